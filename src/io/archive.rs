//! Persisted-output container for per-dataset fit totals.
//!
//! The container is the "portable" representation of the best-fit model:
//! one full-dimensional total histogram per dataset, keyed by a name derived
//! from the dataset id (`htotal_<ds>`). It is written once per pipeline
//! invocation and can be reloaded for goodness-of-fit studies or re-plotting
//! without re-evaluating any model.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use crate::domain::DatasetId;
use crate::error::PlotError;
use crate::hist::Histogram;

/// Container key for a dataset's full-dimensional total.
pub fn total_key(dataset: DatasetId) -> String {
    format!("htotal_{dataset}")
}

/// Write the totals container.
///
/// Datasets that accumulated no contribution are absent from the container;
/// an empty map still produces a valid (empty) container file.
pub fn write_totals(
    path: &Path,
    totals: &BTreeMap<DatasetId, Histogram>,
) -> Result<(), PlotError> {
    let keyed: BTreeMap<String, &Histogram> = totals
        .iter()
        .map(|(ds, hist)| (total_key(*ds), hist))
        .collect();

    let file = File::create(path).map_err(|e| {
        PlotError::export(format!(
            "failed to create totals container '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, &keyed).map_err(|e| {
        PlotError::export(format!(
            "failed to write totals container '{}': {e}",
            path.display()
        ))
    })
}

/// Reload a totals container.
pub fn read_totals(path: &Path) -> Result<BTreeMap<String, Histogram>, PlotError> {
    let file = File::open(path).map_err(|e| {
        PlotError::export(format!(
            "failed to open totals container '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::from_reader(file).map_err(|e| {
        PlotError::export(format!(
            "invalid totals container '{}': {e}",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hist::{BinAxis, Hist1D};

    #[test]
    fn totals_round_trip_through_the_container() {
        let dir = std::env::temp_dir().join(format!(
            "fit_spectra_archive_{}_{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("fit_pdfs.json");

        let mut h = Hist1D::new("htotal_0", BinAxis::new(0.0, 10.0, 10));
        h.fill(1.0);
        h.scale(25.0);

        let mut totals = BTreeMap::new();
        totals.insert(0u32, Histogram::Dim1(h));
        write_totals(&path, &totals).unwrap();

        let loaded = read_totals(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        let total = loaded.get("htotal_0").unwrap();
        assert!((total.integral() - 25.0).abs() < 1e-12);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_container_is_an_export_error() {
        let err = read_totals(Path::new("/nonexistent/fit_pdfs.json")).unwrap_err();
        assert!(matches!(err, PlotError::Export(_)));
    }
}
