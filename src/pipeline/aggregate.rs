//! Per-dataset accumulation of model totals and data histograms.
//!
//! One `DatasetTotals` record is created up front for every known dataset
//! id, so "dataset never contributed" and "dataset not configured" stay
//! distinct: the former is a record full of `None`s, the latter is a
//! configuration error on first contribution.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{DatasetId, Observable};
use crate::error::PlotError;
use crate::hist::{Hist1D, Histogram};
use crate::io::total_key;

/// Running totals for one dataset.
#[derive(Debug, Clone)]
pub struct DatasetTotals {
    dataset: DatasetId,
    /// Full-dimensional sum of all scaled signal histograms.
    nd_total: Option<Histogram>,
    /// Per-observable marginal sums (the "total fit" curves).
    marginals: Vec<Option<Hist1D>>,
}

impl DatasetTotals {
    fn new(dataset: DatasetId, n_observables: usize) -> Self {
        Self {
            dataset,
            nd_total: None,
            marginals: vec![None; n_observables],
        }
    }

    pub fn dataset(&self) -> DatasetId {
        self.dataset
    }

    pub fn nd_total(&self) -> Option<&Histogram> {
        self.nd_total.as_ref()
    }

    pub fn marginal(&self, observable: usize) -> Option<&Hist1D> {
        self.marginals[observable].as_ref()
    }
}

/// Accumulates scaled signal spectra into per-dataset totals.
#[derive(Debug, Clone)]
pub struct FitAggregator {
    observable_names: Vec<String>,
    totals: BTreeMap<DatasetId, DatasetTotals>,
}

impl FitAggregator {
    /// Create an aggregation record for every known dataset id.
    pub fn new(datasets: &BTreeSet<DatasetId>, observables: &[Observable]) -> Self {
        let observable_names = observables.iter().map(|o| o.name.clone()).collect();
        let totals = datasets
            .iter()
            .map(|&ds| (ds, DatasetTotals::new(ds, observables.len())))
            .collect();
        Self {
            observable_names,
            totals,
        }
    }

    pub fn totals(&self, dataset: DatasetId) -> Option<&DatasetTotals> {
        self.totals.get(&dataset)
    }

    /// Accumulate one scaled signal: its full-dimensional histogram and its
    /// per-observable marginals.
    ///
    /// The first contribution seeds each running total with a renamed clone;
    /// later ones add bin-wise. A zero-integral marginal is skipped on
    /// accumulation so an empty contribution never pollutes a total.
    pub fn add_signal(
        &mut self,
        dataset: DatasetId,
        nd: &Histogram,
        marginals: &[Hist1D],
    ) -> Result<(), PlotError> {
        if marginals.len() != self.observable_names.len() {
            return Err(PlotError::dimensionality(format!(
                "got {} marginals for {} observables (dataset {dataset})",
                marginals.len(),
                self.observable_names.len()
            )));
        }
        let entry = self.totals.get_mut(&dataset).ok_or_else(|| {
            PlotError::config(format!(
                "dataset {dataset} is not in the configured dataset set"
            ))
        })?;

        match &mut entry.nd_total {
            None => {
                let mut total = nd.clone();
                total.set_name(total_key(dataset));
                entry.nd_total = Some(total);
            }
            Some(total) => total.add(nd)?,
        }

        for (j, marginal) in marginals.iter().enumerate() {
            match &mut entry.marginals[j] {
                None => {
                    let mut total = marginal.clone();
                    total.set_name(format!(
                        "htotal_{dataset}{}",
                        self.observable_names[j]
                    ));
                    entry.marginals[j] = Some(total);
                }
                Some(total) => {
                    if marginal.integral() > 0.0 {
                        total.add(marginal)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Consume the aggregator, yielding the full-dimensional total per
    /// dataset (datasets that never contributed are omitted).
    pub fn into_nd_totals(self) -> BTreeMap<DatasetId, Histogram> {
        self.totals
            .into_values()
            .filter_map(|t| t.nd_total.map(|h| (t.dataset, h)))
            .collect()
    }
}

/// Bin raw data records into a per-(dataset, observable) data histogram.
///
/// `data` is row-major with `n_observables + 1` values per record; the
/// trailing value is the dataset id. The result shares `template`'s binning
/// (cloned and reset), guaranteeing bin alignment with the model curves.
pub fn build_data_histogram(
    template: &Hist1D,
    data: &[f64],
    n_observables: usize,
    observable: usize,
    dataset: DatasetId,
) -> Result<Hist1D, PlotError> {
    let stride = n_observables + 1;
    if data.len() % stride != 0 {
        return Err(PlotError::config(format!(
            "data array length {} is not a multiple of the record stride {stride}",
            data.len()
        )));
    }

    let mut hist = template.zeroed_like("hdata");
    for record in data.chunks_exact(stride) {
        if record[n_observables] as DatasetId == dataset {
            hist.fill(record[observable]);
        }
    }
    Ok(hist)
}
