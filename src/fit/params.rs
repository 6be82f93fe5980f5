//! Parameter vector reconstruction.
//!
//! The fit engine reports point estimates keyed by name; model evaluators
//! want a dense vector. Layout:
//!
//! - positions `0..|sources|`: one entry per source, in source-list order,
//!   keyed by the source name
//! - then, for each systematic in order, `npars` entries keyed
//!   `"<systematic>_<j>"` for `j` in `0..npars`
//!
//! The best-fit result is required to contain every expected key; a missing
//! key is a fatal configuration error.

use nalgebra::DVector;
use tracing::debug;

use crate::domain::{BestFit, Source, Systematic};
use crate::error::PlotError;

/// Build the dense parameter vector for one pipeline invocation.
pub fn build_parameter_vector(
    best_fit: &BestFit,
    sources: &[Source],
    systematics: &[Systematic],
) -> Result<DVector<f64>, PlotError> {
    validate_source_indices(sources)?;

    let total = sources.len() + systematics.iter().map(|s| s.npars).sum::<usize>();
    let mut params = DVector::<f64>::zeros(total);

    for (i, source) in sources.iter().enumerate() {
        let interval = best_fit.get(&source.name).ok_or_else(|| {
            PlotError::config(format!(
                "best-fit result is missing source parameter '{}'",
                source.name
            ))
        })?;
        params[i] = interval.point_estimate;
        debug!(parameter = %source.name, value = interval.point_estimate, "best-fit source");
    }

    let mut idx = sources.len();
    for systematic in systematics {
        for j in 0..systematic.npars {
            let key = format!("{}_{j}", systematic.name);
            let interval = best_fit.get(&key).ok_or_else(|| {
                PlotError::config(format!(
                    "best-fit result is missing systematic parameter '{key}'"
                ))
            })?;
            params[idx] = interval.point_estimate;
            debug!(parameter = %key, value = interval.point_estimate, "best-fit systematic");
            idx += 1;
        }
    }

    Ok(params)
}

/// Every source's `index` must equal its position in the source list; signal
/// yields are looked up through it.
fn validate_source_indices(sources: &[Source]) -> Result<(), PlotError> {
    for (i, source) in sources.iter().enumerate() {
        if source.index != i {
            return Err(PlotError::config(format!(
                "source '{}' has index {} but sits at position {i} in the source list",
                source.name, source.index
            )));
        }
    }
    Ok(())
}
