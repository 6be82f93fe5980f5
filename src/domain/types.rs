//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable (where it
//! makes sense) so they can be:
//!
//! - used in-memory while driving the plot pipeline
//! - exported alongside the rendered overlays
//! - reloaded later for comparisons

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::ModelEvaluator;

/// Opaque identifier grouping signals, observables, and raw data rows that
/// must be compared together.
///
/// Raw data records carry the dataset id as a trailing float field, so ids
/// are small non-negative integers by convention.
pub type DatasetId = u32;

/// Best-fit result: point estimate per parameter name.
pub type BestFit = HashMap<String, Interval>;

/// A named fit component with an index into the parameter vector.
///
/// `index` must equal the source's position in the source list; the pipeline
/// validates this up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub index: usize,
}

/// A named nuisance component contributing `npars` contiguous entries to the
/// parameter vector, located after all source entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Systematic {
    pub name: String,
    pub npars: usize,
}

/// One best-fit result entry.
///
/// Only the point estimate is read by this crate; the interval bounds are
/// carried through for callers that want them in exports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub point_estimate: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    /// An interval collapsed onto a single point estimate.
    pub fn point(value: f64) -> Self {
        Self {
            point_estimate: value,
            lower: value,
            upper: value,
        }
    }
}

/// One measured quantity with its own binning and axis configuration.
///
/// The ordered list of observables defines histogram dimensionality and axis
/// order for every dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observable {
    /// Short name used in output file paths and histogram names.
    pub name: String,
    /// Display title used as the x-axis title.
    pub title: String,
    /// Unit label used when synthesizing the y-axis title.
    pub units: String,
    pub lower: f64,
    pub upper: f64,
    pub bins: usize,
    /// Fixed y-range for plots; `(-1.0, -1.0)` means "auto".
    pub yrange: (f64, f64),
    pub logscale: bool,
}

/// One expected-event-rate model tied to exactly one source and one dataset.
///
/// The signal owns the handle to its model-evaluation object for the
/// duration of a pipeline invocation.
pub struct Signal {
    pub name: String,
    /// Display title used for the legend entry.
    pub title: String,
    /// The source whose parameter-vector entry scales this signal.
    pub source: Source,
    pub dataset: DatasetId,
    /// Nominal expected event count before efficiency and fit scaling.
    pub nexpected: f64,
    /// Number of Monte-Carlo events this signal was generated from.
    pub n_mc: u64,
    /// Model-evaluation engine for this signal (external collaborator).
    pub evaluator: Box<dyn ModelEvaluator>,
}

impl std::fmt::Debug for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("source", &self.source)
            .field("dataset", &self.dataset)
            .field("nexpected", &self.nexpected)
            .field("n_mc", &self.n_mc)
            .finish_non_exhaustive()
    }
}
