//! Error taxonomy for the fit-plotting pipeline.
//!
//! All fatal conditions abort the whole invocation; there is no
//! partial-success result. Each variant carries a message naming the
//! signal/source/systematic (or file) that triggered it.

/// Pipeline error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotError {
    /// Inconsistent inputs: a missing best-fit key, mismatched source
    /// metadata, a malformed flat data array, mismatched binning.
    Configuration(String),
    /// A model histogram's dimensionality does not match the observable list.
    Dimensionality(String),
    /// A zero-integral model histogram cannot be rescaled to an absolute
    /// expected yield.
    DegenerateNormalization(String),
    /// A model evaluator reported a failure.
    Evaluation(String),
    /// Failed to write a plot export or the persisted-output container.
    Export(String),
}

impl PlotError {
    pub fn config(message: impl Into<String>) -> Self {
        PlotError::Configuration(message.into())
    }

    pub fn dimensionality(message: impl Into<String>) -> Self {
        PlotError::Dimensionality(message.into())
    }

    pub fn degenerate(message: impl Into<String>) -> Self {
        PlotError::DegenerateNormalization(message.into())
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        PlotError::Evaluation(message.into())
    }

    pub fn export(message: impl Into<String>) -> Self {
        PlotError::Export(message.into())
    }
}

impl std::fmt::Display for PlotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlotError::Configuration(m) => write!(f, "configuration error: {m}"),
            PlotError::Dimensionality(m) => write!(f, "dimensionality error: {m}"),
            PlotError::DegenerateNormalization(m) => {
                write!(f, "degenerate normalization: {m}")
            }
            PlotError::Evaluation(m) => write!(f, "evaluation error: {m}"),
            PlotError::Export(m) => write!(f, "export error: {m}"),
        }
    }
}

impl std::error::Error for PlotError {}
