//! The model-evaluation collaborator contract.

use nalgebra::DVector;

use crate::error::PlotError;
use crate::hist::Histogram;

/// One signal's model-evaluation engine.
///
/// The contract is deliberately two-phase (`submit`, then
/// `await_completion`) even though the pipeline consumes it synchronously:
/// a pipelined driver may interleave submissions across signals as long as
/// each evaluator's results are read only after its own completion.
///
/// After `await_completion` returns, `accepted_events` and
/// `create_histogram` reflect the submitted parameter vector until the next
/// `submit`.
pub trait ModelEvaluator {
    /// Begin an evaluation.
    ///
    /// `params` is the dense parameter vector; entries `0..source_offset`
    /// are source scales (one per source, in source-list order) and the
    /// remainder are systematic parameters.
    fn submit(&mut self, params: &DVector<f64>, source_offset: usize) -> Result<(), PlotError>;

    /// Block until the submitted evaluation has finished.
    fn await_completion(&mut self) -> Result<(), PlotError>;

    /// Number of simulated events accepted by the completed evaluation.
    fn accepted_events(&self) -> u64;

    /// Full-dimensional model histogram from the completed evaluation.
    ///
    /// The caller owns the result; its dimensionality must match the
    /// observable list of the invocation.
    fn create_histogram(&self) -> Result<Histogram, PlotError>;
}
