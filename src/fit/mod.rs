//! Best-fit ingestion.
//!
//! Responsibilities:
//!
//! - rebuild the dense parameter vector from a best-fit result (`params`)
//! - turn raw model-evaluation output into absolute expected yields
//!   (`yields`)

pub mod params;
pub mod yields;

pub use params::*;
pub use yields::*;
