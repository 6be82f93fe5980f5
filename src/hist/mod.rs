//! Histogram primitives.
//!
//! - uniform bin axes (`BinAxis`)
//! - dense 1/2/3-dimensional histograms and the tagged `Histogram` variant
//!   with per-axis projections

pub mod axis;
pub mod histogram;

pub use axis::*;
pub use histogram::*;
