//! Input/output helpers.
//!
//! - persisted-output container for full-dimensional fit totals (`archive`)

pub mod archive;

pub use archive::*;
