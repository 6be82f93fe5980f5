//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - fit components (`Source`, `Systematic`, `Signal`)
//! - measured quantities (`Observable`)
//! - best-fit result entries (`Interval`)

pub mod types;

pub use types::*;
