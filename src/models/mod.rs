//! Model-evaluation engine interface.
//!
//! The engine that turns a parameter vector into a model histogram lives
//! outside this crate; we only define the contract the pipeline drives.

pub mod eval;

pub use eval::*;
