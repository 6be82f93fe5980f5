//! Overlay plotting.
//!
//! - injectable color/line-style palette (`palette`)
//! - incremental multi-curve overlay plots (`overlay`)
//! - five-format figure export (`export`)

pub mod export;
pub mod overlay;
pub mod palette;

pub use overlay::*;
pub use palette::*;
