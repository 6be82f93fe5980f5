//! `fit-spectra` library crate.
//!
//! Turns a best-fit parameter estimate into comparison plots: scaled
//! expected-signal spectra, their summed total, and the observed data,
//! overlaid per dataset and observable and exported in five formats.
//!
//! The crate is a library only so that:
//!
//! - the pipeline is testable without spawning processes
//! - fit drivers embed it directly and supply their own model evaluators
//! - modules are reusable (re-plotting, goodness-of-fit studies, etc.)

pub mod domain;
pub mod error;
pub mod fit;
pub mod hist;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod plot;
