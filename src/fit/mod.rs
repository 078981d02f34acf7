//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - generate shape grids for the supported fit models
//! - evaluate each candidate shape tuple (parallel)
//! - select the lowest-SSE candidate deterministically

pub mod fitter;
pub mod grid;

pub use fitter::*;
pub use grid::*;
