//! Correction-curve rendering.

pub mod curve;

pub use curve::*;
