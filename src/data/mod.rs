//! Synthetic data generation.

pub mod toy;

pub use toy::*;
