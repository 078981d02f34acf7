//! Mathematical utilities: ansatz basis terms and weighted least squares.

pub mod basis;
pub mod ols;

pub use basis::*;
pub use ols::*;
