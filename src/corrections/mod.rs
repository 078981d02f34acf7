//! Eta-binned jet energy corrections.
//!
//! Responsibilities:
//!
//! - key naming for the objects in a corrections file (`correction_key` / `graph_key`)
//! - assembling the per-bin function table from a file, with identity
//!   fallbacks for missing bins (`loader`)
//! - applying the table to jets in place (`apply`)

pub mod apply;
pub mod loader;

pub use apply::*;
pub use loader::*;
