//! Input/output helpers.
//!
//! - jets CSV ingest + validation (`events`)
//! - jets/events CSV export (`export`)
//! - corrections JSON read/write (`corrections`)

pub mod corrections;
pub mod events;
pub mod export;

pub use corrections::*;
pub use events::*;
pub use export::*;
