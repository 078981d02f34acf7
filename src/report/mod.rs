//! Run summaries and terminal output formatting.

pub mod format;

pub use format::*;
