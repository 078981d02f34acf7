//! `l1jec-curves` library crate.
//!
//! The binary (`l1jec`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable (e.g., batch drivers, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod corrections;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod jets;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod util;
