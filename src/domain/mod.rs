//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - jet kinematics (`FourMomentum`)
//! - persisted correction objects (`FitFunction`, `CorrectionGraph`, `CorrectionsFile`)
//! - correction-pass policy and outputs (`PtGate`, `CorrectionStats`)

pub mod types;

pub use types::*;
