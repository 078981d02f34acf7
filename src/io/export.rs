//! Export jet collections to CSV.
//!
//! The export mirrors the ingest schema, so corrected output can be fed
//! straight back into `apply` or inspected in a spreadsheet.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::CorrectedEvent;
use crate::error::AppError;
use crate::io::events::EventJets;

/// Write corrected jets to a CSV file, one jet per row.
pub fn write_jets_csv(path: &Path, events: &[CorrectedEvent]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create jets CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "event,pt,eta,phi,mass")
        .map_err(|e| AppError::new(2, format!("Failed to write jets CSV header: {e}")))?;

    for e in events {
        for jet in &e.jets {
            writeln!(
                file,
                "{},{:.6},{:.6},{:.6},{:.6}",
                e.event, jet.pt, jet.eta, jet.phi, jet.mass
            )
            .map_err(|e| AppError::new(2, format!("Failed to write jets CSV row: {e}")))?;
        }
    }

    Ok(())
}

/// Write raw event jets to a CSV file in the ingest schema.
///
/// Emits a `bx` column only when every event carries bunch-crossing ids.
pub fn write_events_csv(path: &Path, events: &[EventJets]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create events CSV '{}': {e}", path.display()))
    })?;

    let with_bx = events.iter().all(|e| e.bx.is_some());

    let header = if with_bx {
        "event,et,eta,phi,bx"
    } else {
        "event,et,eta,phi"
    };
    writeln!(file, "{header}")
        .map_err(|e| AppError::new(2, format!("Failed to write events CSV header: {e}")))?;

    for e in events {
        for i in 0..e.n_jets() {
            if with_bx {
                let bx = e.bx.as_ref().map(|b| b[i]).unwrap_or(0);
                writeln!(
                    file,
                    "{},{:.6},{:.6},{:.6},{}",
                    e.event, e.et[i], e.eta[i], e.phi[i], bx
                )
            } else {
                writeln!(
                    file,
                    "{},{:.6},{:.6},{:.6}",
                    e.event, e.et[i], e.eta[i], e.phi[i]
                )
            }
            .map_err(|e| AppError::new(2, format!("Failed to write events CSV row: {e}")))?;
        }
    }

    Ok(())
}
