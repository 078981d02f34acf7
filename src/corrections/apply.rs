//! Apply an eta-binned correction table to jets in place.
//!
//! For each jet: find the |eta| bin by lower-bound search over the edges,
//! check the pt gate against the bin function's fitted range, rescale pt by
//! the function value at pt, and commit only if the result lands strictly
//! inside the sanity window `(0, MAX_CORRECTED_PT)`. Eta, phi and mass are
//! never touched.
//!
//! Per-jet skips (gate or sanity window) are not errors; the returned
//! [`CorrectionStats`] counts them. A jet whose |eta| lies outside the
//! configured binning is an error: it means jets and binning do not belong
//! together, and correcting the rest would hide that.

use crate::corrections::validate_eta_edges;
use crate::domain::{CorrectionStats, FitFunction, FourMomentum, MAX_CORRECTED_PT, PtGate};
use crate::error::AppError;

/// Correct `jets` in place using one function per eta bin.
///
/// `eta_edges` must be strictly increasing with exactly
/// `corr_fns.len() + 1` entries. A jet on or below the first edge, or beyond
/// the last, fails the whole call with a range error.
///
/// Lookup uses the first edge `>= |eta|`, so a jet sitting exactly on an
/// inner edge resolves to the lower bin.
pub fn correct_jets(
    jets: &mut [FourMomentum],
    corr_fns: &[FitFunction],
    eta_edges: &[f64],
    gate: PtGate,
) -> Result<CorrectionStats, AppError> {
    validate_eta_edges(eta_edges)?;
    if corr_fns.len() != eta_edges.len() - 1 {
        return Err(AppError::new(
            2,
            format!(
                "Correction table does not match the binning: {} functions for {} bins.",
                corr_fns.len(),
                eta_edges.len() - 1
            ),
        ));
    }

    let mut stats = CorrectionStats {
        n_jets: jets.len(),
        ..CorrectionStats::default()
    };

    for jet in jets.iter_mut() {
        let abs_eta = jet.eta.abs();

        // First edge >= |eta|.
        let idx = eta_edges.partition_point(|&e| e < abs_eta);
        if idx == 0 {
            return Err(AppError::new(
                3,
                format!(
                    "Jet |eta| {abs_eta} is on or below the first bin edge {}.",
                    eta_edges[0]
                ),
            ));
        }
        if idx == eta_edges.len() {
            return Err(AppError::new(
                3,
                format!(
                    "Jet |eta| {abs_eta} is beyond the last bin edge {}.",
                    eta_edges[eta_edges.len() - 1]
                ),
            ));
        }

        let corr_fn = &corr_fns[idx - 1];
        if !gate.allows(jet.pt, corr_fn.domain()) {
            stats.n_gated += 1;
            continue;
        }

        let new_pt = jet.pt * corr_fn.eval(jet.pt);
        if new_pt > 0.0 && new_pt < MAX_CORRECTED_PT {
            jet.pt = new_pt;
            stats.n_corrected += 1;
        } else {
            stats.n_rejected += 1;
        }
    }

    Ok(stats)
}
