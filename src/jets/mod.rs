//! Build jet four-momenta from parallel kinematic arrays.
//!
//! Event records arrive as parallel `et`/`eta`/`phi` branches (optionally
//! with a per-jet bunch-crossing index). These builders turn them into
//! massless `FourMomentum` values, preserving input order, and refuse
//! ragged inputs up front rather than silently pairing mismatched entries.

use crate::domain::FourMomentum;
use crate::error::AppError;

/// Build one massless four-momentum per entry of the parallel arrays.
///
/// Fails if the three slices differ in length.
pub fn build_four_momenta(
    et: &[f64],
    eta: &[f64],
    phi: &[f64],
) -> Result<Vec<FourMomentum>, AppError> {
    if et.len() != eta.len() || et.len() != phi.len() {
        return Err(AppError::new(
            2,
            format!(
                "Kinematic arrays differ in length: et={}, eta={}, phi={}.",
                et.len(),
                eta.len(),
                phi.len()
            ),
        ));
    }

    let mut jets = Vec::with_capacity(et.len());
    for i in 0..et.len() {
        jets.push(FourMomentum::massless(et[i], eta[i], phi[i]));
    }
    Ok(jets)
}

/// Like [`build_four_momenta`], but keeps only entries from the central
/// bunch crossing (`bx == 0`). Relative order of the kept jets is preserved.
///
/// Fails if any of the four slices differ in length.
pub fn build_four_momenta_bx0(
    et: &[f64],
    eta: &[f64],
    phi: &[f64],
    bx: &[i16],
) -> Result<Vec<FourMomentum>, AppError> {
    if et.len() != eta.len() || et.len() != phi.len() || et.len() != bx.len() {
        return Err(AppError::new(
            2,
            format!(
                "Kinematic arrays differ in length: et={}, eta={}, phi={}, bx={}.",
                et.len(),
                eta.len(),
                phi.len(),
                bx.len()
            ),
        ));
    }

    let mut jets = Vec::new();
    for i in 0..et.len() {
        if bx[i] == 0 {
            jets.push(FourMomentum::massless(et[i], eta[i], phi[i]));
        }
    }
    Ok(jets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_massless_jets_in_input_order() {
        let et = [30.0, 55.5, 12.0];
        let eta = [0.2, -1.4, 3.1];
        let phi = [0.0, 1.5, -2.8];

        let jets = build_four_momenta(&et, &eta, &phi).unwrap();
        assert_eq!(jets.len(), 3);
        for (i, jet) in jets.iter().enumerate() {
            assert_eq!(jet.pt, et[i]);
            assert_eq!(jet.eta, eta[i]);
            assert_eq!(jet.phi, phi[i]);
            assert_eq!(jet.mass, 0.0);
        }
    }

    #[test]
    fn empty_inputs_build_empty_output() {
        let jets = build_four_momenta(&[], &[], &[]).unwrap();
        assert!(jets.is_empty());
    }

    #[test]
    fn rejects_ragged_arrays() {
        let err = build_four_momenta(&[1.0, 2.0], &[0.1], &[0.2, 0.3]).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = build_four_momenta(&[1.0], &[0.1], &[0.2, 0.3]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn bx_variant_keeps_only_central_crossing() {
        let et = [10.0, 20.0, 30.0, 40.0];
        let eta = [0.1, 0.2, 0.3, 0.4];
        let phi = [1.0, 2.0, 3.0, -1.0];
        let bx = [0i16, 1, 0, -1];

        let jets = build_four_momenta_bx0(&et, &eta, &phi, &bx).unwrap();
        assert_eq!(jets.len(), 2);
        assert_eq!(jets[0].pt, 10.0);
        assert_eq!(jets[1].pt, 30.0);
        assert!(jets.iter().all(|j| j.mass == 0.0));
    }

    #[test]
    fn bx_variant_rejects_ragged_selector() {
        let err = build_four_momenta_bx0(&[1.0, 2.0], &[0.1, 0.2], &[0.3, 0.4], &[0]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn kinematic_accessors_are_consistent() {
        let jet = FourMomentum::massless(50.0, 1.2, 0.7);
        // For a massless vector, E^2 == px^2 + py^2 + pz^2.
        let p2 = jet.px().powi(2) + jet.py().powi(2) + jet.pz().powi(2);
        assert!((jet.energy().powi(2) - p2).abs() < 1e-9);
    }
}
