//! Evaluation of the stored correction-function models.
//!
//! The fitter relies on three primitive operations:
//! - build a design row for a given pt and shape parameters (for OLS)
//! - reassemble the full parameter vector from linear + shape parts
//! - evaluate the correction factor at a pt (for residuals/plots/applying)
//!
//! These are implemented here for each model kind.

use crate::domain::FitModel;
use crate::math::{log_falloff, log_gauss};

/// Fill a design row for the given model kind.
///
/// The row includes the constant term first (intercept); for `Standard` the
/// remaining columns are the falloff and Gaussian terms at the given shape.
///
/// # Panics
/// Panics if `out` does not have length `model.linear_len()` or `shape` does
/// not have length `model.shape_len()`. Callers should size these arrays
/// correctly.
pub fn fill_design_row(model: FitModel, pt: f64, shape: &[f64], out: &mut [f64]) {
    match model {
        FitModel::Flat => {
            out[0] = 1.0;
        }
        FitModel::Standard => {
            out[0] = 1.0;
            out[1] = log_falloff(pt, shape[0]);
            out[2] = log_gauss(pt, shape[1], shape[2]);
        }
    }
}

/// Interleave linear coefficients and shape parameters back into the stored
/// parameter order.
///
/// For `Standard` the stored order is `[p0, p1, p2, p3, p4, p5]` where the
/// fit solves `p0, p1, p3` and searches `p2, p4, p5`.
///
/// # Panics
/// Panics if the slices do not have lengths `model.linear_len()` and
/// `model.shape_len()`.
pub fn assemble_params(model: FitModel, linear: &[f64], shape: &[f64]) -> Vec<f64> {
    match model {
        FitModel::Flat => vec![linear[0]],
        FitModel::Standard => vec![
            linear[0], linear[1], shape[0], linear[2], shape[1], shape[2],
        ],
    }
}

/// Evaluate the correction factor at `pt` for the given model kind.
///
/// # Panics
/// Panics if `params.len() != model.param_len()`.
pub fn eval(model: FitModel, pt: f64, params: &[f64]) -> f64 {
    match model {
        FitModel::Flat => params[0],
        FitModel::Standard => {
            params[0]
                + params[1] * log_falloff(pt, params[2])
                + params[3] * log_gauss(pt, params[4], params[5])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_eval_is_its_parameter() {
        assert_eq!(eval(FitModel::Flat, 5.0, &[1.1]), 1.1);
        assert_eq!(eval(FitModel::Flat, 500.0, &[1.1]), 1.1);
    }

    #[test]
    fn standard_eval_matches_design_row_identity() {
        // eval(assemble(linear, shape)) must equal the dot product of the
        // design row with the linear coefficients.
        let linear = [1.02, 2.0, 0.3];
        let shape = [2.0, 0.5, 1.2];
        let params = assemble_params(FitModel::Standard, &linear, &shape);
        assert_eq!(params.len(), FitModel::Standard.param_len());

        let mut row = [0.0; 3];
        for &pt in &[5.0, 20.0, 80.0, 400.0] {
            fill_design_row(FitModel::Standard, pt, &shape, &mut row);
            let via_row: f64 = row.iter().zip(linear.iter()).map(|(r, c)| r * c).sum();
            let direct = eval(FitModel::Standard, pt, &params);
            assert!(
                (via_row - direct).abs() < 1e-12,
                "mismatch at pt {pt}: {via_row} vs {direct}"
            );
        }
    }

    #[test]
    fn standard_eval_finite_over_trigger_range() {
        let params = [1.0, 2.0, 2.0, 0.3, 0.5, 1.2];
        for i in 0..200 {
            let pt = 0.5 + i as f64 * 5.0;
            assert!(eval(FitModel::Standard, pt, &params).is_finite());
        }
    }
}
