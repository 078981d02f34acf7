//! Shape-parameter grid generation.
//!
//! The standard ansatz is fitted by a deterministic grid search over its
//! nonlinear shape parameters (falloff offset, Gaussian width and center).
//!
//! Why grid search?
//! - It avoids the local minima the ansatz is notorious for under
//!   derivative-based minimizers.
//! - It is deterministic given the same inputs/flags.
//! - With three shape dimensions and linear solves per candidate, a modest
//!   grid is fast enough for a full 16-bin calibration pass.

use crate::domain::FitModel;
use crate::error::AppError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid grid range: min={min}, max={max} (must be finite, >0, and max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Grid steps must be >= 2."));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

/// Generate `steps` linearly spaced points between `min` and `max`
/// (inclusive). Used for the Gaussian center, which may be negative.
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid grid range: min={min}, max={max} (must be finite and max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Grid steps must be >= 2."));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push(min + step * i as f64);
    }
    Ok(out)
}

/// Grid ranges for the shape search.
#[derive(Debug, Clone)]
pub struct ShapeRanges {
    /// Falloff offset (p2), log-spaced; must stay positive to keep the
    /// denominator away from zero.
    pub offset_min: f64,
    pub offset_max: f64,
    pub offset_steps: usize,
    /// Gaussian width (p4), log-spaced.
    pub width_min: f64,
    pub width_max: f64,
    pub width_steps: usize,
    /// Gaussian center in log10(pt) (p5), linearly spaced.
    pub center_min: f64,
    pub center_max: f64,
    pub center_steps: usize,
}

impl Default for ShapeRanges {
    fn default() -> Self {
        // Centers cover log10(pt) for pt roughly 0.3 to 1000 GeV.
        Self {
            offset_min: 0.05,
            offset_max: 20.0,
            offset_steps: 12,
            width_min: 0.01,
            width_max: 10.0,
            width_steps: 10,
            center_min: -0.5,
            center_max: 3.0,
            center_steps: 10,
        }
    }
}

/// Build the candidate shape tuples for a model kind.
///
/// `Flat` has no shape parameters; its grid is a single empty tuple so the
/// fitter's candidate loop still runs exactly once.
pub fn shape_grid(model: FitModel, ranges: &ShapeRanges) -> Result<Vec<Vec<f64>>, AppError> {
    match model {
        FitModel::Flat => Ok(vec![Vec::new()]),
        FitModel::Standard => {
            let offsets = log_space(ranges.offset_min, ranges.offset_max, ranges.offset_steps)?;
            let widths = log_space(ranges.width_min, ranges.width_max, ranges.width_steps)?;
            let centers = lin_space(ranges.center_min, ranges.center_max, ranges.center_steps)?;

            let mut out = Vec::with_capacity(offsets.len() * widths.len() * centers.len());
            for &offset in &offsets {
                for &width in &widths {
                    for &center in &centers {
                        out.push(vec![offset, width, center]);
                    }
                }
            }
            Ok(out)
        }
    }
}
