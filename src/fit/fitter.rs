//! Fit a correction function to one graph.
//!
//! Given a graph's points `(x_i, y_i)` with errors `ey_i` and a list of
//! candidate shape tuples, we solve, for each tuple:
//!
//! - a weighted OLS problem (weights `1/ey_i^2`) for the linear coefficients
//! - the resulting weighted SSE
//!
//! and keep the best (lowest SSE) candidate. Selection is deterministic:
//! ties break toward the lower grid index.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::{CorrectionGraph, FitFunction, FitModel, FitOutcome, FitQuality};
use crate::error::AppError;
use crate::fit::grid::{ShapeRanges, shape_grid};
use crate::math::solve_least_squares;
use crate::models::{assemble_params, eval, fill_design_row};

/// Options that affect how a graph is fitted.
#[derive(Debug, Clone, Default)]
pub struct FitOptions {
    /// Shape grid ranges for the nonlinear parameters.
    pub ranges: ShapeRanges,
    /// Override for the recorded fit domain. When unset, the domain is the
    /// fitted graph's x extent.
    pub domain: Option<(f64, f64)>,
}

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    params: Vec<f64>,
    sse: f64,
}

/// Fit `model` to the graph's points.
///
/// The returned function keeps the graph's name; callers re-key it before
/// inserting it into a corrections file.
pub fn fit_graph(
    graph: &CorrectionGraph,
    model: FitModel,
    opts: &FitOptions,
) -> Result<FitOutcome, AppError> {
    if !graph.is_consistent() {
        return Err(AppError::new(
            3,
            format!("Graph '{}' has ragged point vectors.", graph.name),
        ));
    }
    let n = graph.len();
    let free_params = model.param_len();
    if n < free_params {
        return Err(AppError::new(
            3,
            format!(
                "Graph '{}' has {n} points; fitting a {} model needs at least {free_params}.",
                graph.name,
                model.display_name()
            ),
        ));
    }

    let weights = point_weights(&graph.ey);
    let candidates_grid = shape_grid(model, &opts.ranges)?;

    // Evaluate each shape tuple independently (parallel).
    let candidates: Vec<Candidate> = candidates_grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, shape)| {
            evaluate_candidate(model, shape, &graph.x, &graph.y, &weights).map(|(params, sse)| {
                Candidate { idx, params, sse }
            })
        })
        .collect();

    if candidates.is_empty() {
        return Err(AppError::new(
            4,
            format!(
                "No valid fit candidates for graph '{}' with the {} model.",
                graph.name,
                model.display_name()
            ),
        ));
    }

    // Deterministic selection: minimum SSE; break ties by original grid index.
    let mut best = &candidates[0];
    for c in &candidates[1..] {
        if c.sse < best.sse || (c.sse == best.sse && c.idx < best.idx) {
            best = c;
        }
    }

    let (fit_min, fit_max) = match opts.domain {
        Some(d) => d,
        None => graph_extent(&graph.x),
    };

    let rmse = (best.sse / n as f64).sqrt();
    Ok(FitOutcome {
        function: FitFunction::new(
            graph.name.clone(),
            model,
            best.params.clone(),
            fit_min,
            fit_max,
        ),
        quality: FitQuality {
            sse: best.sse,
            rmse,
            n,
        },
    })
}

/// Inverse-variance weights from the graph's y errors.
///
/// Points with a missing or non-positive error get unit weight rather than
/// dominating or vanishing from the objective.
fn point_weights(ey: &[f64]) -> Vec<f64> {
    ey.iter()
        .map(|&e| {
            if e.is_finite() && e > 0.0 {
                1.0 / (e * e)
            } else {
                1.0
            }
        })
        .collect()
}

fn evaluate_candidate(
    model: FitModel,
    shape: &[f64],
    x: &[f64],
    y: &[f64],
    w: &[f64],
) -> Option<(Vec<f64>, f64)> {
    // Skip candidates fed invalid data.
    if x.iter().any(|v| !v.is_finite() || *v <= 0.0) {
        return None;
    }
    if y.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let n = x.len();
    let p = model.linear_len();

    // Build weighted design matrix X_w and weighted observation vector y_w.
    let mut xw = DMatrix::<f64>::zeros(n, p);
    let mut yw = DVector::<f64>::zeros(n);
    let mut row = vec![0.0; p];

    for i in 0..n {
        fill_design_row(model, x[i], shape, &mut row);
        let sw = w[i].sqrt();
        for j in 0..p {
            xw[(i, j)] = row[j] * sw;
        }
        yw[i] = y[i] * sw;
    }

    let linear = solve_least_squares(&xw, &yw)?;
    let linear: Vec<f64> = linear.iter().copied().collect();
    let params = assemble_params(model, &linear, shape);

    // Weighted SSE from the unweighted model prediction.
    let mut sse = 0.0;
    for i in 0..n {
        let r = y[i] - eval(model, x[i], &params);
        sse += w[i] * r * r;
    }

    if sse.is_finite() { Some((params, sse)) } else { None }
}

fn graph_extent(x: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in x {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo.is_finite() && hi.is_finite() && hi > lo {
        (lo, hi)
    } else {
        (0.0, crate::domain::MAX_CORRECTED_PT)
    }
}
