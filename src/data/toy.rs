//! Synthetic jet events and correction inputs for demos and end-to-end runs.
//!
//! The generated corrections follow the standard fit shape, with the
//! low-momentum rise growing toward the forward bins. Events draw jets
//! uniformly across the covered eta range, so a full pipeline run touches
//! every bin.

use std::f64::consts::PI;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::corrections::{correction_key, graph_key, validate_eta_edges};
use crate::domain::{CorrectionGraph, CorrectionsFile, FitFunction, FitModel};
use crate::error::AppError;
use crate::io::events::EventJets;
use crate::models::eval;

/// Relative y error applied to generated graph points.
const GRAPH_REL_ERR: f64 = 0.02;

/// Reference-pt sampling range for generated graphs.
const GRAPH_PT_MIN: f64 = 10.0;
const GRAPH_PT_MAX: f64 = 250.0;

/// Fit domain recorded on generated truth functions.
const TRUTH_FIT_MIN: f64 = 8.0;
const TRUTH_FIT_MAX: f64 = 600.0;

/// Truth parameters for one eta bin.
///
/// The base correction and the low-pt falloff both grow with bin index, which
/// mimics the larger corrections needed in the forward region.
fn truth_params(bin: usize) -> Vec<f64> {
    let i = bin as f64;
    vec![1.0 + 0.02 * (i + 1.0), 2.0 + 0.1 * i, 2.0, 0.3, 0.5, 1.2]
}

/// Build a corrections file with one truth function and one noisy graph per
/// eta bin.
pub fn toy_corrections_file(eta_edges: &[f64], seed: u64) -> Result<CorrectionsFile, AppError> {
    validate_eta_edges(eta_edges)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut file = CorrectionsFile::new();
    for (bin, pair) in eta_edges.windows(2).enumerate() {
        let (lo, hi) = (pair[0], pair[1]);
        let params = truth_params(bin);

        file.insert_function(FitFunction::new(
            correction_key(lo, hi),
            FitModel::Standard,
            params.clone(),
            TRUTH_FIT_MIN,
            TRUTH_FIT_MAX,
        ));
        file.insert_graph(toy_graph(
            graph_key(lo, hi),
            format!("{lo} < |eta| < {hi}"),
            &params,
            &mut rng,
            &normal,
        ));
    }
    Ok(file)
}

fn toy_graph(
    name: String,
    title: String,
    params: &[f64],
    rng: &mut StdRng,
    normal: &Normal<f64>,
) -> CorrectionGraph {
    let n = 14usize;
    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    let mut ex = Vec::with_capacity(n);
    let mut ey = Vec::with_capacity(n);

    // Log-spaced reference-pt bin centers.
    let l0 = GRAPH_PT_MIN.log10();
    let l1 = GRAPH_PT_MAX.log10();
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let pt = 10f64.powf(l0 + u * (l1 - l0));
        let truth = eval(FitModel::Standard, pt, params);
        let err = truth * GRAPH_REL_ERR;
        let z: f64 = normal.sample(rng);

        x.push(pt);
        y.push(truth + err * z);
        ex.push(pt * 0.05);
        ey.push(err);
    }

    CorrectionGraph {
        name,
        title,
        x,
        y,
        ex,
        ey,
    }
}

/// Generate synthetic events with jets spread across the covered eta range.
///
/// Every jet keeps |eta| strictly inside `(first_edge, last_edge)`, so the
/// generated file never trips the binning range check downstream.
pub fn toy_events(eta_edges: &[f64], n_events: usize, seed: u64) -> Result<Vec<EventJets>, AppError> {
    validate_eta_edges(eta_edges)?;
    if n_events == 0 {
        return Err(AppError::new(2, "Event count must be > 0."));
    }

    let eta_lo = eta_edges[0];
    let eta_hi = eta_edges[eta_edges.len() - 1];
    let margin = (eta_hi - eta_lo) * 1e-3;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut events = Vec::with_capacity(n_events);

    for event in 0..n_events {
        let n_jets = rng.gen_range(1..=6usize);
        let mut et = Vec::with_capacity(n_jets);
        let mut eta = Vec::with_capacity(n_jets);
        let mut phi = Vec::with_capacity(n_jets);
        let mut bx = Vec::with_capacity(n_jets);

        for _ in 0..n_jets {
            let magnitude = rng.gen_range((eta_lo + margin)..(eta_hi - margin));

            et.push(rng.gen_range(5.0..300.0));
            eta.push(if rng.gen_bool(0.5) { magnitude } else { -magnitude });
            phi.push(rng.gen_range(-PI..PI));
            bx.push(sample_bx(&mut rng));
        }
        events.push(EventJets {
            event: event as u64 + 1,
            et,
            eta,
            phi,
            bx: Some(bx),
        });
    }

    Ok(events)
}

fn sample_bx(rng: &mut StdRng) -> i16 {
    // Most jets sit in the triggered crossing; a minority spill into
    // neighbouring crossings.
    let roll: f64 = rng.r#gen();
    if roll < 0.85 {
        0
    } else if roll < 0.925 {
        -1
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{STANDARD_ETA_EDGES, StoredObject};

    #[test]
    fn corrections_file_covers_every_bin() {
        let edges = [0.0, 0.435, 0.783, 1.131];
        let file = toy_corrections_file(&edges, 42).unwrap();

        for pair in edges.windows(2) {
            let f = file.get_function(&correction_key(pair[0], pair[1])).unwrap();
            assert_eq!(f.model, FitModel::Standard);
            assert_eq!(f.params.len(), 6);
            assert_eq!(f.domain(), (TRUTH_FIT_MIN, TRUTH_FIT_MAX));

            let g = file.get_graph(&graph_key(pair[0], pair[1])).unwrap();
            assert!(g.is_consistent());
            assert_eq!(g.len(), 14);
            assert!(g.x.windows(2).all(|w| w[0] < w[1]));
            assert!(g.y.iter().all(|&v| v > 0.5 && v < 4.0));
        }
        assert_eq!(file.objects.len(), 6);
    }

    #[test]
    fn graphs_track_their_truth_function() {
        let edges = [0.0, 0.435];
        let file = toy_corrections_file(&edges, 7).unwrap();
        let f = file.get_function(&correction_key(0.0, 0.435)).unwrap();
        let g = file.get_graph(&graph_key(0.0, 0.435)).unwrap();

        for (&pt, &y) in g.x.iter().zip(g.y.iter()) {
            let truth = f.eval(pt);
            assert!(
                (y - truth).abs() < truth * GRAPH_REL_ERR * 5.0,
                "point at pt={pt} strayed from truth"
            );
        }
    }

    #[test]
    fn events_are_deterministic_per_seed() {
        let a = toy_events(&STANDARD_ETA_EDGES, 10, 42).unwrap();
        let b = toy_events(&STANDARD_ETA_EDGES, 10, 42).unwrap();
        assert_eq!(a.len(), b.len());
        for (ea, eb) in a.iter().zip(b.iter()) {
            assert_eq!(ea.et, eb.et);
            assert_eq!(ea.eta, eb.eta);
            assert_eq!(ea.bx, eb.bx);
        }

        let c = toy_events(&STANDARD_ETA_EDGES, 10, 43).unwrap();
        assert_ne!(a[0].et, c[0].et);
    }

    #[test]
    fn event_jets_stay_inside_the_eta_range() {
        let events = toy_events(&STANDARD_ETA_EDGES, 50, 1).unwrap();
        let hi = STANDARD_ETA_EDGES[STANDARD_ETA_EDGES.len() - 1];

        let mut n_jets = 0usize;
        for e in &events {
            assert!(e.bx.is_some());
            for &eta in &e.eta {
                assert!(eta.abs() > 0.0 && eta.abs() < hi);
            }
            for &et in &e.et {
                assert!(et >= 5.0 && et < 300.0);
            }
            n_jets += e.n_jets();
        }
        assert!(n_jets >= 50);
    }

    #[test]
    fn zero_events_is_an_input_error() {
        let err = toy_events(&STANDARD_ETA_EDGES, 0, 42).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn stored_objects_round_trip_kinds() {
        let file = toy_corrections_file(&[0.0, 1.0], 3).unwrap();
        let mut functions = 0;
        let mut graphs = 0;
        for obj in file.objects.values() {
            match obj {
                StoredObject::Function(_) => functions += 1,
                StoredObject::Graph(_) => graphs += 1,
            }
        }
        assert_eq!((functions, graphs), (1, 1));
    }
}
