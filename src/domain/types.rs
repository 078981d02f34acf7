//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while correcting jets or fitting curves
//! - persisted to a corrections JSON file
//! - reloaded later for plotting or further fits

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Standard trigger-tower |eta| bin edges (16 bins, barrel through HF).
///
/// Correction tables are usually produced on this binning; the CLI falls back
/// to it when no explicit edge list is given.
pub const STANDARD_ETA_EDGES: [f64; 17] = [
    0.0, 0.435, 0.783, 1.131, 1.305, 1.479, 1.653, 1.83, 1.93, 2.043, 2.172, 2.322, 2.5, 2.964,
    3.489, 4.191, 5.191,
];

/// Upper bound of the sanity window for a corrected pt (GeV).
///
/// A rescaled pt must land strictly inside `(0, MAX_CORRECTED_PT)` to be
/// committed; anything else leaves the jet untouched. Values beyond this are
/// either saturated trigger quantities or runaway fit evaluations.
pub const MAX_CORRECTED_PT: f64 = 1000.0;

/// A jet four-momentum in `(pt, eta, phi, mass)` representation.
///
/// The builders produce massless jets (trigger jets carry no mass
/// measurement), and corrections rewrite `pt` only, so eta, phi and mass
/// survive a correction pass unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FourMomentum {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub mass: f64,
}

impl FourMomentum {
    pub fn new(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        Self { pt, eta, phi, mass }
    }

    /// A zero-mass four-momentum, the shape every trigger jet starts with.
    pub fn massless(pt: f64, eta: f64, phi: f64) -> Self {
        Self::new(pt, eta, phi, 0.0)
    }

    pub fn px(&self) -> f64 {
        self.pt * self.phi.cos()
    }

    pub fn py(&self) -> f64 {
        self.pt * self.phi.sin()
    }

    pub fn pz(&self) -> f64 {
        self.pt * self.eta.sinh()
    }

    /// Total energy, `sqrt(|p|^2 + m^2)`.
    pub fn energy(&self) -> f64 {
        let p = self.pt * self.eta.cosh();
        (p * p + self.mass * self.mass).sqrt()
    }
}

/// Functional form of a stored correction function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FitModel {
    /// Constant multiplier; one parameter. The identity fallback is a flat 1.
    Flat,
    /// The 6-parameter correction ansatz
    /// `p0 + p1 / ((log10 pt)^2 + p2) + p3 * exp(-p4 * (log10 pt - p5)^2)`.
    Standard,
}

impl FitModel {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            FitModel::Flat => "flat",
            FitModel::Standard => "standard",
        }
    }

    /// Total stored parameter count.
    pub fn param_len(self) -> usize {
        match self {
            FitModel::Flat => 1,
            FitModel::Standard => 6,
        }
    }

    /// Number of coefficients the model is linear in (given fixed shape
    /// parameters); these are solved by least squares during a fit.
    pub fn linear_len(self) -> usize {
        match self {
            FitModel::Flat => 1,
            FitModel::Standard => 3,
        }
    }

    /// Number of nonlinear shape parameters; these are grid-searched.
    pub fn shape_len(self) -> usize {
        match self {
            FitModel::Flat => 0,
            FitModel::Standard => 3,
        }
    }
}

/// A named correction function: model kind, parameters and fit domain.
///
/// `fit_min`/`fit_max` record the pt range the parameters were fitted over.
/// The applier consults them when gating in fit-domain mode; evaluation
/// itself is defined for any positive pt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitFunction {
    pub name: String,
    pub model: FitModel,
    pub params: Vec<f64>,
    pub fit_min: f64,
    pub fit_max: f64,
}

impl FitFunction {
    pub fn new(
        name: impl Into<String>,
        model: FitModel,
        params: Vec<f64>,
        fit_min: f64,
        fit_max: f64,
    ) -> Self {
        Self {
            name: name.into(),
            model,
            params,
            fit_min,
            fit_max,
        }
    }

    /// The identity fallback used when a bin has no stored function: a flat
    /// multiplier of 1 with an unbounded domain, so fit-domain gating never
    /// blocks it.
    pub fn flat(name: impl Into<String>) -> Self {
        Self::new(name, FitModel::Flat, vec![1.0], 0.0, f64::MAX)
    }

    /// Evaluate the correction factor at the given pt.
    ///
    /// # Panics
    /// Panics if `params.len() != model.param_len()`. Functions coming out of
    /// the reader or the fitter always satisfy this.
    pub fn eval(&self, pt: f64) -> f64 {
        crate::models::eval(self.model, pt, &self.params)
    }

    /// The pt range the function was fitted over, as `(fit_min, fit_max)`.
    pub fn domain(&self) -> (f64, f64) {
        (self.fit_min, self.fit_max)
    }
}

/// Measured correction points for one eta bin: parallel x/y vectors with
/// symmetric errors, one entry per reference-pt bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionGraph {
    pub name: String,
    pub title: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub ex: Vec<f64>,
    pub ey: Vec<f64>,
}

impl CorrectionGraph {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// True when the four parallel vectors agree in length.
    pub fn is_consistent(&self) -> bool {
        self.y.len() == self.x.len() && self.ex.len() == self.x.len() && self.ey.len() == self.x.len()
    }
}

/// One named object in a corrections file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoredObject {
    Function(FitFunction),
    Graph(CorrectionGraph),
}

/// A corrections file: a flat store of named functions and graphs.
///
/// Functions are keyed `fitfcneta_<etaMin>_<etaMax>` and graphs
/// `l1corr_eta_<etaMin>_<etaMax>` (see `corrections::correction_key` /
/// `corrections::graph_key`). A `BTreeMap` keeps listing and lookup order
/// deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionsFile {
    pub tool: String,
    pub created: String,
    pub objects: BTreeMap<String, StoredObject>,
}

impl CorrectionsFile {
    /// An empty file stamped with the tool name and the local creation time.
    pub fn new() -> Self {
        Self {
            tool: "l1jec".to_string(),
            created: crate::util::current_time_string(),
            objects: BTreeMap::new(),
        }
    }

    pub fn get_function(&self, name: &str) -> Option<&FitFunction> {
        match self.objects.get(name) {
            Some(StoredObject::Function(f)) => Some(f),
            _ => None,
        }
    }

    pub fn get_graph(&self, name: &str) -> Option<&CorrectionGraph> {
        match self.objects.get(name) {
            Some(StoredObject::Graph(g)) => Some(g),
            _ => None,
        }
    }

    /// Insert a function under its own name, replacing any previous object.
    pub fn insert_function(&mut self, function: FitFunction) {
        self.objects
            .insert(function.name.clone(), StoredObject::Function(function));
    }

    /// Insert a graph under its own name, replacing any previous object.
    pub fn insert_graph(&mut self, graph: CorrectionGraph) {
        self.objects.insert(graph.name.clone(), StoredObject::Graph(graph));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }
}

impl Default for CorrectionsFile {
    fn default() -> Self {
        Self::new()
    }
}

/// Diagnostic describing an eta bin with no stored correction function.
///
/// The loader records one of these per miss and substitutes the identity
/// fallback; jets in that bin effectively pass through uncorrected.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingBin {
    pub eta_min: f64,
    pub eta_max: f64,
    pub key: String,
}

/// Eligibility rule deciding which jets get corrected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PtGate {
    /// Correct a jet only when its pt lies strictly inside the function's
    /// fitted range.
    FitDomain,
    /// Correct a jet whenever `pt >= threshold`, regardless of the fitted
    /// range.
    MinPt(f64),
}

impl PtGate {
    /// Map a raw threshold onto a gate. A negative threshold selects
    /// fit-domain mode; this is the convention correction tables have always
    /// been driven with, so the CLI keeps it.
    pub fn from_threshold(min_pt: f64) -> Self {
        if min_pt < 0.0 {
            PtGate::FitDomain
        } else {
            PtGate::MinPt(min_pt)
        }
    }

    /// Whether a jet with the given pt is eligible, given the correction
    /// function's fitted `(fit_min, fit_max)` range.
    pub fn allows(&self, pt: f64, domain: (f64, f64)) -> bool {
        match *self {
            PtGate::FitDomain => pt > domain.0 && pt < domain.1,
            PtGate::MinPt(threshold) => pt >= threshold,
        }
    }
}

/// Counters describing what a correction pass did.
///
/// Individual gate or sanity-window skips stay silent; these aggregates keep
/// them visible to drivers and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrectionStats {
    /// Jets examined.
    pub n_jets: usize,
    /// Jets whose pt was rescaled and committed.
    pub n_corrected: usize,
    /// Jets the pt gate declared ineligible.
    pub n_gated: usize,
    /// Jets whose rescaled pt fell outside `(0, MAX_CORRECTED_PT)`.
    pub n_rejected: usize,
}

impl CorrectionStats {
    pub fn merge(&mut self, other: &CorrectionStats) {
        self.n_jets += other.n_jets;
        self.n_corrected += other.n_corrected;
        self.n_gated += other.n_gated;
        self.n_rejected += other.n_rejected;
    }
}

/// One event's corrected jets, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedEvent {
    pub event: u64,
    pub jets: Vec<FourMomentum>,
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
}

/// Fit output for a single graph.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub function: FitFunction,
    pub quality: FitQuality,
}

/// One eta bin's fitted function, labelled by its storage key.
#[derive(Debug, Clone)]
pub struct BinFit {
    pub key: String,
    pub outcome: FitOutcome,
}

/// An `apply` run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ApplyConfig {
    pub jets_csv: PathBuf,
    pub corrections_path: PathBuf,
    /// Sorted |eta| bin edges; N+1 edges define N bins.
    pub eta_edges: Vec<f64>,
    pub gate: PtGate,
    pub export: Option<PathBuf>,
}
