//! Shared pipeline logic behind the CLI subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflows:
//!
//! - apply: CSV ingest -> correction lookup -> vector building -> pt rescale
//! - fit:   corrections read -> per-bin grid fit -> re-keyed functions
//!
//! The CLI handlers can then focus on presentation (printing vs exports).

use std::path::PathBuf;

use crate::corrections::{correction_key, graph_key, load_correction_functions, validate_eta_edges};
use crate::corrections::apply::correct_jets;
use crate::domain::{
    ApplyConfig, BinFit, CorrectedEvent, CorrectionStats, CorrectionsFile, FitModel, FitOutcome,
    MissingBin, StoredObject,
};
use crate::error::AppError;
use crate::fit::{FitOptions, fit_graph};
use crate::io::corrections::read_corrections_json;
use crate::io::events::{EventsData, load_event_jets};
use crate::jets::{build_four_momenta, build_four_momenta_bx0};

/// All computed outputs of a single `l1jec apply` run.
#[derive(Debug, Clone)]
pub struct ApplyOutput {
    /// Raw ingest, kept for reporting (row errors, counters).
    pub data: EventsData,
    pub events: Vec<CorrectedEvent>,
    pub stats: CorrectionStats,
    pub missing: Vec<MissingBin>,
}

/// Execute the full correction pipeline and return the computed outputs.
pub fn run_apply(config: &ApplyConfig) -> Result<ApplyOutput, AppError> {
    let data = load_event_jets(&config.jets_csv)?;
    let loaded = load_correction_functions(&config.corrections_path, &config.eta_edges)?;

    let mut events = Vec::with_capacity(data.events.len());
    let mut stats = CorrectionStats::default();

    for e in &data.events {
        // When the file carries bunch-crossing ids, only bx==0 jets are
        // considered part of the event.
        let mut jets = match &e.bx {
            Some(bx) => build_four_momenta_bx0(&e.et, &e.eta, &e.phi, bx)?,
            None => build_four_momenta(&e.et, &e.eta, &e.phi)?,
        };

        let event_stats = correct_jets(&mut jets, &loaded.functions, &config.eta_edges, config.gate)?;
        stats.merge(&event_stats);
        events.push(CorrectedEvent {
            event: e.event,
            jets,
        });
    }

    Ok(ApplyOutput {
        data,
        events,
        stats,
        missing: loaded.missing,
    })
}

/// A `fit` run's configuration as understood by the pipeline.
#[derive(Debug, Clone)]
pub struct FitRunConfig {
    pub input: PathBuf,
    /// Sorted |eta| bin edges; N+1 edges define N bins.
    pub eta_edges: Vec<f64>,
    pub model: FitModel,
    pub options: FitOptions,
    /// Drop graphs from the output file, keeping only fitted functions.
    pub functions_only: bool,
}

/// All computed outputs of a single `l1jec fit` run.
#[derive(Debug, Clone)]
pub struct FitRunOutput {
    pub fits: Vec<BinFit>,
    /// Bins with no stored graph to fit.
    pub skipped: Vec<MissingBin>,
    /// The updated corrections file, ready to be written out.
    pub file: CorrectionsFile,
}

/// Fit every eta bin that has a stored graph and fold the results back into
/// the corrections file.
pub fn run_fit(config: &FitRunConfig) -> Result<FitRunOutput, AppError> {
    validate_eta_edges(&config.eta_edges)?;
    let mut file = read_corrections_json(&config.input)?;

    let mut fits = Vec::new();
    let mut skipped = Vec::new();

    for pair in config.eta_edges.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        let gkey = graph_key(lo, hi);

        let Some(graph) = file.get_graph(&gkey).cloned() else {
            skipped.push(MissingBin {
                eta_min: lo,
                eta_max: hi,
                key: gkey,
            });
            continue;
        };

        let outcome = fit_graph(&graph, config.model, &config.options)?;

        // Fitted functions are stored under the correction key, not the
        // graph's name.
        let mut function = outcome.function;
        function.name = correction_key(lo, hi);

        fits.push(BinFit {
            key: function.name.clone(),
            outcome: FitOutcome {
                function: function.clone(),
                quality: outcome.quality,
            },
        });
        file.insert_function(function);
    }

    if fits.is_empty() {
        return Err(AppError::new(
            3,
            "No graphs found for any eta bin; nothing to fit.",
        ));
    }

    if config.functions_only {
        file.objects
            .retain(|_, object| matches!(object, StoredObject::Function(_)));
    }

    file.tool = "l1jec".to_string();
    file.created = crate::util::current_time_string();

    Ok(FitRunOutput {
        fits,
        skipped,
        file,
    })
}
