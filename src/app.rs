//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads jets and corrections
//! - applies corrections or fits curves
//! - prints run summaries
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{ApplyArgs, Cli, Command, FitArgs, ListArgs, PlotArgs, ToyArgs};
use crate::domain::{ApplyConfig, CorrectionGraph, PtGate, STANDARD_ETA_EDGES};
use crate::error::AppError;
use crate::fit::{FitOptions, ShapeRanges};
use crate::plot::PlotStyle;

pub mod pipeline;

/// Entry point for the `l1jec` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Apply(args) => handle_apply(args),
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
        Command::List(args) => handle_list(args),
        Command::Toy(args) => handle_toy(args),
    }
}

fn handle_apply(args: ApplyArgs) -> Result<(), AppError> {
    let config = apply_config_from_args(&args);
    let run = pipeline::run_apply(&config)?;

    println!(
        "{}",
        crate::report::format_apply_summary(&config, &run.data, &run.stats, &run.missing)
    );

    if let Some(path) = &config.export {
        crate::io::export::write_jets_csv(path, &run.events)?;
        println!("Wrote corrected jets to '{}'.", path.display());
    }

    Ok(())
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let domain = match (args.fit_min, args.fit_max) {
        (Some(lo), Some(hi)) if hi > lo => Some((lo, hi)),
        (Some(_), Some(_)) => {
            return Err(AppError::new(2, "`--fit-max` must be greater than `--fit-min`."));
        }
        (None, None) => None,
        _ => {
            return Err(AppError::new(
                2,
                "`--fit-min` and `--fit-max` must be given together.",
            ));
        }
    };

    let ranges = ShapeRanges {
        offset_steps: args.offset_steps,
        width_steps: args.width_steps,
        center_steps: args.center_steps,
        ..ShapeRanges::default()
    };

    let config = pipeline::FitRunConfig {
        input: args.input.clone(),
        eta_edges: resolve_eta_edges(args.eta_edges.clone()),
        model: args.model,
        options: FitOptions { ranges, domain },
        functions_only: args.functions_only,
    };
    let run = pipeline::run_fit(&config)?;

    println!("{}", crate::report::format_fit_summary(&run.fits, &run.skipped));

    let output = args.output.as_ref().unwrap_or(&args.input);
    crate::io::corrections::write_corrections_json(output, &run.file)?;
    println!(
        "Wrote {} fitted functions to '{}'.",
        run.fits.len(),
        output.display()
    );

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::corrections::read_corrections_json(&args.corrections)?;

    let graph = file.get_graph(&args.graph).ok_or_else(|| {
        AppError::new(
            3,
            format!(
                "No graph '{}' in '{}'.",
                args.graph,
                args.corrections.display()
            ),
        )
    })?;

    // An explicitly named fit must resolve; a derived one may be absent, in
    // which case the points are drawn on their own.
    let fit = match &args.fit {
        Some(name) => Some(file.get_function(name).ok_or_else(|| {
            AppError::new(
                3,
                format!(
                    "No fit function '{}' in '{}'.",
                    name,
                    args.corrections.display()
                ),
            )
        })?),
        None => {
            let derived = derived_fit_key(&args.graph)?;
            let function = file.get_function(&derived);
            if function.is_none() {
                eprintln!("note: no fit function '{derived}' stored; drawing points only");
            }
            function
        }
    };

    let style = plot_style_from_args(&args, graph);
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.svg", args.graph)));

    crate::plot::render_correction_curve(graph, fit, &style, &out)?;
    println!("Wrote '{}'.", out.display());

    Ok(())
}

fn handle_list(args: ListArgs) -> Result<(), AppError> {
    let file = crate::io::corrections::read_corrections_json(&args.corrections)?;

    println!("=== {} ===", args.corrections.display());
    print!("{}", crate::report::format_objects_list(&file));

    Ok(())
}

fn handle_toy(args: ToyArgs) -> Result<(), AppError> {
    let edges = resolve_eta_edges(args.eta_edges.clone());

    let events = crate::data::toy_events(&edges, args.events, args.seed)?;
    crate::io::export::write_events_csv(&args.events_out, &events)?;
    let n_jets: usize = events.iter().map(|e| e.n_jets()).sum();
    println!(
        "Wrote {} events ({n_jets} jets) to '{}'.",
        events.len(),
        args.events_out.display()
    );

    if let Some(path) = &args.corrections_out {
        let file = crate::data::toy_corrections_file(&edges, args.seed)?;
        crate::io::corrections::write_corrections_json(path, &file)?;
        println!("Wrote {} objects to '{}'.", file.objects.len(), path.display());
    }

    Ok(())
}

pub fn apply_config_from_args(args: &ApplyArgs) -> ApplyConfig {
    ApplyConfig {
        jets_csv: args.jets.clone(),
        corrections_path: args.corrections.clone(),
        eta_edges: resolve_eta_edges(args.eta_edges.clone()),
        gate: PtGate::from_threshold(args.min_pt),
        export: args.export.clone(),
    }
}

fn resolve_eta_edges(edges: Option<Vec<f64>>) -> Vec<f64> {
    edges.unwrap_or_else(|| STANDARD_ETA_EDGES.to_vec())
}

/// Derive the fit-function key for a graph named in the `l1corr_eta_*` scheme.
fn derived_fit_key(graph_name: &str) -> Result<String, AppError> {
    let suffix = crate::util::strip_pattern(graph_name, "^l1corr_eta_")?;
    Ok(format!("fitfcneta_{suffix}"))
}

fn plot_style_from_args(args: &PlotArgs, graph: &CorrectionGraph) -> PlotStyle {
    let x_range = match (args.x_min, args.x_max) {
        (Some(lo), Some(hi)) => Some((lo, hi)),
        _ => None,
    };
    let title = args.title.clone().or_else(|| {
        if graph.title.is_empty() {
            None
        } else {
            Some(graph.title.clone())
        }
    });

    PlotStyle {
        width: args.width,
        height: args.height,
        title,
        x_range,
        y_range: Some((args.y_min, args.y_max)),
        legend: !args.no_legend,
        ..PlotStyle::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_fit_key_follows_the_naming_scheme() {
        assert_eq!(
            derived_fit_key("l1corr_eta_0_0.435").unwrap(),
            "fitfcneta_0_0.435"
        );
        // Names outside the scheme pass through unchanged under the prefix.
        assert_eq!(derived_fit_key("custom").unwrap(), "fitfcneta_custom");
    }

    #[test]
    fn negative_min_pt_selects_the_fit_domain_gate() {
        let args = ApplyArgs {
            jets: PathBuf::from("jets.csv"),
            corrections: PathBuf::from("corr.json"),
            eta_edges: None,
            min_pt: -1.0,
            export: None,
        };
        let config = apply_config_from_args(&args);
        assert_eq!(config.gate, PtGate::FitDomain);
        assert_eq!(config.eta_edges.len(), STANDARD_ETA_EDGES.len());
    }

    #[test]
    fn explicit_min_pt_selects_the_threshold_gate() {
        let args = ApplyArgs {
            jets: PathBuf::from("jets.csv"),
            corrections: PathBuf::from("corr.json"),
            eta_edges: Some(vec![0.0, 1.0]),
            min_pt: 30.0,
            export: None,
        };
        let config = apply_config_from_args(&args);
        assert_eq!(config.gate, PtGate::MinPt(30.0));
        assert_eq!(config.eta_edges, vec![0.0, 1.0]);
    }
}
