//! Command-line parsing for the L1 jet energy correction tools.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the correction/fitting code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::FitModel;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "l1jec", version, about = "L1 jet energy correction toolkit")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply stored corrections to a jets CSV, print a run summary, and optionally export.
    Apply(ApplyArgs),
    /// Fit correction functions to the graphs stored in a corrections file.
    Fit(FitArgs),
    /// Render a correction graph and its fitted curve to an SVG image.
    Plot(PlotArgs),
    /// List the objects stored in a corrections file.
    List(ListArgs),
    /// Generate synthetic events and corrections for a full pipeline dry run.
    Toy(ToyArgs),
}

/// Options for applying corrections to jets.
#[derive(Debug, Parser, Clone)]
pub struct ApplyArgs {
    /// Jets CSV (columns: event, et, eta, phi, and optionally bx).
    #[arg(long, value_name = "CSV")]
    pub jets: PathBuf,

    /// Corrections JSON with per-bin fit functions.
    #[arg(long, value_name = "JSON")]
    pub corrections: PathBuf,

    /// |eta| bin edges as a comma-separated list. Defaults to the standard
    /// 16-bin trigger-tower layout.
    #[arg(long, value_delimiter = ',')]
    pub eta_edges: Option<Vec<f64>>,

    /// Only correct jets at or above this pt (GeV). A negative value gates on
    /// each function's own fit domain instead.
    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
    pub min_pt: f64,

    /// Export the corrected jets to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

/// Options for fitting correction curves.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Corrections JSON holding the graphs to fit.
    #[arg(long, value_name = "JSON")]
    pub input: PathBuf,

    /// Output corrections JSON. Defaults to rewriting the input file.
    #[arg(long, value_name = "JSON")]
    pub output: Option<PathBuf>,

    /// |eta| bin edges as a comma-separated list. Defaults to the standard
    /// 16-bin trigger-tower layout.
    #[arg(long, value_delimiter = ',')]
    pub eta_edges: Option<Vec<f64>>,

    /// Functional form to fit.
    #[arg(long, value_enum, default_value_t = FitModel::Standard)]
    pub model: FitModel,

    /// Lower edge of the recorded fit domain (GeV). Requires `--fit-max`;
    /// defaults to each graph's x extent.
    #[arg(long)]
    pub fit_min: Option<f64>,

    /// Upper edge of the recorded fit domain (GeV). Requires `--fit-min`.
    #[arg(long)]
    pub fit_max: Option<f64>,

    /// Grid steps for the low-pt falloff offset.
    #[arg(long, default_value_t = 12)]
    pub offset_steps: usize,

    /// Grid steps for the gaussian bump width.
    #[arg(long, default_value_t = 10)]
    pub width_steps: usize,

    /// Grid steps for the gaussian bump center.
    #[arg(long, default_value_t = 10)]
    pub center_steps: usize,

    /// Keep only fitted functions in the output, dropping the graphs.
    #[arg(long)]
    pub functions_only: bool,
}

/// Options for rendering a stored graph and fit.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Corrections JSON holding the graph (and fit) to draw.
    #[arg(long, value_name = "JSON")]
    pub corrections: PathBuf,

    /// Name of the stored graph to draw, e.g. `l1corr_eta_0_0.435`.
    #[arg(long)]
    pub graph: String,

    /// Name of the stored fit function to overlay. Derived from the graph
    /// name when omitted.
    #[arg(long)]
    pub fit: Option<String>,

    /// Output SVG path. Defaults to `<graph>.svg`.
    #[arg(long, value_name = "SVG")]
    pub out: Option<PathBuf>,

    /// Image width in pixels.
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Image height in pixels.
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Chart title. Defaults to the stored graph's title.
    #[arg(long)]
    pub title: Option<String>,

    /// Lower y-axis bound.
    #[arg(long, default_value_t = 0.97)]
    pub y_min: f64,

    /// Upper y-axis bound.
    #[arg(long, default_value_t = 2.03)]
    pub y_max: f64,

    /// Lower x-axis bound (GeV). Derived from the graph when omitted.
    #[arg(long)]
    pub x_min: Option<f64>,

    /// Upper x-axis bound (GeV).
    #[arg(long)]
    pub x_max: Option<f64>,

    /// Skip the legend.
    #[arg(long)]
    pub no_legend: bool,
}

/// Options for listing a corrections file.
#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Corrections JSON to inspect.
    #[arg(long, value_name = "JSON")]
    pub corrections: PathBuf,
}

/// Options for generating synthetic inputs.
#[derive(Debug, Parser)]
pub struct ToyArgs {
    /// Output CSV for the generated events.
    #[arg(long, value_name = "CSV")]
    pub events_out: PathBuf,

    /// Also write a corrections JSON with per-bin truth functions and graphs.
    #[arg(long, value_name = "JSON")]
    pub corrections_out: Option<PathBuf>,

    /// |eta| bin edges as a comma-separated list. Defaults to the standard
    /// 16-bin trigger-tower layout.
    #[arg(long, value_delimiter = ',')]
    pub eta_edges: Option<Vec<f64>>,

    /// Number of events to generate.
    #[arg(long, default_value_t = 50)]
    pub events: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
