//! Reporting utilities: formatted terminal output for runs.
//!
//! We keep formatting code in one place so:
//! - the correction/fit code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::corrections::fmt_g;
use crate::domain::{
    ApplyConfig, BinFit, CorrectionStats, CorrectionsFile, MissingBin, PtGate, StoredObject,
};
use crate::io::events::EventsData;

/// Row errors echoed in a summary before the rest is elided.
const MAX_ROW_ERRORS: usize = 5;

/// Format the full `apply` run summary.
pub fn format_apply_summary(
    config: &ApplyConfig,
    data: &EventsData,
    stats: &CorrectionStats,
    missing: &[MissingBin],
) -> String {
    let mut out = String::new();

    out.push_str("=== l1jec - L1 jet energy corrections ===\n");
    out.push_str(&format!("Jets: {}\n", config.jets_csv.display()));
    out.push_str(&format!("Corrections: {}\n", config.corrections_path.display()));
    out.push_str(&format!(
        "Eta bins: {} in [{}, {}]\n",
        config.eta_edges.len().saturating_sub(1),
        fmt_g(config.eta_edges[0]),
        fmt_g(config.eta_edges[config.eta_edges.len() - 1]),
    ));
    out.push_str(&format!("Gate: {}\n", fmt_gate(config.gate)));
    out.push_str(&format!(
        "Events: n={} | jets read={} | bx==0 filter: {}\n",
        data.events.len(),
        data.n_jets,
        if data.has_bx { "on" } else { "off (no bx column)" },
    ));

    if !data.row_errors.is_empty() {
        out.push_str(&format!(
            "\nRow errors: {} of {} rows skipped\n",
            data.row_errors.len(),
            data.rows_read
        ));
        for e in data.row_errors.iter().take(MAX_ROW_ERRORS) {
            out.push_str(&format!("  line {}: {}\n", e.line, e.message));
        }
        if data.row_errors.len() > MAX_ROW_ERRORS {
            out.push_str(&format!(
                "  ... and {} more\n",
                data.row_errors.len() - MAX_ROW_ERRORS
            ));
        }
    }

    if !missing.is_empty() {
        out.push_str("\nMissing corrections (identity applied):\n");
        for m in missing {
            out.push_str(&format!(
                "- {} for [{}, {})\n",
                m.key,
                fmt_g(m.eta_min),
                fmt_g(m.eta_max)
            ));
        }
    }

    out.push_str("\nCorrection stats:\n");
    out.push_str(&format!("- jets      : {}\n", stats.n_jets));
    out.push_str(&format!("- corrected : {}\n", stats.n_corrected));
    out.push_str(&format!("- gated     : {}\n", stats.n_gated));
    out.push_str(&format!("- rejected  : {}\n", stats.n_rejected));
    out.push('\n');

    out
}

/// Format the per-bin fit summary table.
pub fn format_fit_summary(fits: &[BinFit], skipped: &[MissingBin]) -> String {
    let mut out = String::new();

    out.push_str("=== l1jec - correction curve fits ===\n\n");
    out.push_str(&format!(
        "{:<28} {:>4} {:>10} {:>10}  params\n",
        "key", "n", "sse", "rmse"
    ));
    for fit in fits {
        let q = &fit.outcome.quality;
        out.push_str(&format!(
            "{:<28} {:>4} {:>10.4} {:>10.4}  {}\n",
            truncate(&fit.key, 28),
            q.n,
            q.sse,
            q.rmse,
            fmt_vec(&fit.outcome.function.params),
        ));
    }
    for m in skipped {
        out.push_str(&format!(
            "  (skipped {}) no graph for [{}, {})\n",
            m.key,
            fmt_g(m.eta_min),
            fmt_g(m.eta_max)
        ));
    }
    out.push('\n');

    out
}

/// Format the object listing of a corrections file.
pub fn format_objects_list(file: &CorrectionsFile) -> String {
    let mut out = String::new();

    out.push_str(&format!("tool: {} | created: {}\n\n", file.tool, file.created));
    out.push_str(&format!("{:<30} {:<9} details\n", "name", "kind"));

    for (name, object) in &file.objects {
        match object {
            StoredObject::Function(f) => {
                let (lo, hi) = f.domain();
                out.push_str(&format!(
                    "{:<30} {:<9} {}, {} params, domain [{}, {}]\n",
                    truncate(name, 30),
                    "function",
                    f.model.display_name(),
                    f.params.len(),
                    fmt_g(lo),
                    fmt_g(hi),
                ));
            }
            StoredObject::Graph(g) => {
                out.push_str(&format!(
                    "{:<30} {:<9} {} points\n",
                    truncate(name, 30),
                    "graph",
                    g.len(),
                ));
            }
        }
    }

    out
}

fn fmt_gate(gate: PtGate) -> String {
    match gate {
        PtGate::FitDomain => "fit domain".to_string(),
        PtGate::MinPt(t) => format!("pt >= {t}"),
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitFunction, FitModel, FitOutcome, FitQuality};
    use crate::io::events::RowError;
    use std::path::PathBuf;

    fn sample_config() -> ApplyConfig {
        ApplyConfig {
            jets_csv: PathBuf::from("jets.csv"),
            corrections_path: PathBuf::from("corr.json"),
            eta_edges: vec![0.0, 0.435, 0.783],
            gate: PtGate::MinPt(30.0),
            export: None,
        }
    }

    fn sample_data() -> EventsData {
        EventsData {
            events: vec![],
            row_errors: vec![RowError {
                line: 7,
                event: Some(3),
                message: "Invalid `et` value 'oops'.".to_string(),
            }],
            rows_read: 12,
            n_jets: 11,
            has_bx: true,
        }
    }

    #[test]
    fn apply_summary_shows_stats_and_missing_bins() {
        let stats = CorrectionStats {
            n_jets: 11,
            n_corrected: 8,
            n_gated: 2,
            n_rejected: 1,
        };
        let missing = vec![MissingBin {
            eta_min: 0.435,
            eta_max: 0.783,
            key: "fitfcneta_0.435_0.783".to_string(),
        }];

        let text = format_apply_summary(&sample_config(), &sample_data(), &stats, &missing);
        assert!(text.contains("Eta bins: 2 in [0, 0.783]"));
        assert!(text.contains("Gate: pt >= 30"));
        assert!(text.contains("bx==0 filter: on"));
        assert!(text.contains("line 7: Invalid `et` value 'oops'."));
        assert!(text.contains("fitfcneta_0.435_0.783 for [0.435, 0.783)"));
        assert!(text.contains("- corrected : 8"));
        assert!(text.contains("- rejected  : 1"));
    }

    #[test]
    fn fit_summary_lists_each_bin() {
        let fits = vec![BinFit {
            key: "fitfcneta_0_0.435".to_string(),
            outcome: FitOutcome {
                function: FitFunction::new(
                    "fitfcneta_0_0.435".to_string(),
                    FitModel::Flat,
                    vec![1.1],
                    10.0,
                    400.0,
                ),
                quality: FitQuality {
                    sse: 0.5,
                    rmse: 0.05,
                    n: 14,
                },
            },
        }];
        let skipped = vec![MissingBin {
            eta_min: 0.435,
            eta_max: 0.783,
            key: "fitfcneta_0.435_0.783".to_string(),
        }];

        let text = format_fit_summary(&fits, &skipped);
        assert!(text.contains("fitfcneta_0_0.435"));
        assert!(text.contains("[1.100000]"));
        assert!(text.contains("(skipped fitfcneta_0.435_0.783) no graph for [0.435, 0.783)"));
    }

    #[test]
    fn objects_list_shows_both_kinds() {
        let mut file = CorrectionsFile::new();
        file.insert_function(FitFunction::flat("fitfcneta_0_0.435".to_string()));
        file.insert_graph(crate::domain::CorrectionGraph {
            name: "l1corr_eta_0_0.435".to_string(),
            title: String::new(),
            x: vec![10.0, 20.0],
            y: vec![1.0, 1.1],
            ex: vec![1.0, 1.0],
            ey: vec![0.1, 0.1],
        });

        let text = format_objects_list(&file);
        assert!(text.contains("tool: l1jec"));
        assert!(text.contains("function"));
        assert!(text.contains("flat, 1 params"));
        assert!(text.contains("2 points"));
    }

    #[test]
    fn truncate_keeps_short_names() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a_much_longer_name", 8), "a_much_.");
    }
}
