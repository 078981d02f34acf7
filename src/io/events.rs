//! CSV ingest for per-event jet collections.
//!
//! The input is a flat CSV with one jet per row. Rows carry the event they
//! belong to, so consecutive rows sharing an `event` value are grouped into a
//! single event with parallel kinematic columns.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Order preservation**: jets stay in file order within their event
//!
//! Expected columns: `event`, `et`, `eta`, `phi`, and optionally `bx`.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::error::AppError;

/// One event's jets as parallel columns.
#[derive(Debug, Clone)]
pub struct EventJets {
    pub event: u64,
    pub et: Vec<f64>,
    pub eta: Vec<f64>,
    pub phi: Vec<f64>,
    /// Bunch-crossing ids, present only when the file carries a `bx` column.
    pub bx: Option<Vec<i16>>,
}

impl EventJets {
    pub fn n_jets(&self) -> usize {
        self.et.len()
    }
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub event: Option<u64>,
    pub message: String,
}

/// Ingest output: grouped events + row errors + counters.
#[derive(Debug, Clone)]
pub struct EventsData {
    pub events: Vec<EventJets>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub n_jets: usize,
    pub has_bx: bool,
}

/// Load a jets CSV and group rows into events.
pub fn load_event_jets(path: &Path) -> Result<EventsData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open jets CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);

    for name in ["event", "et", "eta", "phi"] {
        if !header_map.contains_key(name) {
            return Err(AppError::new(2, format!("Missing required column: `{name}`")));
        }
    }
    let has_bx = header_map.contains_key("bx");

    let mut events: Vec<EventJets> = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut n_jets = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    event: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map, has_bx) {
            Ok(row) => {
                // Rows belong to the most recent event with the same id.
                // Non-consecutive reuse of an id starts a fresh event, which
                // keeps jets in file order.
                match events.last_mut() {
                    Some(current) if current.event == row.event => {
                        current.et.push(row.et);
                        current.eta.push(row.eta);
                        current.phi.push(row.phi);
                        if let (Some(bx_col), Some(bx)) = (current.bx.as_mut(), row.bx) {
                            bx_col.push(bx);
                        }
                    }
                    _ => events.push(EventJets {
                        event: row.event,
                        et: vec![row.et],
                        eta: vec![row.eta],
                        phi: vec![row.phi],
                        bx: row.bx.map(|b| vec![b]),
                    }),
                }
                n_jets += 1;
            }
            Err((event, message)) => row_errors.push(RowError {
                line,
                event,
                message,
            }),
        }
    }

    if events.is_empty() {
        return Err(AppError::new(3, "No valid jet rows found in the CSV."));
    }

    Ok(EventsData {
        events,
        row_errors,
        rows_read,
        n_jets,
        has_bx,
    })
}

struct JetRow {
    event: u64,
    et: f64,
    eta: f64,
    phi: f64,
    bx: Option<i16>,
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    has_bx: bool,
) -> Result<JetRow, (Option<u64>, String)> {
    let event = get_required(record, header_map, "event")
        .and_then(|s| {
            s.parse::<u64>()
                .map_err(|_| format!("Invalid `event` value '{s}'."))
        })
        .map_err(|m| (None, m))?;

    let et = parse_f64(record, header_map, "et").map_err(|m| (Some(event), m))?;
    let eta = parse_f64(record, header_map, "eta").map_err(|m| (Some(event), m))?;
    let phi = parse_f64(record, header_map, "phi").map_err(|m| (Some(event), m))?;

    let bx = if has_bx {
        let s = get_required(record, header_map, "bx").map_err(|m| (Some(event), m))?;
        Some(
            s.parse::<i16>()
                .map_err(|_| (Some(event), format!("Invalid `bx` value '{s}'.")))?,
        )
    } else {
        None
    };

    Ok(JetRow {
        event,
        et,
        eta,
        phi,
        bx,
    })
}

fn parse_f64(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<f64, String> {
    let s = get_required(record, header_map, name)?;
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value '{s}'."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite `{name}` value '{s}'."));
    }
    Ok(v)
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿event"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}
