//! Load per-bin correction functions from a corrections file.
//!
//! A table covering N eta bins needs one function per bin, keyed
//! `fitfcneta_<etaMin>_<etaMax>`. Bins with no stored function are not
//! fatal: the loader substitutes the identity fallback and records a
//! [`MissingBin`] diagnostic so the driver can report the gap. Only a failure
//! to open or parse the file itself aborts the run.

use std::path::Path;

use crate::domain::{CorrectionsFile, FitFunction, MissingBin};
use crate::error::AppError;
use crate::io::read_corrections_json;

/// The function table for one binning, plus the bins that had no stored
/// function and got the identity fallback.
#[derive(Debug, Clone)]
pub struct LoadedCorrections {
    pub functions: Vec<FitFunction>,
    pub missing: Vec<MissingBin>,
}

/// Format a float the way C's `%g` does: up to six significant digits,
/// trailing zeros trimmed, scientific notation outside `[1e-4, 1e6)`.
///
/// Correction-file keys have always been written with `%g`, so lookups must
/// reproduce it exactly (`0.435`, not `0.435000`).
pub fn fmt_g(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if !v.is_finite() {
        return v.to_string();
    }

    let exp = v.abs().log10().floor() as i32;
    if (-4..6).contains(&exp) {
        let decimals = (5 - exp).max(0) as usize;
        trim_trailing_zeros(&format!("{:.*}", decimals, v))
    } else {
        let mantissa = v / 10f64.powi(exp);
        let m = trim_trailing_zeros(&format!("{:.*}", 5, mantissa));
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{m}e{sign}{:02}", exp.abs())
    }
}

fn trim_trailing_zeros(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Key of the correction function for the bin `[eta_min, eta_max)`.
pub fn correction_key(eta_min: f64, eta_max: f64) -> String {
    format!("fitfcneta_{}_{}", fmt_g(eta_min), fmt_g(eta_max))
}

/// Key of the correction graph for the bin `[eta_min, eta_max)`.
pub fn graph_key(eta_min: f64, eta_max: f64) -> String {
    format!("l1corr_eta_{}_{}", fmt_g(eta_min), fmt_g(eta_max))
}

/// Check that an edge list defines a usable binning: at least two finite
/// edges, strictly increasing.
pub fn validate_eta_edges(eta_edges: &[f64]) -> Result<(), AppError> {
    if eta_edges.len() < 2 {
        return Err(AppError::new(
            2,
            format!(
                "Eta binning needs at least 2 edges, got {}.",
                eta_edges.len()
            ),
        ));
    }
    for pair in eta_edges.windows(2) {
        if !(pair[0].is_finite() && pair[1].is_finite() && pair[0] < pair[1]) {
            return Err(AppError::new(
                2,
                format!(
                    "Eta bin edges must be finite and strictly increasing, got {} then {}.",
                    pair[0], pair[1]
                ),
            ));
        }
    }
    Ok(())
}

/// Select one function per bin out of an already-parsed corrections file.
///
/// Each returned function is an independent copy; the file can be dropped
/// afterwards. Bins without a stored function get [`FitFunction::flat`] and
/// an entry in `missing`.
pub fn functions_for_binning(
    file: &CorrectionsFile,
    eta_edges: &[f64],
) -> Result<LoadedCorrections, AppError> {
    validate_eta_edges(eta_edges)?;

    let mut functions = Vec::with_capacity(eta_edges.len() - 1);
    let mut missing = Vec::new();

    for pair in eta_edges.windows(2) {
        let key = correction_key(pair[0], pair[1]);
        match file.get_function(&key) {
            Some(f) => functions.push(f.clone()),
            None => {
                missing.push(MissingBin {
                    eta_min: pair[0],
                    eta_max: pair[1],
                    key: key.clone(),
                });
                functions.push(FitFunction::flat(key));
            }
        }
    }

    Ok(LoadedCorrections { functions, missing })
}

/// Open a corrections file and assemble the function table for the given
/// binning. The file handle is released once the table is built.
pub fn load_correction_functions(
    path: &Path,
    eta_edges: &[f64],
) -> Result<LoadedCorrections, AppError> {
    let file = read_corrections_json(path)?;
    functions_for_binning(&file, eta_edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitModel;

    #[test]
    fn fmt_g_matches_printf_for_bin_edges() {
        assert_eq!(fmt_g(0.0), "0");
        assert_eq!(fmt_g(0.435), "0.435");
        assert_eq!(fmt_g(1.83), "1.83");
        assert_eq!(fmt_g(2.5), "2.5");
        assert_eq!(fmt_g(5.191), "5.191");
        assert_eq!(fmt_g(100.0), "100");
        assert_eq!(fmt_g(-0.435), "-0.435");
    }

    #[test]
    fn fmt_g_switches_to_scientific_outside_range() {
        assert_eq!(fmt_g(15_000_000.0), "1.5e+07");
        assert_eq!(fmt_g(0.00002), "2e-05");
    }

    #[test]
    fn keys_match_the_reference_scheme() {
        assert_eq!(correction_key(0.0, 0.435), "fitfcneta_0_0.435");
        assert_eq!(correction_key(4.191, 5.191), "fitfcneta_4.191_5.191");
        assert_eq!(graph_key(0.0, 0.435), "l1corr_eta_0_0.435");
    }

    #[test]
    fn edge_validation_rejects_bad_binnings() {
        assert_eq!(validate_eta_edges(&[0.0]).unwrap_err().exit_code(), 2);
        assert_eq!(validate_eta_edges(&[0.0, 1.0, 1.0]).unwrap_err().exit_code(), 2);
        assert_eq!(validate_eta_edges(&[0.0, 2.0, 1.0]).unwrap_err().exit_code(), 2);
        assert!(validate_eta_edges(&[0.0, 1.0, 2.0]).is_ok());
    }

    #[test]
    fn missing_bins_get_identity_fallback_and_diagnostic() {
        let mut file = CorrectionsFile::new();
        file.insert_function(FitFunction::new(
            correction_key(0.0, 1.0),
            FitModel::Flat,
            vec![1.2],
            10.0,
            400.0,
        ));

        let edges = [0.0, 1.0, 2.0, 3.0];
        let loaded = functions_for_binning(&file, &edges).unwrap();

        assert_eq!(loaded.functions.len(), 3);
        assert_eq!(loaded.functions[0].params, vec![1.2]);

        // Bins 1 and 2 fall back to the identity.
        for f in &loaded.functions[1..] {
            assert_eq!(f.model, FitModel::Flat);
            assert_eq!(f.params, vec![1.0]);
        }
        assert_eq!(loaded.missing.len(), 2);
        assert_eq!(loaded.missing[0].key, correction_key(1.0, 2.0));
        assert_eq!(loaded.missing[0].eta_min, 1.0);
        assert_eq!(loaded.missing[1].key, correction_key(2.0, 3.0));
    }

    #[test]
    fn fully_populated_binning_reports_no_misses() {
        let edges = [0.0, 1.305, 5.191];
        let mut file = CorrectionsFile::new();
        for pair in edges.windows(2) {
            file.insert_function(FitFunction::new(
                correction_key(pair[0], pair[1]),
                FitModel::Flat,
                vec![1.1],
                0.0,
                500.0,
            ));
        }

        let loaded = functions_for_binning(&file, &edges).unwrap();
        assert_eq!(loaded.functions.len(), 2);
        assert!(loaded.missing.is_empty());
        assert_eq!(loaded.functions[1].name, correction_key(1.305, 5.191));
    }
}
