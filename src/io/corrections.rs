//! Read/write corrections JSON files.
//!
//! A corrections file is the portable container for everything a correction
//! run produces:
//! - fitted correction functions, keyed `fitfcneta_<etaMin>_<etaMax>`
//! - the underlying correction graphs, keyed `l1corr_eta_<etaMin>_<etaMax>`
//! - run metadata (tool name, creation timestamp)
//!
//! The schema is defined by `domain::CorrectionsFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{CorrectionsFile, StoredObject};
use crate::error::AppError;

/// Write a corrections JSON file.
pub fn write_corrections_json(path: &Path, file: &CorrectionsFile) -> Result<(), AppError> {
    let out = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create corrections JSON '{}': {e}", path.display()),
        )
    })?;

    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::new(2, format!("Failed to write corrections JSON: {e}")))?;

    Ok(())
}

/// Read a corrections JSON file and validate its contents.
pub fn read_corrections_json(path: &Path) -> Result<CorrectionsFile, AppError> {
    let input = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open corrections JSON '{}': {e}", path.display()),
        )
    })?;
    let file: CorrectionsFile = serde_json::from_reader(input)
        .map_err(|e| AppError::new(2, format!("Invalid corrections JSON: {e}")))?;

    validate_corrections(&file)?;
    Ok(file)
}

/// Structural checks beyond what serde enforces.
///
/// A function must carry exactly as many parameters as its model expects, and
/// a graph's point vectors must all have the same length. Either problem means
/// the file was hand-edited or produced by an incompatible writer.
fn validate_corrections(file: &CorrectionsFile) -> Result<(), AppError> {
    for (key, object) in &file.objects {
        match object {
            StoredObject::Function(f) => {
                if f.params.len() != f.model.param_len() {
                    return Err(AppError::new(
                        2,
                        format!(
                            "Function '{key}' has {} parameters; the {} model expects {}.",
                            f.params.len(),
                            f.model.display_name(),
                            f.model.param_len()
                        ),
                    ));
                }
                if f.params.iter().any(|p| !p.is_finite()) {
                    return Err(AppError::new(
                        2,
                        format!("Function '{key}' has non-finite parameters."),
                    ));
                }
                if !f.fit_min.is_finite() || !f.fit_max.is_finite() || f.fit_max <= f.fit_min {
                    return Err(AppError::new(
                        2,
                        format!("Function '{key}' has an invalid fit domain."),
                    ));
                }
            }
            StoredObject::Graph(g) => {
                if !g.is_consistent() {
                    return Err(AppError::new(
                        2,
                        format!("Graph '{key}' has ragged point vectors."),
                    ));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CorrectionGraph, FitFunction, FitModel};

    fn sample_file() -> CorrectionsFile {
        let mut file = CorrectionsFile::new();
        file.insert_function(FitFunction::new(
            "fitfcneta_0_0.435".to_string(),
            FitModel::Standard,
            vec![1.02, 2.0, 2.0, 0.3, 0.5, 1.2],
            8.0,
            600.0,
        ));
        file.insert_graph(CorrectionGraph {
            name: "l1corr_eta_0_0.435".to_string(),
            title: "0 < |#eta| < 0.435".to_string(),
            x: vec![10.0, 30.0, 90.0],
            y: vec![1.5, 1.3, 1.1],
            ex: vec![1.0, 1.0, 1.0],
            ey: vec![0.05, 0.03, 0.02],
        });
        file
    }

    #[test]
    fn write_then_read_preserves_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corr.json");

        let file = sample_file();
        write_corrections_json(&path, &file).unwrap();
        let back = read_corrections_json(&path).unwrap();

        assert_eq!(back.tool, "l1jec");
        let f = back.get_function("fitfcneta_0_0.435").unwrap();
        assert_eq!(f.model, FitModel::Standard);
        assert_eq!(f.params.len(), 6);
        assert_eq!(f.domain(), (8.0, 600.0));

        let g = back.get_graph("l1corr_eta_0_0.435").unwrap();
        assert_eq!(g.len(), 3);
        assert!((g.y[1] - 1.3).abs() < 1e-12);
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_corrections_json(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn wrong_param_count_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corr.json");

        let mut file = sample_file();
        file.insert_function(FitFunction::new(
            "fitfcneta_0.435_0.783".to_string(),
            FitModel::Standard,
            vec![1.0, 2.0], // Standard expects 6
            8.0,
            600.0,
        ));
        write_corrections_json(&path, &file).unwrap();

        let err = read_corrections_json(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("fitfcneta_0.435_0.783"));
    }

    #[test]
    fn inverted_domain_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corr.json");

        let mut file = CorrectionsFile::new();
        file.insert_function(FitFunction::new(
            "fitfcneta_0_0.435".to_string(),
            FitModel::Flat,
            vec![1.1],
            40.0,
            10.0,
        ));
        write_corrections_json(&path, &file).unwrap();

        let err = read_corrections_json(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn garbage_json_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corr.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = read_corrections_json(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
