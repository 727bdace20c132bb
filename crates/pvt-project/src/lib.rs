//! pvt-project: PVT table file format, validation and model construction.

pub mod compile;
pub mod schema;
pub mod validate;

pub use compile::{build_live_oil, build_model};
pub use schema::*;
pub use validate::{LATEST_VERSION, ValidationError, validate_file};

use std::path::Path;
use tracing::info;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Table error: {0}")]
    Pvt(#[from] pvt_fluids::PvtError),

    #[error("Expected a {expected} model, found {found}")]
    WrongModel {
        expected: &'static str,
        found: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<PvtFile> {
    let content = std::fs::read_to_string(path)?;
    let file: PvtFile = serde_yaml::from_str(&content)?;
    validate_file(&file)?;
    info!(path = %path.display(), model = file.model.kind(), "loaded PVT file");
    Ok(file)
}

pub fn save_yaml(path: &Path, file: &PvtFile) -> ProjectResult<()> {
    validate_file(file)?;
    let content = serde_yaml::to_string(file)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<PvtFile> {
    let content = std::fs::read_to_string(path)?;
    let file: PvtFile = serde_json::from_str(&content)?;
    validate_file(&file)?;
    info!(path = %path.display(), model = file.model.kind(), "loaded PVT file");
    Ok(file)
}

pub fn save_json(path: &Path, file: &PvtFile) -> ProjectResult<()> {
    validate_file(file)?;
    let content = serde_json::to_string_pretty(file)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load by extension: `.json` as JSON, anything else as YAML.
pub fn load(path: &Path) -> ProjectResult<PvtFile> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json(path),
        _ => load_yaml(path),
    }
}
