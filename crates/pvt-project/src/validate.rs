//! Structural validation of PVT files.
//!
//! Numeric checks (ordering, positivity) happen when the tables are compiled;
//! this pass only rejects files whose shape cannot describe a model.

use crate::schema::{ModelDef, PvtFile};

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Region count mismatch: {context} has {found} regions, model has {expected}")]
    RegionCount {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_file(file: &PvtFile) -> Result<(), ValidationError> {
    if file.version == 0 || file.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: file.version,
        });
    }

    let phases = &file.phases;
    if phases.oil >= phases.num_phases || phases.gas >= phases.num_phases {
        return Err(ValidationError::InvalidValue {
            field: "phases".to_string(),
            value: format!(
                "oil={}, gas={}, num_phases={}",
                phases.oil, phases.gas, phases.num_phases
            ),
            reason: "phase positions must lie inside the block".to_string(),
        });
    }
    if phases.oil == phases.gas {
        return Err(ValidationError::InvalidValue {
            field: "phases".to_string(),
            value: format!("oil={}, gas={}", phases.oil, phases.gas),
            reason: "oil and gas must occupy different positions".to_string(),
        });
    }

    let regions = file.model.region_count();
    if regions == 0 {
        return Err(ValidationError::InvalidValue {
            field: "model.regions".to_string(),
            value: "[]".to_string(),
            reason: "at least one PVT region is required".to_string(),
        });
    }

    if let ModelDef::LiveOil { regions } = &file.model {
        for (index, region) in regions.iter().enumerate() {
            if region.undersaturated.len() != region.saturated.len() {
                return Err(ValidationError::InvalidValue {
                    field: format!("model.regions[{index}].undersaturated"),
                    value: region.undersaturated.len().to_string(),
                    reason: format!(
                        "expected one table per saturated row ({})",
                        region.saturated.len()
                    ),
                });
            }
        }
    }

    if let Some(tables) = &file.viscosity_temperature {
        if tables.len() != regions {
            return Err(ValidationError::RegionCount {
                context: "viscosity_temperature".to_string(),
                expected: regions,
                found: tables.len(),
            });
        }
    }

    Ok(())
}
