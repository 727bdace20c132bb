//! PVT table file schema.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PvtFile {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub phases: PhaseLayoutDef,
    pub model: ModelDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viscosity_temperature: Option<Vec<ViscosityTemperatureDef>>,
}

/// Positions inside each cell's surface-volume block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhaseLayoutDef {
    pub num_phases: usize,
    pub oil: usize,
    pub gas: usize,
}

impl Default for PhaseLayoutDef {
    fn default() -> Self {
        Self {
            num_phases: 3,
            oil: 1,
            gas: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ModelDef {
    LiveOil { regions: Vec<LiveOilRegionDef> },
    DeadOil { regions: Vec<DeadOilRegionDef> },
}

impl ModelDef {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelDef::LiveOil { .. } => "LiveOil",
            ModelDef::DeadOil { .. } => "DeadOil",
        }
    }

    pub fn region_count(&self) -> usize {
        match self {
            ModelDef::LiveOil { regions } => regions.len(),
            ModelDef::DeadOil { regions } => regions.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveOilRegionDef {
    pub saturated: Vec<SaturatedRowDef>,
    /// One table per saturated row; a table may be empty or hold only its
    /// saturated point.
    #[serde(default)]
    pub undersaturated: Vec<Vec<PressureRowDef>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeadOilRegionDef {
    pub rows: Vec<PressureRowDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SaturatedRowDef {
    pub pressure: f64,
    pub ratio: f64,
    pub inv_fvf: f64,
    pub viscosity: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PressureRowDef {
    pub pressure: f64,
    pub inv_fvf: f64,
    pub viscosity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViscosityTemperatureDef {
    pub reference_pressure: f64,
    #[serde(default)]
    pub reference_ratio: f64,
    pub rows: Vec<TemperatureRowDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TemperatureRowDef {
    pub temperature: f64,
    pub viscosity: f64,
}
