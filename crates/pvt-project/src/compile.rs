//! Turn a validated file into an evaluator.

use crate::schema::{ModelDef, PhaseLayoutDef, PressureRowDef, PvtFile};
use crate::{ProjectError, ProjectResult};
use pvt_fluids::{
    DeadOil, DeadOilRegion, LiveOil, LiveOilRegion, PhaseLayout, PressureRow, PvtModel,
    SaturatedRow, ViscosityCorrection, ViscosityTemperatureRegion,
};

/// Build the model named by the file's `type`.
pub fn build_model(file: &PvtFile) -> ProjectResult<Box<dyn PvtModel>> {
    let layout = phase_layout(&file.phases)?;
    let correction = viscosity_correction(file);
    let model: Box<dyn PvtModel> = match &file.model {
        ModelDef::LiveOil { .. } => Box::new(LiveOil::with_layout(
            &live_oil_regions(file)?,
            correction,
            layout,
        )?),
        ModelDef::DeadOil { regions } => {
            let regions: Vec<DeadOilRegion> = regions
                .iter()
                .map(|r| DeadOilRegion {
                    rows: r.rows.iter().map(pressure_row).collect(),
                })
                .collect();
            Box::new(DeadOil::with_layout(&regions, correction, layout)?)
        }
    };
    Ok(model)
}

/// Build a live-oil evaluator; fails for any other model type.
pub fn build_live_oil(file: &PvtFile) -> ProjectResult<LiveOil> {
    let layout = phase_layout(&file.phases)?;
    Ok(LiveOil::with_layout(
        &live_oil_regions(file)?,
        viscosity_correction(file),
        layout,
    )?)
}

pub fn live_oil_regions(file: &PvtFile) -> ProjectResult<Vec<LiveOilRegion>> {
    let ModelDef::LiveOil { regions } = &file.model else {
        return Err(ProjectError::WrongModel {
            expected: "LiveOil",
            found: file.model.kind(),
        });
    };
    Ok(regions
        .iter()
        .map(|r| LiveOilRegion {
            saturated: r
                .saturated
                .iter()
                .map(|s| SaturatedRow {
                    pressure: s.pressure,
                    ratio: s.ratio,
                    inv_fvf: s.inv_fvf,
                    viscosity: s.viscosity,
                })
                .collect(),
            undersaturated: r
                .undersaturated
                .iter()
                .map(|sub| sub.iter().map(pressure_row).collect())
                .collect(),
        })
        .collect())
}

pub fn viscosity_correction(file: &PvtFile) -> ViscosityCorrection {
    match &file.viscosity_temperature {
        None => ViscosityCorrection::Isothermal,
        Some(tables) => ViscosityCorrection::Tabulated(
            tables
                .iter()
                .map(|t| ViscosityTemperatureRegion {
                    temperature: t.rows.iter().map(|row| row.temperature).collect(),
                    viscosity: t.rows.iter().map(|row| row.viscosity).collect(),
                    reference_pressure: t.reference_pressure,
                    reference_ratio: t.reference_ratio,
                })
                .collect(),
        ),
    }
}

fn phase_layout(def: &PhaseLayoutDef) -> ProjectResult<PhaseLayout> {
    Ok(PhaseLayout::new(def.num_phases, def.oil, def.gas)?)
}

fn pressure_row(row: &PressureRowDef) -> PressureRow {
    PressureRow {
        pressure: row.pressure,
        inv_fvf: row.inv_fvf,
        viscosity: row.viscosity,
    }
}
