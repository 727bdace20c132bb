//! Dead oil: oil without dissolved gas.

use crate::error::PvtResult;
use crate::interp::Sample;
use crate::model::{PointValue, PvtModel};
use crate::phase::{PhaseLayout, SaturationState};
use crate::region::RegionSelector;
use crate::tables::{DeadOilRegion, DeadOilTables, Property};
use crate::viscosity::{TemperatureScaling, ViscosityCorrection};

/// PVT evaluator for dead oil. Properties depend on pressure only.
#[derive(Clone, Debug)]
pub struct DeadOil {
    tables: DeadOilTables,
    layout: PhaseLayout,
    temperature: TemperatureScaling,
}

impl DeadOil {
    pub fn new(regions: &[DeadOilRegion], correction: ViscosityCorrection) -> PvtResult<Self> {
        Self::with_layout(regions, correction, PhaseLayout::default())
    }

    pub fn with_layout(
        regions: &[DeadOilRegion],
        correction: ViscosityCorrection,
        layout: PhaseLayout,
    ) -> PvtResult<Self> {
        let tables = DeadOilTables::new(regions)?;
        // The reference ratio has no meaning without dissolved gas.
        let temperature =
            TemperatureScaling::compile(correction, tables.num_regions(), |region, p, _| {
                tables.region(region).sample(Property::Viscosity, p).value
            })?;
        Ok(Self {
            tables,
            layout,
            temperature,
        })
    }

    pub fn tables(&self) -> &DeadOilTables {
        &self.tables
    }
}

impl PvtModel for DeadOil {
    fn name(&self) -> &str {
        "dead-oil"
    }

    fn num_regions(&self) -> usize {
        self.tables.num_regions()
    }

    fn phase_layout(&self) -> PhaseLayout {
        self.layout
    }

    fn saturated_ratio(&self, _region: usize, _p: f64) -> Sample {
        Sample {
            value: 0.0,
            slope: 0.0,
        }
    }

    #[inline]
    fn evaluate(
        &self,
        region: usize,
        p: f64,
        _r: f64,
        _state: SaturationState,
        property: Property,
    ) -> PointValue {
        let s = self.tables.region(region).sample(property, p);
        PointValue {
            value: s.value,
            d_dp: s.slope,
            d_dr: 0.0,
        }
    }

    fn is_isothermal(&self) -> bool {
        self.temperature.is_isothermal()
    }

    fn viscosity_factor(&self, region: usize, t: f64) -> f64 {
        self.temperature.factor(region, t)
    }

    fn ratio(&self, _regions: RegionSelector<'_>, _p: &[f64], _z: &[f64], out: &mut [f64]) {
        out.fill(0.0);
    }

    fn ratio_with_derivative(
        &self,
        _regions: RegionSelector<'_>,
        _p: &[f64],
        _z: &[f64],
        out_ratio: &mut [f64],
        out_dratio_dp: &mut [f64],
    ) {
        out_ratio.fill(0.0);
        out_dratio_dp[..out_ratio.len()].fill(0.0);
    }
}
