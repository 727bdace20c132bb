//! Live oil: oil with gas dissolved in it.
//!
//! Saturated points are read from the region's saturated curve at pressure
//! `p`. Undersaturated points locate `r` among the saturated ratio
//! breakpoints, sample the two bracketing undersaturated tables at `p`, and
//! blend them by `r`'s position between the breakpoints.

use crate::error::PvtResult;
use crate::interp::{Sample, interval_weight, linear_interpolation};
use crate::model::{PointValue, PvtModel};
use crate::phase::{PhaseLayout, SaturationState};
use crate::region::RegionSelector;
use crate::tables::{LiveOilRegion, LiveOilTables, Property, SaturatedCurve};
use crate::viscosity::{TemperatureScaling, ViscosityCorrection};

/// PVT evaluator for live oil.
#[derive(Clone, Debug)]
pub struct LiveOil {
    tables: LiveOilTables,
    layout: PhaseLayout,
    temperature: TemperatureScaling,
}

impl LiveOil {
    /// Build from per-region tables with the default water/oil/gas layout.
    pub fn new(regions: &[LiveOilRegion], correction: ViscosityCorrection) -> PvtResult<Self> {
        Self::with_layout(regions, correction, PhaseLayout::default())
    }

    /// Build without temperature dependence.
    pub fn isothermal(regions: &[LiveOilRegion]) -> PvtResult<Self> {
        Self::new(regions, ViscosityCorrection::Isothermal)
    }

    pub fn with_layout(
        regions: &[LiveOilRegion],
        correction: ViscosityCorrection,
        layout: PhaseLayout,
    ) -> PvtResult<Self> {
        let tables = LiveOilTables::new(regions)?;
        let temperature =
            TemperatureScaling::compile(correction, tables.num_regions(), |region, p, r| {
                let rs_sat = tables.region(region).rs_sat(p).value;
                let state = SaturationState::from_ratio(r, rs_sat);
                evaluate_point(&tables, region, p, r, state, Property::Viscosity).value
            })?;
        Ok(Self {
            tables,
            layout,
            temperature,
        })
    }

    pub fn tables(&self) -> &LiveOilTables {
        &self.tables
    }

    /// Pressure at which each cell's ratio `r` saturates the oil.
    ///
    /// Inverts the piecewise-linear `rsSat(p)`; ratios beyond the table
    /// extrapolate along the boundary segment.
    pub fn saturation_pressure(&self, regions: RegionSelector<'_>, r: &[f64], out: &mut [f64]) {
        for (cell, p_sat) in out.iter_mut().enumerate() {
            let curve = self.tables.region(regions.region(cell));
            *p_sat = linear_interpolation(curve.ratio, curve.curve.pressure, r[cell]);
        }
    }
}

impl PvtModel for LiveOil {
    fn name(&self) -> &str {
        "live-oil"
    }

    fn num_regions(&self) -> usize {
        self.tables.num_regions()
    }

    fn phase_layout(&self) -> PhaseLayout {
        self.layout
    }

    #[inline]
    fn saturated_ratio(&self, region: usize, p: f64) -> Sample {
        self.tables.region(region).rs_sat(p)
    }

    #[inline]
    fn evaluate(
        &self,
        region: usize,
        p: f64,
        r: f64,
        state: SaturationState,
        property: Property,
    ) -> PointValue {
        evaluate_point(&self.tables, region, p, r, state, property)
    }

    fn is_isothermal(&self) -> bool {
        self.temperature.is_isothermal()
    }

    #[inline]
    fn viscosity_factor(&self, region: usize, t: f64) -> f64 {
        self.temperature.factor(region, t)
    }
}

/// Value, `d/dp` and `d/dr` of `property`.
///
/// Above the saturated curve `d/dr` is zero. Below it, `d/dr` is the difference
/// of the two bracketing tables at `p` over the breakpoint spacing. Exactly on
/// the curve the value comes from the saturated table and `d/dr` keeps the
/// bracket slope, so the ratio derivative jumps once a point moves above it.
#[inline]
fn evaluate_point(
    tables: &LiveOilTables,
    region: usize,
    p: f64,
    r: f64,
    state: SaturationState,
    property: Property,
) -> PointValue {
    let curve = tables.region(region);
    match state {
        SaturationState::Saturated => {
            let s = curve.curve.sample(property, p);
            PointValue {
                value: s.value,
                d_dp: s.slope,
                d_dr: 0.0,
            }
        }
        SaturationState::OnCurve => {
            let s = curve.curve.sample(property, p);
            PointValue {
                value: s.value,
                d_dp: s.slope,
                d_dr: undersaturated_blend(&curve, property, p, r).d_dr,
            }
        }
        SaturationState::Undersaturated => undersaturated_blend(&curve, property, p, r),
    }
}

#[inline]
fn undersaturated_blend(
    curve: &SaturatedCurve<'_>,
    property: Property,
    p: f64,
    r: f64,
) -> PointValue {
    let (k, w) = interval_weight(curve.ratio, r);
    let lower = curve.undersaturated(k).sample(property, p);
    let upper = curve.undersaturated(k + 1).sample(property, p);
    PointValue {
        value: lower.value + w * (upper.value - lower.value),
        d_dp: lower.slope + w * (upper.slope - lower.slope),
        d_dr: (upper.value - lower.value) / (curve.ratio[k + 1] - curve.ratio[k]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DerivativeOutputs;
    use crate::phase::{PhasePresence, SaturationRule};
    use crate::tables::{PressureRow, SaturatedRow};
    use crate::viscosity::ViscosityTemperatureRegion;
    use pvt_core::{Tolerances, nearly_equal};

    const TOL: Tolerances = Tolerances {
        abs: 1e-10,
        rel: 1e-10,
    };

    fn close(a: f64, b: f64) -> bool {
        nearly_equal(a, b, TOL)
    }

    fn sat(pressure: f64, ratio: f64, inv_fvf: f64, viscosity: f64) -> SaturatedRow {
        SaturatedRow {
            pressure,
            ratio,
            inv_fvf,
            viscosity,
        }
    }

    /// Undersaturated `b` rises 2e-4 and viscosity 1e-3 per unit pressure.
    fn undersat(pressure: f64, inv_fvf: f64, viscosity: f64) -> Vec<PressureRow> {
        vec![
            PressureRow {
                pressure,
                inv_fvf,
                viscosity,
            },
            PressureRow {
                pressure: pressure + 200.0,
                inv_fvf: inv_fvf + 0.04,
                viscosity: viscosity + 0.2,
            },
        ]
    }

    fn region() -> LiveOilRegion {
        LiveOilRegion {
            saturated: vec![
                sat(100.0, 50.0, 0.9, 1.2),
                sat(200.0, 80.0, 0.95, 1.0),
                sat(300.0, 100.0, 0.98, 0.9),
            ],
            undersaturated: vec![
                undersat(100.0, 0.9, 1.2),
                undersat(200.0, 0.95, 1.0),
                undersat(300.0, 0.98, 0.9),
            ],
        }
    }

    fn oil() -> LiveOil {
        LiveOil::isothermal(&[region()]).unwrap()
    }

    fn b_at(model: &LiveOil, p: f64, r: f64, rule: SaturationRule<'_>) -> PointValue {
        let (mut v, mut dp, mut dr) = ([0.0], [0.0], [0.0]);
        model.inverse_fvf(
            RegionSelector::single(),
            &[p],
            &[0.0],
            &[r],
            rule,
            DerivativeOutputs::new(&mut v, &mut dp, &mut dr),
        );
        PointValue {
            value: v[0],
            d_dp: dp[0],
            d_dr: dr[0],
        }
    }

    fn mu_at(model: &LiveOil, p: f64, t: f64, r: f64) -> PointValue {
        let (mut v, mut dp, mut dr) = ([0.0], [0.0], [0.0]);
        model.mu_with_derivatives(
            RegionSelector::single(),
            &[p],
            &[t],
            &[r],
            SaturationRule::InferFromRsSat,
            DerivativeOutputs::new(&mut v, &mut dp, &mut dr),
        );
        PointValue {
            value: v[0],
            d_dp: dp[0],
            d_dr: dr[0],
        }
    }

    #[test]
    fn on_saturation_curve_uses_saturated_table() {
        let model = oil();
        let b = b_at(&model, 150.0, 65.0, SaturationRule::InferFromRsSat);
        assert!(close(b.value, 0.925));
        assert!(close(b.d_dp, 5e-4));

        let mu = mu_at(&model, 150.0, 0.0, 65.0);
        assert!(close(mu.value, 1.1));
        assert!(close(mu.d_dp, -2e-3));
    }

    #[test]
    fn above_saturation_matches_saturated_value() {
        let model = oil();
        let at_curve = b_at(&model, 150.0, 65.0, SaturationRule::InferFromRsSat);
        let above = b_at(&model, 150.0, 500.0, SaturationRule::InferFromRsSat);
        assert_eq!(at_curve.value, above.value);
        assert_eq!(at_curve.d_dp, above.d_dp);
        assert_eq!(above.d_dr, 0.0);
    }

    #[test]
    fn undersaturated_blends_bracketing_tables() {
        let model = oil();
        let b = b_at(&model, 250.0, 60.0, SaturationRule::InferFromRsSat);
        assert!(close(b.value, 0.94));
        assert!(close(b.d_dp, 2e-4));
        assert!(close(b.d_dr, 1e-3));

        let mu = mu_at(&model, 250.0, 0.0, 60.0);
        assert!(close(mu.value, 1.25));
        assert!(close(mu.d_dp, 1e-3));
        assert!(close(mu.d_dr, -0.01));
    }

    #[test]
    fn ratio_derivative_keeps_bracket_slope_on_the_curve() {
        let model = oil();
        let below = b_at(&model, 150.0, 65.0 - 1e-9, SaturationRule::InferFromRsSat);
        let on = b_at(&model, 150.0, 65.0, SaturationRule::InferFromRsSat);
        let above = b_at(&model, 150.0, 65.0 + 1e-9, SaturationRule::InferFromRsSat);
        assert!((below.value - on.value).abs() < 1e-9);
        assert!(close(below.d_dr, 1e-3));
        assert!(close(on.d_dr, 1e-3));
        assert_eq!(above.value, on.value);
        assert_eq!(above.d_dr, 0.0);

        let mu = mu_at(&model, 150.0, 0.0, 65.0);
        assert!(close(mu.d_dr, -0.01));
    }

    #[test]
    fn forced_saturation_on_the_curve_has_no_ratio_slope() {
        let model = oil();
        let cond = [PhasePresence::oil_and_gas()];
        let forced = b_at(&model, 150.0, 65.0, SaturationRule::ForcedByPhase(&cond));
        assert!(close(forced.value, 0.925));
        assert_eq!(forced.d_dr, 0.0);
    }

    #[test]
    fn forced_rule_overrides_rs_sat() {
        let model = oil();
        let cond = [PhasePresence::oil_only()];
        // r is far above rsSat(150) but the cell has no free gas.
        let forced = b_at(&model, 150.0, 90.0, SaturationRule::ForcedByPhase(&cond));
        // Bracketed by the 80 and 100 breakpoints, halfway between them.
        let lower = 0.95 - 2e-4 * 50.0;
        let upper = 0.98 - 2e-4 * 150.0;
        assert!(close(forced.value, 0.5 * (lower + upper)));

        let cond = [PhasePresence::oil_and_gas()];
        let forced = b_at(&model, 150.0, 10.0, SaturationRule::ForcedByPhase(&cond));
        assert!(close(forced.value, 0.925));
    }

    #[test]
    fn rs_sat_extrapolates_linearly() {
        let model = oil();
        let p = [50.0, 100.0, 150.0, 300.0, 400.0];
        let (mut rs, mut drs) = ([0.0; 5], [0.0; 5]);
        model.rs_sat(RegionSelector::single(), &p, &mut rs, &mut drs);
        let expected = [35.0, 50.0, 65.0, 100.0, 120.0];
        let slopes = [0.3, 0.3, 0.3, 0.2, 0.2];
        for i in 0..p.len() {
            assert!(close(rs[i], expected[i]), "rs[{i}] = {}", rs[i]);
            assert!(close(drs[i], slopes[i]), "drs[{i}] = {}", drs[i]);
        }
    }

    #[test]
    fn rv_sat_is_zero() {
        let model = oil();
        let (mut rv, mut drv) = ([1.0; 2], [1.0; 2]);
        model.rv_sat(RegionSelector::single(), &[50.0, 500.0], &mut rv, &mut drv);
        assert_eq!(rv, [0.0; 2]);
        assert_eq!(drv, [0.0; 2]);
    }

    #[test]
    fn surface_volume_operations() {
        let model = oil();
        // water, oil, gas per cell
        let z = [0.0, 1.0, 65.0, 1.0, 0.0, 5.0, 0.0, 2.0, 120.0];
        let p = [150.0, 150.0, 250.0];
        let t = [0.0; 3];
        let sel = RegionSelector::single();

        let (mut fvf, mut dfvf) = ([0.0; 3], [0.0; 3]);
        model.fvf_with_derivative(sel, &p, &t, &z, &mut fvf, &mut dfvf);
        assert!(close(fvf[0], 1.0 / 0.925));
        assert!(close(dfvf[0], -(1.0 / 0.925_f64).powi(2) * 5e-4));
        assert_eq!((fvf[1], dfvf[1]), (1.0, 0.0));
        assert!(close(fvf[2], 1.0 / 0.94));

        let mut fvf_only = [0.0; 3];
        model.fvf(sel, &p, &t, &z, &mut fvf_only);
        assert_eq!(fvf_only, fvf);

        let (mut ratio, mut dratio) = ([0.0; 3], [0.0; 3]);
        model.ratio_with_derivative(sel, &p, &z, &mut ratio, &mut dratio);
        assert!(close(ratio[0], 65.0));
        assert!(close(dratio[0], 0.3));
        assert_eq!((ratio[1], dratio[1]), (0.0, 0.0));
        assert!(close(ratio[2], 60.0));
        assert_eq!(dratio[2], 0.0);

        let mut mu = [0.0; 3];
        model.mu(sel, &p, &t, &z, &mut mu);
        assert!(close(mu[0], 1.1));
        assert!(close(mu[2], 1.25));
        // No oil: viscosity of gas-free oil, extrapolated below the first ratio.
        assert_eq!(mu[1], mu_at(&model, 150.0, 0.0, 0.0).value);
        assert!(close(mu[1], 1.75));
    }

    #[test]
    fn temperature_correction_scales_viscosity() {
        let correction = ViscosityCorrection::Tabulated(vec![ViscosityTemperatureRegion {
            temperature: vec![300.0, 350.0],
            viscosity: vec![2.0, 1.0],
            reference_pressure: 150.0,
            reference_ratio: 65.0,
        }]);
        let model = LiveOil::new(&[region()], correction).unwrap();
        assert!(!model.is_isothermal());

        let factor = 1.5 / 1.1;
        let mu = mu_at(&model, 250.0, 325.0, 60.0);
        assert!(close(mu.value, 1.25 * factor));
        assert!(close(mu.d_dp, 1e-3 * factor));
        assert!(close(mu.d_dr, -0.01 * factor));

        // b carries no temperature dependence.
        let b = b_at(&model, 250.0, 60.0, SaturationRule::InferFromRsSat);
        assert!(close(b.value, 0.94));
    }

    #[test]
    fn viscosity_stays_positive_beyond_temperature_table() {
        let correction = ViscosityCorrection::Tabulated(vec![ViscosityTemperatureRegion {
            temperature: vec![300.0, 350.0],
            viscosity: vec![2.0, 1.0],
            reference_pressure: 150.0,
            reference_ratio: 65.0,
        }]);
        let model = LiveOil::new(&[region()], correction).unwrap();

        let at_end = mu_at(&model, 150.0, 350.0, 65.0);
        assert!(close(at_end.value, 1.0));
        for t in [400.0, 450.0] {
            let mu = mu_at(&model, 150.0, t, 65.0);
            assert_eq!(mu, at_end);
        }
        let cold = mu_at(&model, 150.0, 200.0, 65.0);
        assert!(close(cold.value, 2.0));
    }

    #[test]
    fn isothermal_ignores_temperature() {
        let model = oil();
        assert!(model.is_isothermal());
        assert_eq!(mu_at(&model, 250.0, 280.0, 60.0), mu_at(&model, 250.0, 400.0, 60.0));
    }

    #[test]
    fn saturation_pressure_inverts_rs_sat() {
        let model = oil();
        let mut p_sat = [0.0; 3];
        model.saturation_pressure(RegionSelector::single(), &[65.0, 80.0, 110.0], &mut p_sat);
        assert!(close(p_sat[0], 150.0));
        assert!(close(p_sat[1], 200.0));
        assert!(close(p_sat[2], 350.0));
    }
}
