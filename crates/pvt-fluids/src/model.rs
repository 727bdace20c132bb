//! PVT model trait and the vectorized property API.
//!
//! A model supplies a handful of scalar primitives; the per-cell loops that
//! read caller arrays, resolve regions, decide saturation and write outputs
//! are provided methods shared by every model.
//!
//! Array conventions for all vectorized operations, with `n = output.len()`:
//! - `p`, `t`, `r` hold at least `n` values
//! - `z` holds `n * num_phases` surface volumes, one block per cell
//! - every output slice holds at least `n` values and is fully overwritten
//!
//! Element `i` of every output depends on element `i` of the inputs only.
//! Short inputs or region indices beyond [`PvtModel::num_regions`] are caller
//! errors and panic.

use crate::interp::Sample;
use crate::phase::{PhaseLayout, SaturationRule, SaturationState};
use crate::region::RegionSelector;
use crate::tables::Property;

/// A property value with its pressure and ratio derivatives.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointValue {
    pub value: f64,
    pub d_dp: f64,
    pub d_dr: f64,
}

impl PointValue {
    #[inline]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            value: self.value * factor,
            d_dp: self.d_dp * factor,
            d_dr: self.d_dr * factor,
        }
    }
}

/// Caller-owned buffers for a property and its two derivatives.
#[derive(Debug)]
pub struct DerivativeOutputs<'a> {
    pub value: &'a mut [f64],
    pub d_dp: &'a mut [f64],
    pub d_dr: &'a mut [f64],
}

impl<'a> DerivativeOutputs<'a> {
    pub fn new(value: &'a mut [f64], d_dp: &'a mut [f64], d_dr: &'a mut [f64]) -> Self {
        Self { value, d_dp, d_dr }
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    #[inline]
    fn write(&mut self, cell: usize, v: PointValue) {
        self.value[cell] = v.value;
        self.d_dp[cell] = v.d_dp;
        self.d_dr[cell] = v.d_dr;
    }
}

/// Dissolved ratio of one surface-volume block and its saturation state.
#[derive(Clone, Copy, Debug)]
struct SurfacePoint {
    ratio: f64,
    rs_sat: Sample,
    state: SaturationState,
}

/// Trait for PVT property models of the oil phase.
///
/// Implementations hold immutable tables only, so one instance may be shared
/// across threads and evaluated concurrently.
pub trait PvtModel: Send + Sync {
    /// Model name (for logging and summaries).
    fn name(&self) -> &str;

    fn num_regions(&self) -> usize;

    /// Layout of the surface-volume blocks accepted by the `z` operations.
    fn phase_layout(&self) -> PhaseLayout;

    /// Saturated dissolved gas/oil ratio and its pressure derivative.
    fn saturated_ratio(&self, region: usize, p: f64) -> Sample;

    /// Saturated vaporized oil/gas ratio and its pressure derivative.
    fn vaporized_ratio(&self, _region: usize, _p: f64) -> Sample {
        Sample {
            value: 0.0,
            slope: 0.0,
        }
    }

    /// Evaluate `property` at pressure `p` and ratio `r` in a known state.
    fn evaluate(
        &self,
        region: usize,
        p: f64,
        r: f64,
        state: SaturationState,
        property: Property,
    ) -> PointValue;

    /// True when viscosity does not depend on temperature.
    fn is_isothermal(&self) -> bool;

    /// Viscosity multiplier at temperature `t`.
    fn viscosity_factor(&self, region: usize, t: f64) -> f64;

    /// Viscosity from `(p, T, z)`.
    fn mu(
        &self,
        regions: RegionSelector<'_>,
        p: &[f64],
        t: &[f64],
        z: &[f64],
        out: &mut [f64],
    ) {
        let layout = self.phase_layout();
        for (cell, mu) in out.iter_mut().enumerate() {
            let region = regions.region(cell);
            let (r, state) = match surface_point(self, layout, region, p[cell], z, cell) {
                Some(point) => (point.ratio, point.state),
                None => {
                    let rs_sat = self.saturated_ratio(region, p[cell]).value;
                    (0.0, SaturationState::from_ratio(0.0, rs_sat))
                }
            };
            let value = self.evaluate(region, p[cell], r, state, Property::Viscosity).value;
            *mu = value * temperature_factor(self, region, t, cell);
        }
    }

    /// Viscosity and its `p` and `r` derivatives from `(p, T, r)`.
    ///
    /// `rule` decides per cell whether the oil is saturated.
    fn mu_with_derivatives(
        &self,
        regions: RegionSelector<'_>,
        p: &[f64],
        t: &[f64],
        r: &[f64],
        rule: SaturationRule<'_>,
        mut out: DerivativeOutputs<'_>,
    ) {
        for cell in 0..out.len() {
            let region = regions.region(cell);
            let state = rule.state(cell, r[cell], || {
                self.saturated_ratio(region, p[cell]).value
            });
            let value = self.evaluate(region, p[cell], r[cell], state, Property::Viscosity);
            out.write(cell, value.scaled(temperature_factor(self, region, t, cell)));
        }
    }

    /// Formation volume factor `B` from `(p, T, z)`.
    ///
    /// A block without oil reports `B = 1`.
    fn fvf(
        &self,
        regions: RegionSelector<'_>,
        p: &[f64],
        _t: &[f64],
        z: &[f64],
        out: &mut [f64],
    ) {
        let layout = self.phase_layout();
        for (cell, fvf) in out.iter_mut().enumerate() {
            let region = regions.region(cell);
            *fvf = match surface_point(self, layout, region, p[cell], z, cell) {
                Some(point) => {
                    let b = self.evaluate(
                        region,
                        p[cell],
                        point.ratio,
                        point.state,
                        Property::InverseFvf,
                    );
                    1.0 / b.value
                }
                None => 1.0,
            };
        }
    }

    /// Formation volume factor `B` and `dB/dp` from `(p, T, z)`.
    fn fvf_with_derivative(
        &self,
        regions: RegionSelector<'_>,
        p: &[f64],
        _t: &[f64],
        z: &[f64],
        out_fvf: &mut [f64],
        out_dfvf_dp: &mut [f64],
    ) {
        let layout = self.phase_layout();
        for cell in 0..out_fvf.len() {
            let region = regions.region(cell);
            let (fvf, dfvf_dp) = match surface_point(self, layout, region, p[cell], z, cell) {
                Some(point) => {
                    let b = self.evaluate(
                        region,
                        p[cell],
                        point.ratio,
                        point.state,
                        Property::InverseFvf,
                    );
                    let fvf = 1.0 / b.value;
                    (fvf, -fvf * fvf * b.d_dp)
                }
                None => (1.0, 0.0),
            };
            out_fvf[cell] = fvf;
            out_dfvf_dp[cell] = dfvf_dp;
        }
    }

    /// Inverse formation volume factor `b = 1/B` and its `p` and `r` derivatives
    /// from `(p, T, r)`.
    fn inverse_fvf(
        &self,
        regions: RegionSelector<'_>,
        p: &[f64],
        _t: &[f64],
        r: &[f64],
        rule: SaturationRule<'_>,
        mut out: DerivativeOutputs<'_>,
    ) {
        for cell in 0..out.len() {
            let region = regions.region(cell);
            let state = rule.state(cell, r[cell], || {
                self.saturated_ratio(region, p[cell]).value
            });
            let value = self.evaluate(region, p[cell], r[cell], state, Property::InverseFvf);
            out.write(cell, value);
        }
    }

    /// Saturated gas/oil ratio `rsSat(p)` and its pressure derivative.
    fn rs_sat(
        &self,
        regions: RegionSelector<'_>,
        p: &[f64],
        out_rs: &mut [f64],
        out_drs_dp: &mut [f64],
    ) {
        for cell in 0..out_rs.len() {
            let rs = self.saturated_ratio(regions.region(cell), p[cell]);
            out_rs[cell] = rs.value;
            out_drs_dp[cell] = rs.slope;
        }
    }

    /// Saturated vapor oil/gas ratio `rvSat(p)` and its pressure derivative.
    fn rv_sat(
        &self,
        regions: RegionSelector<'_>,
        p: &[f64],
        out_rv: &mut [f64],
        out_drv_dp: &mut [f64],
    ) {
        for cell in 0..out_rv.len() {
            let rv = self.vaporized_ratio(regions.region(cell), p[cell]);
            out_rv[cell] = rv.value;
            out_drv_dp[cell] = rv.slope;
        }
    }

    /// Dissolved gas/oil ratio `R` from `(p, z)`, capped at `rsSat(p)`.
    ///
    /// A block without oil reports `R = 0`.
    fn ratio(&self, regions: RegionSelector<'_>, p: &[f64], z: &[f64], out: &mut [f64]) {
        let layout = self.phase_layout();
        for (cell, ratio) in out.iter_mut().enumerate() {
            let region = regions.region(cell);
            *ratio = match surface_point(self, layout, region, p[cell], z, cell) {
                Some(point) if point.state.is_saturated() => point.rs_sat.value,
                Some(point) => point.ratio,
                None => 0.0,
            };
        }
    }

    /// Dissolved gas/oil ratio `R` and `dR/dp` from `(p, z)`.
    ///
    /// `dR/dp` follows the saturation curve when saturated and is zero otherwise.
    fn ratio_with_derivative(
        &self,
        regions: RegionSelector<'_>,
        p: &[f64],
        z: &[f64],
        out_ratio: &mut [f64],
        out_dratio_dp: &mut [f64],
    ) {
        let layout = self.phase_layout();
        for cell in 0..out_ratio.len() {
            let region = regions.region(cell);
            let (ratio, dratio_dp) = match surface_point(self, layout, region, p[cell], z, cell) {
                Some(point) if point.state.is_saturated() => {
                    (point.rs_sat.value, point.rs_sat.slope)
                }
                Some(point) => (point.ratio, 0.0),
                None => (0.0, 0.0),
            };
            out_ratio[cell] = ratio;
            out_dratio_dp[cell] = dratio_dp;
        }
    }
}

#[inline]
fn surface_point<M: PvtModel + ?Sized>(
    model: &M,
    layout: PhaseLayout,
    region: usize,
    p: f64,
    z: &[f64],
    cell: usize,
) -> Option<SurfacePoint> {
    let ratio = layout.dissolved_ratio(layout.cell(z, cell))?;
    let rs_sat = model.saturated_ratio(region, p);
    Some(SurfacePoint {
        ratio,
        rs_sat,
        state: SaturationState::from_ratio(ratio, rs_sat.value),
    })
}

#[inline]
fn temperature_factor<M: PvtModel + ?Sized>(
    model: &M,
    region: usize,
    t: &[f64],
    cell: usize,
) -> f64 {
    if model.is_isothermal() {
        1.0
    } else {
        model.viscosity_factor(region, t[cell])
    }
}
