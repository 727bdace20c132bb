//! Phase layout of surface-volume blocks and the saturated/undersaturated decision.

use crate::error::{PvtError, PvtResult};

/// Positions of the oil and gas components inside a per-cell surface-volume block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseLayout {
    pub num_phases: usize,
    pub oil: usize,
    pub gas: usize,
}

impl Default for PhaseLayout {
    /// Water, oil, gas.
    fn default() -> Self {
        Self {
            num_phases: 3,
            oil: 1,
            gas: 2,
        }
    }
}

impl PhaseLayout {
    pub fn new(num_phases: usize, oil: usize, gas: usize) -> PvtResult<Self> {
        if oil >= num_phases || gas >= num_phases {
            return Err(PvtError::InvalidArg {
                what: "phase position outside the surface-volume block",
            });
        }
        if oil == gas {
            return Err(PvtError::InvalidArg {
                what: "oil and gas must occupy different positions",
            });
        }
        Ok(Self {
            num_phases,
            oil,
            gas,
        })
    }

    /// Surface volumes of one cell.
    #[inline]
    pub fn cell<'z>(&self, z: &'z [f64], cell: usize) -> &'z [f64] {
        &z[cell * self.num_phases..(cell + 1) * self.num_phases]
    }

    /// Gas/oil surface-volume ratio of a block, or `None` when there is no oil.
    #[inline]
    pub fn dissolved_ratio(&self, surfvol: &[f64]) -> Option<f64> {
        let oil = surfvol[self.oil];
        if oil.abs() < f64::MIN_POSITIVE {
            None
        } else {
            Some(surfvol[self.gas] / oil)
        }
    }
}

/// Which phases are present in a cell, as decided by the caller's phase equilibrium.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PhasePresence {
    pub free_water: bool,
    pub free_oil: bool,
    pub free_gas: bool,
}

impl PhasePresence {
    pub fn oil_only() -> Self {
        Self {
            free_oil: true,
            ..Self::default()
        }
    }

    pub fn oil_and_gas() -> Self {
        Self {
            free_oil: true,
            free_gas: true,
            ..Self::default()
        }
    }

    pub fn has_free_gas(&self) -> bool {
        self.free_gas
    }
}

/// Saturation state of one evaluation point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaturationState {
    /// On the saturation curve; properties depend on pressure only.
    Saturated,
    /// Exactly on the curve. Value and `d/dp` come from the saturated table,
    /// `d/dr` from the undersaturated bracket around `r`.
    OnCurve,
    /// Below the curve; properties blend the bracketing undersaturated tables.
    Undersaturated,
}

impl SaturationState {
    /// Saturated when `r > rs_sat`, on the curve when equal.
    #[inline]
    pub fn from_ratio(r: f64, rs_sat: f64) -> Self {
        if r > rs_sat {
            SaturationState::Saturated
        } else if r == rs_sat {
            SaturationState::OnCurve
        } else {
            SaturationState::Undersaturated
        }
    }

    /// True unless strictly below the curve.
    #[inline]
    pub fn is_saturated(self) -> bool {
        !matches!(self, SaturationState::Undersaturated)
    }
}

/// How the saturation state of each cell is decided.
#[derive(Clone, Copy, Debug)]
pub enum SaturationRule<'a> {
    /// Saturated when `r >= rsSat(p)`.
    InferFromRsSat,
    /// Saturated when the cell has free gas.
    ForcedByPhase(&'a [PhasePresence]),
}

impl SaturationRule<'_> {
    /// Decide the state of `cell`; `rs_sat` is only called when inferring.
    #[inline]
    pub fn state(&self, cell: usize, r: f64, rs_sat: impl FnOnce() -> f64) -> SaturationState {
        match self {
            SaturationRule::InferFromRsSat => SaturationState::from_ratio(r, rs_sat()),
            SaturationRule::ForcedByPhase(cond) if cond[cell].has_free_gas() => {
                SaturationState::Saturated
            }
            SaturationRule::ForcedByPhase(_) => SaturationState::Undersaturated,
        }
    }
}
