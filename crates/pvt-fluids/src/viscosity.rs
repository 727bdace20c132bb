//! Temperature dependence of oil viscosity.
//!
//! The PVT tables give viscosity at one reservoir temperature. A tabulated
//! correction rescales it: for a cell at temperature `T` the viscosity is
//! multiplied by `mu_T(T) / mu_ref`, where `mu_T` is read from the
//! temperature table and `mu_ref` is the PVT viscosity at the region's
//! reference pressure and ratio. Temperatures outside the table take the
//! viscosity of the nearest end.

use crate::error::{PvtError, PvtResult};
use crate::interp::linear_interpolation;
use pvt_core::{ensure_finite, first_non_increasing};

/// Viscosity-versus-temperature table of one region.
#[derive(Clone, Debug, PartialEq)]
pub struct ViscosityTemperatureRegion {
    pub temperature: Vec<f64>,
    pub viscosity: Vec<f64>,
    pub reference_pressure: f64,
    pub reference_ratio: f64,
}

/// Temperature treatment chosen when an evaluator is built.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ViscosityCorrection {
    /// Temperature inputs are accepted and ignored.
    #[default]
    Isothermal,
    /// One table per PVT region.
    Tabulated(Vec<ViscosityTemperatureRegion>),
}

/// A correction bound to a table set, with reference viscosities resolved.
#[derive(Clone, Debug, Default)]
pub(crate) enum TemperatureScaling {
    #[default]
    Unity,
    Tabulated {
        tables: Vec<ViscosityTemperatureRegion>,
        reference_viscosity: Vec<f64>,
    },
}

impl TemperatureScaling {
    /// Validate `correction` and resolve each region's reference viscosity
    /// through `reference(region, pressure, ratio)`.
    pub(crate) fn compile(
        correction: ViscosityCorrection,
        num_regions: usize,
        reference: impl Fn(usize, f64, f64) -> f64,
    ) -> PvtResult<Self> {
        let tables = match correction {
            ViscosityCorrection::Isothermal => return Ok(Self::Unity),
            ViscosityCorrection::Tabulated(tables) => tables,
        };
        if tables.len() != num_regions {
            return Err(PvtError::RegionCount {
                what: "viscosity-temperature tables",
                expected: num_regions,
                found: tables.len(),
            });
        }

        let mut reference_viscosity = Vec::with_capacity(tables.len());
        for (region, table) in tables.iter().enumerate() {
            validate_table(region, table)?;
            let p_ref = ensure_finite(table.reference_pressure, "reference pressure")?;
            let r_ref = ensure_finite(table.reference_ratio, "reference ratio")?;
            let mu_ref = reference(region, p_ref, r_ref);
            if !(mu_ref.is_finite() && mu_ref > 0.0) {
                return Err(PvtError::NonPhysical {
                    what: "reference viscosity",
                    region,
                    row: 0,
                    value: mu_ref,
                });
            }
            reference_viscosity.push(mu_ref);
        }

        Ok(Self::Tabulated {
            tables,
            reference_viscosity,
        })
    }

    #[inline]
    pub(crate) fn factor(&self, region: usize, temperature: f64) -> f64 {
        match self {
            Self::Unity => 1.0,
            Self::Tabulated {
                tables,
                reference_viscosity,
            } => {
                let table = &tables[region];
                let (lo, hi) = (
                    table.temperature[0],
                    table.temperature[table.temperature.len() - 1],
                );
                let t = temperature.clamp(lo, hi);
                linear_interpolation(&table.temperature, &table.viscosity, t)
                    / reference_viscosity[region]
            }
        }
    }

    pub(crate) fn is_isothermal(&self) -> bool {
        matches!(self, Self::Unity)
    }
}

fn validate_table(region: usize, table: &ViscosityTemperatureRegion) -> PvtResult<()> {
    if table.temperature.len() != table.viscosity.len() {
        return Err(PvtError::InvalidArg {
            what: "temperature and viscosity columns differ in length",
        });
    }
    if table.temperature.len() < 2 {
        return Err(PvtError::TooFewRows {
            what: "viscosity-temperature table",
            region,
            rows: table.temperature.len(),
            min: 2,
        });
    }
    for (row, (&t, &mu)) in table.temperature.iter().zip(&table.viscosity).enumerate() {
        ensure_finite(t, "temperature")?;
        if !(mu.is_finite() && mu > 0.0) {
            return Err(PvtError::NonPhysical {
                what: "viscosity",
                region,
                row,
                value: mu,
            });
        }
    }
    if let Some(row) = first_non_increasing(&table.temperature) {
        return Err(PvtError::NotIncreasing {
            what: "temperature",
            region,
            row,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ViscosityTemperatureRegion {
        ViscosityTemperatureRegion {
            temperature: vec![300.0, 350.0],
            viscosity: vec![2.0, 1.0],
            reference_pressure: 150.0,
            reference_ratio: 65.0,
        }
    }

    #[test]
    fn isothermal_factor_is_one() {
        let scaling =
            TemperatureScaling::compile(ViscosityCorrection::Isothermal, 3, |_, _, _| 0.0)
                .unwrap();
        assert!(scaling.is_isothermal());
        assert_eq!(scaling.factor(2, 1234.0), 1.0);
    }

    #[test]
    fn factor_is_table_over_reference() {
        let scaling = TemperatureScaling::compile(
            ViscosityCorrection::Tabulated(vec![table()]),
            1,
            |region, p, r| {
                assert_eq!((region, p, r), (0, 150.0, 65.0));
                1.5
            },
        )
        .unwrap();
        assert!((scaling.factor(0, 300.0) - 2.0 / 1.5).abs() < 1e-12);
        assert!((scaling.factor(0, 325.0) - 1.0).abs() < 1e-12);
        assert!((scaling.factor(0, 350.0) - 1.0 / 1.5).abs() < 1e-12);
    }

    #[test]
    fn factor_holds_end_values_outside_table() {
        let scaling = TemperatureScaling::compile(
            ViscosityCorrection::Tabulated(vec![table()]),
            1,
            |_, _, _| 1.5,
        )
        .unwrap();
        for t in [400.0, 450.0, 1.0e4] {
            assert_eq!(scaling.factor(0, t), scaling.factor(0, 350.0));
        }
        for t in [250.0, 0.0, -1.0e4] {
            assert_eq!(scaling.factor(0, t), scaling.factor(0, 300.0));
        }
        assert!(scaling.factor(0, 450.0) > 0.0);
    }

    #[test]
    fn region_count_must_match() {
        let err = TemperatureScaling::compile(
            ViscosityCorrection::Tabulated(vec![table()]),
            2,
            |_, _, _| 1.0,
        )
        .unwrap_err();
        assert_eq!(
            err,
            PvtError::RegionCount {
                what: "viscosity-temperature tables",
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn bad_tables_are_rejected() {
        let mut t = table();
        t.temperature = vec![350.0, 300.0];
        let compiled =
            TemperatureScaling::compile(ViscosityCorrection::Tabulated(vec![t]), 1, |_, _, _| 1.0);
        assert!(matches!(compiled, Err(PvtError::NotIncreasing { .. })));

        let mut t = table();
        t.viscosity.pop();
        let compiled =
            TemperatureScaling::compile(ViscosityCorrection::Tabulated(vec![t]), 1, |_, _, _| 1.0);
        assert!(matches!(compiled, Err(PvtError::InvalidArg { .. })));
    }

    #[test]
    fn non_positive_reference_is_rejected() {
        let compiled = TemperatureScaling::compile(
            ViscosityCorrection::Tabulated(vec![table()]),
            1,
            |_, _, _| 0.0,
        );
        assert!(matches!(
            compiled,
            Err(PvtError::NonPhysical {
                what: "reference viscosity",
                ..
            })
        ));
    }
}
