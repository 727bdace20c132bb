//! Flat storage for per-region PVT tables.
//!
//! Rows of every region live in a few contiguous columns; regions and
//! undersaturated sub-tables are addressed by [`Span`]s into them. The
//! undersaturated span list runs parallel to the saturated rows, so row `k` of
//! a region's saturated curve and its sub-table share one global index.

use crate::error::{PvtError, PvtResult};
use crate::interp::{Sample, sample};
use pvt_core::{ensure_finite, first_non_increasing};
use std::ops::Range;
use tracing::debug;

/// One row of a saturated curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SaturatedRow {
    pub pressure: f64,
    /// Dissolved gas/oil ratio at saturation.
    pub ratio: f64,
    /// Inverse formation volume factor `b = 1/B`.
    pub inv_fvf: f64,
    pub viscosity: f64,
}

/// One row of a pressure-indexed property table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PressureRow {
    pub pressure: f64,
    pub inv_fvf: f64,
    pub viscosity: f64,
}

impl From<SaturatedRow> for PressureRow {
    fn from(row: SaturatedRow) -> Self {
        Self {
            pressure: row.pressure,
            inv_fvf: row.inv_fvf,
            viscosity: row.viscosity,
        }
    }
}

/// Parsed live-oil tables of one PVT region.
///
/// `undersaturated[k]` describes the oil at the fixed ratio `saturated[k].ratio`
/// for pressures from the saturation point upwards. A sub-table with fewer
/// than two rows is completed from the next sub-table that has two; an empty
/// one is first seeded with the saturated row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiveOilRegion {
    pub saturated: Vec<SaturatedRow>,
    pub undersaturated: Vec<Vec<PressureRow>>,
}

/// Parsed dead-oil table of one PVT region.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeadOilRegion {
    pub rows: Vec<PressureRow>,
}

/// Property column read by an evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Property {
    /// `b = 1/B`.
    InverseFvf,
    Viscosity,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Span {
    offset: usize,
    len: usize,
}

impl Span {
    fn range(self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Struct-of-arrays pressure tables shared by all regions.
#[derive(Clone, Debug, Default)]
pub(crate) struct PressureColumns {
    pressure: Vec<f64>,
    inv_fvf: Vec<f64>,
    viscosity: Vec<f64>,
}

impl PressureColumns {
    fn push_table(&mut self, rows: &[PressureRow]) -> Span {
        let span = Span {
            offset: self.pressure.len(),
            len: rows.len(),
        };
        for row in rows {
            self.pressure.push(row.pressure);
            self.inv_fvf.push(row.inv_fvf);
            self.viscosity.push(row.viscosity);
        }
        span
    }

    fn curve(&self, span: Span) -> Curve<'_> {
        let range = span.range();
        Curve {
            pressure: &self.pressure[range.clone()],
            inv_fvf: &self.inv_fvf[range.clone()],
            viscosity: &self.viscosity[range],
        }
    }

    fn rows(&self) -> usize {
        self.pressure.len()
    }
}

/// Borrowed view of one pressure-indexed table.
#[derive(Clone, Copy, Debug)]
pub struct Curve<'a> {
    pub pressure: &'a [f64],
    pub inv_fvf: &'a [f64],
    pub viscosity: &'a [f64],
}

impl<'a> Curve<'a> {
    pub fn column(&self, property: Property) -> &'a [f64] {
        match property {
            Property::InverseFvf => self.inv_fvf,
            Property::Viscosity => self.viscosity,
        }
    }

    #[inline]
    pub fn sample(&self, property: Property, p: f64) -> Sample {
        sample(self.pressure, self.column(property), p)
    }

    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }
}

/// Saturated curve of one region together with its undersaturated family.
#[derive(Clone, Copy, Debug)]
pub struct SaturatedCurve<'a> {
    pub curve: Curve<'a>,
    pub ratio: &'a [f64],
    undersaturated: &'a [Span],
    columns: &'a PressureColumns,
}

impl<'a> SaturatedCurve<'a> {
    /// Undersaturated sub-table at breakpoint `k`.
    #[inline]
    pub fn undersaturated(&self, k: usize) -> Curve<'a> {
        self.columns.curve(self.undersaturated[k])
    }

    /// Saturated ratio and its pressure derivative.
    #[inline]
    pub fn rs_sat(&self, p: f64) -> Sample {
        sample(self.curve.pressure, self.ratio, p)
    }

    pub fn len(&self) -> usize {
        self.ratio.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratio.is_empty()
    }
}

/// Immutable live-oil tables for every PVT region.
#[derive(Clone, Debug, Default)]
pub struct LiveOilTables {
    saturated: PressureColumns,
    ratio: Vec<f64>,
    undersaturated: PressureColumns,
    regions: Vec<Span>,
    undersaturated_spans: Vec<Span>,
}

impl LiveOilTables {
    pub fn new(regions: &[LiveOilRegion]) -> PvtResult<Self> {
        if regions.is_empty() {
            return Err(PvtError::InvalidArg {
                what: "at least one PVT region is required",
            });
        }

        let mut tables = Self::default();
        for (region, input) in regions.iter().enumerate() {
            validate_saturated(region, &input.saturated)?;
            if input.undersaturated.len() != input.saturated.len() {
                return Err(PvtError::BreakpointMismatch {
                    region,
                    saturated: input.saturated.len(),
                    undersaturated: input.undersaturated.len(),
                });
            }
            let family = complete_undersaturated(region, &input.saturated, &input.undersaturated)?;
            for sub in &family {
                validate_pressure_rows(region, "undersaturated pressure", sub)?;
            }

            let rows: Vec<PressureRow> = input.saturated.iter().copied().map(Into::into).collect();
            tables.regions.push(tables.saturated.push_table(&rows));
            tables
                .ratio
                .extend(input.saturated.iter().map(|row| row.ratio));
            for sub in &family {
                let span = tables.undersaturated.push_table(sub);
                tables.undersaturated_spans.push(span);
            }
        }

        debug!(
            regions = tables.regions.len(),
            saturated_rows = tables.saturated.rows(),
            undersaturated_rows = tables.undersaturated.rows(),
            "built live-oil tables"
        );
        Ok(tables)
    }

    pub fn num_regions(&self) -> usize {
        self.regions.len()
    }

    /// Tables of `region`.
    ///
    /// # Panics
    ///
    /// Panics if `region >= self.num_regions()`.
    #[inline]
    pub fn region(&self, region: usize) -> SaturatedCurve<'_> {
        let span = self.regions[region];
        SaturatedCurve {
            curve: self.saturated.curve(span),
            ratio: &self.ratio[span.range()],
            undersaturated: &self.undersaturated_spans[span.range()],
            columns: &self.undersaturated,
        }
    }
}

/// Immutable dead-oil tables for every PVT region.
#[derive(Clone, Debug, Default)]
pub struct DeadOilTables {
    columns: PressureColumns,
    regions: Vec<Span>,
}

impl DeadOilTables {
    pub fn new(regions: &[DeadOilRegion]) -> PvtResult<Self> {
        if regions.is_empty() {
            return Err(PvtError::InvalidArg {
                what: "at least one PVT region is required",
            });
        }

        let mut tables = Self::default();
        for (region, input) in regions.iter().enumerate() {
            validate_pressure_rows(region, "dead-oil pressure", &input.rows)?;
            tables.regions.push(tables.columns.push_table(&input.rows));
        }

        debug!(
            regions = tables.regions.len(),
            rows = tables.columns.rows(),
            "built dead-oil tables"
        );
        Ok(tables)
    }

    pub fn num_regions(&self) -> usize {
        self.regions.len()
    }

    #[inline]
    pub fn region(&self, region: usize) -> Curve<'_> {
        self.columns.curve(self.regions[region])
    }
}

fn validate_saturated(region: usize, rows: &[SaturatedRow]) -> PvtResult<()> {
    if rows.len() < 2 {
        return Err(PvtError::TooFewRows {
            what: "saturated table",
            region,
            rows: rows.len(),
            min: 2,
        });
    }
    for (row, r) in rows.iter().enumerate() {
        ensure_finite(r.ratio, "saturated ratio")?;
        check_pressure_row(region, row, &PressureRow::from(*r))?;
    }

    let pressure: Vec<f64> = rows.iter().map(|r| r.pressure).collect();
    if let Some(row) = first_non_increasing(&pressure) {
        return Err(PvtError::NotIncreasing {
            what: "saturated pressure",
            region,
            row,
        });
    }
    let ratio: Vec<f64> = rows.iter().map(|r| r.ratio).collect();
    if let Some(row) = first_non_increasing(&ratio) {
        return Err(PvtError::NotIncreasing {
            what: "saturated ratio",
            region,
            row,
        });
    }
    Ok(())
}

fn validate_pressure_rows(
    region: usize,
    what: &'static str,
    rows: &[PressureRow],
) -> PvtResult<()> {
    if rows.len() < 2 {
        return Err(PvtError::TooFewRows {
            what,
            region,
            rows: rows.len(),
            min: 2,
        });
    }
    for (row, r) in rows.iter().enumerate() {
        check_pressure_row(region, row, r)?;
    }
    let pressure: Vec<f64> = rows.iter().map(|r| r.pressure).collect();
    if let Some(row) = first_non_increasing(&pressure) {
        return Err(PvtError::NotIncreasing { what, region, row });
    }
    Ok(())
}

fn check_pressure_row(region: usize, row: usize, r: &PressureRow) -> PvtResult<()> {
    ensure_finite(r.pressure, "pressure")?;
    if !(r.inv_fvf.is_finite() && r.inv_fvf > 0.0) {
        return Err(PvtError::NonPhysical {
            what: "inverse formation volume factor",
            region,
            row,
            value: r.inv_fvf,
        });
    }
    if !(r.viscosity.is_finite() && r.viscosity > 0.0) {
        return Err(PvtError::NonPhysical {
            what: "viscosity",
            region,
            row,
            value: r.viscosity,
        });
    }
    Ok(())
}

/// Give every sub-table at least two rows.
///
/// A short sub-table borrows the shape of the next sub-table that has data:
/// each donor step adds the same pressure increment and scales `b` and
/// viscosity by the donor's ratio over that step.
fn complete_undersaturated(
    region: usize,
    saturated: &[SaturatedRow],
    tables: &[Vec<PressureRow>],
) -> PvtResult<Vec<Vec<PressureRow>>> {
    let mut completed: Vec<Vec<PressureRow>> = tables
        .iter()
        .zip(saturated)
        .map(|(sub, sat)| {
            if sub.is_empty() {
                vec![PressureRow::from(*sat)]
            } else {
                sub.clone()
            }
        })
        .collect();

    for (k, sub) in completed.iter_mut().enumerate() {
        if sub.len() > 1 {
            continue;
        }
        let donor = (k + 1..tables.len())
            .find(|&j| tables[j].len() > 1)
            .ok_or(PvtError::IncompleteUndersaturated {
                region,
                breakpoint: k,
            })?;

        let mut last = sub[0];
        for step in tables[donor].windows(2) {
            last = PressureRow {
                pressure: last.pressure + (step[1].pressure - step[0].pressure),
                inv_fvf: last.inv_fvf * step[1].inv_fvf / step[0].inv_fvf,
                viscosity: last.viscosity * step[1].viscosity / step[0].viscosity,
            };
            sub.push(last);
        }
        debug!(region, breakpoint = k, donor, "completed undersaturated table");
    }

    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sat(pressure: f64, ratio: f64, inv_fvf: f64, viscosity: f64) -> SaturatedRow {
        SaturatedRow {
            pressure,
            ratio,
            inv_fvf,
            viscosity,
        }
    }

    fn row(pressure: f64, inv_fvf: f64, viscosity: f64) -> PressureRow {
        PressureRow {
            pressure,
            inv_fvf,
            viscosity,
        }
    }

    fn two_row_region() -> LiveOilRegion {
        LiveOilRegion {
            saturated: vec![sat(100.0, 50.0, 0.9, 1.2), sat(200.0, 80.0, 0.95, 1.0)],
            undersaturated: vec![
                vec![row(100.0, 0.9, 1.2), row(300.0, 0.92, 1.3)],
                vec![row(200.0, 0.95, 1.0), row(400.0, 0.97, 1.1)],
            ],
        }
    }

    #[test]
    fn regions_share_flat_columns() {
        let mut second = two_row_region();
        second.saturated[0].ratio = 40.0;
        let tables = LiveOilTables::new(&[two_row_region(), second]).unwrap();
        assert_eq!(tables.num_regions(), 2);

        let r0 = tables.region(0);
        let r1 = tables.region(1);
        assert_eq!(r0.ratio, &[50.0, 80.0]);
        assert_eq!(r1.ratio, &[40.0, 80.0]);
        assert_eq!(r1.undersaturated(1).pressure, &[200.0, 400.0]);
        assert_eq!(r1.curve.column(Property::Viscosity), &[1.2, 1.0]);
    }

    #[test]
    fn empty_region_list_is_rejected() {
        assert!(matches!(
            LiveOilTables::new(&[]),
            Err(PvtError::InvalidArg { .. })
        ));
    }

    #[test]
    fn single_saturated_row_is_rejected() {
        let region = LiveOilRegion {
            saturated: vec![sat(100.0, 50.0, 0.9, 1.2)],
            undersaturated: vec![vec![row(100.0, 0.9, 1.2), row(200.0, 0.91, 1.3)]],
        };
        assert!(matches!(
            LiveOilTables::new(&[region]),
            Err(PvtError::TooFewRows { rows: 1, .. })
        ));
    }

    #[test]
    fn non_monotone_pressure_is_rejected() {
        let mut region = two_row_region();
        region.saturated[1].pressure = 100.0;
        let err = LiveOilTables::new(&[region]).unwrap_err();
        assert_eq!(
            err,
            PvtError::NotIncreasing {
                what: "saturated pressure",
                region: 0,
                row: 1
            }
        );
    }

    #[test]
    fn non_monotone_ratio_is_rejected() {
        let mut region = two_row_region();
        region.saturated[1].ratio = 10.0;
        assert!(matches!(
            LiveOilTables::new(&[region]),
            Err(PvtError::NotIncreasing {
                what: "saturated ratio",
                ..
            })
        ));
    }

    #[test]
    fn breakpoint_count_must_match() {
        let mut region = two_row_region();
        region.undersaturated.pop();
        assert!(matches!(
            LiveOilTables::new(&[region]),
            Err(PvtError::BreakpointMismatch {
                saturated: 2,
                undersaturated: 1,
                ..
            })
        ));
    }

    #[test]
    fn non_physical_values_are_rejected() {
        let mut region = two_row_region();
        region.saturated[0].inv_fvf = 0.0;
        assert!(matches!(
            LiveOilTables::new(&[region]),
            Err(PvtError::NonPhysical { .. })
        ));

        let mut region = two_row_region();
        region.undersaturated[1][1].viscosity = -1.0;
        assert!(matches!(
            LiveOilTables::new(&[region]),
            Err(PvtError::NonPhysical {
                what: "viscosity",
                ..
            })
        ));
    }

    #[test]
    fn nan_pressure_is_rejected() {
        let mut region = two_row_region();
        region.saturated[0].pressure = f64::NAN;
        assert!(matches!(
            LiveOilTables::new(&[region]),
            Err(PvtError::Numeric(_))
        ));
    }

    #[test]
    fn short_sub_table_is_completed_from_next() {
        let mut region = two_row_region();
        region.undersaturated[0] = vec![];
        let tables = LiveOilTables::new(&[region]).unwrap();
        let sub = tables.region(0).undersaturated(0);

        assert_eq!(sub.len(), 2);
        assert_eq!(sub.pressure[0], 100.0);
        assert!((sub.pressure[1] - 300.0).abs() < 1e-12);
        assert!((sub.inv_fvf[1] - 0.9 * 0.97 / 0.95).abs() < 1e-12);
        assert!((sub.viscosity[1] - 1.2 * 1.1 / 1.0).abs() < 1e-12);
    }

    #[test]
    fn last_sub_table_needs_data() {
        let mut region = two_row_region();
        region.undersaturated[1].truncate(1);
        assert_eq!(
            LiveOilTables::new(&[region]).unwrap_err(),
            PvtError::IncompleteUndersaturated {
                region: 0,
                breakpoint: 1
            }
        );
    }

    #[test]
    fn dead_oil_tables_validate_rows() {
        let ok = DeadOilRegion {
            rows: vec![row(100.0, 0.9, 1.2), row(200.0, 0.95, 1.1)],
        };
        let tables = DeadOilTables::new(&[ok.clone()]).unwrap();
        assert_eq!(tables.region(0).pressure, &[100.0, 200.0]);

        let short = DeadOilRegion {
            rows: vec![row(100.0, 0.9, 1.2)],
        };
        assert!(DeadOilTables::new(&[ok, short]).is_err());
    }
}
