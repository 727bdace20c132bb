//! PVT table errors.

use pvt_core::CoreError;
use thiserror::Error;

/// Result type for PVT table operations.
pub type PvtResult<T> = Result<T, PvtError>;

/// Errors raised while building a PVT evaluator from parsed tables.
///
/// Evaluation itself never fails; every variant here is a construction-time
/// rejection of malformed input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PvtError {
    /// No regions, or a region table without enough rows to interpolate.
    #[error("Table too short: {what} in region {region} has {rows} rows (need at least {min})")]
    TooFewRows {
        what: &'static str,
        region: usize,
        rows: usize,
        min: usize,
    },

    /// A column that must be strictly increasing is not.
    #[error("Column {what} in region {region} is not strictly increasing at row {row}")]
    NotIncreasing {
        what: &'static str,
        region: usize,
        row: usize,
    },

    /// Negative or zero formation volume factor, viscosity, etc.
    #[error("Non-physical value for {what} in region {region}, row {row}: {value}")]
    NonPhysical {
        what: &'static str,
        region: usize,
        row: usize,
        value: f64,
    },

    /// Undersaturated family length differs from the saturated row count.
    #[error(
        "Region {region} has {saturated} saturated rows but {undersaturated} undersaturated tables"
    )]
    BreakpointMismatch {
        region: usize,
        saturated: usize,
        undersaturated: usize,
    },

    /// A sub-table lacks data and no later sub-table can be used to complete it.
    #[error("Undersaturated table {breakpoint} in region {region} cannot be completed")]
    IncompleteUndersaturated { region: usize, breakpoint: usize },

    /// Two table sets that must describe the same regions do not.
    #[error("Region count mismatch for {what}: expected {expected}, found {found}")]
    RegionCount {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Numeric error: {0}")]
    Numeric(#[from] CoreError),
}
