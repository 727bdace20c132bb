//! pvt-fluids: PVT property evaluation for reservoir oil.
//!
//! Provides:
//! - Piecewise-linear table primitives with linear extrapolation
//! - Flat per-region table storage built and validated once
//! - Live-oil (dissolved gas) and dead-oil evaluators
//! - Optional temperature correction of viscosity
//! - `PvtModel` trait with the vectorized per-cell property API
//!
//! # Architecture
//!
//! Models implement a few scalar primitives (saturated ratio, point
//! evaluation, viscosity factor); the vectorized operations are provided by
//! the trait and shared by every model. Tables are immutable after
//! construction and no call mutates the model, so one instance can serve any
//! number of threads.
//!
//! # Example
//!
//! ```
//! use pvt_fluids::{
//!     DerivativeOutputs, LiveOil, LiveOilRegion, PressureRow, PvtModel, RegionSelector,
//!     SaturatedRow, SaturationRule,
//! };
//!
//! let row = |pressure, inv_fvf, viscosity| PressureRow { pressure, inv_fvf, viscosity };
//! let region = LiveOilRegion {
//!     saturated: vec![
//!         SaturatedRow { pressure: 100.0, ratio: 50.0, inv_fvf: 0.9, viscosity: 1.2 },
//!         SaturatedRow { pressure: 200.0, ratio: 80.0, inv_fvf: 0.95, viscosity: 1.0 },
//!     ],
//!     undersaturated: vec![
//!         vec![row(100.0, 0.9, 1.2), row(300.0, 0.94, 1.4)],
//!         vec![row(200.0, 0.95, 1.0), row(400.0, 0.99, 1.2)],
//!     ],
//! };
//! let oil = LiveOil::isothermal(&[region]).unwrap();
//!
//! let (mut b, mut dbdp, mut dbdr) = ([0.0], [0.0], [0.0]);
//! oil.inverse_fvf(
//!     RegionSelector::single(),
//!     &[150.0],
//!     &[300.0],
//!     &[65.0],
//!     SaturationRule::InferFromRsSat,
//!     DerivativeOutputs::new(&mut b, &mut dbdp, &mut dbdr),
//! );
//! assert!((b[0] - 0.925).abs() < 1e-12);
//! ```

pub mod dead_oil;
pub mod error;
pub mod interp;
pub mod live_oil;
pub mod model;
pub mod phase;
pub mod region;
pub mod tables;
pub mod viscosity;

// Re-exports for ergonomics
pub use dead_oil::DeadOil;
pub use error::{PvtError, PvtResult};
pub use interp::Sample;
pub use live_oil::LiveOil;
pub use model::{DerivativeOutputs, PointValue, PvtModel};
pub use phase::{PhaseLayout, PhasePresence, SaturationRule, SaturationState};
pub use region::RegionSelector;
pub use tables::{
    Curve, DeadOilRegion, DeadOilTables, LiveOilRegion, LiveOilTables, PressureRow, Property,
    SaturatedCurve, SaturatedRow,
};
pub use viscosity::{ViscosityCorrection, ViscosityTemperatureRegion};
