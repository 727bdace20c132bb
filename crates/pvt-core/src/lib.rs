//! pvt-core: stable foundation for the PVT property layer.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers + tolerant slice comparison)
//! - error (shared error types)

pub mod error;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
