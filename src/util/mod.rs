//! Shared utilities.

pub mod math;
pub mod telemetry;

pub use math::map_range;
pub use telemetry::*;
