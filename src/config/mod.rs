//! Configuration models for pools, the bus and the scheduler.

pub mod runtime;

pub use runtime::{BusConfig, PoolConfig, RuntimeConfig, SchedulerConfig, CONFIG_PATH_ENV, STRICT_ENV};
