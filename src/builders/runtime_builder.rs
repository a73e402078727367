//! Builder to construct a [`Runtime`] from configuration.

use crate::config::{PoolConfig, RuntimeConfig};
use crate::core::RuntimeError;
use crate::runtime::Runtime;

/// Fluent runtime construction with validation at build time.
///
/// ```
/// use prometheus_tickbus::builders::RuntimeBuilder;
///
/// let rt = RuntimeBuilder::new()
///     .with_strict_dispatch(true)
///     .with_job_capacity(64)
///     .build()
///     .unwrap();
/// assert!(rt.bus().config().strict);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuntimeBuilder {
    config: RuntimeConfig,
}

impl RuntimeBuilder {
    /// Start from default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    #[must_use]
    pub const fn from_config(config: RuntimeConfig) -> Self {
        Self { config }
    }

    /// Start from the process environment (see [`RuntimeConfig::from_env`]).
    ///
    /// # Errors
    ///
    /// [`RuntimeError::InvalidConfig`] when the environment configuration is invalid.
    pub fn from_env() -> Result<Self, RuntimeError> {
        RuntimeConfig::from_env()
            .map(Self::from_config)
            .map_err(RuntimeError::InvalidConfig)
    }

    /// Report dispatches that reach no listener as errors.
    #[must_use]
    pub const fn with_strict_dispatch(mut self, strict: bool) -> Self {
        self.config.bus.strict = strict;
        self
    }

    /// Initial capacity of the job pool and the active job list.
    #[must_use]
    pub fn with_job_capacity(mut self, capacity: usize) -> Self {
        self.config.scheduler.jobs.initial_capacity = capacity;
        self.config.scheduler.active.initial_capacity = capacity;
        self
    }

    /// Fix the job pool and list at `capacity`; scheduling past it fails.
    #[must_use]
    pub fn with_fixed_job_capacity(mut self, capacity: usize) -> Self {
        self.config.scheduler.jobs = PoolConfig::fixed(capacity);
        self.config.scheduler.active = PoolConfig::fixed(capacity);
        self
    }

    /// Initial per-channel listener capacity.
    #[must_use]
    pub const fn with_listener_capacity(mut self, capacity: usize) -> Self {
        self.config.bus.listeners.initial_capacity = capacity;
        self
    }

    /// Configuration accumulated so far.
    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Validate the configuration and build the runtime.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::InvalidConfig`] when validation fails.
    pub fn build(self) -> Result<Runtime, RuntimeError> {
        build_runtime(&self.config)
    }
}

/// Validate `cfg` and build a runtime from it.
///
/// # Errors
///
/// [`RuntimeError::InvalidConfig`] when validation fails.
pub fn build_runtime(cfg: &RuntimeConfig) -> Result<Runtime, RuntimeError> {
    cfg.validate()
        .map_err(|e| RuntimeError::InvalidConfig(format!("config invalid: {e}")))?;
    tracing::debug!(
        "building runtime (strict dispatch: {}, job capacity: {})",
        cfg.bus.strict,
        cfg.scheduler.jobs.initial_capacity
    );
    Ok(Runtime::new(cfg))
}
