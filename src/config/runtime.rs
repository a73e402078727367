//! Pool, bus and scheduler configuration structures.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Environment variable naming a JSON configuration file.
pub const CONFIG_PATH_ENV: &str = "TICKBUS_CONFIG";
/// Environment variable toggling strict dispatch (`1`/`true`).
pub const STRICT_ENV: &str = "TICKBUS_STRICT";

/// Sizing of a growable pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Slots available before the first growth.
    pub initial_capacity: usize,
    /// Fraction of the current capacity added on each growth.
    pub growth_factor: f32,
    /// Whether the pool may grow past its capacity.
    pub resizable: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 8,
            growth_factor: 0.5,
            resizable: true,
        }
    }
}

impl PoolConfig {
    /// Resizable pool with the given initial capacity and default growth.
    #[must_use]
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            ..Self::default()
        }
    }

    /// Fixed-size pool that never grows.
    #[must_use]
    pub fn fixed(capacity: usize) -> Self {
        Self {
            initial_capacity: capacity,
            growth_factor: 0.5,
            resizable: false,
        }
    }

    /// Validate pool sizing values.
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_capacity == 0 {
            return Err("initial_capacity must be greater than 0".into());
        }
        if !self.growth_factor.is_finite() || self.growth_factor <= 0.0 {
            return Err("growth_factor must be a positive finite number".into());
        }
        Ok(())
    }
}

/// Event bus configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Listener list sizing, per channel.
    pub listeners: PoolConfig,
    /// Payload pool sizing, per channel.
    pub payloads: PoolConfig,
    /// Report dispatches that reach no listener as errors.
    ///
    /// Defaults to on in debug builds and off in release builds.
    pub strict: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            listeners: PoolConfig::with_capacity(8),
            payloads: PoolConfig::with_capacity(2),
            strict: cfg!(debug_assertions),
        }
    }
}

impl BusConfig {
    /// Validate listener and payload pool sizing.
    pub fn validate(&self) -> Result<(), String> {
        self.listeners
            .validate()
            .map_err(|e| format!("listeners: {e}"))?;
        self.payloads
            .validate()
            .map_err(|e| format!("payloads: {e}"))?;
        Ok(())
    }
}

/// Job scheduler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Job record pool sizing.
    pub jobs: PoolConfig,
    /// Active job list sizing.
    pub active: PoolConfig,
    /// Initial capacity of the next-tick deferral buffer.
    pub deferred_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            jobs: PoolConfig::with_capacity(10),
            active: PoolConfig::with_capacity(16),
            deferred_capacity: 4,
        }
    }
}

impl SchedulerConfig {
    /// Validate job pool and active list sizing.
    pub fn validate(&self) -> Result<(), String> {
        self.jobs.validate().map_err(|e| format!("jobs: {e}"))?;
        self.active.validate().map_err(|e| format!("active: {e}"))?;
        Ok(())
    }
}

/// Root runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Event bus settings.
    pub bus: BusConfig,
    /// Job scheduler settings.
    pub scheduler: SchedulerConfig,
}

impl RuntimeConfig {
    /// Validate bus and scheduler sections.
    pub fn validate(&self) -> Result<(), String> {
        self.bus.validate().map_err(|e| format!("bus invalid: {e}"))?;
        self.scheduler
            .validate()
            .map_err(|e| format!("scheduler invalid: {e}"))?;
        Ok(())
    }

    /// Parse runtime configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read `{}`: {e}", path.display()))?;
        Self::from_json_str(&input)
    }

    /// Build configuration from the process environment.
    ///
    /// Loads a `.env` file when present, then reads the file named by
    /// [`CONFIG_PATH_ENV`] (defaults otherwise) and applies [`STRICT_ENV`].
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        let mut cfg = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_json_file(path)?,
            Err(_) => Self::default(),
        };
        if let Ok(flag) = std::env::var(STRICT_ENV) {
            cfg.bus.strict = parse_flag(&flag)
                .ok_or_else(|| format!("{STRICT_ENV} must be a boolean, got `{flag}`"))?;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
