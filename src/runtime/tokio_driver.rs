//! Drive a [`Runtime`] from a tokio interval.
//!
//! The driver measures the real time between ticks and feeds it to
//! [`Runtime::advance`]. Missed ticks are skipped rather than replayed, so a
//! stalled host sees one long tick instead of a burst of short ones.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use crate::core::RuntimeError;
use crate::runtime::Runtime;

/// Fixed-rate tick loop for a [`Runtime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickDriver {
    period: Duration,
    max_ticks: Option<u64>,
    stop_when_idle: bool,
}

impl TickDriver {
    /// Tick every `period`, stopping once the scheduler goes idle.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::InvalidConfig`] for a zero period.
    pub fn new(period: Duration) -> Result<Self, RuntimeError> {
        if period.is_zero() {
            return Err(RuntimeError::InvalidConfig("tick period must be non-zero".into()));
        }
        Ok(Self {
            period,
            max_ticks: None,
            stop_when_idle: true,
        })
    }

    /// Tick `hz` times per second.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::InvalidConfig`] when `hz` is not a positive finite rate.
    pub fn from_hz(hz: f32) -> Result<Self, RuntimeError> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(RuntimeError::InvalidConfig(format!(
                "tick rate must be positive, got {hz}"
            )));
        }
        Self::new(Duration::from_secs_f32(1.0 / hz))
    }

    /// Stop after `ticks` ticks.
    #[must_use]
    pub const fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// Keep ticking (until `max_ticks`) even when no job is scheduled.
    #[must_use]
    pub const fn keep_alive(mut self) -> Self {
        self.stop_when_idle = false;
        self
    }

    /// Interval between ticks.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Advance `runtime` on every interval tick. Returns the ticks driven.
    ///
    /// Without `max_ticks`, a driver built with [`TickDriver::keep_alive`]
    /// runs until its future is dropped.
    pub async fn run(&self, runtime: &mut Runtime) -> u64 {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        interval.tick().await;
        let mut last = Instant::now();

        let mut ticks = 0u64;
        loop {
            if self.max_ticks.is_some_and(|max| ticks >= max) {
                break;
            }
            if self.stop_when_idle && !runtime.is_running() {
                break;
            }
            interval.tick().await;
            let now = Instant::now();
            runtime.advance(now.duration_since(last).as_secs_f32());
            last = now;
            ticks += 1;
        }
        tracing::debug!("tick driver stopped after {} ticks", ticks);
        ticks
    }
}
