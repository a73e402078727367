//! Event bus and scheduler bundled behind one tick entry point.

use crate::config::RuntimeConfig;
use crate::core::{EventBus, Scheduler};

/// Owns an [`EventBus`] and a [`Scheduler`] whose jobs receive the bus as host.
#[derive(Debug)]
pub struct Runtime {
    bus: EventBus,
    scheduler: Scheduler<EventBus>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(&RuntimeConfig::default())
    }
}

impl Runtime {
    /// Create a runtime from configuration. Callers validate `config` first.
    #[must_use]
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            bus: EventBus::new(config.bus.clone()),
            scheduler: Scheduler::new(&config.scheduler),
        }
    }

    /// Event bus.
    #[must_use]
    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Mutable event bus.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Job scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &Scheduler<EventBus> {
        &self.scheduler
    }

    /// Mutable job scheduler.
    pub fn scheduler_mut(&mut self) -> &mut Scheduler<EventBus> {
        &mut self.scheduler
    }

    /// Run one tick of `elapsed` seconds. Returns the number of job callbacks run.
    pub fn advance(&mut self, elapsed: f32) -> usize {
        self.scheduler.advance(&mut self.bus, elapsed)
    }

    /// True while the scheduler has jobs left.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Dispose all jobs, then tear down every channel.
    pub fn shutdown(&mut self) {
        self.scheduler.shutdown();
        self.bus.dispose_all();
    }
}
