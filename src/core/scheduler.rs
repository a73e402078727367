//! Tick-driven job scheduler.
//!
//! Jobs live in a [`PooledList`] in scheduling order. Every [`Scheduler::advance`]
//! walks that list once, steps each unpaused job and runs the callbacks that
//! come due. Callbacks get the scheduler back through [`JobContext`], so they
//! may schedule, pause or cancel any job while the walk is in progress:
//!
//! - jobs scheduled immediately are linked at the tail and stepped in the same tick;
//! - jobs scheduled with [`JobSpec::deferred`] wait in a buffer that is merged
//!   into the list after the walk, so they first run on the following tick;
//! - cancelled jobs are unlinked, fire their completion listeners right away
//!   and are never stepped again.
//!
//! The scheduler stops running once no job is left and starts again on the next
//! [`Scheduler::schedule`]; advancing a stopped scheduler is a no-op.
//!
//! ```
//! use prometheus_tickbus::core::{JobSpec, Scheduler};
//!
//! let mut scheduler: Scheduler<Vec<u64>> = Scheduler::default();
//! scheduler
//!     .schedule(JobSpec::every_frames(2).times(2), |ctx| {
//!         let frame = ctx.frame();
//!         ctx.host.push(frame);
//!     })
//!     .unwrap();
//!
//! let mut fired = Vec::new();
//! for _ in 0..5 {
//!     scheduler.advance(&mut fired, 0.016);
//! }
//! assert_eq!(fired, vec![2, 4]);
//! assert!(!scheduler.is_running());
//! ```

use std::fmt;
use std::mem;

use crate::config::SchedulerConfig;
use crate::core::job::JobRecord;
use crate::core::{JobContext, JobId, JobSpec, JobState, NodeId, Pool, PooledList, RuntimeError};

/// Runs jobs against a host context of type `C`.
pub struct Scheduler<C = ()> {
    active: PooledList<JobId, JobRecord<C>>,
    deferred: Vec<(JobId, JobRecord<C>)>,
    records: Pool<JobRecord<C>>,
    next_id: u64,
    running: bool,
    in_tick: bool,
    frame: u64,
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new(&SchedulerConfig::default())
    }
}

impl<C> fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("active", &self.active.len())
            .field("deferred", &self.deferred.len())
            .field("running", &self.running)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl<C> Drop for Scheduler<C> {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

impl<C> Scheduler<C> {
    /// Create an idle scheduler.
    #[must_use]
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            active: PooledList::new(&config.active),
            deferred: Vec::with_capacity(config.deferred_capacity),
            records: Pool::new(&config.jobs),
            next_id: 1,
            running: false,
            in_tick: false,
            frame: 0,
        }
    }

    /// Schedule `callback` according to `spec`.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::InvalidJob`] when `spec` fails validation,
    /// [`RuntimeError::PoolExhausted`] when a fixed job pool or list is full.
    pub fn schedule<F>(&mut self, spec: JobSpec, callback: F) -> Result<JobId, RuntimeError>
    where
        F: FnMut(&mut JobContext<'_, C>) + 'static,
    {
        spec.validate()?;
        if !spec.defer_to_next_tick {
            self.active.try_reserve(1)?;
        }
        let mut record = self.records.try_acquire()?;
        record.arm(&spec, Box::new(callback));

        let id = JobId(self.next_id);
        self.next_id += 1;
        if spec.defer_to_next_tick {
            self.deferred.push((id, record));
        } else {
            self.active.add_last(id, record)?;
        }

        if !self.running {
            tracing::debug!("scheduler loop started at frame {}", self.frame);
            self.running = true;
        }
        tracing::trace!("{} scheduled", id);
        Ok(id)
    }

    /// Run `callback` every `seconds`, forever.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::schedule`].
    pub fn every_seconds<F>(&mut self, seconds: f32, callback: F) -> Result<JobId, RuntimeError>
    where
        F: FnMut(&mut JobContext<'_, C>) + 'static,
    {
        self.schedule(JobSpec::every_seconds(seconds), callback)
    }

    /// Run `callback` every `frames` ticks, forever.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::schedule`].
    pub fn every_frames<F>(&mut self, frames: u32, callback: F) -> Result<JobId, RuntimeError>
    where
        F: FnMut(&mut JobContext<'_, C>) + 'static,
    {
        self.schedule(JobSpec::every_frames(frames), callback)
    }

    /// Run `callback` once after `seconds`.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::schedule`].
    pub fn once_after_seconds<F>(&mut self, seconds: f32, callback: F) -> Result<JobId, RuntimeError>
    where
        F: FnMut(&mut JobContext<'_, C>) + 'static,
    {
        self.schedule(JobSpec::once_after_seconds(seconds), callback)
    }

    /// Run `callback` once after `frames` ticks.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::schedule`].
    pub fn once_after_frames<F>(&mut self, frames: u32, callback: F) -> Result<JobId, RuntimeError>
    where
        F: FnMut(&mut JobContext<'_, C>) + 'static,
    {
        self.schedule(JobSpec::once_after_frames(frames), callback)
    }

    /// Run `callback` once on the tick after the current one.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::schedule`].
    pub fn next_tick<F>(&mut self, callback: F) -> Result<JobId, RuntimeError>
    where
        F: FnMut(&mut JobContext<'_, C>) + 'static,
    {
        self.schedule(JobSpec::next_tick(), callback)
    }

    /// Step every active job by one tick of `elapsed` seconds.
    ///
    /// Returns the number of callbacks run. Calls made from inside a job
    /// callback are ignored. A negative or non-finite `elapsed` counts as a
    /// zero-length tick.
    pub fn advance(&mut self, host: &mut C, elapsed: f32) -> usize {
        if self.in_tick {
            tracing::warn!("advance called from inside a job callback; ignored");
            return 0;
        }
        if !self.running {
            return 0;
        }
        let elapsed = if elapsed.is_finite() && elapsed >= 0.0 {
            elapsed
        } else {
            tracing::warn!("invalid tick length {}; treating as 0s", elapsed);
            0.0
        };

        self.in_tick = true;
        self.frame += 1;
        let mut fired = 0;

        let walk = self.active.begin_walk();
        while let Some(node) = self.active.walk_next(walk) {
            let Some((id, record)) = self.active.entry_mut(node) else {
                continue;
            };
            if record.paused || !record.step(elapsed) {
                continue;
            }
            let Some(mut callback) = record.callback.take() else {
                continue;
            };

            let mut ctx = JobContext {
                scheduler: &mut *self,
                host: &mut *host,
                job: id,
                elapsed,
            };
            callback(&mut ctx);
            fired += 1;

            // The callback may have cancelled its own job.
            let Some(record) = self.active.value_mut(node) else {
                continue;
            };
            record.callback = Some(callback);
            if record.rearm() {
                self.dispose_node(node);
            }
        }
        self.active.end_walk(walk);

        self.merge_deferred();
        self.in_tick = false;
        self.settle();
        fired
    }

    /// Skip the job on future ticks. Returns false for unknown jobs.
    pub fn pause(&mut self, id: JobId) -> bool {
        self.set_paused(id, true)
    }

    /// Resume a paused job. Returns false for unknown jobs.
    pub fn resume(&mut self, id: JobId) -> bool {
        self.set_paused(id, false)
    }

    /// Dispose a job, firing its completion listeners.
    ///
    /// Returns false when the job is unknown or already gone.
    pub fn cancel(&mut self, id: JobId) -> bool {
        if let Some(node) = self.active.node_of(&id) {
            self.dispose_node(node);
        } else if let Some(pos) = self.deferred.iter().position(|(queued, _)| *queued == id) {
            let (id, record) = self.deferred.remove(pos);
            self.retire(id, record);
        } else {
            return false;
        }
        self.settle();
        true
    }

    /// Call `listener` once the job completes or is cancelled.
    ///
    /// The listener gets the scheduler, so it may schedule follow-up jobs.
    /// Returns false for unknown jobs.
    pub fn on_complete<F>(&mut self, id: JobId, listener: F) -> bool
    where
        F: FnOnce(&mut Self, JobId) + 'static,
    {
        match self.record_mut(id) {
            Some(record) => {
                record.completions.push(Box::new(listener));
                true
            }
            None => false,
        }
    }

    /// Lifecycle state of a job, or `None` once it is gone.
    #[must_use]
    pub fn state(&self, id: JobId) -> Option<JobState> {
        if self.deferred.iter().any(|(queued, _)| *queued == id) {
            return Some(JobState::Deferred);
        }
        let record = self.active.get(&id)?;
        Some(if record.paused {
            JobState::Paused
        } else if record.is_delayed() {
            JobState::Delayed
        } else {
            JobState::Active
        })
    }

    /// True while the job is linked or buffered.
    #[must_use]
    pub fn is_scheduled(&self, id: JobId) -> bool {
        self.state(id).is_some()
    }

    /// Jobs linked or buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len() + self.deferred.len()
    }

    /// True when no job is linked or buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Jobs linked into the active list.
    #[must_use]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Jobs waiting for the end of the current tick.
    #[must_use]
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    /// Whether `advance` currently does any work.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks processed since construction.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Idle job records waiting for reuse.
    #[must_use]
    pub fn pooled_records(&self) -> usize {
        self.records.idle()
    }

    /// Dispose every job, tail first, then the deferral buffer.
    ///
    /// Jobs scheduled by completion listeners meanwhile are disposed as well.
    pub fn dispose_all(&mut self) {
        let mut disposed = 0usize;
        loop {
            if let Some(node) = self.active.last() {
                self.dispose_node(node);
            } else if let Some((id, record)) = self.deferred.pop() {
                self.retire(id, record);
            } else {
                break;
            }
            disposed += 1;
        }
        if disposed > 0 {
            tracing::debug!("disposed {} jobs", disposed);
        }
        self.settle();
    }

    /// Drop idle job records; `purge` also frees their backing storage.
    pub fn clear_pools(&mut self, purge: bool) {
        self.records.drop_idle(purge);
    }

    /// Dispose every job and release pooled storage.
    pub fn shutdown(&mut self) {
        self.dispose_all();
        self.clear_pools(true);
        tracing::info!("scheduler shut down after {} frames", self.frame);
    }

    fn set_paused(&mut self, id: JobId, paused: bool) -> bool {
        match self.record_mut(id) {
            Some(record) => {
                record.paused = paused;
                true
            }
            None => false,
        }
    }

    fn record_mut(&mut self, id: JobId) -> Option<&mut JobRecord<C>> {
        if let Some(record) = self.active.get_mut(&id) {
            return Some(record);
        }
        self.deferred
            .iter_mut()
            .find(|(queued, _)| *queued == id)
            .map(|(_, record)| record)
    }

    fn dispose_node(&mut self, node: NodeId) {
        if let Some((id, record)) = self.active.remove_node(node) {
            self.retire(id, record);
        }
    }

    /// Blank the record, notify completion listeners and recycle the record.
    fn retire(&mut self, id: JobId, mut record: JobRecord<C>) {
        let mut completions = mem::take(&mut record.completions);
        record.clear();
        for listener in completions.drain(..) {
            listener(&mut *self, id);
        }
        record.completions = completions;
        self.records.release(record);
        tracing::trace!("{} disposed", id);
    }

    fn merge_deferred(&mut self) {
        if self.deferred.is_empty() {
            return;
        }
        let mut pending = mem::take(&mut self.deferred);
        for (id, record) in pending.drain(..) {
            if let Err(e) = self.active.try_reserve(1) {
                tracing::error!("failed to admit deferred {}: {}", id, e);
                self.retire(id, record);
                continue;
            }
            if let Err(e) = self.active.add_last(id, record) {
                tracing::error!("failed to admit deferred {}: {}", id, e);
            }
        }
        // Completion listeners of rejected jobs may have deferred new ones.
        let queued = mem::replace(&mut self.deferred, pending);
        self.deferred.extend(queued);
    }

    fn settle(&mut self) {
        if self.running && !self.in_tick && self.is_empty() {
            tracing::debug!("scheduler loop stopped at frame {}", self.frame);
            self.running = false;
        }
    }
}
