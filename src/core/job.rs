//! Job specifications and per-job timing state.
//!
//! A job fires its callback once every period. A period is measured in
//! seconds, in frames, or in both; when both are configured the job fires only
//! once both have run out. A job without any period fires every tick. An
//! optional start delay (seconds and/or frames) holds the job back before its
//! first period starts counting.

use std::fmt;

use crate::core::{RuntimeError, Scheduler};

/// Stable handle to a scheduled job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub(crate) u64);

impl JobId {
    /// Scheduler-wide unique job number.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job#{}", self.0)
    }
}

/// How many times a job fires before it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    /// Fire until cancelled.
    #[default]
    Forever,
    /// Fire the given number of times.
    Times(u32),
}

/// Where a job currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Waiting for its start delay to elapse.
    Delayed,
    /// Counting down its period.
    Active,
    /// Linked but skipped by ticks until resumed.
    Paused,
    /// Buffered until the end of the current tick.
    Deferred,
}

/// Declarative description of a job.
///
/// ```
/// use prometheus_tickbus::core::{JobSpec, Repeat};
///
/// let spec = JobSpec::every_seconds(0.5).times(4).delay_frames(2);
/// assert_eq!(spec.repeat, Repeat::Times(4));
/// assert!(spec.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobSpec {
    /// Period in seconds.
    pub period_seconds: Option<f32>,
    /// Period in frames.
    pub period_frames: Option<u32>,
    /// Repeat count.
    pub repeat: Repeat,
    /// Seconds to wait before the first period starts.
    pub delay_seconds: f32,
    /// Frames to wait before the first period starts.
    pub delay_frames: u32,
    /// Schedule the job paused.
    pub start_paused: bool,
    /// Hold the job back until the current tick has finished.
    pub defer_to_next_tick: bool,
}

impl JobSpec {
    /// Job firing on every tick, forever.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Job firing every `seconds`, forever.
    #[must_use]
    pub fn every_seconds(seconds: f32) -> Self {
        Self::new().seconds(seconds)
    }

    /// Job firing every `frames` ticks, forever.
    #[must_use]
    pub fn every_frames(frames: u32) -> Self {
        Self::new().frames(frames)
    }

    /// Job firing once after `seconds`.
    #[must_use]
    pub fn once_after_seconds(seconds: f32) -> Self {
        Self::every_seconds(seconds).times(1)
    }

    /// Job firing once after `frames` ticks.
    #[must_use]
    pub fn once_after_frames(frames: u32) -> Self {
        Self::every_frames(frames).times(1)
    }

    /// Job firing once, on the tick after the current one.
    #[must_use]
    pub fn next_tick() -> Self {
        Self::new().times(1).deferred()
    }

    /// Set the period in seconds.
    #[must_use]
    pub const fn seconds(mut self, seconds: f32) -> Self {
        self.period_seconds = Some(seconds);
        self
    }

    /// Set the period in frames.
    #[must_use]
    pub const fn frames(mut self, frames: u32) -> Self {
        self.period_frames = Some(frames);
        self
    }

    /// Fire `count` times, then complete.
    #[must_use]
    pub const fn times(mut self, count: u32) -> Self {
        self.repeat = Repeat::Times(count);
        self
    }

    /// Fire until cancelled.
    #[must_use]
    pub const fn forever(mut self) -> Self {
        self.repeat = Repeat::Forever;
        self
    }

    /// Wait `seconds` before the first period starts.
    #[must_use]
    pub const fn delay_seconds(mut self, seconds: f32) -> Self {
        self.delay_seconds = seconds;
        self
    }

    /// Wait `frames` ticks before the first period starts.
    #[must_use]
    pub const fn delay_frames(mut self, frames: u32) -> Self {
        self.delay_frames = frames;
        self
    }

    /// Schedule paused; the job is skipped until resumed.
    #[must_use]
    pub const fn paused(mut self) -> Self {
        self.start_paused = true;
        self
    }

    /// Admit the job after the current tick instead of immediately.
    #[must_use]
    pub const fn deferred(mut self) -> Self {
        self.defer_to_next_tick = true;
        self
    }

    /// Reject negative or non-finite durations and zero repeat counts.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::InvalidJob`] describing the offending field.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if let Some(seconds) = self.period_seconds {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(RuntimeError::InvalidJob(format!(
                    "period_seconds must be finite and non-negative, got {seconds}"
                )));
            }
        }
        if !self.delay_seconds.is_finite() || self.delay_seconds < 0.0 {
            return Err(RuntimeError::InvalidJob(format!(
                "delay_seconds must be finite and non-negative, got {}",
                self.delay_seconds
            )));
        }
        if self.repeat == Repeat::Times(0) {
            return Err(RuntimeError::InvalidJob("repeat count must be at least 1".into()));
        }
        Ok(())
    }
}

/// Access handed to a job callback while it runs.
///
/// `scheduler` is the scheduler running the job, so callbacks can schedule,
/// pause or cancel jobs (including their own). `host` is the context the
/// scheduler was advanced with.
pub struct JobContext<'a, C> {
    /// Scheduler running the job.
    pub scheduler: &'a mut Scheduler<C>,
    /// Host context passed to [`Scheduler::advance`].
    pub host: &'a mut C,
    /// The job being run.
    pub job: JobId,
    /// Seconds elapsed since the previous tick.
    pub elapsed: f32,
}

impl<C> JobContext<'_, C> {
    /// Cancel the running job. Its completion listeners fire right away.
    pub fn cancel(&mut self) -> bool {
        self.scheduler.cancel(self.job)
    }

    /// Frame counter of the scheduler.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.scheduler.frame()
    }
}

/// Boxed job callback.
pub type JobCallback<C> = Box<dyn FnMut(&mut JobContext<'_, C>)>;

/// Completion listener; receives the scheduler so it can chain follow-up jobs.
pub(crate) type Completion<C> = Box<dyn FnOnce(&mut Scheduler<C>, JobId)>;

/// Pooled per-job state.
pub(crate) struct JobRecord<C> {
    pub(crate) callback: Option<JobCallback<C>>,
    pub(crate) completions: Vec<Completion<C>>,
    pub(crate) paused: bool,
    period_seconds: Option<f32>,
    period_frames: Option<u32>,
    remaining_seconds: f32,
    remaining_frames: i64,
    delay_seconds: f32,
    delay_frames: i64,
    delaying: bool,
    repeat: Repeat,
}

impl<C> Default for JobRecord<C> {
    fn default() -> Self {
        Self {
            callback: None,
            completions: Vec::new(),
            paused: false,
            period_seconds: None,
            period_frames: None,
            remaining_seconds: 0.0,
            remaining_frames: 0,
            delay_seconds: 0.0,
            delay_frames: 0,
            delaying: false,
            repeat: Repeat::Forever,
        }
    }
}

impl<C> JobRecord<C> {
    /// Load `spec` and `callback` into a blank record.
    pub(crate) fn arm(&mut self, spec: &JobSpec, callback: JobCallback<C>) {
        self.callback = Some(callback);
        self.paused = spec.start_paused;
        self.period_seconds = spec.period_seconds;
        self.period_frames = spec.period_frames;
        self.delay_seconds = spec.delay_seconds;
        self.delay_frames = i64::from(spec.delay_frames);
        self.delaying = self.delay_seconds > 0.0 || self.delay_frames > 0;
        self.repeat = spec.repeat;
        self.restart_period();
    }

    pub(crate) const fn is_delayed(&self) -> bool {
        self.delaying
    }

    /// Advance timers by one tick. Returns true when the job is due.
    ///
    /// The tick that ends the delay phase never fires.
    pub(crate) fn step(&mut self, elapsed: f32) -> bool {
        if self.delaying {
            self.delay_seconds -= elapsed;
            self.delay_frames -= 1;
            self.delaying = self.delay_seconds > 0.0 || self.delay_frames > 0;
            return false;
        }

        let mut due = true;
        if self.period_seconds.is_some() {
            self.remaining_seconds -= elapsed;
            due &= self.remaining_seconds <= 0.0;
        }
        if self.period_frames.is_some() {
            self.remaining_frames -= 1;
            due &= self.remaining_frames <= 0;
        }
        due
    }

    /// Restart the period after firing. Returns true once the repeats are used up.
    pub(crate) fn rearm(&mut self) -> bool {
        self.restart_period();
        match &mut self.repeat {
            Repeat::Forever => false,
            Repeat::Times(left) => {
                *left = left.saturating_sub(1);
                *left == 0
            }
        }
    }

    /// Blank the record before it returns to the pool.
    pub(crate) fn clear(&mut self) {
        let mut completions = std::mem::take(&mut self.completions);
        completions.clear();
        *self = Self {
            completions,
            ..Self::default()
        };
    }

    fn restart_period(&mut self) {
        self.remaining_seconds = self.period_seconds.unwrap_or(0.0);
        self.remaining_frames = self.period_frames.map_or(0, i64::from);
    }
}
