//! # Prometheus Tickbus
//!
//! A low-allocation event dispatch and tick-driven job scheduling runtime for
//! interactive hosts (game loops, UI frame callbacks, simulation steppers).
//!
//! The library sits underneath a UI/logic binding layer: views and domain actions
//! publish typed events through an [`EventBus`](core::EventBus), and timed or
//! frame-based work is expressed as jobs on a [`Scheduler`](core::Scheduler) that
//! the host advances once per tick.
//!
//! ## Core Problem Solved
//!
//! Per-frame code paths are allocation sensitive and heavily re-entrant:
//!
//! - **Heap churn**: event payloads, listener nodes and job records are created and
//!   destroyed at frame rate
//! - **Re-entrancy**: a listener unsubscribes itself, a job cancels its neighbour, a
//!   callback schedules more work while the tick is still walking the job list
//! - **Deterministic ordering**: listeners must fire in registration order, jobs in
//!   scheduling order, synchronously, on the calling context
//!
//! ## Key Features
//!
//! - **Growable Pool**: free-list of reusable objects with capacity accounting
//! - **Pooled List**: arena-backed doubly-linked list with O(1) add/remove/contains
//!   and traversal cursors that survive removal of the current or next node
//! - **Event Bus**: one channel per payload type, payloads recycled after dispatch
//! - **Job Scheduler**: seconds/frames periods, start delays, repeat counts, pause,
//!   next-tick deferral and completion notifications
//!
//! ## Example
//!
//! ```rust
//! use prometheus_tickbus::core::{JobSpec, Payload};
//! use prometheus_tickbus::runtime::Runtime;
//!
//! #[derive(Default)]
//! struct ScoreChanged {
//!     score: u32,
//! }
//!
//! impl Payload for ScoreChanged {
//!     fn reset(&mut self) {
//!         self.score = 0;
//!     }
//! }
//!
//! let mut rt = Runtime::default();
//! rt.bus_mut()
//!     .add_listener::<ScoreChanged, _>(|_bus, ev| println!("score is now {}", ev.score))
//!     .unwrap();
//!
//! rt.scheduler_mut()
//!     .schedule(JobSpec::every_seconds(1.0).times(3), |ctx| {
//!         let mut ev = ctx.host.reusable_payload_or_default::<ScoreChanged>();
//!         ev.score = 10;
//!         let _ = ctx.host.dispatch(ev);
//!     })
//!     .unwrap();
//!
//! for _ in 0..3 {
//!     rt.advance(1.0);
//! }
//! assert!(!rt.scheduler().is_running());
//! ```
//!
//! For complete examples, see:
//! - `tests/scheduler_scenarios_test.rs` - job lifecycle scenarios
//! - `tests/event_bus_test.rs` - dispatch and re-entrancy scenarios

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Pools, pooled lists, the event bus and the job scheduler.
pub mod core;
/// Configuration models for pools, the bus and the scheduler.
pub mod config;
/// Builders to construct runtimes from configuration.
pub mod builders;
/// Host-facing runtime facade and tick drivers.
pub mod runtime;
/// Shared utilities.
pub mod util;
