//! Pools, pooled lists, event dispatch and job scheduling.

pub mod error;
pub mod pool;
pub mod list;
pub mod bus;
pub mod job;
pub mod scheduler;

pub use error::{AppResult, RuntimeError};
pub use pool::Pool;
pub use list::{Iter, NodeId, PooledList, Walk};
pub use bus::{EventBus, Listener, ListenerId, Payload};
pub use job::{JobCallback, JobContext, JobId, JobSpec, JobState, Repeat};
pub use scheduler::Scheduler;
