//! Error types for pool, bus and scheduler operations.

use thiserror::Error;

/// Errors produced by runtime components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// A non-resizable pool or list has no free slot left.
    #[error("pool exhausted: capacity {capacity}")]
    PoolExhausted {
        /// Capacity of the exhausted pool.
        capacity: usize,
    },
    /// The key is already linked into the list.
    #[error("duplicate entry")]
    DuplicateEntry,
    /// Dispatch reached no listener while the bus runs in strict mode.
    #[error("no listeners for `{0}`")]
    NoListeners(&'static str),
    /// No idle payload and no factory registered for the payload type.
    #[error("no payload factory registered for `{0}`")]
    MissingFactory(&'static str),
    /// A registry entry did not hold the channel type it is keyed by.
    #[error("channel type mismatch for `{0}`")]
    ChannelMismatch(&'static str),
    /// Job specification rejected by validation.
    #[error("invalid job: {0}")]
    InvalidJob(String),
    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for host-level glue.
pub type AppResult<T> = Result<T, anyhow::Error>;
