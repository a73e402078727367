//! Growable free-list pool for recycled objects.
//!
//! The pool is an array-backed stack of idle objects plus an account of how many
//! objects are currently handed out. Acquisition pops an idle object, builds a
//! fresh one while under capacity, and grows the capacity only when the pool is
//! resizable. Node slots, event payloads and job records all cycle through pools
//! so steady-state ticks do not touch the allocator.
//!
//! # Example
//!
//! ```
//! use prometheus_tickbus::config::PoolConfig;
//! use prometheus_tickbus::core::Pool;
//!
//! let mut pool: Pool<Vec<u8>> = Pool::new(&PoolConfig::fixed(1));
//! let mut buf = pool.try_acquire().unwrap();
//! buf.extend_from_slice(b"frame");
//! assert!(pool.try_acquire().is_err());
//!
//! buf.clear();
//! pool.release(buf);
//! assert_eq!(pool.idle(), 1);
//! ```

use crate::config::PoolConfig;
use crate::core::RuntimeError;

/// Growth factor used when the configured one is not positive.
pub const FALLBACK_GROWTH: f32 = 0.5;

/// Array-backed stack of reusable objects with capacity accounting.
///
/// Invariant: `live() + idle() <= capacity()`.
#[derive(Debug)]
pub struct Pool<T> {
    idle: Vec<T>,
    live: usize,
    capacity: usize,
    growth_factor: f32,
    resizable: bool,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new(&PoolConfig::default())
    }
}

impl<T> Pool<T> {
    /// Create an empty pool sized by `config`.
    #[must_use]
    pub fn new(config: &PoolConfig) -> Self {
        let capacity = config.initial_capacity.max(1);
        let growth_factor = if config.growth_factor > 0.0 {
            config.growth_factor
        } else {
            FALLBACK_GROWTH
        };
        Self {
            idle: Vec::with_capacity(capacity),
            live: 0,
            capacity,
            growth_factor,
            resizable: config.resizable,
        }
    }

    /// Resizable pool with the given initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(&PoolConfig::with_capacity(capacity))
    }

    /// Objects currently handed out.
    #[inline]
    #[must_use]
    pub const fn live(&self) -> usize {
        self.live
    }

    /// Idle objects waiting for reuse.
    #[inline]
    #[must_use]
    pub fn idle(&self) -> usize {
        self.idle.len()
    }

    /// Current capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Acquisitions possible before the pool has to grow.
    #[inline]
    #[must_use]
    pub const fn available(&self) -> usize {
        self.capacity - self.live
    }

    /// True when every slot is handed out.
    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.live == self.capacity
    }

    /// True when no idle object is waiting for reuse.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.idle.is_empty()
    }

    /// Whether the pool grows on exhaustion.
    #[inline]
    #[must_use]
    pub const fn is_resizable(&self) -> bool {
        self.resizable
    }

    /// Acquire an object, building one with `make` when no idle object exists.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::PoolExhausted`] when the pool is full and not resizable.
    pub fn try_acquire_with<F>(&mut self, make: F) -> Result<T, RuntimeError>
    where
        F: FnOnce() -> T,
    {
        if let Some(item) = self.idle.pop() {
            self.live += 1;
            return Ok(item);
        }
        if self.live >= self.capacity {
            if !self.resizable {
                return Err(RuntimeError::PoolExhausted {
                    capacity: self.capacity,
                });
            }
            self.grow();
        }
        self.live += 1;
        Ok(make())
    }

    /// Reuse an idle object without building or growing.
    pub fn try_reuse(&mut self) -> Option<T> {
        let item = self.idle.pop()?;
        self.live += 1;
        Some(item)
    }

    /// Acquire an object, building a default one when no idle object exists.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::PoolExhausted`] when the pool is full and not resizable.
    pub fn try_acquire(&mut self) -> Result<T, RuntimeError>
    where
        T: Default,
    {
        self.try_acquire_with(T::default)
    }

    /// Return an object for reuse. Callers reset it beforehand.
    ///
    /// An object that would overflow a fixed-size pool is dropped.
    pub fn release(&mut self, item: T) {
        self.live = self.live.saturating_sub(1);
        if self.live + self.idle.len() >= self.capacity {
            if !self.resizable {
                tracing::warn!(
                    "release overflows fixed pool of capacity {}; dropping object",
                    self.capacity
                );
                return;
            }
            self.grow();
        }
        self.idle.push(item);
    }

    /// Make room for `additional` more acquisitions.
    ///
    /// Resizable pools grow by their growth factor until the room exists.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::PoolExhausted`] when a fixed-size pool lacks the room.
    pub fn reserve(&mut self, additional: usize) -> Result<(), RuntimeError> {
        if self.available() >= additional {
            return Ok(());
        }
        if !self.resizable {
            return Err(RuntimeError::PoolExhausted {
                capacity: self.capacity,
            });
        }
        while self.available() < additional {
            self.grow();
        }
        Ok(())
    }

    /// Pre-build idle objects so the first acquisitions do not allocate.
    pub fn warm<F>(&mut self, count: usize, mut make: F)
    where
        F: FnMut() -> T,
    {
        let room = self.capacity - self.live - self.idle.len();
        for _ in 0..count.min(room) {
            self.idle.push(make());
        }
    }

    /// Drop idle objects and forget handed-out ones.
    ///
    /// `purge` also releases the backing allocation.
    pub fn clear(&mut self, purge: bool) {
        self.idle.clear();
        self.live = 0;
        if purge {
            self.idle.shrink_to_fit();
        }
    }

    /// Drop idle objects while keeping track of handed-out ones.
    ///
    /// `purge` also releases the backing allocation.
    pub fn drop_idle(&mut self, purge: bool) {
        self.idle.clear();
        if purge {
            self.idle.shrink_to_fit();
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn grow(&mut self) {
        let extra = (self.capacity as f32 * self.growth_factor).ceil() as usize;
        let next = self.capacity + extra.max(1);
        tracing::trace!("pool grow: {} -> {}", self.capacity, next);
        self.idle.reserve(next - self.idle.len());
        self.capacity = next;
    }
}
