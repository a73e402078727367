//! Type-indexed event bus with pooled payloads.
//!
//! Each payload type gets its own channel: a [`PooledList`] of listeners and a
//! [`Pool`] of payload instances. Channels are created lazily the first time a
//! type is subscribed to, registered, requested or dispatched, and live in a
//! registry owned by the [`EventBus`] instance.
//!
//! Listeners receive the bus itself alongside the payload, so they can
//! subscribe, unsubscribe, dispatch or dispose while a dispatch is running.
//! Dispatch is synchronous and follows registration order. Listeners added
//! during a dispatch do not see the in-flight payload; listeners removed during
//! a dispatch are not invoked after their removal.
//!
//! ```
//! use prometheus_tickbus::core::{EventBus, Payload};
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Clicked {
//!     button: u8,
//! }
//!
//! impl Payload for Clicked {
//!     fn reset(&mut self) {
//!         self.button = 0;
//!     }
//! }
//!
//! let mut bus = EventBus::default();
//! let id = bus
//!     .add_listener::<Clicked, _>(|_bus, ev| assert_eq!(ev.button, 2))
//!     .unwrap();
//!
//! let mut ev = bus.reusable_payload_or_default::<Clicked>();
//! ev.button = 2;
//! assert_eq!(bus.dispatch(ev).unwrap(), 1);
//!
//! assert!(bus.remove_listener(id));
//! ```

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::marker::PhantomData;

use rustc_hash::FxHashMap;

use crate::config::BusConfig;
use crate::core::{Pool, PooledList, RuntimeError};

/// Event payload dispatched through an [`EventBus`].
///
/// `reset` runs after every dispatch, right before the instance returns to its
/// pool. Types whose fields are always overwritten by the publisher can keep
/// the default no-op.
pub trait Payload: 'static {
    /// Restore the blank state of a freshly constructed payload.
    fn reset(&mut self) {}
}

/// Listener callback for payload type `T`.
pub type Listener<T> = Box<dyn FnMut(&mut EventBus, &T)>;

type Factory<T> = Box<dyn Fn() -> T>;

/// Handle to a registered listener of payload type `T`.
pub struct ListenerId<T> {
    raw: u64,
    _payload: PhantomData<fn(&T)>,
}

impl<T> ListenerId<T> {
    const fn new(raw: u64) -> Self {
        Self {
            raw,
            _payload: PhantomData,
        }
    }

    /// Bus-wide unique listener number.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.raw
    }
}

impl<T> Clone for ListenerId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ListenerId<T> {}

impl<T> PartialEq for ListenerId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for ListenerId<T> {}

impl<T> std::hash::Hash for ListenerId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for ListenerId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ListenerId").field(&self.raw).finish()
    }
}

/// Listener list plus payload pool of one payload type.
struct Channel<T> {
    epoch: u64,
    // A `None` value marks a listener that is currently executing.
    listeners: PooledList<u64, Option<Listener<T>>>,
    payloads: Pool<T>,
    factory: Option<Factory<T>>,
}

impl<T: Payload> Channel<T> {
    fn new(epoch: u64, config: &BusConfig) -> Self {
        Self {
            epoch,
            listeners: PooledList::new(&config.listeners),
            payloads: Pool::new(&config.payloads),
            factory: None,
        }
    }
}

/// Type-erased channel operations used by bus-wide maintenance.
trait AnyChannel {
    fn type_name(&self) -> &'static str;
    fn listener_count(&self) -> usize;
    fn clear(&mut self, purge_pool: bool);
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Payload> AnyChannel for Channel<T> {
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn clear(&mut self, purge_pool: bool) {
        self.listeners.clear(purge_pool);
        if purge_pool {
            self.payloads.clear(true);
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Registry of per-type channels.
pub struct EventBus {
    channels: FxHashMap<TypeId, Box<dyn AnyChannel>>,
    config: BusConfig,
    next_listener: u64,
    next_epoch: u64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("channels", &self.channels.len())
            .field("strict", &self.config.strict)
            .finish_non_exhaustive()
    }
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new(config: BusConfig) -> Self {
        Self {
            channels: FxHashMap::default(),
            config,
            next_listener: 1,
            next_epoch: 1,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Toggle strict dispatch reporting.
    pub fn set_strict(&mut self, strict: bool) {
        self.config.strict = strict;
    }

    /// Number of live channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// True when a channel for `T` exists.
    #[must_use]
    pub fn has_channel<T: Payload>(&self) -> bool {
        self.channels.contains_key(&TypeId::of::<T>())
    }

    /// Install the constructor used when `T`'s pool has no idle instance.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::ChannelMismatch`] if the registry is corrupted.
    pub fn register<T, F>(&mut self, factory: F) -> Result<(), RuntimeError>
    where
        T: Payload,
        F: Fn() -> T + 'static,
    {
        self.channel_or_insert::<T>()?.factory = Some(Box::new(factory));
        Ok(())
    }

    /// Take a payload from `T`'s pool, or build one with the registered factory.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::MissingFactory`] when the pool is empty and no factory is
    /// registered, [`RuntimeError::PoolExhausted`] when a fixed payload pool is
    /// fully handed out.
    pub fn reusable_payload<T: Payload>(&mut self) -> Result<T, RuntimeError> {
        let Channel {
            payloads, factory, ..
        } = self.channel_or_insert::<T>()?;
        if let Some(payload) = payloads.try_reuse() {
            return Ok(payload);
        }
        let make = factory
            .as_ref()
            .ok_or(RuntimeError::MissingFactory(type_name::<T>()))?;
        payloads.try_acquire_with(|| make())
    }

    /// Take a payload from `T`'s pool, or build a default one.
    ///
    /// Falls back to a fresh, unpooled instance when a fixed payload pool is
    /// fully handed out.
    pub fn reusable_payload_or_default<T: Payload + Default>(&mut self) -> T {
        match self.channel_or_insert::<T>() {
            Ok(channel) => channel.payloads.try_acquire().unwrap_or_default(),
            Err(_) => T::default(),
        }
    }

    /// Subscribe `listener` to payloads of type `T`.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::PoolExhausted`] when a fixed listener list is full.
    pub fn add_listener<T, F>(&mut self, listener: F) -> Result<ListenerId<T>, RuntimeError>
    where
        T: Payload,
        F: FnMut(&mut Self, &T) + 'static,
    {
        let raw = self.next_listener;
        let channel = self.channel_or_insert::<T>()?;
        channel.listeners.add_last(raw, Some(Box::new(listener)))?;
        self.next_listener += 1;
        tracing::trace!("listener {} added for {}", raw, type_name::<T>());
        Ok(ListenerId::new(raw))
    }

    /// Unsubscribe a listener. Returns false when it was not registered.
    pub fn remove_listener<T: Payload>(&mut self, id: ListenerId<T>) -> bool {
        self.channel_mut::<T>()
            .is_some_and(|channel| channel.listeners.remove(&id.raw).is_some())
    }

    /// True when the listener is registered.
    #[must_use]
    pub fn has_listener<T: Payload>(&self, id: ListenerId<T>) -> bool {
        self.channel_ref::<T>()
            .is_some_and(|channel| channel.listeners.contains(&id.raw))
    }

    /// Number of listeners subscribed to `T`.
    #[must_use]
    pub fn listener_count<T: Payload>(&self) -> usize {
        self.channels
            .get(&TypeId::of::<T>())
            .map_or(0, |channel| channel.listener_count())
    }

    /// Idle payload instances pooled for `T`.
    #[must_use]
    pub fn pooled_payloads<T: Payload>(&self) -> usize {
        self.channel_ref::<T>()
            .map_or(0, |channel| channel.payloads.idle())
    }

    /// Deliver `payload` to every listener of `T`, then recycle it.
    ///
    /// Returns the number of listeners invoked.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NoListeners`] when no listener was invoked and the bus
    /// is strict. The payload is recycled either way.
    pub fn dispatch<T: Payload>(&mut self, mut payload: T) -> Result<usize, RuntimeError> {
        let (epoch, boundary, walk) = {
            let channel = self.channel_or_insert::<T>()?;
            (
                channel.epoch,
                channel.listeners.next_seq(),
                channel.listeners.begin_walk(),
            )
        };

        let mut delivered = 0;
        loop {
            let Some(channel) = self.channel_at::<T>(epoch) else {
                break;
            };
            let Some(node) = channel.listeners.walk_next(walk) else {
                break;
            };
            if node.seq() >= boundary {
                continue;
            }
            let Some(mut listener) = channel.listeners.value_mut(node).and_then(Option::take) else {
                continue;
            };

            listener(&mut *self, &payload);
            delivered += 1;

            if let Some(slot) = self
                .channel_at::<T>(epoch)
                .and_then(|channel| channel.listeners.value_mut(node))
            {
                *slot = Some(listener);
            }
        }

        payload.reset();
        match self.channel_at::<T>(epoch) {
            Some(channel) => {
                channel.listeners.end_walk(walk);
                channel.payloads.release(payload);
            }
            None => tracing::trace!("{} channel disposed during dispatch", type_name::<T>()),
        }

        if delivered == 0 && self.config.strict {
            tracing::debug!("dispatch of {} reached no listeners", type_name::<T>());
            return Err(RuntimeError::NoListeners(type_name::<T>()));
        }
        Ok(delivered)
    }

    /// Remove every listener of `T`; `purge_pool` also drops pooled storage.
    pub fn clear<T: Payload>(&mut self, purge_pool: bool) {
        if let Some(channel) = self.channels.get_mut(&TypeId::of::<T>()) {
            channel.clear(purge_pool);
        }
    }

    /// Tear down `T`'s channel, releasing listeners and pooled payloads.
    pub fn dispose<T: Payload>(&mut self) -> bool {
        let removed = self.channels.remove(&TypeId::of::<T>()).is_some();
        if removed {
            tracing::debug!("{} channel disposed", type_name::<T>());
        }
        removed
    }

    /// Clear every channel.
    pub fn clear_all(&mut self, purge_pools: bool) {
        for channel in self.channels.values_mut() {
            channel.clear(purge_pools);
        }
    }

    /// Tear down every channel.
    pub fn dispose_all(&mut self) {
        for channel in self.channels.values() {
            tracing::trace!("{} channel disposed", channel.type_name());
        }
        self.channels.clear();
    }

    fn channel_or_insert<T: Payload>(&mut self) -> Result<&mut Channel<T>, RuntimeError> {
        let next_epoch = &mut self.next_epoch;
        let config = &self.config;
        self.channels
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                let epoch = *next_epoch;
                *next_epoch += 1;
                tracing::debug!("{} channel created (epoch {})", type_name::<T>(), epoch);
                let channel: Box<dyn AnyChannel> = Box::new(Channel::<T>::new(epoch, config));
                channel
            })
            .as_any_mut()
            .downcast_mut::<Channel<T>>()
            .ok_or(RuntimeError::ChannelMismatch(type_name::<T>()))
    }

    fn channel_mut<T: Payload>(&mut self) -> Option<&mut Channel<T>> {
        self.channels
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<Channel<T>>()
    }

    fn channel_ref<T: Payload>(&self) -> Option<&Channel<T>> {
        self.channels
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<Channel<T>>()
    }

    /// Channel of `T`, provided it is the same instance that was live at `epoch`.
    fn channel_at<T: Payload>(&mut self, epoch: u64) -> Option<&mut Channel<T>> {
        self.channel_mut::<T>().filter(|channel| channel.epoch == epoch)
    }
}
