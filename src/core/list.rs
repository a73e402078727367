//! Intrusive pooled doubly-linked list.
//!
//! Nodes live in an arena addressed by slot index; the indices of unlinked slots
//! are recycled through a [`Pool`], and a key→node index gives O(1) `contains`
//! and removal by key. Every linked node carries a sequence stamp taken from a
//! list-wide counter. [`NodeId`] pairs the slot index with that stamp, so a
//! handle to a slot that has since been recycled no longer resolves.
//!
//! # Traversal under mutation
//!
//! User code invoked while walking the list may add or remove entries. A walk
//! registers a cursor with the list; [`PooledList::walk_next`] hands out the
//! current node and parks the cursor on it before the caller runs anything.
//! The following step resumes from the parked node's live next link. Removing
//! the node a cursor is parked on moves the cursor back to its predecessor, so
//! neither removing the current node nor removing its successor breaks the
//! walk. Nodes appended during a walk are visited by it.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::config::PoolConfig;
use crate::core::{Pool, RuntimeError};

/// Handle to a linked node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    seq: u64,
}

impl NodeId {
    /// Sequence stamp assigned when the node was linked.
    ///
    /// Stamps increase monotonically per list, so comparing a stamp against
    /// [`PooledList::next_seq`] tells whether a node was linked after that point.
    #[inline]
    #[must_use]
    pub const fn seq(self) -> u64 {
        self.seq
    }
}

/// Cursor registration returned by [`PooledList::begin_walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walk(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Start,
    After(u32),
    Done,
}

#[derive(Debug)]
struct Slot<K, V> {
    seq: u64,
    prev: Option<u32>,
    next: Option<u32>,
    entry: Option<(K, V)>,
}

impl<K, V> Slot<K, V> {
    const fn vacant() -> Self {
        Self {
            seq: 0,
            prev: None,
            next: None,
            entry: None,
        }
    }
}

/// Doubly-linked list of unique keys with attached values.
pub struct PooledList<K, V> {
    slots: Vec<Slot<K, V>>,
    vacant: Pool<u32>,
    index: FxHashMap<K, NodeId>,
    head: Option<u32>,
    tail: Option<u32>,
    next_seq: u64,
    walks: Vec<Cursor>,
}

impl<K, V> Default for PooledList<K, V>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new(&PoolConfig::default())
    }
}

impl<K, V> PooledList<K, V>
where
    K: Copy + Eq + Hash,
{
    /// Create an empty list whose node slots are sized by `config`.
    #[must_use]
    pub fn new(config: &PoolConfig) -> Self {
        let capacity = config.initial_capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            vacant: Pool::new(config),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            head: None,
            tail: None,
            next_seq: 1,
            walks: Vec::new(),
        }
    }

    /// Resizable list with the given initial node capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(&PoolConfig::with_capacity(capacity))
    }

    /// Number of linked nodes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when no node is linked.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Node capacity before the slot pool has to grow.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.vacant.capacity()
    }

    /// Stamp the next linked node will receive.
    #[inline]
    #[must_use]
    pub const fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// True when `key` is linked.
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Node currently holding `key`.
    #[inline]
    #[must_use]
    pub fn node_of(&self, key: &K) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    /// First node.
    #[must_use]
    pub fn first(&self) -> Option<NodeId> {
        self.head.map(|index| self.id_at(index))
    }

    /// Last node.
    #[must_use]
    pub fn last(&self) -> Option<NodeId> {
        self.tail.map(|index| self.id_at(index))
    }

    /// Node after `node`, if `node` is still linked.
    #[must_use]
    pub fn next(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node)?.next.map(|index| self.id_at(index))
    }

    /// Node before `node`, if `node` is still linked.
    #[must_use]
    pub fn prev(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node)?.prev.map(|index| self.id_at(index))
    }

    /// Key stored at `node`.
    #[must_use]
    pub fn key(&self, node: NodeId) -> Option<K> {
        self.slot(node)?.entry.as_ref().map(|(key, _)| *key)
    }

    /// Value stored at `node`.
    #[must_use]
    pub fn value(&self, node: NodeId) -> Option<&V> {
        self.slot(node)?.entry.as_ref().map(|(_, value)| value)
    }

    /// Mutable value stored at `node`.
    pub fn value_mut(&mut self, node: NodeId) -> Option<&mut V> {
        self.slot_mut(node)?.entry.as_mut().map(|(_, value)| value)
    }

    /// Key and mutable value stored at `node`.
    pub fn entry_mut(&mut self, node: NodeId) -> Option<(K, &mut V)> {
        self.slot_mut(node)?
            .entry
            .as_mut()
            .map(|(key, value)| (*key, value))
    }

    /// Value linked under `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.value(self.node_of(key)?)
    }

    /// Mutable value linked under `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let node = self.node_of(key)?;
        self.value_mut(node)
    }

    /// Ensure `additional` more nodes can be linked without failing.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::PoolExhausted`] when a fixed-size list lacks the room.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), RuntimeError> {
        self.vacant.reserve(additional)
    }

    /// Append `key` after the current tail.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::DuplicateEntry`] when `key` is already linked (nothing
    /// changes), [`RuntimeError::PoolExhausted`] when a fixed-size list is full.
    pub fn add_last(&mut self, key: K, value: V) -> Result<NodeId, RuntimeError> {
        let index = self.claim(key, value)?;
        match self.tail {
            Some(tail) => {
                self.slots[tail as usize].next = Some(index);
                self.slots[index as usize].prev = Some(tail);
            }
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        Ok(self.id_at(index))
    }

    /// Prepend `key` before the current head.
    ///
    /// # Errors
    ///
    /// Same as [`PooledList::add_last`].
    pub fn add_first(&mut self, key: K, value: V) -> Result<NodeId, RuntimeError> {
        let index = self.claim(key, value)?;
        match self.head {
            Some(head) => {
                self.slots[head as usize].prev = Some(index);
                self.slots[index as usize].next = Some(head);
            }
            None => self.tail = Some(index),
        }
        self.head = Some(index);
        Ok(self.id_at(index))
    }

    /// Unlink `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let node = self.node_of(key)?;
        self.remove_node(node).map(|(_, value)| value)
    }

    /// Unlink `node`, returning its key and value. Stale handles are ignored.
    pub fn remove_node(&mut self, node: NodeId) -> Option<(K, V)> {
        let index = node.index;
        let (prev, next) = {
            let slot = self.slot(node)?;
            (slot.prev, slot.next)
        };

        match prev {
            Some(p) => self.slots[p as usize].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n as usize].prev = prev,
            None => self.tail = prev,
        }
        for cursor in &mut self.walks {
            if *cursor == Cursor::After(index) {
                *cursor = prev.map_or(Cursor::Start, Cursor::After);
            }
        }

        let slot = &mut self.slots[index as usize];
        slot.prev = None;
        slot.next = None;
        let (key, value) = slot.entry.take()?;
        self.index.remove(&key);
        self.vacant.release(index);
        Some((key, value))
    }

    /// Unlink every node.
    ///
    /// Slots return to the pool; `purge` also drops the slot storage.
    /// Active walks end at their next step.
    pub fn clear(&mut self, purge: bool) {
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let slot = &mut self.slots[index as usize];
            cursor = slot.next;
            slot.prev = None;
            slot.next = None;
            slot.entry = None;
            if !purge {
                self.vacant.release(index);
            }
        }
        self.head = None;
        self.tail = None;
        self.index.clear();
        for walk in &mut self.walks {
            *walk = Cursor::Done;
        }
        if purge {
            self.slots.clear();
            self.slots.shrink_to_fit();
            self.vacant.clear(true);
            self.index.shrink_to_fit();
        }
    }

    /// Iterate keys and values from head to tail.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len(),
        }
    }

    /// Register a cursor positioned before the head.
    ///
    /// Walks nest; end them with [`PooledList::end_walk`] in reverse order.
    pub fn begin_walk(&mut self) -> Walk {
        self.walks.push(Cursor::Start);
        Walk(self.walks.len() - 1)
    }

    /// Next node of `walk`; the cursor is parked on it before returning.
    pub fn walk_next(&mut self, walk: Walk) -> Option<NodeId> {
        let index = match *self.walks.get(walk.0)? {
            Cursor::Start => self.head,
            Cursor::After(parked) => self.slots[parked as usize].next,
            Cursor::Done => None,
        }?;
        self.walks[walk.0] = Cursor::After(index);
        Some(self.id_at(index))
    }

    /// Unregister `walk` together with any walk begun after it.
    pub fn end_walk(&mut self, walk: Walk) {
        self.walks.truncate(walk.0);
    }

    fn claim(&mut self, key: K, value: V) -> Result<u32, RuntimeError> {
        if self.index.contains_key(&key) {
            return Err(RuntimeError::DuplicateEntry);
        }
        let slots = &mut self.slots;
        let index = self.vacant.try_acquire_with(|| {
            slots.push(Slot::vacant());
            u32::try_from(slots.len() - 1).unwrap_or(u32::MAX)
        })?;

        let seq = self.next_seq;
        self.next_seq += 1;
        let slot = &mut self.slots[index as usize];
        slot.seq = seq;
        slot.prev = None;
        slot.next = None;
        slot.entry = Some((key, value));
        self.index.insert(key, NodeId { index, seq });
        Ok(index)
    }

    fn id_at(&self, index: u32) -> NodeId {
        NodeId {
            index,
            seq: self.slots[index as usize].seq,
        }
    }

    fn slot(&self, node: NodeId) -> Option<&Slot<K, V>> {
        self.slots
            .get(node.index as usize)
            .filter(|slot| slot.seq == node.seq && slot.entry.is_some())
    }

    fn slot_mut(&mut self, node: NodeId) -> Option<&mut Slot<K, V>> {
        self.slots
            .get_mut(node.index as usize)
            .filter(|slot| slot.seq == node.seq && slot.entry.is_some())
    }
}

/// Iterator over a [`PooledList`] from head to tail.
pub struct Iter<'a, K, V> {
    list: &'a PooledList<K, V>,
    cursor: Option<u32>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = &self.list.slots[self.cursor? as usize];
        self.cursor = slot.next;
        self.remaining = self.remaining.saturating_sub(1);
        slot.entry.as_ref().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
