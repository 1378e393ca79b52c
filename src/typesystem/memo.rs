//! Concurrent compute-once memoization.
//!
//! This module provides [`MemoMap`], a type-indexed cache that guarantees at
//! most one computation per distinct key across concurrent callers. It is the
//! single serialization point of the mutability classifier: every cached
//! classification result goes through it, and all callers observing a
//! completed entry observe the identical value.
//!
//! # Guarantees
//!
//! - **Single computation**: concurrent calls for the same missing key race to
//!   install a placeholder slot; only the winner invokes the producer, every
//!   other caller blocks on the slot and returns the winner's value.
//! - **Monotonic growth**: no eviction, no expiry, no removal API beyond the
//!   internal cleanup of failed slots.
//! - **Failure does not poison**: if the producer fails, the winner gets the
//!   original error, parked waiters get [`Error::ProducerFailure`], and the
//!   slot is removed so a later caller retries.
//! - **Re-entrancy is survivable**: a producer that re-enters the map for the
//!   key it is currently computing (a cyclic dependency) receives the
//!   caller-supplied fallback value instead of deadlocking.
//! - **Wait cycles are broken**: when producers on different threads end up
//!   waiting on each other's keys, at least one of them is handed its
//!   fallback value instead of parking, so mutually dependent computations
//!   cannot deadlock no matter which thread entered the cycle first.
//!
//! # Thread Safety
//!
//! Slots live in a [`dashmap::DashMap`]; each slot carries its own
//! `Mutex`/`Condvar` pair. Producers run without holding any map shard lock,
//! so they are free to recurse into the map for other keys.
//!
//! # Examples
//!
//! ```rust
//! use mutscope::typesystem::MemoMap;
//!
//! let cache: MemoMap<u32, u64> = MemoMap::new();
//!
//! let value = cache.get_or_compute(&7, 0, || Ok(7 * 6))?;
//! assert_eq!(value, 42);
//!
//! // Second call never re-invokes the producer.
//! let again = cache.get_or_compute(&7, 0, || unreachable!())?;
//! assert_eq!(again, 42);
//! # Ok::<(), mutscope::Error>(())
//! ```

use std::{
    collections::HashSet,
    hash::Hash,
    sync::{Arc, Condvar, Mutex},
    thread::{self, ThreadId},
};

use dashmap::{mapref::entry::Entry, DashMap};

use crate::{Error, Result};

/// State of a single cache slot.
enum SlotState<V> {
    /// The owning thread is still running the producer
    Pending,
    /// The producer completed; every reader observes this exact value
    Ready(V),
    /// The producer failed; waiters surface this message as `ProducerFailure`
    Failed(String),
}

/// A single-assignment holder for one key's value.
///
/// The `owner` field records which thread installed the slot, which is what
/// allows re-entrant computations of the same key to be detected and
/// short-circuited rather than deadlocking on the condvar.
struct Slot<V> {
    owner: ThreadId,
    state: Mutex<SlotState<V>>,
    ready: Condvar,
}

impl<V: Clone> Slot<V> {
    fn pending() -> Self {
        Slot {
            owner: thread::current().id(),
            state: Mutex::new(SlotState::Pending),
            ready: Condvar::new(),
        }
    }

    fn completed(value: V) -> Self {
        Slot {
            owner: thread::current().id(),
            state: Mutex::new(SlotState::Ready(value)),
            ready: Condvar::new(),
        }
    }

    /// Publish the produced value and wake all waiters.
    fn fulfill(&self, value: V) -> Result<()> {
        let mut state = self.state.lock().map_err(|_| Error::LockError)?;
        *state = SlotState::Ready(value);
        self.ready.notify_all();
        Ok(())
    }

    /// Publish the failure message and wake all waiters.
    fn fail(&self, message: String) -> Result<()> {
        let mut state = self.state.lock().map_err(|_| Error::LockError)?;
        *state = SlotState::Failed(message);
        self.ready.notify_all();
        Ok(())
    }

    /// Non-blocking read of a completed value.
    fn peek(&self) -> Option<V> {
        let state = self.state.lock().ok()?;
        match &*state {
            SlotState::Ready(value) => Some(value.clone()),
            _ => None,
        }
    }
}

/// A concurrent, grow-only cache with a single-computation-per-key guarantee.
///
/// `MemoMap` maps keys to slots; a slot is installed exactly once per key and
/// every caller for that key shares it. See the [module documentation](self)
/// for the full set of guarantees.
pub struct MemoMap<K, V> {
    slots: DashMap<K, Arc<Slot<V>>>,
    /// Waits-for edges between threads parked on pending slots, used to
    /// detect and break cross-thread wait cycles.
    waits: DashMap<ThreadId, ThreadId>,
}

impl<K: Eq + Hash + Clone, V: Clone> MemoMap<K, V> {
    /// Create a new, empty cache
    #[must_use]
    pub fn new() -> Self {
        MemoMap {
            slots: DashMap::new(),
            waits: DashMap::new(),
        }
    }

    /// Look up the value for `key`, computing and caching it on first access.
    ///
    /// Exactly one caller per key ever runs `compute`; concurrent callers for
    /// the same key block until the winning computation finishes and return
    /// its value. If `compute` recursively calls back into this map for the
    /// same key from the same thread, the inner call returns `on_reentry`
    /// instead of deadlocking. The same escape applies across threads: when
    /// producers on different threads would otherwise wait on each other in a
    /// cycle, at least one of the waiting calls returns `on_reentry`, so every
    /// participant terminates.
    ///
    /// ## Arguments
    /// * 'key'         - The key to look up
    /// * 'on_reentry'  - Value returned to a re-entrant computation of the same key
    /// * 'compute'     - Producer invoked at most once for this key
    ///
    /// # Errors
    /// Propagates the producer's error to the winning caller; parked waiters
    /// receive [`Error::ProducerFailure`] instead. A failed slot is removed,
    /// so subsequent calls retry the computation.
    pub fn get_or_compute<F>(&self, key: &K, on_reentry: V, compute: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        // Fast path, no entry lock for keys that already have a slot.
        let existing = self.slots.get(key).map(|entry| entry.value().clone());
        if let Some(slot) = existing {
            return self.await_slot(&slot, on_reentry);
        }

        let (slot, winner) = match self.slots.entry(key.clone()) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                let slot = Arc::new(Slot::pending());
                entry.insert(slot.clone());
                (slot, true)
            }
        };

        if !winner {
            return self.await_slot(&slot, on_reentry);
        }

        // The shard lock is released here; the producer may recurse into the map.
        match compute() {
            Ok(value) => {
                slot.fulfill(value.clone())?;
                Ok(value)
            }
            Err(error) => {
                slot.fail(error.to_string())?;
                // Only clear our own slot; a racing `insert` may have
                // replaced it with a registered value already.
                self.slots
                    .remove_if(key, |_, current| Arc::ptr_eq(current, &slot));
                Err(error)
            }
        }
    }

    /// Unconditionally store `value` for `key`, replacing any existing slot.
    pub fn insert(&self, key: K, value: V) {
        self.slots.insert(key, Arc::new(Slot::completed(value)));
    }

    /// Store `value` for `key` only if the key is absent.
    ///
    /// Returns whatever ends up stored: the offered value if this call won the
    /// insertion, or the already-present value otherwise. If a computation for
    /// the key is still in flight, this call blocks until it resolves.
    ///
    /// One exception to the "whatever ends up stored" contract: a call made
    /// from inside the key's own producer (or one that would otherwise
    /// deadlock waiting on it) returns the offered value without storing it;
    /// the in-flight computation's result is what gets cached.
    ///
    /// # Errors
    /// Returns [`Error::ProducerFailure`] if an in-flight computation for this
    /// key fails while being awaited.
    pub fn get_or_insert(&self, key: K, value: V) -> Result<V> {
        let slot = match self.slots.entry(key) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Slot::completed(value.clone())));
                return Ok(value);
            }
        };

        self.await_slot(&slot, value)
    }

    /// Block until `slot` resolves, short-circuiting callers whose wait would
    /// never end: the slot's own producer re-entering from the same thread,
    /// and threads whose parking would close a cycle in the waits-for graph
    /// of pending slots. Both receive `on_reentry` instead.
    fn await_slot(&self, slot: &Slot<V>, on_reentry: V) -> Result<V> {
        let me = thread::current().id();
        let mut state = slot.state.lock().map_err(|_| Error::LockError)?;
        loop {
            match &*state {
                SlotState::Ready(value) => return Ok(value.clone()),
                SlotState::Failed(message) => {
                    return Err(Error::ProducerFailure(message.clone()))
                }
                SlotState::Pending => {
                    if slot.owner == me {
                        return Ok(on_reentry);
                    }

                    // Publish our edge before scanning: of two threads closing
                    // a cycle at the same time, at least one then sees the
                    // other's edge and backs off.
                    self.waits.insert(me, slot.owner);
                    if self.wait_would_deadlock(me, slot.owner) {
                        self.waits.remove(&me);
                        return Ok(on_reentry);
                    }

                    let waited = slot.ready.wait(state);
                    self.waits.remove(&me);
                    state = waited.map_err(|_| Error::LockError)?;
                }
            }
        }
    }

    /// Whether parking `me` behind `owner` would close a cycle in the
    /// waits-for graph.
    fn wait_would_deadlock(&self, me: ThreadId, owner: ThreadId) -> bool {
        let mut visited = HashSet::new();
        let mut current = owner;
        loop {
            if current == me {
                return true;
            }
            if !visited.insert(current) {
                // A cycle among other threads; its participants break it.
                return false;
            }
            current = match self.waits.get(&current) {
                Some(next) => *next,
                None => return false,
            };
        }
    }

    /// Non-blocking lookup; pending and failed slots read as absent
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        let slot = self.slots.get(key)?.value().clone();
        slot.peek()
    }

    /// Whether a slot (completed or in-flight) exists for `key`
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.slots.contains_key(key)
    }

    /// Number of slots, including in-flight computations
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the cache holds no slots at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Default for MemoMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
