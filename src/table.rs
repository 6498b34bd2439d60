use std::{borrow::Borrow, fmt, mem};

use log::{debug, trace};

use crate::{
    cluster::ClusterStats,
    error::TableError,
    hash::KeyHash,
    probe::{DoubleHashProbe, LinearProbe, ProbeSequence, QuadraticProbe},
    slot::{Slot, SlotState},
    stats::OperationStats,
};

/// Open addressing table resolved with double hashing
pub type DoubleHashTable<K, V> = OpenAddressingTable<K, V, DoubleHashProbe>;
/// Open addressing table resolved with linear probing
pub type LinearProbeTable<K, V> = OpenAddressingTable<K, V, LinearProbe>;
/// Open addressing table resolved with quadratic probing
pub type QuadraticProbeTable<K, V> = OpenAddressingTable<K, V, QuadraticProbe>;

/// Result of a successful insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome<V> {
    /// The key was new and now occupies a slot
    Inserted,
    /// The key was already present. Holds the value it replaced.
    Updated(V),
}

/// Where a search or erase walk ended
#[derive(Debug, Clone, Copy)]
struct Lookup {
    /// Slot holding the key, if it was found
    index: Option<usize>,
    /// Slots examined
    probes: u64,
}

/// A fixed-capacity hash table using open addressing.
///
/// The collision strategy is the probe sequence `P`. Capacity never changes after
/// construction, and erased slots become tombstones that are never reclaimed.
/// Every insert, search and erase updates the table's [`OperationStats`].
///
/// Note: This implementation is not thread-safe. Clone a table to run several
/// experiments from the same starting state.
#[derive(Debug, Clone)]
pub struct OpenAddressingTable<K, V, P> {
    /// Slot array, its length is the capacity
    slots: Box<[Slot<K, V>]>,
    /// Number of occupied slots, tombstones excluded
    occupied: usize,
    /// Probe sequence sized for `slots`
    probe: P,
    /// Operation counters
    stats: OperationStats,
}

impl<K, V, P> OpenAddressingTable<K, V, P>
where
    K: KeyHash + Eq,
    V: Clone,
    P: ProbeSequence,
{
    /// Creates an empty table with `capacity` slots
    ///
    /// # Errors
    ///
    /// Returns [`TableError::ZeroCapacity`] for a zero capacity and
    /// [`TableError::CapacityTooSmall`] when the probe sequence needs more slots
    /// (double hashing requires at least 3).
    pub fn new(capacity: usize) -> Result<Self, TableError> {
        let probe = P::for_capacity(capacity)?;
        debug!("created {} table with {} slots", P::NAME, capacity);

        Ok(Self {
            slots: (0..capacity).map(|_| Slot::Empty).collect(),
            occupied: 0,
            probe,
            stats: OperationStats::default(),
        })
    }

    /// Inserts a key-value pair, returning whether the table now holds it
    pub fn insert(&mut self, key: K, value: V) -> bool {
        match self.try_insert(key, value) {
            Ok(_) => true,
            Err(err) => {
                trace!("{} insert failed: {err}", P::NAME);
                false
            }
        }
    }

    /// Inserts a key-value pair, updating the value in place if the key is present.
    ///
    /// The walk skips over tombstones while looking for a live copy of the key and
    /// stores a new key in the first tombstone or empty slot it passed. A failed
    /// insertion leaves the table and its statistics untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::TableFull`] when every slot is occupied and
    /// [`TableError::ProbeExhausted`] when the probe sequence reaches no usable slot.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<InsertOutcome<V>, TableError> {
        if self.is_full() {
            return Err(TableError::TableFull { capacity: self.capacity() });
        }

        let stop_on_wrap = self.probe.stops_on_wrap();
        let mut probes: u64 = 0;
        let mut collided = false;
        let mut first_free = None;
        let mut existing = None;

        for index in self.probe.walk(key.key_hash(), stop_on_wrap) {
            probes = probes.saturating_add(1);
            match self.slots.get(index) {
                Some(Slot::Occupied { key: stored, .. }) => {
                    if probes == 1 {
                        collided = true;
                    }
                    if *stored == key {
                        existing = Some(index);
                        break;
                    }
                }
                Some(slot) if slot.is_free() => {
                    first_free = first_free.or(Some(index));
                    if slot.state() == SlotState::Empty {
                        break;
                    }
                }
                Some(_) | None => break,
            }
        }

        if let Some(index) = existing {
            let Some(Slot::Occupied { value: stored, .. }) = self.slots.get_mut(index) else {
                return Err(TableError::ProbeExhausted { attempts: self.capacity() });
            };
            let previous = mem::replace(stored, value);
            self.stats.record_collision(collided);
            return Ok(InsertOutcome::Updated(previous));
        }

        let attempts = self.capacity();
        let slot = first_free
            .and_then(|index| self.slots.get_mut(index))
            .ok_or(TableError::ProbeExhausted { attempts })?;
        slot.fill(key, value);
        self.occupied = self.occupied.saturating_add(1);
        self.stats.record_insert(probes, collided);
        Ok(InsertOutcome::Inserted)
    }

    /// Walks the probe sequence for `key` without touching the statistics
    fn lookup<Q>(&self, key: &Q) -> Lookup
    where
        K: Borrow<Q>,
        Q: KeyHash + Eq + ?Sized,
    {
        let mut probes: u64 = 0;
        for index in self.probe.walk(key.key_hash(), self.probe.stops_on_wrap()) {
            probes = probes.saturating_add(1);
            match self.slots.get(index) {
                None | Some(Slot::Empty) => break,
                Some(Slot::Occupied { key: stored, .. }) if stored.borrow() == key => {
                    return Lookup { index: Some(index), probes };
                }
                Some(_) => {}
            }
        }
        Lookup { index: None, probes: probes.max(1) }
    }

    /// Searches for `key` and returns a copy of its value.
    ///
    /// Tombstones do not end the walk. Hits and misses are both recorded.
    pub fn search<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: KeyHash + Eq + ?Sized,
    {
        let lookup = self.lookup(key);
        self.stats.record_search(lookup.probes);
        lookup.index.and_then(|index| self.slots.get(index)).and_then(Slot::value).cloned()
    }

    /// Removes `key`, leaving a tombstone behind, and returns its value
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: KeyHash + Eq + ?Sized,
    {
        let lookup = self.lookup(key);
        self.stats.record_delete(lookup.probes);
        let (_, value) = lookup.index.and_then(|index| self.slots.get_mut(index))?.bury()?;
        self.occupied = self.occupied.saturating_sub(1);
        Some(value)
    }

    /// Removes `key`, returning whether it was present
    pub fn erase<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: KeyHash + Eq + ?Sized,
    {
        self.remove(key).is_some()
    }

    /// Retrieves a value without recording the lookup
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: KeyHash + Eq + ?Sized,
    {
        self.position(key).and_then(|index| self.slots.get(index)).and_then(Slot::value)
    }

    /// Returns the slot index holding `key`, without recording the lookup
    pub fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: KeyHash + Eq + ?Sized,
    {
        self.lookup(key).index
    }

    /// Returns true if the table holds `key`, without recording the lookup
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: KeyHash + Eq + ?Sized,
    {
        self.position(key).is_some()
    }
}

impl<K, V, P> OpenAddressingTable<K, V, P> {
    /// Returns true if every slot holds a live pair
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.occupied == self.slots.len()
    }

    /// Returns the number of live pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.occupied
    }

    /// Returns true if the table holds no live pair
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Returns the number of slots
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of tombstones
    #[must_use]
    pub fn tombstone_count(&self) -> usize {
        self.slot_states().filter(|&state| state == SlotState::Deleted).count()
    }

    /// Returns the ratio of live pairs to slots
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::arithmetic_side_effects)]
    pub fn load_factor(&self) -> f64 {
        self.occupied as f64 / self.slots.len() as f64
    }

    /// Returns a snapshot of the operation counters
    #[must_use]
    pub fn stats(&self) -> OperationStats {
        self.stats
    }

    /// Returns the probe sequence driving this table
    #[must_use]
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Returns the slot array
    #[must_use]
    pub fn slots(&self) -> &[Slot<K, V>] {
        &self.slots
    }

    /// Returns the state of every slot, in slot order
    pub fn slot_states(&self) -> impl Iterator<Item = SlotState> + '_ {
        self.slots.iter().map(Slot::state)
    }

    /// Measures the runs of consecutive occupied slots
    #[must_use]
    pub fn cluster_stats(&self) -> ClusterStats {
        ClusterStats::analyze(self.slot_states())
    }

    /// Returns the longest run of consecutive occupied slots
    #[must_use]
    pub fn max_cluster_length(&self) -> usize {
        self.cluster_stats().max_length
    }

    /// Returns the mean length of the runs of consecutive occupied slots
    #[must_use]
    pub fn avg_cluster_length(&self) -> f64 {
        self.cluster_stats().avg_length
    }

    /// Returns an iterator over the live key-value pairs, in slot order
    #[must_use]
    #[allow(clippy::iter_without_into_iter)]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { slots: self.slots.iter() }
    }
}

impl<K, V, P> Extend<(K, V)> for OpenAddressingTable<K, V, P>
where
    K: KeyHash + Eq,
    V: Clone,
    P: ProbeSequence,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: fmt::Display, V, P> fmt::Display for OpenAddressingTable<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match slot {
                Slot::Empty => f.write_str("Empty")?,
                Slot::Deleted => f.write_str("Deleted")?,
                Slot::Occupied { key, .. } => write!(f, "{key}")?,
            }
        }
        Ok(())
    }
}

/// Iterator over the live key-value pairs of a table
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// Remaining slots
    slots: std::slice::Iter<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.find_map(|slot| match slot {
            Slot::Occupied { key, value } => Some((key, value)),
            Slot::Empty | Slot::Deleted => None,
        })
    }
}
