//! Storage cells shared by every probing strategy

use std::mem;

/// Occupancy marker of a [`Slot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// Never written. Ends every probe walk.
    Empty,
    /// Holds a live key-value pair
    Occupied,
    /// Tombstone left by an erase. Probe walks step over it.
    Deleted,
}

/// A cell of an open addressing table.
///
/// The payload lives inside the `Occupied` variant, so a key and value are present
/// exactly when the slot is occupied. Tombstones are never turned back into `Empty`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Slot<K, V> {
    /// Never written
    #[default]
    Empty,
    /// Live key-value pair
    Occupied {
        /// Stored key
        key: K,
        /// Value associated with the key
        value: V,
    },
    /// Tombstone
    Deleted,
}

impl<K, V> Slot<K, V> {
    /// Returns the occupancy marker of this slot
    #[must_use]
    pub fn state(&self) -> SlotState {
        match self {
            Self::Empty => SlotState::Empty,
            Self::Occupied { .. } => SlotState::Occupied,
            Self::Deleted => SlotState::Deleted,
        }
    }

    /// Returns true if the slot holds a live pair
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        matches!(self, Self::Occupied { .. })
    }

    /// Returns true if a new pair may be written here
    #[must_use]
    pub fn is_free(&self) -> bool {
        !self.is_occupied()
    }

    /// Returns the stored key, if any
    #[must_use]
    pub fn key(&self) -> Option<&K> {
        match self {
            Self::Occupied { key, .. } => Some(key),
            Self::Empty | Self::Deleted => None,
        }
    }

    /// Returns the stored value, if any
    #[must_use]
    pub fn value(&self) -> Option<&V> {
        match self {
            Self::Occupied { value, .. } => Some(value),
            Self::Empty | Self::Deleted => None,
        }
    }

    /// Writes a pair into the slot, whatever it held before
    pub fn fill(&mut self, key: K, value: V) {
        *self = Self::Occupied { key, value };
    }

    /// Turns an occupied slot into a tombstone and hands back its pair.
    ///
    /// Empty slots and tombstones are left untouched.
    pub fn bury(&mut self) -> Option<(K, V)> {
        if !self.is_occupied() {
            return None;
        }
        match mem::replace(self, Self::Deleted) {
            Self::Occupied { key, value } => Some((key, value)),
            Self::Empty | Self::Deleted => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut slot: Slot<u32, &str> = Slot::default();
        assert_eq!(slot.state(), SlotState::Empty);
        assert!(slot.is_free());
        assert_eq!(slot.key(), None);

        slot.fill(7, "seven");
        assert_eq!(slot.state(), SlotState::Occupied);
        assert_eq!(slot.key(), Some(&7));
        assert_eq!(slot.value(), Some(&"seven"));

        assert_eq!(slot.bury(), Some((7, "seven")));
        assert_eq!(slot.state(), SlotState::Deleted);
        assert!(slot.is_free());
        assert_eq!(slot.value(), None);

        slot.fill(8, "eight");
        assert_eq!(slot.state(), SlotState::Occupied);
    }

    #[test]
    fn test_bury_non_occupied() {
        let mut empty: Slot<u32, u32> = Slot::Empty;
        assert_eq!(empty.bury(), None);
        assert_eq!(empty.state(), SlotState::Empty);

        let mut tombstone: Slot<u32, u32> = Slot::Deleted;
        assert_eq!(tombstone.bury(), None);
        assert_eq!(tombstone.state(), SlotState::Deleted);
    }
}
