//! Probe sequences for open addressing
//!
//! A probe sequence maps `(hash, attempt)` to a slot index in `[0, capacity)`.
//! Three strategies are provided:
//!
//! - [`DoubleHashProbe`]: `(h1 + i * h2) mod capacity` with a key dependent step
//! - [`LinearProbe`]: `(h + i) mod capacity`
//! - [`QuadraticProbe`]: `(h + i^2) mod capacity`
//!
//! Tables walk a sequence through [`ProbeWalk`], which never yields more than
//! `capacity` indices and can optionally stop as soon as the sequence comes back
//! to its first index.

use std::fmt;

use crate::{error::TableError, primes::largest_prime_below};

/// Strategy producing the candidate slots for a key hash
pub trait ProbeSequence: Clone + fmt::Debug {
    /// Human readable strategy name
    const NAME: &'static str;

    /// Runtime tag of the strategy
    const STRATEGY: ProbeStrategy;

    /// Smallest capacity the strategy can work with
    const MIN_CAPACITY: usize = 1;

    /// Builds the sequence for a table of `capacity` slots
    ///
    /// # Errors
    ///
    /// Returns [`TableError::ZeroCapacity`] for an empty table and
    /// [`TableError::CapacityTooSmall`] when the strategy cannot work with `capacity`.
    fn for_capacity(capacity: usize) -> Result<Self, TableError>;

    /// Number of slots the sequence addresses
    fn capacity(&self) -> usize;

    /// Slot index probed at `attempt` for a key with the given hash
    fn index(&self, hash: u64, attempt: usize) -> usize;

    /// Whether a walk ends once the sequence returns to its first index.
    ///
    /// Only sound when the sequence is periodic from its first index on, otherwise
    /// walks run the full `capacity` attempts.
    fn stops_on_wrap(&self) -> bool {
        true
    }

    /// Walks the candidate slots for `hash`
    fn walk(&self, hash: u64, stop_on_wrap: bool) -> ProbeWalk<'_, Self> {
        ProbeWalk { sequence: self, hash, attempt: 0, home: None, stop_on_wrap }
    }
}

/// Checks a capacity against the strategy minimum
fn check_capacity(capacity: usize, minimum: usize) -> Result<(), TableError> {
    if capacity == 0 {
        return Err(TableError::ZeroCapacity);
    }
    if capacity < minimum {
        return Err(TableError::CapacityTooSmall { capacity, minimum });
    }
    Ok(())
}

/// Reduces `hash` into `[0, modulus)`
#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
fn reduce(hash: u64, modulus: usize) -> u128 {
    u128::from(hash) % (modulus.max(1) as u128)
}

/// Converts an index already reduced modulo a `usize` capacity back to `usize`
#[allow(clippy::cast_possible_truncation)]
fn to_index(reduced: u128) -> usize {
    reduced as usize
}

/// Double hashing: `index(i) = (h1 + i * h2) mod capacity`.
///
/// `h1 = hash mod capacity` and `h2 = P - (hash mod P)`, where `P` is the largest prime
/// below the capacity. The step is always in `[1, P]`, so the walk never stalls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleHashProbe {
    /// Number of slots
    capacity: usize,
    /// Largest prime strictly below the capacity
    prime: usize,
}

impl DoubleHashProbe {
    /// Returns the prime used for the secondary hash
    #[must_use]
    pub fn prime(&self) -> usize {
        self.prime
    }

    /// Secondary hash, the step between consecutive probes
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)]
    pub fn step(&self, hash: u64) -> usize {
        // reduce() < prime, so the difference is in [1, prime]
        self.prime - to_index(reduce(hash, self.prime))
    }
}

impl ProbeSequence for DoubleHashProbe {
    const NAME: &'static str = "Double Hashing";
    const STRATEGY: ProbeStrategy = ProbeStrategy::DoubleHash;
    const MIN_CAPACITY: usize = 3;

    fn for_capacity(capacity: usize) -> Result<Self, TableError> {
        check_capacity(capacity, Self::MIN_CAPACITY)?;
        let prime = largest_prime_below(capacity).ok_or(TableError::CapacityTooSmall {
            capacity,
            minimum: Self::MIN_CAPACITY,
        })?;
        Ok(Self { capacity, prime })
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
    fn index(&self, hash: u64, attempt: usize) -> usize {
        let capacity = self.capacity as u128;
        let home = reduce(hash, self.capacity);
        let step = self.step(hash) as u128;
        to_index((home + (attempt as u128 % capacity) * step) % capacity)
    }
}

/// Linear probing: `index(i) = (hash mod capacity + i) mod capacity`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearProbe {
    /// Number of slots
    capacity: usize,
}

impl ProbeSequence for LinearProbe {
    const NAME: &'static str = "Linear Probing";
    const STRATEGY: ProbeStrategy = ProbeStrategy::Linear;

    fn for_capacity(capacity: usize) -> Result<Self, TableError> {
        check_capacity(capacity, Self::MIN_CAPACITY)?;
        Ok(Self { capacity })
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
    fn index(&self, hash: u64, attempt: usize) -> usize {
        let capacity = self.capacity as u128;
        to_index((reduce(hash, self.capacity) + attempt as u128) % capacity)
    }
}

/// Quadratic probing: `index(i) = (hash mod capacity + i^2) mod capacity`.
///
/// Coverage of every slot is not guaranteed. `i^2` may come back to 0 modulo a
/// composite capacity before the offsets repeat, so walks do not stop on wraparound
/// and give up after `capacity` attempts instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadraticProbe {
    /// Number of slots
    capacity: usize,
}

impl ProbeSequence for QuadraticProbe {
    const NAME: &'static str = "Quadratic Probing";
    const STRATEGY: ProbeStrategy = ProbeStrategy::Quadratic;

    fn for_capacity(capacity: usize) -> Result<Self, TableError> {
        check_capacity(capacity, Self::MIN_CAPACITY)?;
        Ok(Self { capacity })
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn stops_on_wrap(&self) -> bool {
        false
    }

    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
    fn index(&self, hash: u64, attempt: usize) -> usize {
        let capacity = self.capacity as u128;
        let attempt = attempt as u128 % capacity;
        to_index((reduce(hash, self.capacity) + attempt * attempt) % capacity)
    }
}

/// Iterator over the slot indices probed for one key
#[derive(Debug, Clone)]
pub struct ProbeWalk<'a, P> {
    /// Sequence being walked
    sequence: &'a P,
    /// Hash of the key
    hash: u64,
    /// Next attempt number
    attempt: usize,
    /// First index of the walk, known once it has been yielded
    home: Option<usize>,
    /// End the walk when it returns to `home`
    stop_on_wrap: bool,
}

impl<P: ProbeSequence> Iterator for ProbeWalk<'_, P> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.attempt >= self.sequence.capacity() {
            return None;
        }
        let index = self.sequence.index(self.hash, self.attempt);
        match self.home {
            None => self.home = Some(index),
            Some(home) if self.stop_on_wrap && home == index => {
                self.attempt = self.sequence.capacity();
                return None;
            }
            Some(_) => {}
        }
        self.attempt = self.attempt.saturating_add(1);
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.sequence.capacity().saturating_sub(self.attempt)))
    }
}

/// Runtime name of a probing strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ProbeStrategy {
    /// Double hashing
    DoubleHash,
    /// Linear probing
    Linear,
    /// Quadratic probing
    Quadratic,
}

impl ProbeStrategy {
    /// Every strategy, in reporting order
    pub const ALL: [Self; 3] = [Self::DoubleHash, Self::Linear, Self::Quadratic];

    /// Human readable strategy name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::DoubleHash => DoubleHashProbe::NAME,
            Self::Linear => LinearProbe::NAME,
            Self::Quadratic => QuadraticProbe::NAME,
        }
    }

    /// Smallest capacity the strategy accepts
    #[must_use]
    pub fn min_capacity(self) -> usize {
        match self {
            Self::DoubleHash => DoubleHashProbe::MIN_CAPACITY,
            Self::Linear => LinearProbe::MIN_CAPACITY,
            Self::Quadratic => QuadraticProbe::MIN_CAPACITY,
        }
    }
}

impl fmt::Display for ProbeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_hash_rejects_tiny_capacity() {
        assert_eq!(DoubleHashProbe::for_capacity(0), Err(TableError::ZeroCapacity));
        assert_eq!(
            DoubleHashProbe::for_capacity(2),
            Err(TableError::CapacityTooSmall { capacity: 2, minimum: 3 })
        );
        assert!(DoubleHashProbe::for_capacity(3).is_ok());
    }

    #[test]
    fn test_linear_and_quadratic_accept_one_slot() {
        assert_eq!(LinearProbe::for_capacity(0), Err(TableError::ZeroCapacity));
        assert!(LinearProbe::for_capacity(1).is_ok());
        assert!(QuadraticProbe::for_capacity(1).is_ok());
    }

    #[test]
    fn test_double_hash_sequence() -> Result<(), TableError> {
        let probe = DoubleHashProbe::for_capacity(11)?;
        assert_eq!(probe.prime(), 7);
        // 16 mod 11 = 5, step = 7 - (16 mod 7) = 5
        assert_eq!(probe.step(16), 5);
        let indices: Vec<usize> = (0..4).map(|i| probe.index(16, i)).collect();
        assert_eq!(indices, vec![5, 10, 4, 9]);
        Ok(())
    }

    #[test]
    fn test_double_hash_step_never_zero() -> Result<(), TableError> {
        let probe = DoubleHashProbe::for_capacity(3)?;
        assert_eq!(probe.prime(), 2);
        for hash in 0..20 {
            let step = probe.step(hash);
            assert!((1..=2).contains(&step), "hash {hash} gave step {step}");
        }
        Ok(())
    }

    #[test]
    fn test_linear_sequence_wraps() -> Result<(), TableError> {
        let probe = LinearProbe::for_capacity(7)?;
        let indices: Vec<usize> = probe.walk(12, true).collect();
        assert_eq!(indices, vec![5, 6, 0, 1, 2, 3, 4]);
        Ok(())
    }

    #[test]
    fn test_quadratic_sequence() -> Result<(), TableError> {
        let probe = QuadraticProbe::for_capacity(13)?;
        let indices: Vec<usize> = (0..4).map(|i| probe.index(16, i)).collect();
        assert_eq!(indices, vec![3, 4, 7, 12]);
        Ok(())
    }

    #[test]
    fn test_walk_is_bounded_by_capacity() -> Result<(), TableError> {
        let probe = QuadraticProbe::for_capacity(4)?;
        // i^2 mod 4 only reaches 0 and 1, so the walk revisits slots
        let indices: Vec<usize> = probe.walk(0, false).collect();
        assert_eq!(indices, vec![0, 1, 0, 1]);
        Ok(())
    }

    #[test]
    fn test_wrap_policy() -> Result<(), TableError> {
        assert!(DoubleHashProbe::for_capacity(7)?.stops_on_wrap());
        assert!(LinearProbe::for_capacity(7)?.stops_on_wrap());
        assert!(!QuadraticProbe::for_capacity(7)?.stops_on_wrap());
        Ok(())
    }

    #[test]
    fn test_quadratic_offsets_outlive_wrap() -> Result<(), TableError> {
        // 3^2 = 9 wraps back home, yet 4^2 mod 9 = 7 is a slot not seen before
        let probe = QuadraticProbe::for_capacity(9)?;
        let indices: Vec<usize> = probe.walk(0, false).collect();
        assert_eq!(indices, vec![0, 1, 4, 0, 7, 7, 0, 4, 1]);
        Ok(())
    }

    #[test]
    fn test_walk_stops_on_wrap() -> Result<(), TableError> {
        let probe = QuadraticProbe::for_capacity(4)?;
        let indices: Vec<usize> = probe.walk(0, true).collect();
        assert_eq!(indices, vec![0, 1]);
        Ok(())
    }

    #[test]
    fn test_double_hash_covers_prime_table() -> Result<(), TableError> {
        let probe = DoubleHashProbe::for_capacity(13)?;
        let mut seen: Vec<usize> = probe.walk(1_234, true).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..13).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(ProbeStrategy::DoubleHash.to_string(), "Double Hashing");
        assert_eq!(ProbeStrategy::Linear.name(), "Linear Probing");
        assert_eq!(ProbeStrategy::Quadratic.min_capacity(), 1);
        assert_eq!(ProbeStrategy::DoubleHash.min_capacity(), 3);
    }
}
