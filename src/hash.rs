//! Hash capability required from table keys

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

/// Keys that can produce a deterministic, non-negative hash for probing.
///
/// Integer keys hash to their own value, so `k.key_hash() % capacity == k % capacity`
/// for non-negative keys. This keeps collision experiments with integer workloads
/// predictable. Signed keys are reinterpreted as their two's complement bit pattern.
/// Everything else goes through the standard library's [`DefaultHasher`].
pub trait KeyHash {
    /// Returns the hash fed into the probe sequence
    fn key_hash(&self) -> u64;
}

/// Hashes a value with the standard library's default hasher
fn std_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Implements [`KeyHash`] as the identity for unsigned integers
macro_rules! impl_key_hash_unsigned {
    ($($ty:ty),*) => {
        $(
            impl KeyHash for $ty {
                fn key_hash(&self) -> u64 {
                    u64::from(*self)
                }
            }
        )*
    };
}

/// Implements [`KeyHash`] for signed integers by reinterpreting their bits
macro_rules! impl_key_hash_signed {
    ($($ty:ty),*) => {
        $(
            impl KeyHash for $ty {
                fn key_hash(&self) -> u64 {
                    u64::from_ne_bytes(i64::from(*self).to_ne_bytes())
                }
            }
        )*
    };
}

/// Implements [`KeyHash`] through [`DefaultHasher`]
macro_rules! impl_key_hash_std {
    ($($ty:ty),*) => {
        $(
            impl KeyHash for $ty {
                fn key_hash(&self) -> u64 {
                    std_hash(self)
                }
            }
        )*
    };
}

impl_key_hash_unsigned!(u8, u16, u32, u64, bool);
impl_key_hash_signed!(i8, i16, i32, i64);
impl_key_hash_std!(str, String, [u8], Vec<u8>);

impl KeyHash for usize {
    #[allow(clippy::cast_possible_truncation)]
    fn key_hash(&self) -> u64 {
        *self as u64
    }
}

impl KeyHash for isize {
    #[allow(clippy::cast_possible_truncation)]
    fn key_hash(&self) -> u64 {
        u64::from_ne_bytes((*self as i64).to_ne_bytes())
    }
}

impl KeyHash for char {
    fn key_hash(&self) -> u64 {
        u64::from(u32::from(*self))
    }
}

impl<T: KeyHash + ?Sized> KeyHash for &T {
    fn key_hash(&self) -> u64 {
        (**self).key_hash()
    }
}

impl<T: KeyHash + ?Sized> KeyHash for Box<T> {
    fn key_hash(&self) -> u64 {
        (**self).key_hash()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_hash_to_themselves() {
        assert_eq!(5_u32.key_hash(), 5);
        assert_eq!(16_i32.key_hash(), 16);
        assert_eq!(42_usize.key_hash(), 42);
        assert_eq!(u64::MAX.key_hash(), u64::MAX);
        assert_eq!('a'.key_hash(), 97);
    }

    #[test]
    fn test_negative_keys_are_distinct() {
        assert_ne!((-1_i32).key_hash(), 1_i32.key_hash());
        assert_eq!((-1_i64).key_hash(), u64::MAX);
    }

    #[test]
    fn test_strings_are_deterministic() {
        let owned = String::from("apple");
        assert_eq!(owned.key_hash(), "apple".key_hash());
        assert_eq!(owned.key_hash(), owned.clone().key_hash());
        assert_eq!((&owned).key_hash(), owned.key_hash());
    }
}
