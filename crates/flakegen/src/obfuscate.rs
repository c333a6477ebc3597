use core::fmt;

use crate::{RandSource, SnowflakeId};

/// A per-generator key XORed into every emitted ID.
///
/// ⚠️ This is **not** a security boundary. XOR with a fixed key only hides the
/// bit layout from casual inspection of raw IDs; anyone who learns the key
/// (or a single ID together with its decoded fields) can decode every ID and
/// mint ones that validate. Do not use it for authentication.
///
/// # Example
///
/// ```
/// use flakegen::{SecretKey, SnowflakeId};
///
/// let key = SecretKey::new(0xDEAD_BEEF);
/// let packed = SnowflakeId::from_parts(1000, 1, 2, 3);
/// let emitted = key.emit(packed);
/// assert_ne!(emitted, packed.to_raw());
/// assert_eq!(key.absorb(emitted), packed);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct SecretKey(u64);

impl SecretKey {
    pub const fn new(key: u64) -> Self {
        Self(key)
    }

    /// Draws a fresh key from `rng`.
    pub fn random<R: RandSource<u64>>(rng: &R) -> Self {
        Self(rng.rand())
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Obfuscates a packed ID for hand-out.
    pub const fn emit(self, id: SnowflakeId) -> u64 {
        id.to_raw() ^ self.0
    }

    /// Reverses [`Self::emit`].
    pub const fn absorb(self, id: u64) -> SnowflakeId {
        SnowflakeId::from_raw(id ^ self.0)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_key_is_identity() {
        let key = SecretKey::new(0);
        let id = SnowflakeId::from_parts(5, 6, 7, 8);
        assert_eq!(key.emit(id), id.to_raw());
    }

    #[test]
    fn wrong_key_scrambles_fields() {
        let id = SnowflakeId::from_parts(5, 6, 7, 8);
        let emitted = SecretKey::new(0x0123_4567_89AB_CDEF).emit(id);
        let decoded = SecretKey::new(0xFEDC_BA98_7654_3210).absorb(emitted);
        assert_ne!(decoded, id);
    }

    #[test]
    fn debug_hides_key() {
        let key = SecretKey::new(42);
        assert_eq!(format!("{key:?}"), "SecretKey(..)");
    }
}
