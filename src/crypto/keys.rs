//! The vault key.
//!
//! A single 32-byte key drives the keystream for every record in a
//! vault.  `Key` keeps the bytes in a fixed-size array and wipes them
//! when dropped.

use std::fmt;

use zeroize::Zeroize;

/// Length of a vault key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// A wrapper around the 32-byte vault key that automatically zeroes
/// its memory when dropped.
#[derive(Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct Key {
    bytes: [u8; KEY_LEN],
}

impl Key {
    /// Create a new `Key` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Build a key from a slice, returning `None` unless it is exactly
    /// `KEY_LEN` bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; KEY_LEN] = bytes.try_into().ok()?;
        Some(Self { bytes })
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

// Never print key material, even in debug output.
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key([REDACTED])")
    }
}
