//! Key material and the content transform for OneVault.
//!
//! This module provides:
//! - The zeroizing 32-byte `Key` (`keys`)
//! - `KeyStore` for generating, persisting and loading the key (`keyfile`)
//! - The repeating-keystream XOR plus base64 text encoding (`cipher`)

pub mod cipher;
pub mod keyfile;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encode, decode, Key, KeyStore};
pub use cipher::{apply_keystream, decode, encode};
pub use keyfile::KeyStore;
pub use keys::{Key, KEY_LEN};
