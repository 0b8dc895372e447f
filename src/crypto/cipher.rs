//! Keystream transform and text encoding for record content.
//!
//! Content is XORed with the vault key repeated to the content length,
//! then base64-encoded so it can sit inside the JSON store file.
//!
//! This is obfuscation, not encryption: there is no nonce and no
//! authentication tag.  Decoding with the wrong key succeeds and
//! returns garbage.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::keys::Key;
use crate::errors::{VaultError, Result};

/// XOR `data` with the key bytes, cycling the key as needed.
///
/// Applying the transform twice with the same key returns the input.
pub fn apply_keystream(data: &[u8], key: &Key) -> Vec<u8> {
    data.iter()
        .zip(key.as_bytes().iter().cycle())
        .map(|(b, k)| b ^ k)
        .collect()
}

/// Transform `plaintext` and return it as standard base64 text.
pub fn encode(plaintext: &[u8], key: &Key) -> String {
    BASE64.encode(apply_keystream(plaintext, key))
}

/// Reverse `encode`.
///
/// Fails only if `stored` is not valid base64.
pub fn decode(stored: &str, key: &Key) -> Result<Vec<u8>> {
    let raw = BASE64
        .decode(stored)
        .map_err(|e| VaultError::DecodeError(e.to_string()))?;
    Ok(apply_keystream(&raw, key))
}
