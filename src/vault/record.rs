//! Record types stored inside a vault.
//!
//! A `VaultRecord` is what sits in the store file: the title, the
//! encoded content, and creation/update timestamps.  A `TextEntry` is
//! the decoded view that front ends see.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum title length in characters.
pub const MAX_TITLE_LEN: usize = 256;

/// A single encoded record stored in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRecord {
    /// Unique, case-sensitive title (the lookup key).
    pub title: String,

    /// Keystream-transformed content, base64-encoded.
    pub content: String,

    /// When this record was first added.
    pub created_at: DateTime<Utc>,

    /// When this record's content last changed.
    pub updated_at: DateTime<Utc>,
}

/// A record with its content decoded back to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validate that a title is usable as a lookup key.
///
/// Must contain a non-whitespace character and be at most
/// `MAX_TITLE_LEN` characters.
pub fn validate_title(title: &str) -> crate::errors::Result<()> {
    use crate::errors::VaultError;

    if title.trim().is_empty() {
        return Err(VaultError::InvalidTitle("title cannot be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(VaultError::InvalidTitle(format!(
            "title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}
