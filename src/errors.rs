use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in OneVault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Key errors ---
    #[error("Key file not found at {0}")]
    KeyMissing(PathBuf),

    #[error("Key file at {path} is corrupt: expected {expected} bytes, found {found}")]
    KeyCorrupt {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    // --- Cipher errors ---
    #[error("Stored content is not valid base64: {0}")]
    DecodeError(String),

    // --- Record errors ---
    #[error("A record titled '{0}' already exists (use `update` to change it)")]
    DuplicateTitle(String),

    #[error("Record '{0}' not found")]
    NotFound(String),

    #[error("Invalid title: {0}")]
    InvalidTitle(String),

    // --- Store errors ---
    #[error("Store file is corrupt: {0}")]
    StoreCorrupt(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for OneVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
