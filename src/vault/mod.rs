//! Vault module: the persisted record collection.
//!
//! This module provides:
//! - `VaultRecord` and `TextEntry` types (`record`)
//! - The JSON store file format, atomic writes and backups (`format`)
//! - `RecordStore` for adding, finding, updating and deleting records (`store`)

pub mod format;
pub mod record;
pub mod store;

// Re-export the most commonly used items.
pub use record::{TextEntry, VaultRecord};
pub use store::{BackupPolicy, Matches, RecordStore};
