//! The persisted record collection.
//!
//! `RecordStore` owns the in-memory records and the key used to encode
//! them, and rewrites the whole store file after every mutation.  A
//! mutation whose write fails is rolled back in memory, so the
//! collection never drifts from what is on disk.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};

use crate::crypto::{cipher, Key};
use crate::errors::{Result, VaultError};

use super::format;
use super::record::{validate_title, VaultRecord};

/// Where and how many backups to keep before each rewrite.
#[derive(Debug, Clone)]
pub struct BackupPolicy {
    pub dir: PathBuf,
    pub max_backups: usize,
}

/// The main record handle.  Open one with `RecordStore::open`, then use
/// its methods to manage records.
pub struct RecordStore {
    /// Path to the store file on disk.
    path: PathBuf,

    /// Key used to encode and decode record content.
    key: Key,

    /// Records in insertion order.
    records: Vec<VaultRecord>,

    /// Optional rolling backups taken before each write.
    backups: Option<BackupPolicy>,
}

impl RecordStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open the store at `path`, loading any existing records.
    ///
    /// A missing file means an empty store; nothing is written until the
    /// first mutation.
    pub fn open(path: &Path, key: Key) -> Result<Self> {
        let records = Self::load(path)?;
        tracing::debug!(path = %path.display(), records = records.len(), "opened record store");

        Ok(Self {
            path: path.to_path_buf(),
            key,
            records,
            backups: None,
        })
    }

    /// Take a rolling backup of the store file before every write.
    pub fn with_backups(mut self, policy: BackupPolicy) -> Self {
        self.backups = Some(policy);
        self
    }

    /// Read the collection persisted at `path`.
    pub fn load(path: &Path) -> Result<Vec<VaultRecord>> {
        format::read_store(path)
    }

    // ------------------------------------------------------------------
    // Record operations
    // ------------------------------------------------------------------

    /// Append a new record.  Fails if the title is already taken.
    pub fn add(&mut self, title: &str, content_plain: &[u8]) -> Result<VaultRecord> {
        validate_title(title)?;
        if self.position(title).is_some() {
            return Err(VaultError::DuplicateTitle(title.to_string()));
        }

        let now = Utc::now();
        let record = VaultRecord {
            title: title.to_string(),
            content: cipher::encode(content_plain, &self.key),
            created_at: now,
            updated_at: now,
        };

        self.records.push(record.clone());
        self.persist_or_rollback(|records| {
            records.pop();
        })?;

        tracing::debug!(title, "added record");
        Ok(record)
    }

    /// Look up a record by exact title.
    pub fn get(&self, title: &str) -> Result<&VaultRecord> {
        self.position(title)
            .map(|idx| &self.records[idx])
            .ok_or_else(|| VaultError::NotFound(title.to_string()))
    }

    /// Records whose title contains `query`, ignoring case, in insertion
    /// order.  The returned iterator is lazy and can be cloned to restart.
    pub fn search(&self, query: &str) -> Matches<'_> {
        Matches {
            records: self.records.iter(),
            needle: query.to_lowercase(),
        }
    }

    /// Every record, in insertion order.
    pub fn list_all(&self) -> &[VaultRecord] {
        &self.records
    }

    /// Replace a record's content, keeping its `created_at`.
    pub fn update(&mut self, title: &str, new_content_plain: &[u8]) -> Result<VaultRecord> {
        let idx = self
            .position(title)
            .ok_or_else(|| VaultError::NotFound(title.to_string()))?;

        let previous = self.records[idx].clone();
        let updated = VaultRecord {
            content: cipher::encode(new_content_plain, &self.key),
            updated_at: advance(previous.updated_at),
            ..previous.clone()
        };

        self.records[idx] = updated.clone();
        self.persist_or_rollback(move |records| records[idx] = previous)?;

        tracing::debug!(title, "updated record");
        Ok(updated)
    }

    /// Remove a record.
    pub fn delete(&mut self, title: &str) -> Result<()> {
        let idx = self
            .position(title)
            .ok_or_else(|| VaultError::NotFound(title.to_string()))?;

        let removed = self.records.remove(idx);
        self.persist_or_rollback(move |records| records.insert(idx, removed))?;

        tracing::debug!(title, "deleted record");
        Ok(())
    }

    /// Decode a record's content with this store's key.
    pub fn decode_content(&self, record: &VaultRecord) -> Result<Vec<u8>> {
        cipher::decode(&record.content, &self.key)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write the full collection to disk atomically, backing up the
    /// previous file first if a backup policy is set.
    pub fn persist(&self) -> Result<()> {
        if let Some(policy) = &self.backups {
            if let Err(e) = format::backup_store(&self.path, &policy.dir, policy.max_backups) {
                tracing::warn!(error = %e, dir = %policy.dir.display(), "store backup failed");
            }
        }
        format::write_store(&self.path, &self.records)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` if a record with exactly this title exists.
    pub fn contains(&self, title: &str) -> bool {
        self.position(title).is_some()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn position(&self, title: &str) -> Option<usize> {
        self.records.iter().position(|r| r.title == title)
    }

    fn persist_or_rollback(&mut self, undo: impl FnOnce(&mut Vec<VaultRecord>)) -> Result<()> {
        if let Err(e) = self.persist() {
            undo(&mut self.records);
            return Err(e);
        }
        Ok(())
    }
}

/// Next `updated_at`: now, or one nanosecond past `previous` if the
/// clock has not moved on.
fn advance(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + TimeDelta::nanoseconds(1)
    }
}

/// Lazy, case-insensitive title search over a store.
#[derive(Debug, Clone)]
pub struct Matches<'a> {
    records: std::slice::Iter<'a, VaultRecord>,
    needle: String,
}

impl<'a> Iterator for Matches<'a> {
    type Item = &'a VaultRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let needle = self.needle.as_str();
        self.records
            .by_ref()
            .find(|r| r.title.to_lowercase().contains(needle))
    }
}
