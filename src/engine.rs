//! The engine front ends talk to.
//!
//! `VaultEngine` ties the key file, the content transform and the record
//! store together behind six text-in/text-out operations.  It starts
//! Uninitialized and loads the key and the collection on first use.
//!
//! The engine is `Send + Sync`.  Mutations hold the store's write lock
//! for the whole change-and-persist section; reads share the read lock.

use std::path::Path;
use std::sync::OnceLock;

use parking_lot::{Mutex, RwLock};

use crate::config::{Settings, VaultLayout};
use crate::crypto::KeyStore;
use crate::errors::Result;
use crate::vault::{BackupPolicy, RecordStore, TextEntry, VaultRecord};

/// Lifecycle of a `VaultEngine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No key or collection loaded yet.
    Uninitialized,
    /// Key and collection loaded into memory.
    Ready,
}

/// Façade over `KeyStore`, the cipher and `RecordStore`.
pub struct VaultEngine {
    layout: VaultLayout,

    /// Serializes first-use initialization.
    init: Mutex<()>,

    /// Set exactly once, on the first successful initialization.
    store: OnceLock<RwLock<RecordStore>>,
}

impl VaultEngine {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create an engine for the given file layout.  No files are touched
    /// until the first operation.
    pub fn new(layout: VaultLayout) -> Self {
        Self {
            layout,
            init: Mutex::new(()),
            store: OnceLock::new(),
        }
    }

    /// Create an engine from `<project_dir>/.onevault.toml` (or defaults).
    pub fn for_project(project_dir: &Path) -> Result<Self> {
        let settings = Settings::load(project_dir)?;
        Ok(Self::new(settings.layout(project_dir)))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        if self.store.get().is_some() {
            EngineState::Ready
        } else {
            EngineState::Uninitialized
        }
    }

    /// Returns the file layout this engine uses.
    pub fn layout(&self) -> &VaultLayout {
        &self.layout
    }

    // ------------------------------------------------------------------
    // Text operations
    // ------------------------------------------------------------------

    /// Store `plaintext` under a new `title`.
    pub fn add_text(&self, title: &str, plaintext: &str) -> Result<TextEntry> {
        let mut store = self.store()?.write();
        let record = store.add(title, plaintext.as_bytes())?;
        to_entry(&store, &record)
    }

    /// Return the decoded text stored under `title`.
    pub fn get_text(&self, title: &str) -> Result<String> {
        Ok(self.get_entry(title)?.text)
    }

    /// Return the decoded record stored under `title`.
    pub fn get_entry(&self, title: &str) -> Result<TextEntry> {
        let store = self.store()?.read();
        let record = store.get(title)?;
        to_entry(&store, record)
    }

    /// Records whose title contains `query`, ignoring case.
    pub fn search_text(&self, query: &str) -> Result<Vec<TextEntry>> {
        let store = self.store()?.read();
        let matches = store.search(query);
        matches.map(|record| to_entry(&store, record)).collect()
    }

    /// Records whose decoded text contains `query`, ignoring case.
    ///
    /// Every record has to be decoded to answer this, unlike
    /// `search_text` which only decodes the hits.
    pub fn search_content(&self, query: &str) -> Result<Vec<TextEntry>> {
        let needle = query.to_lowercase();
        let store = self.store()?.read();

        let mut hits = Vec::new();
        for record in store.list_all() {
            let entry = to_entry(&store, record)?;
            if entry.text.to_lowercase().contains(&needle) {
                hits.push(entry);
            }
        }
        Ok(hits)
    }

    /// Every record, decoded, in insertion order.
    pub fn list_texts(&self) -> Result<Vec<TextEntry>> {
        let store = self.store()?.read();
        store
            .list_all()
            .iter()
            .map(|record| to_entry(&store, record))
            .collect()
    }

    /// Replace the text stored under `title`.
    pub fn update_text(&self, title: &str, plaintext: &str) -> Result<TextEntry> {
        let mut store = self.store()?.write();
        let record = store.update(title, plaintext.as_bytes())?;
        to_entry(&store, &record)
    }

    /// Remove the record stored under `title`.
    pub fn delete_text(&self, title: &str) -> Result<()> {
        self.store()?.write().delete(title)
    }

    /// Returns `true` if a record titled exactly `title` exists.  The
    /// content is not decoded, so this works for damaged records too.
    pub fn contains(&self, title: &str) -> Result<bool> {
        Ok(self.store()?.read().contains(title))
    }

    /// Number of records in the vault.
    pub fn len(&self) -> Result<usize> {
        Ok(self.store()?.read().len())
    }

    /// Returns `true` if the vault holds no records.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    // ------------------------------------------------------------------
    // Initialization
    // ------------------------------------------------------------------

    /// Uninitialized -> Ready, at most once.  A failed attempt leaves the
    /// engine Uninitialized so the next call tries again.
    fn store(&self) -> Result<&RwLock<RecordStore>> {
        if let Some(store) = self.store.get() {
            return Ok(store);
        }

        let _guard = self.init.lock();
        if let Some(store) = self.store.get() {
            return Ok(store);
        }

        let mut keys = KeyStore::new(&self.layout.key_file);
        let key = keys.ensure_key()?.clone();
        let store = RecordStore::open(&self.layout.store_file, key)?.with_backups(BackupPolicy {
            dir: self.layout.backup_dir.clone(),
            max_backups: self.layout.max_backups,
        });

        tracing::debug!(
            key_file = %keys.path().display(),
            store_file = %self.layout.store_file.display(),
            "vault engine ready"
        );
        Ok(self.store.get_or_init(|| RwLock::new(store)))
    }
}

/// Decode a record for handing to a front end.
///
/// Bytes that are not UTF-8 (the usual sign of a mismatched key) are
/// converted lossily rather than rejected.
fn to_entry(store: &RecordStore, record: &VaultRecord) -> Result<TextEntry> {
    let bytes = store.decode_content(record)?;
    let text = String::from_utf8_lossy(&bytes).into_owned();

    Ok(TextEntry {
        title: record.title.clone(),
        text,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}
