//! Store file format, atomic writes and rolling backups.
//!
//! A store file is pretty-printed JSON:
//!
//! ```text
//! {
//!   "version": 1,
//!   "records": [ { "title", "content", "created_at", "updated_at" }, ... ]
//! }
//! ```
//!
//! - **version**: format version (currently `1`).
//! - **records**: every `VaultRecord`, in insertion order.  A JSON array
//!   keeps the order stable across rewrites, which an object keyed by
//!   title would not.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::record::VaultRecord;
use crate::errors::{Result, VaultError};

/// Current store format version.
pub const CURRENT_VERSION: u32 = 1;

/// On-disk shape of the store file.
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    records: Vec<VaultRecord>,
}

/// Borrowing twin of `StoreFile` so writes don't clone the collection.
#[derive(Serialize)]
struct StoreFileRef<'a> {
    version: u32,
    records: &'a [VaultRecord],
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Read the store file at `path`.
///
/// A missing file is a first run and yields an empty collection.  A file
/// that exists but does not parse, carries an unknown version, or holds
/// two records with the same title is reported as `StoreCorrupt`.
pub fn read_store(path: &Path) -> Result<Vec<VaultRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let data = fs::read(path)?;

    let file: StoreFile = serde_json::from_slice(&data)
        .map_err(|e| VaultError::StoreCorrupt(format!("{}: {e}", path.display())))?;

    if file.version != CURRENT_VERSION {
        return Err(VaultError::StoreCorrupt(format!(
            "unsupported version {}, expected {CURRENT_VERSION}",
            file.version
        )));
    }

    ensure_unique_titles(&file.records)?;
    Ok(file.records)
}

/// Write the full collection to `path` **atomically**.
///
/// 1. Serialize the records to JSON.
/// 2. Write to a temp file in the same directory and fsync it.
/// 3. Rename the temp file over the target path.
///
/// The rename ensures readers never see a half-written file.
pub fn write_store(path: &Path, records: &[VaultRecord]) -> Result<()> {
    let doc = StoreFileRef {
        version: CURRENT_VERSION,
        records,
    };
    let buf = serde_json::to_vec_pretty(&doc).map_err(std::io::Error::from)?;

    let parent = path.parent().unwrap_or(Path::new("."));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let written = (|| -> Result<()> {
        let mut file = File::create(&tmp_path)?;
        file.write_all(&buf)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
        Ok(())
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

/// Copy the current store file into `backup_dir` and prune old copies.
///
/// Backups are named `<stem>_<UTC timestamp>.json`, with a `_<n>` counter
/// appended when that name is already taken; only the newest
/// `max_backups` are kept.  Returns the new backup path, or `None` when
/// there was nothing to back up or backups are disabled.
pub fn backup_store(path: &Path, backup_dir: &Path, max_backups: usize) -> Result<Option<PathBuf>> {
    if max_backups == 0 || !path.exists() {
        return Ok(None);
    }

    fs::create_dir_all(backup_dir)?;

    let stem = backup_stem(path);
    let (dest, mut backup) = create_backup_file(backup_dir, &stem)?;
    let mut current = File::open(path)?;
    io::copy(&mut current, &mut backup)?;
    backup.sync_all()?;

    prune_backups(backup_dir, &stem, max_backups)?;
    Ok(Some(dest))
}

/// List the backups of the store at `path`, oldest first.
pub fn list_backups(path: &Path, backup_dir: &Path) -> Result<Vec<PathBuf>> {
    if !backup_dir.exists() {
        return Ok(Vec::new());
    }
    collect_backups(backup_dir, &backup_stem(path))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ensure_unique_titles(records: &[VaultRecord]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.title.as_str()) {
            return Err(VaultError::StoreCorrupt(format!(
                "duplicate title '{}'",
                record.title
            )));
        }
    }
    Ok(())
}

/// Create a new, never-before-used backup file for `stem`.
///
/// `_` sorts after `.`, so a suffixed name stays after the plain name
/// from the same microsecond.
fn create_backup_file(backup_dir: &Path, stem: &str) -> Result<(PathBuf, File)> {
    let ts = Utc::now().format("%Y%m%dT%H%M%S%.6fZ").to_string();
    let mut attempt: u32 = 0;
    loop {
        let name = if attempt == 0 {
            format!("{stem}_{ts}.json")
        } else {
            format!("{stem}_{ts}_{attempt:04}.json")
        };
        let dest = backup_dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&dest) {
            Ok(file) => return Ok((dest, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

fn backup_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_string())
}

/// Timestamps sort lexicographically, so name order is age order.
fn collect_backups(backup_dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
    let prefix = format!("{stem}_");
    let mut backups: Vec<PathBuf> = fs::read_dir(backup_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&prefix) && n.ends_with(".json"))
        })
        .collect();
    backups.sort();
    Ok(backups)
}

fn prune_backups(backup_dir: &Path, stem: &str, max_backups: usize) -> Result<()> {
    let backups = collect_backups(backup_dir, stem)?;
    let excess = backups.len().saturating_sub(max_backups);
    for old in &backups[..excess] {
        fs::remove_file(old)?;
    }
    Ok(())
}
