//! Key file management for OneVault.
//!
//! The key lives in its own file next to the record store: exactly
//! `KEY_LEN` raw bytes, no header and no checksum.  The first run
//! generates it; every later run loads it.
//!
//! Writes go through a temp file plus rename, so a crash mid-write can
//! never leave a short key file behind.  A key file of the wrong length
//! is reported as corrupt rather than silently regenerated, since a new
//! key would turn every stored record into garbage.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::TryRngCore;

use super::keys::{Key, KEY_LEN};
use crate::errors::{VaultError, Result};

/// Loads, generates and caches the vault key.
#[derive(Debug)]
pub struct KeyStore {
    /// Path to the key file on disk.
    path: PathBuf,

    /// The key once loaded or generated in this process.
    cached: Option<Key>,
}

impl KeyStore {
    /// Create a key store for the key file at `path`.  Nothing is read
    /// until `ensure_key` or `load_key` is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: None,
        }
    }

    /// Returns the path to the key file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the vault key, creating the key file on first run.
    ///
    /// Repeated calls on the same `KeyStore` return the cached key
    /// without touching the filesystem again.
    pub fn ensure_key(&mut self) -> Result<&Key> {
        let key = match self.cached.take() {
            Some(key) => key,
            None if self.path.exists() => load_key_file(&self.path)?,
            None => {
                let key = generate_key()?;
                write_key_file(&self.path, &key)?;
                tracing::debug!(path = %self.path.display(), "generated new vault key");
                key
            }
        };
        Ok(self.cached.insert(key))
    }

    /// Load the persisted key without ever creating one.
    pub fn load_key(&self) -> Result<Key> {
        if let Some(key) = &self.cached {
            return Ok(key.clone());
        }
        load_key_file(&self.path)
    }
}

/// Generate a fresh random key from the operating system RNG.
pub fn generate_key() -> Result<Key> {
    let mut bytes = [0u8; KEY_LEN];
    rand::rngs::OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        VaultError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("OS random source unavailable: {e}"),
        ))
    })?;
    let key = Key::new(bytes);
    zeroize::Zeroize::zeroize(&mut bytes);
    Ok(key)
}

/// Read a key file from disk and validate its length.
pub fn load_key_file(path: &Path) -> Result<Key> {
    if !path.exists() {
        return Err(VaultError::KeyMissing(path.to_path_buf()));
    }

    let mut data = fs::read(path)?;
    let found = data.len();
    let key = Key::from_slice(&data);
    zeroize::Zeroize::zeroize(&mut data);

    key.ok_or_else(|| VaultError::KeyCorrupt {
        path: path.to_path_buf(),
        expected: KEY_LEN,
        found,
    })
}

/// Write `key` to `path` atomically with owner-only permissions.
pub fn write_key_file(path: &Path, key: &Key) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let written = (|| -> std::io::Result<()> {
        let mut file = File::create(&tmp_path)?;

        // Restrict permissions before any key bytes hit the disk.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(key.as_bytes())?;
        file.sync_all()
    })()
    .and_then(|()| fs::rename(&tmp_path, path));

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn ensure_key_creates_file_on_first_run() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.bin");

        let mut store = KeyStore::new(&path);
        let key = store.ensure_key().unwrap().clone();

        assert!(path.exists());
        assert_eq!(fs::read(&path).unwrap(), key.as_bytes().to_vec());
    }

    #[test]
    fn ensure_key_is_stable_within_a_process() {
        let dir = TempDir::new().unwrap();
        let mut store = KeyStore::new(dir.path().join("key.bin"));

        let first = store.ensure_key().unwrap().clone();
        let second = store.ensure_key().unwrap().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn ensure_key_reloads_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.bin");

        let original = KeyStore::new(&path).ensure_key().unwrap().clone();
        let reloaded = KeyStore::new(&path).ensure_key().unwrap().clone();
        assert_eq!(original, reloaded);
    }

    #[test]
    fn load_key_fails_if_missing() {
        let dir = TempDir::new().unwrap();
        let store = KeyStore::new(dir.path().join("nope.bin"));

        let result = store.load_key();
        assert!(matches!(result, Err(VaultError::KeyMissing(_))));
    }

    #[test]
    fn wrong_length_is_corrupt_and_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.bin");
        fs::write(&path, [1u8; 16]).unwrap();

        let mut store = KeyStore::new(&path);
        let result = store.ensure_key();
        assert!(matches!(
            result,
            Err(VaultError::KeyCorrupt {
                expected: KEY_LEN,
                found: 16,
                ..
            })
        ));

        // The damaged file is left for the user to inspect.
        assert_eq!(fs::read(&path).unwrap().len(), 16);
    }

    #[test]
    fn write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.bin");
        write_key_file(&path, &Key::new([9u8; KEY_LEN])).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
        assert_eq!(names[0], "key.bin");
    }

    #[cfg(unix)]
    #[test]
    fn key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.bin");
        KeyStore::new(&path).ensure_key().unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn generated_keys_differ() {
        let a = generate_key().unwrap();
        let b = generate_key().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.bin");

        // A non-empty directory in the way makes the final rename fail.
        fs::create_dir_all(path.join("occupied")).unwrap();

        let result = write_key_file(&path, &Key::new([9u8; KEY_LEN]));
        assert!(matches!(result, Err(VaultError::Io(_))));
        assert!(!dir.path().join(".key.bin.tmp").exists());
    }
}
