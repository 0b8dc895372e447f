use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

/// Project-level configuration, loaded from `.onevault.toml`.
///
/// Every field has a sensible default so OneVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) holding the vault files.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// Key file name inside the vault directory.
    #[serde(default = "default_key_file")]
    pub key_file: String,

    /// Store file name inside the vault directory.
    #[serde(default = "default_store_file")]
    pub store_file: String,

    /// Backup directory name inside the vault directory.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,

    /// How many store backups to keep (0 disables backups).
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,
}

/// Resolved locations of every file a vault uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultLayout {
    pub key_file: PathBuf,
    pub store_file: PathBuf,
    pub backup_dir: PathBuf,
    pub max_backups: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_dir() -> String {
    ".onevault".to_string()
}

fn default_key_file() -> String {
    "key.bin".to_string()
}

fn default_store_file() -> String {
    "records.json".to_string()
}

fn default_backup_dir() -> String {
    "backups".to_string()
}

fn default_max_backups() -> usize {
    7
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            key_file: default_key_file(),
            store_file: default_store_file(),
            backup_dir: default_backup_dir(),
            max_backups: default_max_backups(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = ".onevault.toml";

    /// Load settings from `<project_dir>/.onevault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// File names must stay inside the vault directory.
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("key_file", &self.key_file),
            ("store_file", &self.store_file),
            ("backup_dir", &self.backup_dir),
        ] {
            let as_path = Path::new(value);
            if value.is_empty() || as_path.components().count() != 1 || as_path.is_absolute() {
                return Err(VaultError::ConfigError(format!(
                    "{field} must be a plain file name, got '{value}'"
                )));
            }
        }
        if self.key_file == self.store_file {
            return Err(VaultError::ConfigError(
                "key_file and store_file must differ".into(),
            ));
        }
        Ok(())
    }

    /// Resolve every vault path under `project_dir/<vault_dir>`.
    pub fn layout(&self, project_dir: &Path) -> VaultLayout {
        let root = project_dir.join(&self.vault_dir);
        VaultLayout {
            key_file: root.join(&self.key_file),
            store_file: root.join(&self.store_file),
            backup_dir: root.join(&self.backup_dir),
            max_backups: self.max_backups,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
