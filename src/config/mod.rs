//! Project configuration loaded from `.onevault.toml`.

pub mod settings;

pub use settings::{Settings, VaultLayout};
