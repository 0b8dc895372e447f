//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};

use clap::Parser;

use crate::config::Settings;
use crate::engine::VaultEngine;
use crate::errors::{Result, VaultError};

/// OneVault CLI: a local vault for short text records.
#[derive(Parser)]
#[command(
    name = "onevault",
    about = "Local vault for short text records",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (overrides `vault_dir` from .onevault.toml)
    #[arg(long, env = "ONEVAULT_DIR", global = true)]
    pub vault_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Add a new record
    Add {
        /// Record title (must be unique)
        title: String,
        /// Record text (omit to read from stdin or a prompt)
        text: Option<String>,
    },

    /// Print a record's text
    Get {
        /// Record title
        title: String,
    },

    /// List all records
    List,

    /// Find records by title (or by text with --content)
    Search {
        /// Case-insensitive substring to look for
        query: String,
        /// Match against the record text instead of the title
        #[arg(long)]
        content: bool,
    },

    /// Replace a record's text
    Update {
        /// Record title
        title: String,
        /// New text (omit to read from stdin or a prompt)
        text: Option<String>,
    },

    /// Delete a record
    Delete {
        /// Record title
        title: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Build the engine for the current directory, honouring `--vault-dir`.
pub fn open_engine(cli: &Cli) -> Result<VaultEngine> {
    let cwd = std::env::current_dir()?;
    let mut settings = Settings::load(&cwd)?;
    if let Some(dir) = &cli.vault_dir {
        settings.vault_dir = dir.clone();
    }
    Ok(VaultEngine::new(settings.layout(&cwd)))
}

/// Resolve record text from one of three sources:
/// 1. The value given on the command line
/// 2. Piped stdin (when stdin is not a terminal)
/// 3. An interactive prompt
pub fn read_text(inline: Option<&str>, title: &str) -> Result<String> {
    if let Some(text) = inline {
        return Ok(text.to_string());
    }

    if !io::stdin().is_terminal() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf.trim_end_matches(['\r', '\n']).to_string());
    }

    dialoguer::Input::<String>::new()
        .with_prompt(format!("Text for '{title}'"))
        .allow_empty(true)
        .interact_text()
        .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))
}

/// Shorten `text` to one display line of at most `max` characters.
pub fn preview(text: &str, max: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();

    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}\u{2026}")
}
