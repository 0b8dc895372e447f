//! `onevault delete`: remove a record from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_engine, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, title: &str, force: bool) -> Result<()> {
    let engine = open_engine(cli)?;

    // Fail on a missing title before asking for confirmation.
    if !engine.contains(title)? {
        return Err(VaultError::NotFound(title.to_string()));
    }

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete record '{title}'?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    engine.delete_text(title)?;
    output::success(&format!("Deleted '{title}'"));

    Ok(())
}
