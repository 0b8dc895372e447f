//! `onevault update`: replace a record's text.

use crate::cli::output;
use crate::cli::{open_engine, read_text, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `update` command.
pub fn execute(cli: &Cli, title: &str, text: Option<&str>) -> Result<()> {
    let engine = open_engine(cli)?;

    // Fail on a missing title before prompting for text.
    if !engine.contains(title)? {
        return Err(VaultError::NotFound(title.to_string()));
    }

    let text = read_text(text, title)?;
    engine.update_text(title, &text)?;

    output::success(&format!("Updated '{title}'"));
    Ok(())
}
