//! `onevault add`: store a new record.

use crate::cli::output;
use crate::cli::{open_engine, read_text, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `add` command.
pub fn execute(cli: &Cli, title: &str, text: Option<&str>) -> Result<()> {
    let engine = open_engine(cli)?;

    // Fail on a taken title before prompting for text.
    if engine.contains(title)? {
        return Err(VaultError::DuplicateTitle(title.to_string()));
    }

    let text = read_text(text, title)?;
    engine.add_text(title, &text)?;

    output::success(&format!(
        "Added '{}' ({} total)",
        title,
        engine.len()?
    ));

    Ok(())
}
