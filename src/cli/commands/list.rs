//! `onevault list`: display all records in a table.

use crate::cli::output;
use crate::cli::{open_engine, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let engine = open_engine(cli)?;
    let entries = engine.list_texts()?;

    if entries.is_empty() {
        output::info("No records in this vault yet.");
        output::tip("Run `onevault add <TITLE> <TEXT>` to add your first record.");
        return Ok(());
    }

    output::info(&format!("{} record(s)", entries.len()));
    output::print_entries_table(&entries);

    Ok(())
}
