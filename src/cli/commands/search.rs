//! `onevault search`: find records by title or by text.

use crate::cli::output;
use crate::cli::{open_engine, Cli};
use crate::errors::Result;

/// Execute the `search` command.
pub fn execute(cli: &Cli, query: &str, content: bool) -> Result<()> {
    let engine = open_engine(cli)?;

    let hits = if content {
        engine.search_content(query)?
    } else {
        engine.search_text(query)?
    };

    let scope = if content { "text" } else { "title" };
    output::info(&format!(
        "{} result(s) for '{query}' in {scope}",
        hits.len()
    ));

    if !hits.is_empty() {
        output::print_entries_table(&hits);
    }

    Ok(())
}
