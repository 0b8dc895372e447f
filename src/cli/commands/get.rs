//! `onevault get`: print a single record's text.

use crate::cli::{open_engine, Cli};
use crate::errors::Result;

/// Execute the `get` command.
pub fn execute(cli: &Cli, title: &str) -> Result<()> {
    let engine = open_engine(cli)?;

    // Plain text to stdout so it can be piped.
    let text = engine.get_text(title)?;
    println!("{text}");

    Ok(())
}
