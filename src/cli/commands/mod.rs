//! One module per subcommand.  Each exposes an `execute` function that
//! turns parsed arguments into engine calls and prints the result.

pub mod add;
pub mod completions;
pub mod delete;
pub mod get;
pub mod list;
pub mod search;
pub mod update;
