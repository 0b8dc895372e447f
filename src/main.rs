use clap::Parser;
use onevault::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    // Diagnostics go to stderr, filtered by ONEVAULT_LOG (default: warn).
    let filter = EnvFilter::try_from_env("ONEVAULT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Add {
            ref title,
            ref text,
        } => onevault::cli::commands::add::execute(&cli, title, text.as_deref()),
        Commands::Get { ref title } => onevault::cli::commands::get::execute(&cli, title),
        Commands::List => onevault::cli::commands::list::execute(&cli),
        Commands::Search { ref query, content } => {
            onevault::cli::commands::search::execute(&cli, query, content)
        }
        Commands::Update {
            ref title,
            ref text,
        } => onevault::cli::commands::update::execute(&cli, title, text.as_deref()),
        Commands::Delete { ref title, force } => {
            onevault::cli::commands::delete::execute(&cli, title, force)
        }
        Commands::Completions { shell } => onevault::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        onevault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
