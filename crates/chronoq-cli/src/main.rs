//! Command-line host for the time-travel quantum debugger.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// chronoq — step a quantum program forward and backward, inspecting state
/// and assertions along the way.
#[derive(Parser)]
#[command(name = "chronoq")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program to completion, reporting every assertion failure
    Run {
        /// Source file
        input: String,
    },

    /// Open an interactive, reversible stepping session
    Repl {
        /// Source file
        input: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run { input } => commands::run::execute(&input),
        Commands::Repl { input } => commands::repl::execute(&input),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
