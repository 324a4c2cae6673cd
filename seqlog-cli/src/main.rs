use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod sink;

#[derive(Parser)]
#[command(name = "seqlog", about = "Bounded event log with a tailing consumer")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with [log] and [tail] tables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Park two long-poll fetches and release them by cancelling the log
    Demo,
    /// Publish events and tail them into stdout as JSON lines
    Tail(commands::tail::TailArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Demo => commands::demo::run().await,
        Commands::Tail(args) => commands::tail::run(args, &config).await,
    }
}
