//! LUDARENA CLI - tournament server for six board games
//!
//! ## Commands
//!
//! - `serve`: start the WebSocket coordinator and admin API
//! - `simulate`: run an offline bot-vs-bot tournament and print the result

mod serve;
mod simulate;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ludarena")]
#[command(version, about = "Realtime tournament coordinator for turn-based board games")]
#[command(long_about = "ludarena runs double-elimination tournaments of six deterministic \
    board games over a persistent bidirectional channel. The server validates every move, \
    drives computer players, and exposes an operator API for bracket management.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Random seed for bracket shuffles and bot play
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the WebSocket coordinator and admin API
    Serve(serve::ServeArgs),

    /// Run an offline bot-vs-bot tournament
    Simulate(simulate::SimulateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    initialize_logging(cli.verbose);

    dispatch_command(cli)
}

/// Initialize tracing/logging based on verbosity
fn initialize_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("ludarena=debug,info")
    } else {
        EnvFilter::new("ludarena=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Dispatch to the appropriate command handler
fn dispatch_command(cli: Cli) -> anyhow::Result<()> {
    let seed = cli.seed;

    match cli.command {
        Commands::Serve(args) => serve::run(args, seed),
        Commands::Simulate(args) => simulate::run(args, seed),
    }
}
