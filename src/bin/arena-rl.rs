//! arena-rl CLI - offline tooling for the arena learning agents
//!
//! This CLI provides a unified interface for:
//! - Training feed-forward networks on the XOR benchmark
//! - Distilling a learned lookup table into a network
//! - Summarising and converting saved lookup tables

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arena-rl")]
#[command(version, about = "Offline tooling for arena learning agents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train networks on the XOR patterns
    Xor(arena_rl::cli::commands::xor::XorArgs),

    /// Fit a network to a saved lookup table
    Distill(arena_rl::cli::commands::distill::DistillArgs),

    /// Summarise or convert a saved lookup table
    Table(arena_rl::cli::commands::table::TableArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Xor(args) => arena_rl::cli::commands::xor::execute(args),
        Commands::Distill(args) => arena_rl::cli::commands::distill::execute(args),
        Commands::Table(args) => arena_rl::cli::commands::table::execute(args),
    }
}
