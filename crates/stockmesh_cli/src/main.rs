//! Stockmesh CLI
//!
//! Command-line tools for stockmesh.
//!
//! # Commands
//!
//! - `simulate` - Run a store/central pair in process and sync between them

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Stockmesh command-line tools.
#[derive(Parser)]
#[command(name = "stockmesh")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a store/central pair in process and sync between them
    Simulate {
        /// Number of products to provision
        #[arg(short, long, default_value_t = 3)]
        products: u32,

        /// Stock mutations to apply before each push
        #[arg(short, long, default_value_t = 6)]
        mutations: u32,

        /// Number of mutate-then-push cycles to run
        #[arg(short, long, default_value_t = 2)]
        cycles: u32,

        /// Keep a scheduled pusher running for this long afterwards (ms)
        #[arg(short, long, default_value_t = 0)]
        watch_ms: u64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let result = match cli.command {
        Commands::Simulate {
            products,
            mutations,
            cycles,
            watch_ms,
            format,
        } => commands::simulate::run(products, mutations, cycles, watch_ms, &format),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
