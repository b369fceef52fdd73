//! Command-line frontend for the Zweikampf duel engine.

mod commands;
mod surface;

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "zk",
    about = "Zweikampf — a two-player item duel engine",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a complete duel between two generated rosters
    Simulate {
        /// RNG seed for a deterministic duel
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Items per roster (capped at the roster limit)
        #[arg(short, long, default_value = "3")]
        roster: usize,

        /// Narrate at full pacing instead of instantly
        #[arg(long)]
        paced: bool,

        /// Print the final report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Resolve a single 1v1 fight between two hand-rolled items
    Fight {
        /// Attack stat of the first item
        #[arg(long, default_value = "10")]
        attack_a: u32,

        /// Health stat of the first item
        #[arg(long, default_value = "50")]
        health_a: u32,

        /// Attack stat of the second item
        #[arg(long, default_value = "10")]
        attack_b: u32,

        /// Health stat of the second item
        #[arg(long, default_value = "50")]
        health_b: u32,

        /// RNG seed for a deterministic fight
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Simulate {
            seed,
            roster,
            paced,
            json,
        } => commands::simulate::run(seed, roster, paced, json).await,
        Commands::Fight {
            attack_a,
            health_a,
            attack_b,
            health_b,
            seed,
        } => commands::fight::run(attack_a, health_a, attack_b, health_b, seed),
    };

    if let Err(message) = result {
        eprintln!("Error: {message}");
        process::exit(1);
    }
}
