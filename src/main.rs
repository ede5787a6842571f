use clap::{Parser, Subcommand};
use std::path::Path;

use rebellion::cli::{commands, init_tracing};
use rebellion::config::simulation::SimulationConfig;

#[derive(Parser)]
#[command(name = "rebellion")]
#[command(about = "An agent-based civil unrest simulation with grievance-driven rebels and patrolling cops")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation
    Run {
        /// Seed for the random stream (overrides model.seed)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Stop after this many ticks (overrides max_ticks)
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Do not print the grid each tick
        #[arg(long)]
        no_render: bool,
    },

    /// Validate the configuration and show the initial population
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match SimulationConfig::from_file(Path::new(&cli.config)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config);

    match cli.command {
        Commands::Run {
            seed,
            ticks,
            no_render,
        } => {
            let options = commands::RunOptions {
                seed,
                ticks,
                no_render,
            };
            if let Err(e) = commands::run_simulation(&config, &options).await {
                eprintln!("Simulation error: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Check => {
            if let Err(e) = commands::check(&config) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
