//! Galaxy Shooter - Development Tools

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "galaxy-tools")]
#[command(about = "Development tools for Galaxy Shooter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate data files
    Validate {
        /// Path to data directory
        #[arg(default_value = "assets/data")]
        path: String,
    },
    /// Run a headless scripted session and print a summary
    Simulate {
        /// Seed for the session's random generator
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Simulated seconds to run
        #[arg(long, default_value_t = 60)]
        seconds: u32,
        /// Data directory to load instead of the shipped defaults
        #[arg(long)]
        data: Option<PathBuf>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating data files in: {path}");
            match galaxy_tools::validate::validate_data_directory(Path::new(&path)) {
                Ok(()) => tracing::info!("Validation passed"),
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Simulate {
            seed,
            seconds,
            data,
            json,
        } => {
            let report = match galaxy_tools::simulate::simulate(seed, seconds, data.as_deref()) {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!("Simulation failed: {e}");
                    std::process::exit(1);
                }
            };
            if json {
                match report.to_json() {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        tracing::error!("{e}");
                        std::process::exit(1);
                    }
                }
            } else {
                print!("{}", report.to_text());
            }
        }
    }
}
