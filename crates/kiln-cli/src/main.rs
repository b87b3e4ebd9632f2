//! Kiln CLI - Command-line interface for the Kiln runtime

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check_config, run};

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Frame lifecycle runtime with a headless demo driver", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a headless application with a demo material
    Run {
        /// Path to a TOML config file
        #[arg(long)]
        config: Option<String>,

        /// Number of frames to run after start
        #[arg(long, default_value = "120")]
        frames: u32,

        /// Simulated display refresh rate
        #[arg(long, default_value = "60")]
        fps: f64,

        /// Maximum texture loads completed per frame (0 = unlimited)
        #[arg(long, default_value = "1")]
        loads_per_frame: usize,
    },

    /// Validate a config file
    CheckConfig {
        /// Path to the TOML config file
        path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            frames,
            fps,
            loads_per_frame,
        } => run::run(run::RunArgs {
            config,
            frames,
            fps,
            loads_per_frame,
        }),
        Commands::CheckConfig { path } => check_config::run(&path),
    }
}
