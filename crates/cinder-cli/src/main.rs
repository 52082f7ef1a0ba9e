//! Cinder CLI - Command-line interface for the Cinder particle engine

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, run, scenarios};

#[derive(Parser)]
#[command(name = "cinder")]
#[command(about = "Headless driver for the Cinder particle simulation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario headless and print per-frame statistics
    Run {
        /// Built-in scenario name or path to a scenario TOML file
        #[arg(default_value = "fire")]
        scenario: String,

        /// Number of frames to simulate
        #[arg(long, default_value = "300")]
        frames: u64,

        /// Seconds per frame
        #[arg(long, default_value = "0.016666668")]
        dt: f32,

        /// Override the scenario's random seed
        #[arg(long)]
        seed: Option<u32>,

        /// Hold the emit signal (turns on gated emitters such as the hose)
        #[arg(long)]
        emit: bool,

        /// View direction (comma-separated x,y,z)
        #[arg(long, value_parser = parse_vec3)]
        view: Option<[f32; 3]>,

        /// Viewer position (comma-separated x,y,z)
        #[arg(long, value_parser = parse_vec3)]
        eye: Option<[f32; 3]>,

        /// Print a report every N frames (0 = summary only)
        #[arg(long, default_value = "30")]
        report_every: u64,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Parse and validate a scenario file
    Check {
        /// Path to scenario TOML file
        scenario: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// List the built-in scenarios
    Scenarios,
}

fn parse_vec3(s: &str) -> Result<[f32; 3], String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("expected 3 comma-separated values, got {}", parts.len()));
    }
    let x: f32 = parts[0].trim().parse().map_err(|e| format!("invalid x: {}", e))?;
    let y: f32 = parts[1].trim().parse().map_err(|e| format!("invalid y: {}", e))?;
    let z: f32 = parts[2].trim().parse().map_err(|e| format!("invalid z: {}", e))?;
    Ok([x, y, z])
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario,
            frames,
            dt,
            seed,
            emit,
            view,
            eye,
            report_every,
            format,
        } => run::run(run::RunArgs {
            scenario,
            frames,
            dt,
            seed,
            emit,
            view,
            eye,
            report_every,
            format,
        }),
        Commands::Check { scenario, format } => check::run(&scenario, &format),
        Commands::Scenarios => scenarios::run(),
    }
}
