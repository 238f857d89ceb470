//! Kindle CLI - headless runner for particle scenes

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{run, validate};

#[derive(Parser)]
#[command(name = "kindle")]
#[command(about = "Headless runner for Kindle particle scenes", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a scene, start its emitters and step it
    Run {
        /// Path to scene file (.toml or .json)
        scene: String,

        /// Number of frames to simulate
        #[arg(long, default_value = "600")]
        frames: u32,

        /// Seconds per frame
        #[arg(long, default_value = "0.016666668")]
        dt: f32,

        /// Print statistics every K frames
        #[arg(long, default_value = "60")]
        report_every: u32,

        /// Override the scene's random seed
        #[arg(long)]
        seed: Option<u32>,
    },

    /// Parse and build a scene without running it
    Validate {
        /// Path to scene file (.toml or .json)
        scene: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose > 0 {
        logger.filter_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    }
    logger.init();

    match cli.command {
        Commands::Run {
            scene,
            frames,
            dt,
            report_every,
            seed,
        } => run::run(run::RunArgs {
            scene,
            frames,
            dt,
            report_every,
            seed,
        }),
        Commands::Validate { scene } => validate::run(&scene),
    }
}
