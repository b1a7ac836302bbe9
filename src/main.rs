use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "mlquest")]
#[command(about = "Track learner progress, XP, levels, streaks and rewards for the ML course")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.mlquest/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record progress on a unit (queued offline if the store is unreachable)
    Record {
        learner: String,
        unit: String,

        /// Progress in percent (0-100); use --completed to finish the unit
        #[arg(short, long, default_value_t = 0)]
        percentage: u32,

        /// Mark the unit as completed
        #[arg(long)]
        completed: bool,
    },

    /// Show a learner's XP, level, streak and rewards
    Profile {
        learner: String,

        /// Compute completion over this chapter or track
        #[arg(long)]
        scope: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Restart a unit from zero
    Reset { learner: String, unit: String },

    /// List learning units
    Units {
        /// Only units in this chapter or track
        #[arg(long)]
        scope: Option<String>,
    },

    /// List badges and superpowers
    Rewards,

    /// Replay queued offline progress
    Sync {
        /// Only replay entries of this learner
        learner: Option<String>,
    },

    /// Write a default ~/.mlquest/config.toml and catalog
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Record {
            learner,
            unit,
            percentage,
            completed,
        } => {
            cli::record::record_command(config_path, &learner, &unit, percentage, completed)
                .await?;
        }
        Commands::Profile {
            learner,
            scope,
            json,
        } => {
            cli::profile::profile_command(config_path, &learner, scope.as_deref(), json).await?;
        }
        Commands::Reset { learner, unit } => {
            cli::record::reset_command(config_path, &learner, &unit).await?;
        }
        Commands::Units { scope } => {
            cli::catalog::units_command(config_path, scope.as_deref())?;
        }
        Commands::Rewards => {
            cli::catalog::rewards_command(config_path)?;
        }
        Commands::Sync { learner } => {
            cli::record::sync_command(config_path, learner.as_deref()).await?;
        }
        Commands::Init { force } => {
            cli::init::init_command(force)?;
        }
    }

    Ok(())
}
