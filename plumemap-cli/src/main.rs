//! plumemap CLI
//!
//! Command-line front end for the plumemap dispersion engine. Every
//! geometry command prints JSON on stdout; logs and progress go to stderr.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use plumemap::config::ConfigFile;
use plumemap::logging;

use commands::config::ConfigCommands;
use commands::geometry::{GeometryArgs, SceneArgs};
use commands::markers::MarkersArgs;
use commands::model::ModelArgs;
use commands::weather::WeatherArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "plumemap", version, about = "Geospatial dispersion visualization engine")]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch current weather for a location
    Weather(WeatherArgs),

    /// Build the downwind hazard corridor
    Corridor(GeometryArgs),

    /// Build time-of-arrival rings
    Rings(GeometryArgs),

    /// Build corridor, rings and markers in one scene
    Scene(SceneArgs),

    /// Map a model result onto styled concentration markers
    Markers(MarkersArgs),

    /// Run the dispersion model service
    Model(ModelArgs),

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", console::style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Loads config and installs logging on the main thread, then hands the
/// command to a multi-threaded runtime.
fn run(cli: Cli) -> Result<(), CliError> {
    if let Commands::Config { command } = cli.command {
        return commands::config::run(command, cli.config.as_deref());
    }

    let config = commands::common::load_config(cli.config.as_deref())?;

    let mut logging_config = config.logging.clone();
    if cli.verbose {
        logging_config = logging_config.with_level("debug");
    }
    let _guard = logging::init(&logging_config).map_err(|e| CliError::Logging(e.to_string()))?;
    tracing::debug!(version = plumemap::VERSION, "plumemap starting");

    let runtime =
        tokio::runtime::Runtime::new().map_err(|e| CliError::Runtime(e.to_string()))?;
    runtime.block_on(dispatch(cli.command, &config))
}

async fn dispatch(command: Commands, config: &ConfigFile) -> Result<(), CliError> {
    match command {
        Commands::Weather(args) => commands::weather::run(args, config).await,
        Commands::Corridor(args) => commands::geometry::run_corridor(args, config).await,
        Commands::Rings(args) => commands::geometry::run_rings(args, config).await,
        Commands::Scene(args) => commands::geometry::run_scene(args, config).await,
        Commands::Markers(args) => commands::markers::run(args, config),
        Commands::Model(args) => commands::model::run(args, config).await,
        Commands::Config { .. } => Ok(()),
    }
}
