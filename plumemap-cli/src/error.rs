//! CLI error type.

use std::fmt;

use plumemap::config::ConfigError;
use plumemap::model::ModelError;
use plumemap::provider::ProviderError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded, parsed or saved.
    Config(String),
    /// Logging could not be initialized.
    Logging(String),
    /// The async runtime could not be started.
    Runtime(String),
    /// HTTP client could not be built or a provider request failed.
    Provider(ProviderError),
    /// No weather could be applied for the requested location.
    Weather(String),
    /// The dispersion model service failed.
    Model(ModelError),
    /// An input file could not be read or parsed.
    Input(String),
    /// Output could not be serialized.
    Output(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Logging(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Runtime(msg) => write!(f, "Failed to start async runtime: {}", msg),
            CliError::Provider(e) => write!(f, "Weather provider error: {}", e),
            CliError::Weather(msg) => write!(f, "Weather unavailable: {}", msg),
            CliError::Model(e) => write!(f, "Dispersion model error: {}", e),
            CliError::Input(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Provider(e)
    }
}

impl From<ModelError> for CliError {
    fn from(e: ModelError) -> Self {
        CliError::Model(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e)
    }
}
