//! Configuration management CLI commands.
//!
//! `config get`, `config set`, `config list` and `config path` read and
//! update the INI file selected by `--config` (or the default location).

use std::path::Path;

use clap::Subcommand;
use plumemap::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one setting
    Get {
        /// Setting name as section.key (e.g. weather.provider)
        key: String,
    },

    /// Change one setting and save the file
    Set {
        /// Setting name as section.key (e.g. geometry.projection_hours)
        key: String,

        /// New value
        value: String,
    },

    /// Print every setting grouped by section
    List,

    /// Print the configuration file location
    Path,
}

/// Runs a config subcommand against `path`, or the default file.
pub fn run(command: ConfigCommands, path: Option<&Path>) -> Result<(), CliError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);
    match command {
        ConfigCommands::Get { key } => run_get(&key, &path),
        ConfigCommands::Set { key, value } => run_set(&key, &value, &path),
        ConfigCommands::List => run_list(&path),
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'plumemap config list' to see available keys.",
            key
        ))
    })
}

/// Unreadable files fall back to defaults so a bad value can be overwritten.
fn load_lenient(path: &Path) -> ConfigFile {
    ConfigFile::load_from(path).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
        ConfigFile::default()
    })
}

fn run_get(key: &str, path: &Path) -> Result<(), CliError> {
    let key = parse_key(key)?;
    let value = key.get(&load_lenient(path));
    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn run_set(key: &str, value: &str, path: &Path) -> Result<(), CliError> {
    let key = parse_key(key)?;
    let mut config = load_lenient(path);
    key.set(&mut config, value)?;
    config.save_to(path)?;

    println!("Set {} = {}", key.name(), key.get(&config));
    Ok(())
}

fn run_list(path: &Path) -> Result<(), CliError> {
    let config = load_lenient(path);

    println!("{}", path.display());
    let mut current_section = "";
    for key in ConfigKey::all() {
        if key.section() != current_section {
            current_section = key.section();
            println!();
            println!("[{}]", current_section);
        }

        let value = key.get(&config);
        if value.is_empty() {
            println!("  {} = (not set)", key.key_name());
        } else {
            println!("  {} = {}", key.key_name(), value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plumemap::provider::ProviderKind;
    use tempfile::TempDir;

    #[test]
    fn test_set_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        run(
            ConfigCommands::Set {
                key: "weather.provider".into(),
                value: "nws".into(),
            },
            Some(&path),
        )
        .unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.weather.provider, ProviderKind::Nws);
    }

    #[test]
    fn test_set_rejects_invalid_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        let result = run(
            ConfigCommands::Set {
                key: "geometry.projection_hours".into(),
                value: "-2".into(),
            },
            Some(&path),
        );
        assert!(matches!(result, Err(CliError::Config(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_unknown_key() {
        let result = run(
            ConfigCommands::Get {
                key: "cache.directory".into(),
            },
            None,
        );
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
