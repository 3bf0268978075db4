use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::env::LogFormat;
use crate::config::CliConfig;

/// Install the global subscriber. `RUST_LOG` wins over `level`; logs go to
/// stderr so stdout stays machine readable.
pub fn init_logging(level: &str, debug: bool, format: LogFormat) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
    .context("Failed to install tracing subscriber")?;

    Ok(())
}

pub struct LoadedConfig {
    pub config: CliConfig,
    pub path: PathBuf,
}

/// Default location of the configuration file
pub fn default_config_path() -> Result<PathBuf> {
    // Priority: ./config/wdactions.yaml > ~/.config/wdactions/config.yaml
    let local_config = PathBuf::from("config/wdactions.yaml");
    if local_config.exists() {
        return Ok(local_config);
    }
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push("wdactions");
    path.push("config.yaml");
    Ok(path)
}

/// Read the configuration file, falling back to defaults when it does not
/// exist. `WDACTIONS_*` environment overrides are applied on top.
pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    let mut config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .await
            .context("Failed to read config file")?;
        let config: CliConfig =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;
        info!("Loaded configuration from: {}", config_path.display());
        config
    } else {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        CliConfig::default()
    };
    config.actions = config.actions.with_env_overrides();

    Ok(LoadedConfig {
        config,
        path: config_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn explicit_path_is_parsed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level: debug\nactions:\n  platform: mac").unwrap();

        let loaded = load_config(Some(&file.path().to_path_buf())).await.unwrap();
        assert_eq!(loaded.config.log_level, "debug");
        assert_eq!(loaded.path, file.path());
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let loaded = load_config(Some(&path)).await.unwrap();
        assert_eq!(loaded.config.viewport, CliConfig::default().viewport);
    }

    #[tokio::test]
    async fn malformed_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "viewport: [1, 2").unwrap();

        assert!(load_config(Some(&file.path().to_path_buf())).await.is_err());
    }
}
