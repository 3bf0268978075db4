use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};

use super::context::CliContext;
use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::{init_logging, load_config, LoadedConfig};

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    let LoadedConfig { config, path } = load_config(cli.config.as_ref()).await?;
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(level, cli.debug, cli.log_format)?;

    debug!("Starting wdactions v{}", env!("CARGO_PKG_VERSION"));
    let cli_context = CliContext::new(config, path);

    match dispatch(&cli, &cli_context).await {
        Ok(()) => {
            debug!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {}", err);
            Err(err)
        }
    }
}
