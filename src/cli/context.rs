use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::CliConfig;

pub struct CliContext {
    config: Arc<CliConfig>,
    config_path: PathBuf,
}

impl CliContext {
    pub fn new(config: CliConfig, config_path: PathBuf) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
        }
    }

    pub fn config(&self) -> &CliConfig {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
