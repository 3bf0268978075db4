use serde::{Deserialize, Serialize};
use wd_actions::{ActionsConfig, Viewport};

/// Contents of `wdactions.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Used when neither `--log-level` nor `RUST_LOG` is given
    pub log_level: String,
    pub actions: ActionsConfig,
    /// Viewport of the recording host
    pub viewport: Viewport,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            actions: ActionsConfig::default(),
            viewport: Viewport::default(),
        }
    }
}
