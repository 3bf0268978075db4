//! Engine configuration

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{CenterMode, Platform};

/// Interval between interpolated pointer moves, roughly one 60Hz frame
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 17;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    /// Cadence of interpolated pointerMove samples
    pub sample_interval_ms: u64,
    /// `true` resolves element origins to the in-view centre point,
    /// `false` to legacy element coordinates
    pub spec_compat_pointer_origin: bool,
    pub platform: Platform,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            spec_compat_pointer_origin: true,
            platform: Platform::default(),
        }
    }
}

impl ActionsConfig {
    /// Defaults with `WDACTIONS_*` environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = env::var("WDACTIONS_SAMPLE_INTERVAL_MS") {
            match value.trim().parse::<u64>() {
                Ok(ms) => self.sample_interval_ms = ms,
                Err(err) => warn!(%value, ?err, "ignoring WDACTIONS_SAMPLE_INTERVAL_MS"),
            }
        }
        if let Ok(value) = env::var("WDACTIONS_SPEC_COMPAT_ORIGIN") {
            let lower = value.to_ascii_lowercase();
            self.spec_compat_pointer_origin = !matches!(lower.as_str(), "0" | "false" | "no" | "off");
        }
        if let Ok(value) = env::var("WDACTIONS_PLATFORM") {
            match Platform::parse(&value) {
                Some(platform) => self.platform = platform,
                None => warn!(%value, "ignoring unknown WDACTIONS_PLATFORM"),
            }
        }
        self.normalized()
    }

    /// Parse a YAML document; missing keys keep their defaults.
    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        let config: ActionsConfig = serde_yaml::from_str(raw)?;
        Ok(config.normalized())
    }

    pub fn from_yaml_file(path: &Path) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    }

    pub fn center_mode(&self) -> CenterMode {
        CenterMode::from_spec_compat(self.spec_compat_pointer_origin)
    }

    pub(crate) fn normalized(mut self) -> Self {
        if self.sample_interval_ms == 0 {
            warn!("sample_interval_ms must be positive; using 1ms");
            self.sample_interval_ms = 1;
        }
        self
    }
}
