use ir_core::export::SpritesheetOptions;
use ir_core::logging::{LogConfig, LogLevel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Layer indices to render; all non-window layers when unset
    pub layers: Option<Vec<usize>>,
    pub spritesheet: SpritesheetOptions,
    /// Decoder log level (`off`, `error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
    /// Messages per second per log category
    pub log_rate_limit: usize,
    /// `render --diff` and `diff` fail when the mismatch exceeds this percentage
    pub fail_above_percent: Option<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            layers: None,
            spritesheet: SpritesheetOptions::default(),
            log_level: "off".to_string(),
            log_rate_limit: 60,
            fail_above_percent: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults on error.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!(
                        "Failed to parse {}: {}. Using defaults.",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    /// Apply the decoder log level and rate limit to the global `LogConfig`.
    pub fn apply_logging(&self) {
        let config = LogConfig::global();
        match LogLevel::from_str(&self.log_level) {
            Some(level) => config.set_global_level(level),
            None => log::warn!("Unknown log level '{}', keeping decoder logs off", self.log_level),
        }
        config.set_rate_limit(self.log_rate_limit);
    }

    /// Whether a diff percentage breaks the configured threshold.
    pub fn exceeds_threshold(&self, percent: f64) -> bool {
        self.fail_above_percent
            .map_or(false, |limit| percent > limit)
    }
}
