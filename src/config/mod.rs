//! Configuration system
//!
//! Handles TOML config file parsing and CLI argument merging.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::alerts::{AlertEngineConfig, DEFAULT_HISTORY_CAPACITY};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Alerting settings
    pub alerts: AlertsConfig,
}

impl Config {
    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alerts.max_history == 0 {
            return Err(ConfigError::InvalidValue {
                key: "alerts.max_history".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.alerts.stats_window_days == 0 {
            return Err(ConfigError::InvalidValue {
                key: "alerts.stats_window_days".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Engine configuration derived from this config
    pub fn engine_config(&self) -> AlertEngineConfig {
        AlertEngineConfig {
            max_history: self.alerts.max_history,
        }
    }
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,
    /// Directory for persisted rules, history and settings
    pub data_dir: Option<PathBuf>,
}

/// Alerting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// Maximum alerts to keep in history
    pub max_history: usize,
    /// Default window for `stats`
    pub stats_window_days: u32,
    /// Print live alerts to the terminal while watching
    pub notify_terminal: bool,
    /// Force colors on or off (auto-detected when unset)
    pub use_colors: Option<bool>,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_HISTORY_CAPACITY,
            stats_window_days: 7,
            notify_terminal: true,
            use_colors: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.alerts.max_history, 1000);
        assert_eq!(config.alerts.stats_window_days, 7);
        assert!(config.alerts.notify_terminal);
        assert!(config.general.data_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[alerts]\nmax_history = 50\n").unwrap();
        assert_eq!(config.alerts.max_history, 50);
        assert_eq!(config.alerts.stats_window_days, 7);
        assert_eq!(config.engine_config().max_history, 50);
    }

    #[test]
    fn test_validate_rejects_zero_history() {
        let mut config = Config::default();
        config.alerts.max_history = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
