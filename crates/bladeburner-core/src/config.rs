//! Configuration loading and typed config structures for the division engine.
//!
//! The canonical configuration lives in `bladeburner-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads and validates the file.
//! Every section has defaults, so an empty document is a valid config.

use std::path::{Path, PathBuf};

use bladeburner_actions::BalanceConfig;
use bladeburner_types::{CityName, StatBlock};
use bladeburner_world::EventConfig;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `bladeburner-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Division start-up settings.
    #[serde(default)]
    pub division: DivisionConfig,

    /// Tuned balance constants.
    #[serde(default)]
    pub balance: BalanceConfig,

    /// World event timing.
    #[serde(default)]
    pub events: EventConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Headless run parameters (used by the engine binary).
    #[serde(default)]
    pub run: RunConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

/// Division start-up settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DivisionConfig {
    /// City the division starts in.
    #[serde(default = "default_starting_city")]
    pub starting_city: CityName,

    /// Rank at division start.
    #[serde(default)]
    pub starting_rank: f64,

    /// World-difficulty multiplier on skill costs.
    #[serde(default = "default_skill_cost_multiplier")]
    pub skill_cost_multiplier: f64,

    /// Threshold-based action switching.
    #[serde(default)]
    pub automation: AutomationConfig,
}

impl Default for DivisionConfig {
    fn default() -> Self {
        Self {
            starting_city: default_starting_city(),
            starting_rank: 0.0,
            skill_cost_multiplier: default_skill_cost_multiplier(),
            automation: AutomationConfig::default(),
        }
    }
}

/// Automation settings. Actions are given by display name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AutomationConfig {
    /// Whether automation runs at all.
    #[serde(default)]
    pub enabled: bool,

    /// Action to switch to when stamina falls to `low_threshold`.
    #[serde(default)]
    pub low_action: Option<String>,

    /// Stamina at or below which the low action starts.
    #[serde(default)]
    pub low_threshold: f64,

    /// Action to switch to when stamina rises to `high_threshold`.
    #[serde(default)]
    pub high_action: Option<String>,

    /// Stamina at or above which the high action starts.
    #[serde(default)]
    pub high_threshold: f64,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Lines kept in the division activity log.
    #[serde(default = "default_activity_log_lines")]
    pub activity_log_lines: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            activity_log_lines: default_activity_log_lines(),
        }
    }
}

/// The operative simulated by a headless run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperativeConfig {
    /// Display name.
    #[serde(default = "default_operative_name")]
    pub name: String,

    /// Stat levels.
    #[serde(default = "default_operative_stats")]
    pub stats: StatBlock,

    /// Maximum HP.
    #[serde(default = "default_max_hp")]
    pub max_hp: f64,
}

impl Default for OperativeConfig {
    fn default() -> Self {
        Self {
            name: default_operative_name(),
            stats: default_operative_stats(),
            max_hp: default_max_hp(),
        }
    }
}

/// Parameters of a headless run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Simulated seconds to run.
    #[serde(default = "default_simulated_seconds")]
    pub simulated_seconds: u64,

    /// Host cycles fed to the division per update.
    #[serde(default = "default_cycles_per_update")]
    pub cycles_per_update: f64,

    /// Seconds between summary log lines.
    #[serde(default = "default_summary_interval_seconds")]
    pub summary_interval_seconds: u64,

    /// Action started at the beginning of the run.
    #[serde(default = "default_starting_action")]
    pub starting_action: String,

    /// The simulated operative.
    #[serde(default)]
    pub operative: OperativeConfig,

    /// Where to write a JSON snapshot when the run ends.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            simulated_seconds: default_simulated_seconds(),
            cycles_per_update: default_cycles_per_update(),
            summary_interval_seconds: default_summary_interval_seconds(),
            starting_action: default_starting_action(),
            operative: OperativeConfig::default(),
            snapshot_path: None,
        }
    }
}

const fn default_starting_city() -> CityName {
    CityName::Sector12
}

const fn default_skill_cost_multiplier() -> f64 {
    1.0
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_activity_log_lines() -> usize {
    500
}

fn default_operative_name() -> String {
    "Agent".to_owned()
}

const fn default_operative_stats() -> StatBlock {
    StatBlock::uniform(100.0)
}

const fn default_max_hp() -> f64 {
    100.0
}

const fn default_seed() -> u64 {
    42
}

const fn default_simulated_seconds() -> u64 {
    3600
}

const fn default_cycles_per_update() -> f64 {
    5.0
}

const fn default_summary_interval_seconds() -> u64 {
    600
}

fn default_starting_action() -> String {
    "Tracking".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.division.starting_city, CityName::Sector12);
        assert_eq!(config.balance.cycles_per_second, 5);
        assert_eq!(config.events.interval_min_seconds, 48);
        assert_eq!(config.logging.activity_log_lines, 500);
        assert_eq!(config.run.seed, 42);
        assert!(!config.division.automation.enabled);
    }

    #[test]
    fn empty_document_uses_defaults() {
        assert_eq!(SimulationConfig::parse("").unwrap(), SimulationConfig::default());
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = r#"
division:
  starting_city: "New Tokyo"
  starting_rank: 10
  automation:
    enabled: true
    low_action: "Hyperbolic Regeneration Chamber"
    low_threshold: 5
    high_action: "Tracking"
    high_threshold: 40

balance:
  chaos_threshold: 60

events:
  interval_min_seconds: 10
  interval_max_seconds: 20

logging:
  level: "debug"
  format: json

run:
  seed: 7
  simulated_seconds: 120
"#;
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.division.starting_city, CityName::NewTokyo);
        assert!((config.division.starting_rank - 10.0).abs() < f64::EPSILON);
        assert!(config.division.automation.enabled);
        assert_eq!(
            config.division.automation.low_action.as_deref(),
            Some("Hyperbolic Regeneration Chamber")
        );
        assert!((config.balance.chaos_threshold - 60.0).abs() < f64::EPSILON);
        assert_eq!(config.balance.max_seconds_per_update, 5);
        assert_eq!(config.events.interval_max_seconds, 20);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.run.seed, 7);
        assert_eq!(config.run.starting_action, "Tracking");
        assert!(config.run.snapshot_path.is_none());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = SimulationConfig::parse("division: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("bladeburner-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = SimulationConfig::from_file(Path::new("/nonexistent/bladeburner.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
