//! Configuration loading and typed config structures for a Hustings run.
//!
//! The canonical configuration lives in `hustings-config.yaml` at the project
//! root. Every section is optional: an empty file, or no file at all, gives
//! the reference run. The actor tunables sit at the top level of the file
//! next to the run-level sections below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use hustings_agents::{AgentError, Tunables};

/// Environment variable that overrides the configured seed.
pub const SEED_ENV: &str = "HUSTINGS_SEED";

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

    /// The seed override is not an unsigned integer.
    #[error("{SEED_ENV}={value} is not a valid seed")]
    InvalidSeed {
        /// The rejected value.
        value: String,
    },

    /// A value is out of range.
    #[error("invalid configuration: {source}")]
    Invalid {
        /// The underlying validation error.
        #[from]
        source: AgentError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Master seed (default: 42).
    pub seed: u64,

    /// Ticks, phases, and wall-clock limits.
    pub schedule: ScheduleConfig,

    /// Social graph generation.
    pub graph: GraphConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Report output.
    pub report: ReportConfig,

    /// Actor tunables.
    #[serde(flatten)]
    pub agents: Tunables,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            schedule: ScheduleConfig::default(),
            graph: GraphConfig::default(),
            logging: LoggingConfig::default(),
            report: ReportConfig::default(),
            agents: Tunables::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `HUSTINGS_SEED` overrides `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidSeed`] if the override does not parse.
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
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Same as [`SimulationConfig::from_file`].
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            info!(path = %path.display(), "config file not found, using defaults");
            let mut config = Self::default();
            config.apply_env_overrides()?;
            Ok(config)
        }
    }

    /// Reject values that would make a run meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.agents.validate()?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var(SEED_ENV) {
            self.seed = value
                .trim()
                .parse()
                .map_err(|_err| ConfigError::InvalidSeed { value })?;
        }
        Ok(())
    }
}

/// Ticks and timing.
///
/// The campaign starts the tick after selection and election day follows
/// the last campaign tick, so three numbers fix the whole cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Tick at which candidates are chosen (default: 10).
    pub selection_tick: u64,
    /// Campaign ticks after selection (default: 40).
    pub campaign_length: u64,
    /// Campaign ticks between digests (default: 10).
    pub report_interval: u64,
    /// Real-time milliseconds the actor runtime sleeps between ticks (default: 5).
    pub tick_interval_ms: u64,
    /// Milliseconds the actor runtime waits for a reply before moving on (default: 2000).
    pub reply_timeout_ms: u64,
    /// Wall-clock seconds before the actor runtime gives up (default: 300).
    pub max_real_time_seconds: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            selection_tick: 10,
            campaign_length: 40,
            report_interval: 10,
            tick_interval_ms: 5,
            reply_timeout_ms: 2000,
            max_real_time_seconds: 300,
        }
    }
}

/// Watts-Strogatz parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Neighbors per citizen in the ring lattice, even (default: 6).
    pub degree: u32,
    /// Chance each lattice edge is rewired (default: 0.1).
    pub rewire_probability: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            degree: 6,
            rewire_probability: 0.1,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (default: `info`).
    pub level: String,
    /// Emit JSON lines instead of human-readable output (default: false).
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

/// Where the election report goes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// JSON report path; no report is written when unset.
    pub path: Option<PathBuf>,
}
