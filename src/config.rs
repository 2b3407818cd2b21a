//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub patterns: PatternConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Progress and timing behaviour of analysis runs
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Interval between progress events (ms)
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Minimum optimistic progress added per `optimistic_interval_ms` (percentage points)
    #[serde(default = "default_optimistic_step")]
    pub optimistic_step: f64,

    #[serde(default = "default_optimistic_interval")]
    pub optimistic_interval_ms: u64,

    /// How far optimistic progress may run ahead of real progress (percentage points)
    #[serde(default = "default_max_optimistic_lead")]
    pub max_optimistic_lead: f64,

    /// Optimistic progress never passes this until the run completes
    #[serde(default = "default_optimistic_ceiling")]
    pub optimistic_ceiling: f64,

    /// Completed run durations kept for estimates
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Estimate per entry when no run has completed yet (ms)
    #[serde(default = "default_per_entry_estimate")]
    pub per_entry_estimate_ms: u64,

    /// Lower bound for the fallback estimate (ms)
    #[serde(default = "default_min_estimate")]
    pub min_estimate_ms: u64,

    /// Remaining time reported once a run outlasts its estimate (ms)
    #[serde(default = "default_overrun_buffer")]
    pub overrun_buffer_ms: u64,

    /// Capacity of the progress event channel
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_tick_interval() -> u64 {
    50
}

fn default_optimistic_step() -> f64 {
    1.0
}

fn default_optimistic_interval() -> u64 {
    500
}

fn default_max_optimistic_lead() -> f64 {
    15.0
}

fn default_optimistic_ceiling() -> f64 {
    95.0
}

fn default_history_size() -> usize {
    5
}

fn default_per_entry_estimate() -> u64 {
    15
}

fn default_min_estimate() -> u64 {
    800
}

fn default_overrun_buffer() -> u64 {
    1000
}

fn default_event_capacity() -> usize {
    256
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            optimistic_step: default_optimistic_step(),
            optimistic_interval_ms: default_optimistic_interval(),
            max_optimistic_lead: default_max_optimistic_lead(),
            optimistic_ceiling: default_optimistic_ceiling(),
            history_size: default_history_size(),
            per_entry_estimate_ms: default_per_entry_estimate(),
            min_estimate_ms: default_min_estimate(),
            overrun_buffer_ms: default_overrun_buffer(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl AnalysisConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn optimistic_interval(&self) -> Duration {
        Duration::from_millis(self.optimistic_interval_ms.max(1))
    }

    pub fn overrun_buffer(&self) -> Duration {
        Duration::from_millis(self.overrun_buffer_ms)
    }

    /// Fallback estimate when no run history exists
    pub fn fallback_estimate(&self, entry_count: usize) -> Duration {
        let per_entry = self.per_entry_estimate_ms.saturating_mul(entry_count as u64);
        Duration::from_millis(per_entry.max(self.min_estimate_ms))
    }
}

/// Pattern discovery tuning
#[derive(Debug, Clone, Deserialize)]
pub struct PatternConfig {
    /// Phrases processed between abort checks
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Minimum cosine similarity for a phrase to join a deep-mode cluster
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    #[serde(default = "default_max_main_patterns")]
    pub max_main_patterns: usize,

    #[serde(default = "default_max_sub_patterns")]
    pub max_sub_patterns: usize,

    /// Examples kept on each sub-pattern
    #[serde(default = "default_max_examples")]
    pub max_examples: usize,
}

fn default_chunk_size() -> usize {
    25
}

fn default_similarity_threshold() -> f64 {
    0.3
}

fn default_max_main_patterns() -> usize {
    8
}

fn default_max_sub_patterns() -> usize {
    5
}

fn default_max_examples() -> usize {
    3
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            similarity_threshold: default_similarity_threshold(),
            max_main_patterns: default_max_main_patterns(),
            max_sub_patterns: default_max_sub_patterns(),
            max_examples: default_max_examples(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("energylog").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(tick) = std::env::var("ENERGYLOG_TICK_INTERVAL_MS") {
            if let Ok(t) = tick.parse() {
                self.analysis.tick_interval_ms = t;
            }
        }
        if let Ok(chunk) = std::env::var("ENERGYLOG_CHUNK_SIZE") {
            if let Ok(c) = chunk.parse() {
                self.patterns.chunk_size = c;
            }
        }
        if let Ok(threshold) = std::env::var("ENERGYLOG_SIMILARITY_THRESHOLD") {
            if let Ok(t) = threshold.parse() {
                self.patterns.similarity_threshold = t;
            }
        }

        if let Ok(level) = std::env::var("ENERGYLOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("ENERGYLOG_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Energylog Configuration
#
# Environment variables override these settings:
# - ENERGYLOG_TICK_INTERVAL_MS
# - ENERGYLOG_CHUNK_SIZE
# - ENERGYLOG_SIMILARITY_THRESHOLD
# - ENERGYLOG_LOG_LEVEL
# - ENERGYLOG_LOG_FORMAT

[analysis]
# Interval between progress events (ms)
tick_interval_ms = 50

# Optimistic progress: at least `optimistic_step` points every `optimistic_interval_ms`
optimistic_step = 1.0
optimistic_interval_ms = 500

# Optimistic progress stays within this many points of real progress
max_optimistic_lead = 15.0

# Optimistic progress never passes this before the run completes
optimistic_ceiling = 95.0

# Completed run durations kept for time estimates
history_size = 5

# Estimate used before any run has completed: per entry (ms), with a floor (ms)
per_entry_estimate_ms = 15
min_estimate_ms = 800

# Remaining time reported once a run outlasts its estimate (ms)
overrun_buffer_ms = 1000

# Capacity of the progress event channel
event_capacity = 256

[patterns]
# Phrases processed between abort checks
chunk_size = 25

# Minimum cosine similarity for a phrase to join a deep-mode cluster
similarity_threshold = 0.3

# Limits on returned patterns
max_main_patterns = 8
max_sub_patterns = 5

# Examples kept on each sub-pattern
max_examples = 3

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
