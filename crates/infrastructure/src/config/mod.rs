//! Configuration loading.
//!
//! Configuration comes from a YAML or JSON file, with environment
//! variables taking precedence:
//! - `TEMPORA_MAX_SKEW_MS`: maximum tolerated clock skew between services
//! - `TEMPORA_REGRESSION_WARN_MS`: wall-clock regression size logged at `warn`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempora_application::ports::Clock;
use tempora_application::{DEFAULT_REGRESSION_WARN_MS, MonotonicClock, OrderingValidator};
use tempora_domain::SkewTolerance;
use tracing::debug;

/// Environment variable overriding [`SkewSettings::max_skew_ms`].
pub const ENV_MAX_SKEW_MS: &str = "TEMPORA_MAX_SKEW_MS";

/// Environment variable overriding [`SkewSettings::regression_warn_ms`].
pub const ENV_REGRESSION_WARN_MS: &str = "TEMPORA_REGRESSION_WARN_MS";

/// Default maximum clock skew between services, in milliseconds.
pub const DEFAULT_MAX_SKEW_MS: u64 = 5_000;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The YAML document is invalid.
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The JSON document is invalid.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension is neither YAML nor JSON.
    #[error("unsupported configuration format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// An environment override is not a non-negative integer.
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv {
        /// Variable name.
        key: &'static str,
        /// Rejected value.
        value: String,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporaConfig {
    /// Clock and skew settings.
    pub skew: SkewSettings,
}

/// Clock and skew settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkewSettings {
    /// Maximum tolerated inversion between two services' timestamps.
    pub max_skew_ms: u64,
    /// Wall-clock regressions larger than this are logged at `warn`.
    pub regression_warn_ms: u64,
}

impl Default for SkewSettings {
    fn default() -> Self {
        Self {
            max_skew_ms: DEFAULT_MAX_SKEW_MS,
            regression_warn_ms: DEFAULT_REGRESSION_WARN_MS,
        }
    }
}

impl SkewSettings {
    /// Returns the configured skew tolerance.
    #[must_use]
    pub const fn tolerance(&self) -> SkewTolerance {
        SkewTolerance::from_millis(self.max_skew_ms)
    }

    /// Builds an ordering validator bound to the configured tolerance.
    #[must_use]
    pub const fn validator(&self) -> OrderingValidator {
        OrderingValidator::new(self.tolerance())
    }

    /// Builds a monotonic clock over `source` with the configured
    /// regression warning threshold.
    #[must_use]
    pub fn monotonic_clock<C: Clock>(&self, source: C) -> MonotonicClock<C> {
        MonotonicClock::new(source).with_regression_warning(self.regression_warn_ms)
    }
}

impl TemporaConfig {
    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid YAML for this type.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON for this type.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the default configuration with environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if an override variable is set but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if an override variable is set but unparsable.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`, which maps a variable name
    /// to its value if set.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is set but is not a non-negative integer.
    pub fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = parse_override(&lookup, ENV_MAX_SKEW_MS)? {
            self.skew.max_skew_ms = value;
        }
        if let Some(value) = parse_override(&lookup, ENV_REGRESSION_WARN_MS)? {
            self.skew.regression_warn_ms = value;
        }
        Ok(())
    }
}

fn parse_override(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let value = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidEnv { key, value: raw.clone() })?;
    debug!(key, value, "applied configuration override");
    Ok(Some(value))
}

/// Loads configuration from `path`, choosing the format by extension
/// (`.yml`/`.yaml` or `.json`), then applies environment overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, the extension is
/// not recognized, or an environment override is invalid.
pub fn load_config(path: &Path) -> Result<TemporaConfig, ConfigError> {
    let mut config = read_config_file(path)?;
    config.apply_env_overrides()?;
    Ok(config)
}

/// Like [`load_config`], but falls back to defaults when `path` does not
/// exist.
///
/// # Errors
///
/// Returns an error if an existing file cannot be read or parsed, or an
/// environment override is invalid.
pub fn load_config_or_default(path: &Path) -> Result<TemporaConfig, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "no configuration file, using defaults");
        return TemporaConfig::from_env();
    }
    load_config(path)
}

fn read_config_file(path: &Path) -> Result<TemporaConfig, ConfigError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let parse: fn(&str) -> Result<TemporaConfig, ConfigError> = match extension.as_deref() {
        Some("yml" | "yaml") => TemporaConfig::from_yaml_str,
        Some("json") => TemporaConfig::from_json_str,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&contents)?;
    debug!(path = %path.display(), max_skew_ms = config.skew.max_skew_ms, "loaded configuration");
    Ok(config)
}
