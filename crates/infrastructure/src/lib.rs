//! Tempora Infrastructure - Adapters and implementations
//!
//! This crate provides the system wall clock behind the application's
//! clock port, and configuration loading for the skew and clock settings.

pub mod adapters;
pub mod config;

pub use adapters::SystemClock;
pub use config::{
    ConfigError, DEFAULT_MAX_SKEW_MS, ENV_MAX_SKEW_MS, ENV_REGRESSION_WARN_MS, SkewSettings,
    TemporaConfig, load_config, load_config_or_default,
};
