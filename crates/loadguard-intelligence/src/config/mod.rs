// ABOUTME: Engine configuration for rolling windows, thresholds, weights, and batch behaviour
// ABOUTME: Loads defaults, optional JSON file, and environment overrides, then validates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

//! Engine Configuration Module
//!
//! A single immutable [`LoadRiskConfig`] is built once at startup and passed
//! explicitly (usually as `Arc<LoadRiskConfig>`) to every component. There is
//! no global instance.
//!
//! Load order: defaults, then the JSON file named by `LOADGUARD_CONFIG_FILE`
//! (if set), then individual `LOADGUARD_*` environment overrides, then
//! [`LoadRiskConfig::validate`].

pub mod error;
pub mod thresholds;

pub use error::ConfigError;
pub use thresholds::{ThresholdConfig, ThresholdMetric, ThresholdTable, TierDirection};

use loadguard_core::constants::{baseline, batch, scales, windows};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Environment variable naming an optional JSON configuration file
pub const CONFIG_FILE_ENV: &str = "LOADGUARD_CONFIG_FILE";

/// Rolling window and gating settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Sessions in the acute window
    pub acute_sessions: usize,
    /// Sessions in the chronic window
    pub chronic_sessions: usize,
    /// Minimum sessions in a calendar week before metrics are stored
    pub min_sessions: usize,
    /// Floor applied to the chronic mean before dividing
    pub acwr_epsilon: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            acute_sessions: windows::DEFAULT_ACUTE_SESSIONS,
            chronic_sessions: windows::DEFAULT_CHRONIC_SESSIONS,
            min_sessions: windows::DEFAULT_MIN_SESSIONS,
            acwr_epsilon: windows::DEFAULT_ACWR_EPSILON,
        }
    }
}

/// Self-referential z-score baseline settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    /// Prior weeks required before z-scores leave neutral
    pub min_history_weeks: usize,
    /// Most recent prior weeks used as the baseline
    pub baseline_weeks: usize,
    /// |z| at which the explanation calls out the deviation
    pub z_score_alert: f64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            min_history_weeks: baseline::MIN_HISTORY_WEEKS,
            baseline_weeks: baseline::DEFAULT_BASELINE_WEEKS,
            z_score_alert: baseline::DEFAULT_Z_SCORE_ALERT,
        }
    }
}

/// Composite factor weights (re-normalised over the factors that have data)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeWeights {
    /// Monotony weight
    pub monotony: f64,
    /// Strain weight
    pub strain: f64,
    /// ACWR weight
    pub acwr: f64,
    /// Wellness weight
    pub wellness: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            monotony: 1.0,
            strain: 1.0,
            acwr: 1.0,
            wellness: 1.0,
        }
    }
}

impl CompositeWeights {
    fn as_array(&self) -> [f64; 4] {
        [self.monotony, self.strain, self.acwr, self.wellness]
    }
}

/// Bounded scales of upstream inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    /// Lowest valid effort rating
    pub min_rating: i32,
    /// Highest valid effort rating
    pub max_rating: i32,
    /// Lowest valid wellness score
    pub min_wellness: f64,
    /// Highest valid wellness score
    pub max_wellness: f64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            min_rating: i32::from(scales::MIN_EFFORT_RATING),
            max_rating: i32::from(scales::MAX_EFFORT_RATING),
            min_wellness: scales::MIN_WELLNESS_SCORE,
            max_wellness: scales::MAX_WELLNESS_SCORE,
        }
    }
}

/// Batch driver behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Athletes processed concurrently
    pub max_concurrent_athletes: usize,
    /// Persistence attempts per athlete-week
    pub max_persist_attempts: u32,
    /// First backoff delay; doubles on each retry
    pub initial_backoff_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_athletes: batch::DEFAULT_MAX_CONCURRENT_ATHLETES,
            max_persist_attempts: batch::DEFAULT_MAX_PERSIST_ATTEMPTS,
            initial_backoff_ms: batch::DEFAULT_INITIAL_BACKOFF_MS,
        }
    }
}

/// Main engine configuration container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadRiskConfig {
    /// Rolling windows and gating
    pub windows: WindowConfig,
    /// Z-score baseline
    pub baseline: BaselineConfig,
    /// Tier cut points
    pub thresholds: ThresholdConfig,
    /// Composite weights
    pub weights: CompositeWeights,
    /// Input scales
    pub scales: ScaleConfig,
    /// Batch driver
    pub batch: BatchConfig,
}

impl LoadRiskConfig {
    /// Load configuration from file and environment, then validate
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, an environment
    /// variable holds an invalid value, or validation fails
    pub fn load() -> Result<Self, ConfigError> {
        let config = match env::var(CONFIG_FILE_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        let config = config.apply_env_overrides()?;
        config.validate()?;
        debug!(?config, "Engine configuration loaded");
        Ok(config)
    }

    /// Parse a JSON configuration file; missing sections use defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Parse a JSON configuration document; missing sections use defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON for this schema
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate every section
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.windows;
        if w.acute_sessions == 0 {
            return Err(ConfigError::InvalidRange("acute_sessions must be > 0"));
        }
        if w.chronic_sessions < w.acute_sessions {
            return Err(ConfigError::InvalidRange(
                "chronic_sessions must be >= acute_sessions",
            ));
        }
        if w.min_sessions == 0 {
            return Err(ConfigError::InvalidRange("min_sessions must be > 0"));
        }
        if !(w.acwr_epsilon.is_finite() && w.acwr_epsilon > 0.0) {
            return Err(ConfigError::ValueOutOfRange(
                "acwr_epsilon must be finite and > 0",
            ));
        }

        let b = &self.baseline;
        if b.min_history_weeks < 2 {
            return Err(ConfigError::InvalidRange(
                "min_history_weeks must be >= 2 for a sample stdev",
            ));
        }
        if b.baseline_weeks < b.min_history_weeks {
            return Err(ConfigError::InvalidRange(
                "baseline_weeks must be >= min_history_weeks",
            ));
        }
        if !(b.z_score_alert.is_finite() && b.z_score_alert > 0.0) {
            return Err(ConfigError::ValueOutOfRange(
                "z_score_alert must be finite and > 0",
            ));
        }

        self.thresholds.validate()?;

        let weights = self.weights.as_array();
        if weights.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::InvalidWeights(
                "weights must be finite and non-negative",
            ));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(ConfigError::InvalidWeights(
                "at least one weight must be positive",
            ));
        }

        let s = &self.scales;
        if s.min_rating < 0 || s.min_rating >= s.max_rating {
            return Err(ConfigError::InvalidRange(
                "rating scale must satisfy 0 <= min_rating < max_rating",
            ));
        }
        if !(s.min_wellness.is_finite()
            && s.max_wellness.is_finite()
            && s.min_wellness < s.max_wellness)
        {
            return Err(ConfigError::InvalidRange(
                "wellness scale must satisfy min_wellness < max_wellness",
            ));
        }

        if self.batch.max_concurrent_athletes == 0 {
            return Err(ConfigError::InvalidRange(
                "max_concurrent_athletes must be > 0",
            ));
        }
        if self.batch.max_persist_attempts == 0 {
            return Err(ConfigError::InvalidRange(
                "max_persist_attempts must be > 0",
            ));
        }

        Ok(())
    }

    /// Helper function to parse and apply an environment variable override
    fn apply_env_var<T: FromStr>(env_var_name: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Ok(val) = env::var(env_var_name) {
            *target = val
                .trim()
                .parse()
                .map_err(|_| ConfigError::Parse(format!("Invalid {env_var_name}")))?;
        }
        Ok(())
    }

    /// Parse a `lower,upper` pair into an existing table, keeping its direction
    fn apply_threshold_env(env_var_name: &str, table: &mut ThresholdTable) -> Result<(), ConfigError> {
        let Ok(val) = env::var(env_var_name) else {
            return Ok(());
        };
        let parse_err = || ConfigError::Parse(format!("Invalid {env_var_name}: expected lower,upper"));
        let (lower, upper) = val.split_once(',').ok_or_else(parse_err)?;
        table.lower = lower.trim().parse().map_err(|_| parse_err())?;
        table.upper = upper.trim().parse().map_err(|_| parse_err())?;
        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        Self::apply_env_var("LOADGUARD_ACUTE_WINDOW", &mut self.windows.acute_sessions)?;
        Self::apply_env_var("LOADGUARD_CHRONIC_WINDOW", &mut self.windows.chronic_sessions)?;
        Self::apply_env_var("LOADGUARD_MIN_SESSIONS", &mut self.windows.min_sessions)?;
        Self::apply_env_var("LOADGUARD_ACWR_EPSILON", &mut self.windows.acwr_epsilon)?;

        Self::apply_env_var(
            "LOADGUARD_BASELINE_WEEKS",
            &mut self.baseline.baseline_weeks,
        )?;
        Self::apply_env_var("LOADGUARD_Z_SCORE_ALERT", &mut self.baseline.z_score_alert)?;

        for metric in ThresholdMetric::ALL {
            let name = format!(
                "LOADGUARD_{}_THRESHOLDS",
                metric.as_str().to_ascii_uppercase()
            );
            Self::apply_threshold_env(&name, self.thresholds.table_mut(metric))?;
        }

        Self::apply_env_var(
            "LOADGUARD_MAX_CONCURRENCY",
            &mut self.batch.max_concurrent_athletes,
        )?;
        Self::apply_env_var(
            "LOADGUARD_PERSIST_ATTEMPTS",
            &mut self.batch.max_persist_attempts,
        )?;

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        for key in [
            CONFIG_FILE_ENV,
            "LOADGUARD_ACUTE_WINDOW",
            "LOADGUARD_CHRONIC_WINDOW",
            "LOADGUARD_MIN_SESSIONS",
            "LOADGUARD_MONOTONY_THRESHOLDS",
            "LOADGUARD_WELLNESS_THRESHOLDS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(LoadRiskConfig::default().validate().is_ok());
    }

    #[test]
    fn test_non_increasing_thresholds_rejected() {
        let mut config = LoadRiskConfig::default();
        config.thresholds.acwr = ThresholdTable::ascending(1.5, 1.3);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidThresholds { metric: "acwr", .. }
        ));
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = LoadRiskConfig::default();
        config.windows.acute_sessions = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_all_zero_weights_rejected() {
        let mut config = LoadRiskConfig::default();
        config.weights = CompositeWeights {
            monotony: 0.0,
            strain: 0.0,
            acwr: 0.0,
            wellness: 0.0,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeights(_))
        ));
    }

    #[test]
    #[serial]
    fn test_env_overrides_applied() {
        clear_env();
        env::set_var("LOADGUARD_MIN_SESSIONS", "4");
        env::set_var("LOADGUARD_MONOTONY_THRESHOLDS", "1.2, 1.8");

        let config = LoadRiskConfig::load().unwrap();
        assert_eq!(config.windows.min_sessions, 4);
        assert!((config.thresholds.monotony.lower - 1.2).abs() < f64::EPSILON);
        assert!((config.thresholds.monotony.upper - 1.8).abs() < f64::EPSILON);
        assert_eq!(
            config.thresholds.monotony.direction,
            TierDirection::HigherIsRiskier
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_thresholds_out_of_order_fail_load() {
        clear_env();
        env::set_var("LOADGUARD_WELLNESS_THRESHOLDS", "60,40");
        assert!(matches!(
            LoadRiskConfig::load(),
            Err(ConfigError::InvalidThresholds {
                metric: "wellness",
                ..
            })
        ));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_malformed_env_value_is_parse_error() {
        clear_env();
        env::set_var("LOADGUARD_ACUTE_WINDOW", "seven");
        assert!(matches!(LoadRiskConfig::load(), Err(ConfigError::Parse(_))));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_partial_config_file_keeps_defaults() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"windows": {{"acute_sessions": 5, "chronic_sessions": 20, "min_sessions": 2, "acwr_epsilon": 0.01}}}}"#
        )
        .unwrap();
        env::set_var(CONFIG_FILE_ENV, file.path());

        let config = LoadRiskConfig::load().unwrap();
        assert_eq!(config.windows.acute_sessions, 5);
        assert_eq!(config.windows.chronic_sessions, 20);
        assert_eq!(config.thresholds, ThresholdConfig::default());
        clear_env();
    }
}
