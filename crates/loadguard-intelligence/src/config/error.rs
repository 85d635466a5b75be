// ABOUTME: Configuration error types for engine configuration validation
// ABOUTME: Defines error variants for invalid ranges, thresholds, weights, and parse failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

//! Configuration error types for engine configuration validation.

use std::io;
use thiserror::Error;

/// Configuration-related errors
///
/// Always raised at load time, before any computation runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Value outside acceptable range (e.g., non-positive window size)
    #[error("Invalid range: {0}")]
    InvalidRange(&'static str),

    /// Threshold cut points are not finite and strictly increasing
    #[error("Invalid thresholds for {metric}: lower={lower}, upper={upper} (must be finite and lower < upper)")]
    InvalidThresholds {
        /// Threshold table name
        metric: &'static str,
        /// Lower cut point
        lower: f64,
        /// Upper cut point
        upper: f64,
    },

    /// Failed to parse configuration value
    #[error("Parse error: {0}")]
    Parse(String),

    /// Config file could not be read
    #[error("Config file error: {0}")]
    Io(#[from] io::Error),

    /// Composite weights are unusable
    #[error("Invalid weights: {0}")]
    InvalidWeights(&'static str),

    /// Numeric value outside valid range for parameter
    #[error("Value out of range: {0}")]
    ValueOutOfRange(&'static str),
}
