// ABOUTME: Training-load statistics, tier classification, and composite risk engine
// ABOUTME: Pure computation crate; all I/O lives in the batch driver and persistence layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

#![deny(unsafe_code)]

//! # Loadguard Intelligence
//!
//! Data flow for one athlete-week:
//!
//! ledger rows → [`validation`] → [`rolling_window`] → [`load_metrics`] →
//! [`risk_classifier`] → [`composite`] → `WeeklyLoadMetric` + `RiskAssessment`
//!
//! [`pipeline::LoadRiskEngine`] wires the stages together from a single
//! immutable [`config::LoadRiskConfig`].

/// Engine configuration, threshold tables, and validation
pub mod config;

/// Composite risk aggregation and explanation text
pub mod composite;

/// Monotony, strain, ACWR, and z-score calculation
pub mod load_metrics;

/// Per-athlete weekly pipeline
pub mod pipeline;

/// Tier classification against threshold tables
pub mod risk_classifier;

/// Session-count rolling windows and calendar weeks
pub mod rolling_window;

/// Mean and sample standard deviation
pub mod statistics;

/// Upstream record validation
pub mod validation;

pub use composite::{CompositeRiskAggregator, MovementSummary};
pub use config::{ConfigError, LoadRiskConfig};
pub use load_metrics::{BaselineHistory, LoadMetricsCalculator, LoadSnapshot};
pub use pipeline::{AthleteTimeline, LoadRiskEngine, WeekOutcome};
pub use risk_classifier::RiskClassifier;
pub use rolling_window::{LoadWindows, RollingWindowAggregator};
pub use validation::{RecordValidator, UpstreamDataError};
