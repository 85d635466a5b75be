// ABOUTME: Weekly load metric record with explicit missing-value markers and risk tiers
// ABOUTME: Defines MetricValue, RiskTier, LoadMetric, MetricSet, and WeeklyLoadMetric
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A derived metric that may not be computable
///
/// `InsufficientData` is distinct from zero: it means the variability or
/// baseline needed to compute the value does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    /// Value was computed
    Computed(f64),
    /// Not enough data (or no variance) to compute the value
    InsufficientData,
}

impl MetricValue {
    /// Wrap an optional value; non-finite numbers are treated as missing
    #[must_use]
    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Self::Computed(v),
            _ => Self::InsufficientData,
        }
    }

    /// The computed value, if any
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Computed(v) => Some(v),
            Self::InsufficientData => None,
        }
    }

    /// Whether a value was computed
    #[must_use]
    pub const fn is_computed(self) -> bool {
        matches!(self, Self::Computed(_))
    }

    /// Apply `f` to a computed value
    #[must_use]
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Self::Computed(v) => Self::from_option(Some(f(v))),
            Self::InsufficientData => Self::InsufficientData,
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::from_option(Some(value))
    }
}

/// Ordinal risk tier for one metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// Below the lower cut point
    Low,
    /// Between the cut points
    Medium,
    /// Beyond the upper cut point
    High,
    /// Metric could not be assessed; carries no severity
    InsufficientData,
}

impl RiskTier {
    /// Numeric severity on the 0-2 scale; `None` for `InsufficientData`
    #[must_use]
    pub const fn severity(self) -> Option<u8> {
        match self {
            Self::Low => Some(0),
            Self::Medium => Some(1),
            Self::High => Some(2),
            Self::InsufficientData => None,
        }
    }

    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::InsufficientData => "insufficient_data",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "insufficient_data" => Some(Self::InsufficientData),
            _ => None,
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::InsufficientData => "Insufficient data",
        };
        f.write_str(label)
    }
}

/// The derived load metrics that are classified per week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMetric {
    /// Mean / stdev of acute-window loads
    Monotony,
    /// Weekly total load x monotony
    Strain,
    /// Acute : chronic workload ratio
    Acwr,
}

impl LoadMetric {
    /// Fixed processing and reporting order
    pub const ALL: [Self; 3] = [Self::Monotony, Self::Strain, Self::Acwr];

    /// Stable identifier used in configuration keys and logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monotony => "monotony",
            Self::Strain => "strain",
            Self::Acwr => "acwr",
        }
    }

    /// Human-readable label used in explanations
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Monotony => "Monotony",
            Self::Strain => "Strain",
            Self::Acwr => "ACWR",
        }
    }
}

/// One value per [`LoadMetric`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSet<T> {
    /// Monotony entry
    pub monotony: T,
    /// Strain entry
    pub strain: T,
    /// ACWR entry
    pub acwr: T,
}

impl<T: Copy> MetricSet<T> {
    /// Same value for every metric
    #[must_use]
    pub const fn splat(value: T) -> Self {
        Self {
            monotony: value,
            strain: value,
            acwr: value,
        }
    }

    /// Entry for `metric`
    #[must_use]
    pub const fn get(&self, metric: LoadMetric) -> T {
        match metric {
            LoadMetric::Monotony => self.monotony,
            LoadMetric::Strain => self.strain,
            LoadMetric::Acwr => self.acwr,
        }
    }

    /// Build from a function of each metric
    #[must_use]
    pub fn from_fn(mut f: impl FnMut(LoadMetric) -> T) -> Self {
        Self {
            monotony: f(LoadMetric::Monotony),
            strain: f(LoadMetric::Strain),
            acwr: f(LoadMetric::Acwr),
        }
    }
}

/// Derived load metrics for one athlete-week
///
/// Exists only for weeks with at least `min_sessions` sessions; keyed by
/// `(athlete_id, week_start)` and overwritten on recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyLoadMetric {
    /// Athlete
    pub athlete_id: Uuid,
    /// Monday of the calendar week
    pub week_start: NaiveDate,
    /// Sessions inside the calendar week
    pub session_count: u32,
    /// Sum of loads inside the calendar week
    pub total_load: f64,
    /// Mean of the acute window
    pub mean_load: f64,
    /// Sample standard deviation of the acute window
    pub stdev_load: MetricValue,
    /// `mean_load / stdev_load`
    pub monotony: MetricValue,
    /// `total_load x monotony`
    pub strain: MetricValue,
    /// Acute window mean
    pub acute_load: f64,
    /// Chronic window mean
    pub chronic_load: f64,
    /// `acute_load / max(chronic_load, epsilon)`; always finite
    pub acwr: f64,
    /// Z-score of each metric against the athlete's own prior weeks
    pub z_scores: MetricSet<MetricValue>,
    /// Tier of each metric
    pub tiers: MetricSet<RiskTier>,
}

impl WeeklyLoadMetric {
    /// The value of `metric` for this week
    #[must_use]
    pub const fn metric(&self, metric: LoadMetric) -> MetricValue {
        match metric {
            LoadMetric::Monotony => self.monotony,
            LoadMetric::Strain => self.strain,
            LoadMetric::Acwr => MetricValue::Computed(self.acwr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_values_are_insufficient() {
        assert_eq!(MetricValue::from(f64::NAN), MetricValue::InsufficientData);
        assert_eq!(
            MetricValue::from(f64::INFINITY),
            MetricValue::InsufficientData
        );
        assert_eq!(MetricValue::from(0.0), MetricValue::Computed(0.0));
    }

    #[test]
    fn test_insufficient_tier_has_no_severity() {
        assert_eq!(RiskTier::InsufficientData.severity(), None);
        assert_eq!(RiskTier::High.severity(), Some(2));
    }

    #[test]
    fn test_tier_round_trips_through_storage_string() {
        for tier in [
            RiskTier::Low,
            RiskTier::Medium,
            RiskTier::High,
            RiskTier::InsufficientData,
        ] {
            assert_eq!(RiskTier::parse(tier.as_str()), Some(tier));
        }
        assert_eq!(RiskTier::parse("severe"), None);
    }

    #[test]
    fn test_metric_value_serializes_with_status_tag() {
        let json = serde_json::to_string(&MetricValue::InsufficientData).unwrap_or_default();
        assert_eq!(json, r#"{"status":"insufficient_data"}"#);
    }
}
