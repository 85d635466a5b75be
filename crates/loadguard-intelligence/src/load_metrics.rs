// ABOUTME: Weekly load metrics: total, mean, stdev, monotony, strain, ACWR, and z-scores
// ABOUTME: Single canonical calculator; undefined values become explicit InsufficientData markers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

//! Load Metrics Calculator
//!
//! - `monotony = mean / stdev` over the acute window
//! - `strain = weekly total x monotony`
//! - `acwr = acute mean / max(chronic mean, epsilon)`
//! - z-scores against the athlete's own prior weeks
//!
//! A window with fewer than two sessions or zero variance has no monotony and
//! no strain. That is a data state, not an error, and never an infinite risk.

use loadguard_core::models::{LoadMetric, MetricSet, MetricValue, WeeklyLoadMetric};
use serde::{Deserialize, Serialize};

use crate::config::{BaselineConfig, WindowConfig};
use crate::rolling_window::LoadWindows;
use crate::statistics::{is_negligible_spread, mean, sample_stdev};

/// Raw metrics for one athlete-week, before classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadSnapshot {
    /// Sessions inside the calendar week
    pub session_count: u32,
    /// Sum of loads inside the calendar week
    pub total_load: f64,
    /// Mean of the acute window
    pub mean_load: f64,
    /// Sample stdev of the acute window
    pub stdev_load: MetricValue,
    /// `mean_load / stdev_load`
    pub monotony: MetricValue,
    /// `total_load x monotony`
    pub strain: MetricValue,
    /// Acute window mean
    pub acute_load: f64,
    /// Chronic window mean
    pub chronic_load: f64,
    /// Epsilon-floored ratio, always finite
    pub acwr: f64,
}

impl LoadSnapshot {
    /// Value of `metric` in this snapshot
    #[must_use]
    pub const fn metric(&self, metric: LoadMetric) -> MetricValue {
        match metric {
            LoadMetric::Monotony => self.monotony,
            LoadMetric::Strain => self.strain,
            LoadMetric::Acwr => MetricValue::Computed(self.acwr),
        }
    }
}

/// Prior computed values of each metric for one athlete, oldest first
///
/// Only weeks where the metric was computed contribute a value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaselineHistory {
    monotony: Vec<f64>,
    strain: Vec<f64>,
    acwr: Vec<f64>,
}

impl BaselineHistory {
    /// Build from stored weekly metrics in chronological order
    #[must_use]
    pub fn from_metrics<'a>(metrics: impl IntoIterator<Item = &'a WeeklyLoadMetric>) -> Self {
        let mut history = Self::default();
        for metric in metrics {
            history.push(metric);
        }
        history
    }

    /// Append one week's computed values
    pub fn push(&mut self, week: &WeeklyLoadMetric) {
        for metric in LoadMetric::ALL {
            if let Some(value) = week.metric(metric).value() {
                self.values_mut(metric).push(value);
            }
        }
    }

    /// Prior values of `metric`, oldest first
    #[must_use]
    pub fn values(&self, metric: LoadMetric) -> &[f64] {
        match metric {
            LoadMetric::Monotony => &self.monotony,
            LoadMetric::Strain => &self.strain,
            LoadMetric::Acwr => &self.acwr,
        }
    }

    fn values_mut(&mut self, metric: LoadMetric) -> &mut Vec<f64> {
        match metric {
            LoadMetric::Monotony => &mut self.monotony,
            LoadMetric::Strain => &mut self.strain,
            LoadMetric::Acwr => &mut self.acwr,
        }
    }
}

/// Computes weekly metrics from rolling windows
#[derive(Debug, Clone, Copy)]
pub struct LoadMetricsCalculator {
    acwr_epsilon: f64,
    min_history_weeks: usize,
    baseline_weeks: usize,
}

impl LoadMetricsCalculator {
    /// Create a calculator from window and baseline settings
    #[must_use]
    pub const fn new(windows: &WindowConfig, baseline: &BaselineConfig) -> Self {
        Self {
            acwr_epsilon: windows.acwr_epsilon,
            min_history_weeks: baseline.min_history_weeks,
            baseline_weeks: baseline.baseline_weeks,
        }
    }

    /// Compute the raw metrics for one week
    ///
    /// `week_loads` are the loads inside the calendar week; `windows` are the
    /// rolling windows ending on the week's reference date.
    #[must_use]
    pub fn compute(&self, windows: &LoadWindows, week_loads: &[f64]) -> LoadSnapshot {
        let total_load: f64 = week_loads.iter().sum();
        let mean_load = mean(&windows.acute).unwrap_or(0.0);
        let stdev = sample_stdev(&windows.acute);
        let monotony = Self::monotony(mean_load, stdev);
        let chronic_load = mean(&windows.chronic).unwrap_or(0.0);

        LoadSnapshot {
            session_count: u32::try_from(week_loads.len()).unwrap_or(u32::MAX),
            total_load,
            mean_load,
            stdev_load: MetricValue::from_option(stdev),
            monotony,
            strain: Self::strain(total_load, monotony),
            acute_load: mean_load,
            chronic_load,
            acwr: self.acwr(mean_load, chronic_load),
        }
    }

    /// `mean / stdev`; missing when stdev is missing or zero
    ///
    /// A stdev within rounding noise of the mean counts as zero.
    #[must_use]
    pub fn monotony(mean_load: f64, stdev: Option<f64>) -> MetricValue {
        match stdev {
            Some(sd) if !is_negligible_spread(sd, mean_load) => MetricValue::from(mean_load / sd),
            _ => MetricValue::InsufficientData,
        }
    }

    /// `total x monotony`; missing whenever monotony is
    #[must_use]
    pub fn strain(total_load: f64, monotony: MetricValue) -> MetricValue {
        monotony.map(|m| total_load * m)
    }

    /// Acute mean over the epsilon-floored chronic mean
    #[must_use]
    pub fn acwr(&self, acute_mean: f64, chronic_mean: f64) -> f64 {
        acute_mean / chronic_mean.max(self.acwr_epsilon)
    }

    /// Z-score of `current` against the most recent `baseline_weeks` prior values
    ///
    /// Neutral (`0.0`) below `min_history_weeks` prior values; missing when
    /// `current` is missing or the baseline has no variance.
    #[must_use]
    pub fn z_score(&self, current: MetricValue, history: &[f64]) -> MetricValue {
        let Some(value) = current.value() else {
            return MetricValue::InsufficientData;
        };
        if history.len() < self.min_history_weeks {
            return MetricValue::Computed(0.0);
        }
        let recent = &history[history.len().saturating_sub(self.baseline_weeks)..];
        match (mean(recent), sample_stdev(recent)) {
            (Some(avg), Some(sd)) if !is_negligible_spread(sd, avg) => {
                MetricValue::from((value - avg) / sd)
            }
            _ => MetricValue::InsufficientData,
        }
    }

    /// Z-scores for every metric in `snapshot`
    #[must_use]
    pub fn z_scores(
        &self,
        snapshot: &LoadSnapshot,
        history: &BaselineHistory,
    ) -> MetricSet<MetricValue> {
        MetricSet::from_fn(|metric| self.z_score(snapshot.metric(metric), history.values(metric)))
    }
}
