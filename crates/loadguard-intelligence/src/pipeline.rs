// ABOUTME: Per-athlete weekly pipeline from ledger records to stored-ready metrics and assessments
// ABOUTME: Validates inputs, gates on sample size, and chains windows, metrics, tiers, and composite
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

//! Weekly Risk Pipeline
//!
//! [`AthleteTimeline`] holds everything fetched for one athlete before any
//! computation starts. [`LoadRiskEngine::compute_week`] is then a pure, CPU-only
//! function of that timeline, the week, and the athlete's prior metric history.
//!
//! A malformed session fails only the calendar week it belongs to and is left
//! out of every other week's rolling windows.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use loadguard_core::models::{
    GpsSessionRecord, RiskAssessment, SessionLoad, SessionLoadRecord, WeeklyLoadMetric,
    WellnessRecord,
};
use tracing::debug;
use uuid::Uuid;

use crate::composite::{CompositeRiskAggregator, MovementSummary};
use crate::config::LoadRiskConfig;
use crate::load_metrics::{BaselineHistory, LoadMetricsCalculator};
use crate::risk_classifier::RiskClassifier;
use crate::rolling_window::{self, RollingWindowAggregator};
use crate::validation::{RecordValidator, UpstreamDataError};

/// Result of one athlete-week that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum WeekOutcome {
    /// Fewer sessions than `min_sessions`; nothing is stored
    Skipped {
        /// Valid sessions in the week
        session_count: u32,
    },
    /// Metrics and assessment ready to persist
    Computed {
        /// Weekly metrics
        metric: Box<WeeklyLoadMetric>,
        /// Composite assessment
        assessment: Box<RiskAssessment>,
    },
}

/// Wellness entry kept with its validation result
#[derive(Debug, Clone)]
struct WellnessEntry {
    recorded_on: NaiveDate,
    score: Result<f64, UpstreamDataError>,
}

/// One athlete's validated inputs, grouped for weekly computation
#[derive(Debug, Clone)]
pub struct AthleteTimeline {
    athlete_id: Uuid,
    sessions: Vec<SessionLoad>,
    weeks: Vec<NaiveDate>,
    invalid_weeks: BTreeMap<NaiveDate, UpstreamDataError>,
    gps: Vec<GpsSessionRecord>,
    wellness: Vec<WellnessEntry>,
}

impl AthleteTimeline {
    /// Validate and order one athlete's ledger, GPS, and wellness rows
    #[must_use]
    pub fn new(
        validator: &RecordValidator,
        athlete_id: Uuid,
        mut records: Vec<SessionLoadRecord>,
        mut gps: Vec<GpsSessionRecord>,
        mut wellness: Vec<WellnessRecord>,
    ) -> Self {
        records.sort_by(|a, b| {
            a.occurred_at
                .cmp(&b.occurred_at)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        gps.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at));
        wellness.sort_by(|a, b| a.recorded_on.cmp(&b.recorded_on));

        let mut weeks = BTreeSet::new();
        let mut invalid_weeks = BTreeMap::new();
        let mut sessions = Vec::with_capacity(records.len());
        for record in &records {
            let week = rolling_window::week_start(record.session_date());
            weeks.insert(week);
            match validator.validate_session(record) {
                Ok(()) => sessions.push(record.to_session_load()),
                Err(error) => {
                    debug!(%athlete_id, week_start = %week, %error, "Excluding malformed session");
                    invalid_weeks.entry(week).or_insert(error);
                }
            }
        }

        let wellness = wellness
            .iter()
            .map(|w| WellnessEntry {
                recorded_on: w.recorded_on,
                score: validator.validate_wellness(w).map(|()| w.score),
            })
            .collect();

        Self {
            athlete_id,
            sessions,
            weeks: weeks.into_iter().collect(),
            invalid_weeks,
            gps,
            wellness,
        }
    }

    /// Athlete these inputs belong to
    #[must_use]
    pub const fn athlete_id(&self) -> Uuid {
        self.athlete_id
    }

    /// Every calendar week with at least one session (valid or not), oldest first
    #[must_use]
    pub fn weeks(&self) -> &[NaiveDate] {
        &self.weeks
    }

    /// Weeks starting on or after the week containing `from`, oldest first
    #[must_use]
    pub fn weeks_from(&self, from: Option<NaiveDate>) -> &[NaiveDate] {
        let Some(from) = from else {
            return &self.weeks;
        };
        let first = rolling_window::week_start(from);
        let start = self.weeks.partition_point(|w| *w < first);
        &self.weeks[start..]
    }

    /// Valid sessions, oldest first
    #[must_use]
    pub fn sessions(&self) -> &[SessionLoad] {
        &self.sessions
    }

    /// Latest wellness score on or before `as_of`
    ///
    /// # Errors
    ///
    /// Returns the validation error when that latest record is malformed
    pub fn latest_wellness(&self, as_of: NaiveDate) -> Result<Option<f64>, UpstreamDataError> {
        let idx = self.wellness.partition_point(|w| w.recorded_on <= as_of);
        idx.checked_sub(1)
            .and_then(|i| self.wellness.get(i))
            .map(|entry| entry.score.clone())
            .transpose()
    }

    /// Movement totals for the week starting on `week_start`
    #[must_use]
    pub fn movement(&self, week_start: NaiveDate) -> Option<MovementSummary> {
        let end = rolling_window::week_end(week_start);
        MovementSummary::from_records(self.gps.iter().filter(|g| {
            let day = g.session_date();
            day >= week_start && day <= end
        }))
    }
}

/// All computation components, built once from one configuration
#[derive(Debug, Clone, Copy)]
pub struct LoadRiskEngine {
    windows: RollingWindowAggregator,
    calculator: LoadMetricsCalculator,
    classifier: RiskClassifier,
    composite: CompositeRiskAggregator,
    validator: RecordValidator,
    min_sessions: usize,
}

impl LoadRiskEngine {
    /// Build the engine from a validated configuration
    #[must_use]
    pub const fn new(config: &LoadRiskConfig) -> Self {
        Self {
            windows: RollingWindowAggregator::new(&config.windows),
            calculator: LoadMetricsCalculator::new(&config.windows, &config.baseline),
            classifier: RiskClassifier::new(config.thresholds),
            composite: CompositeRiskAggregator::new(config),
            validator: RecordValidator::new(config.scales),
            min_sessions: config.windows.min_sessions,
        }
    }

    /// Record validator used by this engine
    #[must_use]
    pub const fn validator(&self) -> &RecordValidator {
        &self.validator
    }

    /// Rolling window aggregator used by this engine
    #[must_use]
    pub const fn windows(&self) -> &RollingWindowAggregator {
        &self.windows
    }

    /// Build a timeline with this engine's validator
    #[must_use]
    pub fn timeline(
        &self,
        athlete_id: Uuid,
        records: Vec<SessionLoadRecord>,
        gps: Vec<GpsSessionRecord>,
        wellness: Vec<WellnessRecord>,
    ) -> AthleteTimeline {
        AthleteTimeline::new(&self.validator, athlete_id, records, gps, wellness)
    }

    /// Compute one athlete-week
    ///
    /// `history` holds the athlete's metrics from earlier weeks; the caller
    /// appends the returned metric before moving on to the next week.
    ///
    /// # Errors
    ///
    /// Returns the first malformed session of the week, or a malformed latest
    /// wellness record
    pub fn compute_week(
        &self,
        timeline: &AthleteTimeline,
        week_start: NaiveDate,
        history: &BaselineHistory,
    ) -> Result<WeekOutcome, UpstreamDataError> {
        if let Some(error) = timeline.invalid_weeks.get(&week_start) {
            return Err(error.clone());
        }

        let week_loads = rolling_window::weekly_loads(timeline.sessions(), week_start);
        if week_loads.len() < self.min_sessions {
            return Ok(WeekOutcome::Skipped {
                session_count: u32::try_from(week_loads.len()).unwrap_or(u32::MAX),
            });
        }

        let reference = rolling_window::week_end(week_start);
        let wellness = timeline.latest_wellness(reference)?;
        let windows = self.windows.windows(timeline.sessions(), reference);
        let snapshot = self.calculator.compute(&windows, &week_loads);

        let metric = WeeklyLoadMetric {
            athlete_id: timeline.athlete_id(),
            week_start,
            session_count: snapshot.session_count,
            total_load: snapshot.total_load,
            mean_load: snapshot.mean_load,
            stdev_load: snapshot.stdev_load,
            monotony: snapshot.monotony,
            strain: snapshot.strain,
            acute_load: snapshot.acute_load,
            chronic_load: snapshot.chronic_load,
            acwr: snapshot.acwr,
            z_scores: self.calculator.z_scores(&snapshot, history),
            tiers: self.classifier.classify_load(&snapshot),
        };
        let movement = timeline.movement(week_start);
        let assessment = self.composite.assess(&metric, wellness, movement.as_ref());

        Ok(WeekOutcome::Computed {
            metric: Box::new(metric),
            assessment: Box::new(assessment),
        })
    }
}
