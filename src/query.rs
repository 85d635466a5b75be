// ABOUTME: Read-only query facade over stored weekly metrics and risk assessments
// ABOUTME: Distinguishes never-computed weeks from weeks that exist but could not be assessed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

//! Query facade for dashboards and tools.
//!
//! Lookups never return a bare `Option`: a week that was skipped or not yet
//! computed is reported as such, and an assessment whose factors all lacked
//! data is reported as not assessable rather than as low risk.

use chrono::NaiveDate;
use loadguard_core::errors::AppResult;
use loadguard_core::models::{RiskAssessment, SessionLoadRecord, WeeklyLoadMetric};
use loadguard_intelligence::rolling_window::{week_end, week_start};
use loadguard_intelligence::{
    LoadRiskConfig, LoadWindows, RecordValidator, RollingWindowAggregator,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::EngineResources;

/// Result of a weekly metric lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "metric", rename_all = "snake_case")]
pub enum WeeklyMetricLookup {
    /// Stored metric for the week
    Computed(WeeklyLoadMetric),
    /// Week was skipped, not yet computed, or has no sessions
    NotComputed,
}

/// Why no risk rating is available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotAssessableReason {
    /// No assessment is stored for the week
    NotComputed,
    /// An assessment exists but every factor lacked data
    InsufficientData,
}

/// Result of a risk assessment lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum RiskAssessmentLookup {
    /// Stored assessment with a real category
    Assessed(RiskAssessment),
    /// No usable risk rating
    NotAssessable(NotAssessableReason),
}

/// Read-only access to derived records
#[derive(Clone)]
pub struct QueryFacade {
    resources: EngineResources,
    windows: RollingWindowAggregator,
    validator: RecordValidator,
}

impl QueryFacade {
    /// Build a facade over the given collaborators
    #[must_use]
    pub fn new(resources: EngineResources, config: &LoadRiskConfig) -> Self {
        Self {
            resources,
            windows: RollingWindowAggregator::new(&config.windows),
            validator: RecordValidator::new(config.scales),
        }
    }

    /// Metric for the calendar week containing `week`
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot be read
    pub async fn get_weekly_metric(
        &self,
        athlete_id: Uuid,
        week: NaiveDate,
    ) -> AppResult<WeeklyMetricLookup> {
        let metric = self
            .resources
            .sink
            .get_weekly_metric(athlete_id, week_start(week))
            .await?;
        Ok(metric.map_or(WeeklyMetricLookup::NotComputed, WeeklyMetricLookup::Computed))
    }

    /// Assessment for the calendar week containing `week`
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot be read
    pub async fn get_risk_assessment(
        &self,
        athlete_id: Uuid,
        week: NaiveDate,
    ) -> AppResult<RiskAssessmentLookup> {
        let assessment = self
            .resources
            .sink
            .get_risk_assessment(athlete_id, week_start(week))
            .await?;
        Ok(match assessment {
            None => RiskAssessmentLookup::NotAssessable(NotAssessableReason::NotComputed),
            Some(assessment) if !assessment.is_assessable() => {
                RiskAssessmentLookup::NotAssessable(NotAssessableReason::InsufficientData)
            }
            Some(assessment) => RiskAssessmentLookup::Assessed(assessment),
        })
    }

    /// Acute and chronic windows ending on the Sunday of `week`
    ///
    /// Malformed sessions are left out, as in the batch, so the windows match
    /// the ones the stored metrics were computed from.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read
    pub async fn get_load_windows(&self, athlete_id: Uuid, week: NaiveDate) -> AppResult<LoadWindows> {
        let reference = week_end(week_start(week));
        let sessions: Vec<_> = self
            .resources
            .ledger
            .get_session_records(athlete_id, Some(reference))
            .await?
            .iter()
            .filter(|record| self.validator.validate_session(record).is_ok())
            .map(SessionLoadRecord::to_session_load)
            .collect();
        Ok(self.windows.windows(&sessions, reference))
    }
}
