// ABOUTME: Collaborator interfaces the engine reads from and writes to
// ABOUTME: Session ledger, wellness source, athlete directory, and derived-metric sink
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

//! # Collaborator Interfaces
//!
//! The engine owns no upstream data. Ingestion writes the session ledger and
//! wellness surveys; the engine only reads them and writes its own two derived
//! tables through [`MetricSink`]. Every implementation must be `Send + Sync`
//! so athlete workers can share it behind an `Arc`.

use async_trait::async_trait;
use chrono::NaiveDate;
use loadguard_core::errors::AppResult;
use loadguard_core::models::{
    Athlete, GpsSessionRecord, RiskAssessment, SessionLoad, SessionLoadRecord, WeeklyLoadMetric,
    WellnessRecord,
};
use std::sync::Arc;
use uuid::Uuid;

/// Append-only per-athlete session ledger
#[async_trait]
pub trait SessionLedger: Send + Sync {
    /// The most recent `limit_by_count` `(date, load)` pairs on or before
    /// `up_to`, oldest first
    async fn get_session_loads(
        &self,
        athlete_id: Uuid,
        up_to: NaiveDate,
        limit_by_count: usize,
    ) -> AppResult<Vec<SessionLoad>>;

    /// Full session records on or before `up_to` (all when `None`), oldest first
    async fn get_session_records(
        &self,
        athlete_id: Uuid,
        up_to: Option<NaiveDate>,
    ) -> AppResult<Vec<SessionLoadRecord>>;

    /// GPS movement records on or before `up_to` (all when `None`), oldest first
    async fn get_gps_sessions(
        &self,
        athlete_id: Uuid,
        up_to: Option<NaiveDate>,
    ) -> AppResult<Vec<GpsSessionRecord>>;
}

/// Wellness survey results
#[async_trait]
pub trait WellnessSource: Send + Sync {
    /// Latest score recorded on or before `as_of`, if any
    async fn get_latest_wellness(&self, athlete_id: Uuid, as_of: NaiveDate)
        -> AppResult<Option<f64>>;

    /// Every wellness record on or before `up_to` (all when `None`), oldest first
    async fn get_wellness_records(
        &self,
        athlete_id: Uuid,
        up_to: Option<NaiveDate>,
    ) -> AppResult<Vec<WellnessRecord>>;
}

/// Read-only athlete reference data
#[async_trait]
pub trait AthleteDirectory: Send + Sync {
    /// Active athletes, ordered by id
    async fn list_active_athletes(&self) -> AppResult<Vec<Athlete>>;

    /// One athlete by id, active or not
    async fn get_athlete(&self, athlete_id: Uuid) -> AppResult<Option<Athlete>>;
}

/// Persistence for the engine's derived records
///
/// Keys are `(athlete_id, week_start)`; writes for different athletes never
/// touch the same rows.
#[async_trait]
pub trait MetricSink: Send + Sync {
    /// Insert or overwrite a week's metric and assessment atomically
    async fn upsert_week(
        &self,
        metric: &WeeklyLoadMetric,
        assessment: &RiskAssessment,
    ) -> AppResult<()>;

    /// Delete a week's metric (and its assessment); `true` when a row existed
    async fn remove_week(&self, athlete_id: Uuid, week_start: NaiveDate) -> AppResult<bool>;

    /// Stored metrics for weeks strictly before `before`, oldest first
    async fn get_metric_history(
        &self,
        athlete_id: Uuid,
        before: NaiveDate,
    ) -> AppResult<Vec<WeeklyLoadMetric>>;

    /// Stored metric for one week
    async fn get_weekly_metric(
        &self,
        athlete_id: Uuid,
        week_start: NaiveDate,
    ) -> AppResult<Option<WeeklyLoadMetric>>;

    /// Stored assessment for one week
    async fn get_risk_assessment(
        &self,
        athlete_id: Uuid,
        week_start: NaiveDate,
    ) -> AppResult<Option<RiskAssessment>>;
}

/// Shared handles to every collaborator
#[derive(Clone)]
pub struct EngineResources {
    /// Session ledger
    pub ledger: Arc<dyn SessionLedger>,
    /// Wellness surveys
    pub wellness: Arc<dyn WellnessSource>,
    /// Athlete directory
    pub athletes: Arc<dyn AthleteDirectory>,
    /// Derived-metric sink
    pub sink: Arc<dyn MetricSink>,
}

impl EngineResources {
    /// Use one backend for every collaborator
    #[must_use]
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: SessionLedger + WellnessSource + AthleteDirectory + MetricSink + 'static,
    {
        Self {
            ledger: backend.clone(),
            wellness: backend.clone(),
            athletes: backend.clone(),
            sink: backend,
        }
    }
}
