// ABOUTME: Batch recomputation driver over athletes and calendar weeks
// ABOUTME: Bounded per-athlete workers, unit-level failure isolation, and cooperative cancellation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

//! # Batch Recomputation
//!
//! [`BatchRecomputeDriver::recompute`] walks every active athlete (or one
//! athlete) and every calendar week with at least one session, oldest first.
//! Each athlete runs in its own task; at most `max_concurrent_athletes` run at
//! once. A worker fetches all of its athlete's inputs up front, then computes
//! and persists weeks in strict date order.
//!
//! One athlete-week is a unit. A failing unit is logged with its key and
//! reported; it never stops other units. Cancellation is checked between
//! units, so a week is either fully written or not touched.

pub mod report;
pub mod retry;

pub use report::{AthleteRun, BatchRunReport, FailedUnit, FailureStage, UnitRecord, UnitState};
pub use retry::RetryPolicy;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use loadguard_core::errors::{AppError, AppResult};
use loadguard_core::models::WeeklyLoadMetric;
use loadguard_intelligence::rolling_window::week_start;
use loadguard_intelligence::{
    AthleteTimeline, BaselineHistory, LoadRiskConfig, LoadRiskEngine, WeekOutcome,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::ledger::EngineResources;
use crate::logging::BatchLogger;

/// Which athletes a run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeScope {
    /// Every active athlete
    All,
    /// One athlete, active or not
    Athlete(Uuid),
}

/// Shared flag for cooperative cancellation
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancellationHandle {
    /// Fresh, not-cancelled handle
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; in-flight units finish, no new unit starts
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Recomputes and persists weekly metrics and assessments
#[derive(Clone)]
pub struct BatchRecomputeDriver {
    resources: EngineResources,
    config: Arc<LoadRiskConfig>,
    engine: LoadRiskEngine,
    retry: RetryPolicy,
    cancellation: CancellationHandle,
}

impl BatchRecomputeDriver {
    /// Build a driver from validated configuration
    #[must_use]
    pub fn new(resources: EngineResources, config: Arc<LoadRiskConfig>) -> Self {
        let engine = LoadRiskEngine::new(&config);
        let retry = RetryPolicy::from_config(&config.batch);
        Self {
            resources,
            config,
            engine,
            retry,
            cancellation: CancellationHandle::new(),
        }
    }

    /// Share an existing cancellation handle instead of a private one
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationHandle) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Handle that cancels runs of this driver
    #[must_use]
    pub fn cancellation_handle(&self) -> CancellationHandle {
        self.cancellation.clone()
    }

    /// Configuration the driver was built with
    #[must_use]
    pub fn config(&self) -> &LoadRiskConfig {
        &self.config
    }

    /// Recompute every eligible athlete-week in `scope`
    ///
    /// Weeks before `from_week` are left as stored and seed the z-score
    /// baseline. Without `from_week` every week is recomputed from the ledger.
    ///
    /// # Errors
    ///
    /// Returns an error only when the athlete list cannot be read, the
    /// requested athlete does not exist, or a worker task dies. Unit failures
    /// are reported in [`BatchRunReport::failed`].
    pub async fn recompute(
        &self,
        scope: RecomputeScope,
        from_week: Option<NaiveDate>,
    ) -> AppResult<BatchRunReport> {
        let started = Instant::now();
        let athletes = self.athletes_in_scope(scope).await?;
        let from_week = from_week.map(week_start);
        info!(
            athletes = athletes.len(),
            from_week = ?from_week,
            "Starting recompute"
        );

        let permits = Arc::new(Semaphore::new(
            self.config.batch.max_concurrent_athletes.max(1),
        ));
        let mut workers = JoinSet::new();
        for athlete_id in athletes {
            let driver = self.clone();
            let permits = Arc::clone(&permits);
            let span = info_span!("athlete", athlete_id = %athlete_id);
            workers.spawn(
                async move {
                    let Ok(_permit) = permits.acquire_owned().await else {
                        return AthleteRun::default();
                    };
                    driver.run_athlete(athlete_id, from_week).await
                }
                .instrument(span),
            );
        }

        let mut report = BatchRunReport::default();
        while let Some(joined) = workers.join_next().await {
            let run = joined.map_err(|e| {
                AppError::internal(format!("athlete worker stopped abnormally: {e}"))
            })?;
            report.absorb(run);
        }
        report.finish();

        BatchLogger::log_run_summary(
            report.processed,
            report.skipped,
            report.failed.len(),
            report.cancelled,
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        );
        Ok(report)
    }

    async fn athletes_in_scope(&self, scope: RecomputeScope) -> AppResult<Vec<Uuid>> {
        match scope {
            RecomputeScope::All => Ok(self
                .resources
                .athletes
                .list_active_athletes()
                .await?
                .into_iter()
                .map(|a| a.id)
                .collect()),
            RecomputeScope::Athlete(athlete_id) => {
                let athlete = self.resources.athletes.get_athlete(athlete_id).await?;
                athlete
                    .map(|a| vec![a.id])
                    .ok_or_else(|| AppError::not_found(format!("athlete {athlete_id}")))
            }
        }
    }

    /// Process one athlete's weeks in order
    async fn run_athlete(&self, athlete_id: Uuid, from_week: Option<NaiveDate>) -> AthleteRun {
        let mut run = AthleteRun::default();
        if self.cancellation.is_cancelled() {
            run.cancelled = true;
            return run;
        }

        let (timeline, stored) = match self.fetch_inputs(athlete_id, from_week).await {
            Ok(inputs) => inputs,
            Err(e) => {
                error!(athlete_id = %athlete_id, error = %e, "Could not load athlete inputs");
                run.failed.push(FailedUnit {
                    athlete_id,
                    week_start: None,
                    stage: FailureStage::Fetch,
                    reason: e.to_string(),
                });
                return run;
            }
        };

        let mut history = BaselineHistory::from_metrics(&stored);
        let weeks = timeline.weeks_from(from_week);
        run.units = weeks
            .iter()
            .map(|&week| UnitRecord::pending(athlete_id, week))
            .collect();
        debug!(weeks = weeks.len(), baseline = stored.len(), "Athlete inputs loaded");

        for unit in &mut run.units {
            if self.cancellation.is_cancelled() {
                run.cancelled = true;
                break;
            }
            unit.advance(UnitState::Computing);
            let next = self
                .process_week(&timeline, unit.week_start, &mut history, &mut run.failed)
                .await;
            unit.advance(next);
        }
        run
    }

    async fn fetch_inputs(
        &self,
        athlete_id: Uuid,
        from_week: Option<NaiveDate>,
    ) -> AppResult<(AthleteTimeline, Vec<WeeklyLoadMetric>)> {
        let records = self
            .resources
            .ledger
            .get_session_records(athlete_id, None)
            .await?;
        let gps = self.resources.ledger.get_gps_sessions(athlete_id, None).await?;
        let wellness = self
            .resources
            .wellness
            .get_wellness_records(athlete_id, None)
            .await?;
        let stored = match from_week {
            Some(from) => {
                self.resources
                    .sink
                    .get_metric_history(athlete_id, from)
                    .await?
            }
            None => Vec::new(),
        };
        let timeline = self.engine.timeline(athlete_id, records, gps, wellness);
        Ok((timeline, stored))
    }

    /// Compute and persist one week; returns the unit's final state
    async fn process_week(
        &self,
        timeline: &AthleteTimeline,
        week: NaiveDate,
        history: &mut BaselineHistory,
        failed: &mut Vec<FailedUnit>,
    ) -> UnitState {
        let athlete_id = timeline.athlete_id();
        let sink = &self.resources.sink;

        let outcome = match self.engine.compute_week(timeline, week, history) {
            Ok(outcome) => outcome,
            Err(e) => {
                let reason = e.to_string();
                BatchLogger::log_unit_failure(athlete_id, week, "validation", &reason);
                self.discard_invalid_week(athlete_id, week).await;
                failed.push(FailedUnit {
                    athlete_id,
                    week_start: Some(week),
                    stage: FailureStage::Validation,
                    reason,
                });
                return UnitState::Failed;
            }
        };

        let persisted = match outcome {
            WeekOutcome::Skipped { session_count } => {
                debug!(week_start = %week, session_count, "Week below minimum sample size");
                self.retry
                    .run(athlete_id, week, || sink.remove_week(athlete_id, week))
                    .await
                    .map(|removed| {
                        if removed {
                            info!(week_start = %week, "Removed stale weekly metric");
                        }
                        UnitState::Skipped
                    })
            }
            WeekOutcome::Computed { metric, assessment } => {
                history.push(&metric);
                self.retry
                    .run(athlete_id, week, || sink.upsert_week(&metric, &assessment))
                    .await
                    .map(|()| {
                        debug!(
                            week_start = %week,
                            category = %assessment.category,
                            "Stored weekly metric"
                        );
                        UnitState::Stored
                    })
            }
        };

        persisted.unwrap_or_else(|e| {
            let reason = e.to_string();
            BatchLogger::log_unit_failure(athlete_id, week, "persistence", &reason);
            failed.push(FailedUnit {
                athlete_id,
                week_start: Some(week),
                stage: FailureStage::Persistence,
                reason,
            });
            UnitState::Failed
        })
    }

    /// Drop the stored row of a week that failed validation
    ///
    /// A stale row would seed later baselines on a `from_week` run but not on
    /// a full run.
    async fn discard_invalid_week(&self, athlete_id: Uuid, week: NaiveDate) {
        let sink = &self.resources.sink;
        match self
            .retry
            .run(athlete_id, week, || sink.remove_week(athlete_id, week))
            .await
        {
            Ok(true) => info!(week_start = %week, "Removed metric of invalid week"),
            Ok(false) => {}
            Err(e) => warn!(
                week_start = %week,
                error = %e,
                "Could not remove metric of invalid week"
            ),
        }
    }
}
