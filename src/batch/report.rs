// ABOUTME: Per-unit state tracking and the run report returned by a batch recompute
// ABOUTME: Every athlete-week ends Stored, Skipped, Failed, or Pending when the run was cancelled
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle of one athlete-week unit
///
/// `Pending -> Computing -> Stored`, `Pending -> Computing -> Skipped`, or
/// `Computing -> Failed`. A unit still `Pending` at the end of a run was never
/// reached because the run was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    /// Not yet started
    Pending,
    /// Metrics are being computed or persisted
    Computing,
    /// Metric and assessment were written
    Stored,
    /// Fewer sessions than the minimum sample size; any stale row was removed
    Skipped,
    /// Computation or persistence failed; see [`FailedUnit`]
    Failed,
}

impl UnitState {
    /// Whether `next` is a legal successor of this state
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Computing)
                | (Self::Computing, Self::Stored | Self::Skipped | Self::Failed)
        )
    }

    /// Whether the unit has finished
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stored | Self::Skipped | Self::Failed)
    }
}

/// Where a unit failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Reading the athlete's inputs
    Fetch,
    /// A malformed upstream record in the week
    Validation,
    /// Writing or deleting the derived rows
    Persistence,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fetch => "fetch",
            Self::Validation => "validation",
            Self::Persistence => "persistence",
        })
    }
}

/// One athlete-week and its final state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    /// Athlete
    pub athlete_id: Uuid,
    /// Monday of the calendar week
    pub week_start: NaiveDate,
    /// Final state
    pub state: UnitState,
}

impl UnitRecord {
    /// New pending unit
    #[must_use]
    pub const fn pending(athlete_id: Uuid, week_start: NaiveDate) -> Self {
        Self {
            athlete_id,
            week_start,
            state: UnitState::Pending,
        }
    }

    /// Move to `next`; illegal transitions leave the state unchanged and return `false`
    pub fn advance(&mut self, next: UnitState) -> bool {
        if self.state.can_advance_to(next) {
            self.state = next;
            true
        } else {
            false
        }
    }
}

/// A unit that was not stored, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedUnit {
    /// Athlete
    pub athlete_id: Uuid,
    /// Week that failed; `None` when the athlete's inputs could not be read
    pub week_start: Option<NaiveDate>,
    /// Stage the failure happened in
    pub stage: FailureStage,
    /// Error message
    pub reason: String,
}

/// Outcome of one recompute run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRunReport {
    /// Units whose metric and assessment were stored
    pub processed: usize,
    /// Units gated out by the minimum sample size
    pub skipped: usize,
    /// Units that failed, keyed by athlete and week
    pub failed: Vec<FailedUnit>,
    /// Whether the run stopped early on a cancellation request
    pub cancelled: bool,
    /// Every unit seen, ordered by athlete then week
    pub units: Vec<UnitRecord>,
}

impl BatchRunReport {
    /// Fold one athlete's results into the report
    pub fn absorb(&mut self, run: AthleteRun) {
        self.processed += run.units.iter().filter(|u| u.state == UnitState::Stored).count();
        self.skipped += run.units.iter().filter(|u| u.state == UnitState::Skipped).count();
        self.failed.extend(run.failed);
        self.units.extend(run.units);
        self.cancelled |= run.cancelled;
    }

    /// Sort units and failures into a stable order
    pub fn finish(&mut self) {
        self.units
            .sort_by(|a, b| (a.athlete_id, a.week_start).cmp(&(b.athlete_id, b.week_start)));
        self.failed
            .sort_by(|a, b| (a.athlete_id, a.week_start).cmp(&(b.athlete_id, b.week_start)));
    }

    /// State of one unit, if it was part of the run
    #[must_use]
    pub fn unit_state(&self, athlete_id: Uuid, week_start: NaiveDate) -> Option<UnitState> {
        self.units
            .iter()
            .find(|u| u.athlete_id == athlete_id && u.week_start == week_start)
            .map(|u| u.state)
    }
}

/// Results of one athlete worker
#[derive(Debug, Clone, Default)]
pub struct AthleteRun {
    /// Units in week order
    pub units: Vec<UnitRecord>,
    /// Failures in week order
    pub failed: Vec<FailedUnit>,
    /// Whether the worker stopped on cancellation
    pub cancelled: bool,
}
