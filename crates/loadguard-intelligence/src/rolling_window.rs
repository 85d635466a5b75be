// ABOUTME: Rolling acute/chronic session-count windows and calendar-week helpers
// ABOUTME: Pure reads over an athlete's time-ordered session loads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

//! Rolling Window Aggregator
//!
//! Windows are counted in sessions, not days: training frequency varies
//! between athletes and phases, and a fixed session count keeps the statistics
//! comparable. Calendar weeks (Monday to Sunday) are only used for the weekly
//! total and as the unit of recomputation.

use chrono::{Datelike, Duration, NaiveDate};
use loadguard_core::models::SessionLoad;
use std::collections::BTreeSet;

use crate::config::WindowConfig;

/// Monday of the ISO week containing `date`
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Sunday of the week starting on `week_start`; the week's reference date
#[must_use]
pub fn week_end(week_start: NaiveDate) -> NaiveDate {
    week_start + Duration::days(6)
}

/// Distinct calendar weeks containing at least one session, oldest first
#[must_use]
pub fn calendar_weeks(sessions: &[SessionLoad]) -> Vec<NaiveDate> {
    sessions
        .iter()
        .map(|s| week_start(s.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Loads of the sessions inside the calendar week starting on `week_start`
#[must_use]
pub fn weekly_loads(sessions: &[SessionLoad], week_start: NaiveDate) -> Vec<f64> {
    let end = week_end(week_start);
    sessions
        .iter()
        .filter(|s| s.date >= week_start && s.date <= end)
        .map(|s| s.load)
        .collect()
}

/// Acute and chronic load windows at one reference date, oldest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadWindows {
    /// Most recent `acute_sessions` loads
    pub acute: Vec<f64>,
    /// Most recent `chronic_sessions` loads
    pub chronic: Vec<f64>,
}

/// Session-count window extraction
#[derive(Debug, Clone, Copy)]
pub struct RollingWindowAggregator {
    acute_sessions: usize,
    chronic_sessions: usize,
}

impl RollingWindowAggregator {
    /// Create an aggregator from the configured window sizes
    #[must_use]
    pub const fn new(config: &WindowConfig) -> Self {
        Self {
            acute_sessions: config.acute_sessions,
            chronic_sessions: config.chronic_sessions,
        }
    }

    /// Windows ending at `reference` (inclusive)
    ///
    /// `sessions` must be sorted oldest first. Returns empty windows when no
    /// session falls on or before `reference`.
    #[must_use]
    pub fn windows(&self, sessions: &[SessionLoad], reference: NaiveDate) -> LoadWindows {
        let eligible = sessions.partition_point(|s| s.date <= reference);
        let history = &sessions[..eligible];
        LoadWindows {
            acute: Self::tail(history, self.acute_sessions),
            chronic: Self::tail(history, self.chronic_sessions),
        }
    }

    fn tail(history: &[SessionLoad], count: usize) -> Vec<f64> {
        let start = history.len().saturating_sub(count);
        history[start..].iter().map(|s| s.load).collect()
    }
}
