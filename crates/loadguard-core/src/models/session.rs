// ABOUTME: Session ledger records: subjective effort load and optional GPS movement counters
// ABOUTME: Produced by ingestion, never mutated by the engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One training session's subjective load (session-RPE method)
///
/// `rating` and `duration_minutes` are kept exactly as ingested so that a
/// malformed upstream row can still be represented and rejected by validation
/// instead of failing to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLoadRecord {
    /// Athlete who trained
    pub athlete_id: Uuid,
    /// Session identifier from the ingestion pipeline
    pub session_id: Uuid,
    /// Session start time
    pub occurred_at: DateTime<Utc>,
    /// Effort rating (RPE), expected on a bounded ordinal scale
    pub rating: i32,
    /// Session duration in minutes, expected > 0
    pub duration_minutes: f64,
    /// `rating x duration_minutes` as recorded upstream
    pub load: f64,
}

impl SessionLoadRecord {
    /// Build a record whose load is derived from rating and duration
    #[must_use]
    pub fn new(
        athlete_id: Uuid,
        session_id: Uuid,
        occurred_at: DateTime<Utc>,
        rating: i32,
        duration_minutes: f64,
    ) -> Self {
        Self {
            athlete_id,
            session_id,
            occurred_at,
            rating,
            duration_minutes,
            load: f64::from(rating) * duration_minutes,
        }
    }

    /// Calendar day the session took place on (UTC)
    #[must_use]
    pub fn session_date(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }

    /// Load implied by rating and duration
    #[must_use]
    pub fn expected_load(&self) -> f64 {
        f64::from(self.rating) * self.duration_minutes
    }

    /// Reduce to the `(date, load)` pair the rolling windows operate on
    #[must_use]
    pub fn to_session_load(&self) -> SessionLoad {
        SessionLoad {
            date: self.session_date(),
            load: self.load,
        }
    }
}

/// A dated load value, the unit the rolling windows operate on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionLoad {
    /// Session day
    pub date: NaiveDate,
    /// Session load in arbitrary units
    pub load: f64,
}

/// Movement-tracking summary for one session
///
/// Optional enrichment; never required for metric computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsSessionRecord {
    /// Athlete who trained
    pub athlete_id: Uuid,
    /// Session identifier (matches the load record when both exist)
    pub session_id: Uuid,
    /// Session start time
    pub occurred_at: DateTime<Utc>,
    /// Total distance covered in meters
    pub distance_m: f64,
    /// Efforts above the high-speed running threshold
    pub high_speed_efforts: u32,
    /// Accelerations above the tracking system's threshold
    pub accelerations: u32,
    /// Decelerations above the tracking system's threshold
    pub decelerations: u32,
}

impl GpsSessionRecord {
    /// Calendar day the session took place on (UTC)
    #[must_use]
    pub fn session_date(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }
}
