// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory database, athlete, and ledger seeding helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `loadguard`

use std::env;
use std::sync::{Arc, Once};

use anyhow::Result;
use chrono::{Days, NaiveDate};
use loadguard::database::Database;
use loadguard::ledger::EngineResources;
use loadguard_core::models::{Athlete, GpsSessionRecord, SessionLoadRecord, WellnessRecord};
use loadguard_intelligence::LoadRiskConfig;
use tracing::Level;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Arc<Database>> {
    init_test_logging();
    Ok(Arc::new(Database::new("sqlite::memory:").await?))
}

/// Every collaborator backed by the same database
pub fn resources(database: &Arc<Database>) -> EngineResources {
    EngineResources::from_backend(Arc::clone(database))
}

/// Defaults with millisecond backoff so retry tests stay fast
pub fn test_config() -> Arc<LoadRiskConfig> {
    let mut config = LoadRiskConfig::default();
    config.batch.initial_backoff_ms = 1;
    Arc::new(config)
}

/// Monday 2025-03-03
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

/// Monday `n` weeks after [`monday`]
pub fn week(n: u64) -> NaiveDate {
    monday().checked_add_days(Days::new(n * 7)).unwrap()
}

/// `offset` days after `start`
pub fn day(start: NaiveDate, offset: u64) -> NaiveDate {
    start.checked_add_days(Days::new(offset)).unwrap()
}

/// Create an active athlete
pub async fn create_athlete(database: &Database, name: &str) -> Result<Uuid> {
    create_athlete_with_status(database, name, true).await
}

/// Create an athlete with an explicit active flag
pub async fn create_athlete_with_status(
    database: &Database,
    name: &str,
    active: bool,
) -> Result<Uuid> {
    let athlete = Athlete {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        active,
    };
    database.upsert_athlete(&athlete).await?;
    Ok(athlete.id)
}

/// A well-formed session at 17:00 UTC on `date`
pub fn session_record(athlete_id: Uuid, date: NaiveDate, rating: i32, minutes: f64) -> SessionLoadRecord {
    SessionLoadRecord::new(
        athlete_id,
        Uuid::new_v4(),
        date.and_hms_opt(17, 0, 0).unwrap().and_utc(),
        rating,
        minutes,
    )
}

/// Insert a well-formed session
pub async fn add_session(
    database: &Database,
    athlete_id: Uuid,
    date: NaiveDate,
    rating: i32,
    minutes: f64,
) -> Result<SessionLoadRecord> {
    let record = session_record(athlete_id, date, rating, minutes);
    database.insert_session_load(&record).await?;
    Ok(record)
}

/// Insert a session whose stored load disagrees with rating x duration
pub async fn add_corrupt_session(database: &Database, athlete_id: Uuid, date: NaiveDate) -> Result<()> {
    let mut record = session_record(athlete_id, date, 5, 60.0);
    record.load = 9_999.0;
    database.insert_session_load(&record).await?;
    Ok(())
}

/// Insert one session per `(day offset, rating, minutes)` in the week starting `week_start`
pub async fn add_week(
    database: &Database,
    athlete_id: Uuid,
    week_start: NaiveDate,
    sessions: &[(u64, i32, f64)],
) -> Result<()> {
    for &(offset, rating, minutes) in sessions {
        add_session(database, athlete_id, day(week_start, offset), rating, minutes).await?;
    }
    Ok(())
}

/// A varied four-session training week; `shift` changes the durations
pub async fn add_training_week(
    database: &Database,
    athlete_id: Uuid,
    week_start: NaiveDate,
    shift: f64,
) -> Result<()> {
    add_week(
        database,
        athlete_id,
        week_start,
        &[
            (0, 6, 60.0 + shift),
            (1, 4, 45.0),
            (3, 7, 75.0 + shift),
            (5, 5, 50.0),
        ],
    )
    .await
}

/// Insert a wellness score
pub async fn add_wellness(
    database: &Database,
    athlete_id: Uuid,
    recorded_on: NaiveDate,
    score: f64,
) -> Result<()> {
    database
        .insert_wellness(&WellnessRecord {
            athlete_id,
            recorded_on,
            score,
        })
        .await?;
    Ok(())
}

/// Insert GPS counters for an existing session
pub async fn add_gps(database: &Database, session: &SessionLoadRecord, distance_m: f64) -> Result<()> {
    database
        .insert_gps_session(&GpsSessionRecord {
            athlete_id: session.athlete_id,
            session_id: session.session_id,
            occurred_at: session.occurred_at,
            distance_m,
            high_speed_efforts: 12,
            accelerations: 30,
            decelerations: 28,
        })
        .await?;
    Ok(())
}
