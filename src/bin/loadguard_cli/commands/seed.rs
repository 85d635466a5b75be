// ABOUTME: Demo seeding command for loadguard-cli
// ABOUTME: Writes a reproducible synthetic ledger (sessions, GPS, wellness) from an RNG seed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use loadguard::database::Database;
use loadguard_core::models::{Athlete, GpsSessionRecord, SessionLoadRecord, WellnessRecord};
use loadguard_intelligence::rolling_window::week_start;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;
use uuid::Uuid;

/// Share of sessions that also carry GPS counters
const GPS_PROBABILITY: f64 = 0.6;

/// Wellness surveys per week
const SURVEYS_PER_WEEK: usize = 3;

/// Seed `athletes` athletes with `weeks` weeks of history starting at `start`
///
/// The same seed always produces the same ids and values. Seed into an empty
/// database; session ids collide on a second run with the same seed.
pub async fn run(
    database: &Database,
    athletes: u32,
    weeks: u32,
    seed: u64,
    start: NaiveDate,
) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let first_monday = week_start(start);
    let mut sessions = 0_usize;

    for index in 1..=athletes {
        let athlete = Athlete {
            id: Uuid::from_u128(rng.gen()),
            name: format!("Demo Athlete {index}"),
            active: true,
        };
        database.upsert_athlete(&athlete).await?;

        let base_rating: i32 = rng.gen_range(4..=7);
        for week in 0..weeks {
            let monday = first_monday
                .checked_add_days(Days::new(u64::from(week) * 7))
                .context("seed range overflows the calendar")?;
            sessions += seed_week(database, &mut rng, athlete.id, monday, base_rating).await?;
        }
        info!(athlete_id = %athlete.id, name = %athlete.name, "Seeded athlete");
    }

    println!("Seeded {athletes} athletes, {weeks} weeks, {sessions} sessions (seed {seed})");
    Ok(())
}

async fn seed_week(
    database: &Database,
    rng: &mut ChaCha8Rng,
    athlete_id: Uuid,
    monday: NaiveDate,
    base_rating: i32,
) -> Result<usize> {
    let days: Vec<u64> = (0..7).collect();

    // Two-session weeks fall below the default gate and show up as skipped
    let session_count = rng.gen_range(2..=6);
    let mut session_days: Vec<u64> = days.choose_multiple(rng, session_count).copied().collect();
    session_days.sort_unstable();

    for offset in session_days {
        let occurred_at = monday
            .checked_add_days(Days::new(offset))
            .and_then(|d| d.and_hms_opt(17, 0, 0))
            .context("invalid session timestamp")?
            .and_utc();
        let rating = (base_rating + rng.gen_range(-2..=2)).clamp(1, 10);
        let duration_minutes = f64::from(rng.gen_range(6_u32..=24) * 5);
        let session = SessionLoadRecord::new(
            athlete_id,
            Uuid::from_u128(rng.gen()),
            occurred_at,
            rating,
            duration_minutes,
        );
        database.insert_session_load(&session).await?;

        if rng.gen_bool(GPS_PROBABILITY) {
            let gps = GpsSessionRecord {
                athlete_id,
                session_id: session.session_id,
                occurred_at,
                distance_m: (duration_minutes * rng.gen_range(60.0..110.0)).round(),
                high_speed_efforts: rng.gen_range(0..=25),
                accelerations: rng.gen_range(5..=60),
                decelerations: rng.gen_range(5..=60),
            };
            database.insert_gps_session(&gps).await?;
        }
    }

    let survey_days: Vec<u64> = days.choose_multiple(rng, SURVEYS_PER_WEEK).copied().collect();
    for offset in survey_days {
        let recorded_on = monday
            .checked_add_days(Days::new(offset))
            .context("invalid survey date")?;
        let score = f64::from(rng.gen_range(350_u32..=950)) / 10.0;
        database
            .insert_wellness(&WellnessRecord {
                athlete_id,
                recorded_on,
                score,
            })
            .await?;
    }

    Ok(session_count)
}
