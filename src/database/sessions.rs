// ABOUTME: Session ledger storage (effort loads and GPS counters) and the SessionLedger implementation
// ABOUTME: Rows are append-only upstream data; the engine reads them in time order per athlete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use super::{count_from_i64, count_to_i64, parse_uuid, Database, DatabaseError};
use crate::ledger::SessionLedger;
use async_trait::async_trait;
use chrono::NaiveDate;
use loadguard_core::errors::AppResult;
use loadguard_core::models::{GpsSessionRecord, SessionLoad, SessionLoadRecord};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

const SESSIONS: &str = "session_loads";
const GPS: &str = "gps_sessions";

impl Database {
    /// Create ledger tables
    pub(super) async fn migrate_sessions(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS session_loads (
                session_id TEXT PRIMARY KEY,
                athlete_id TEXT NOT NULL REFERENCES athletes(id) ON DELETE CASCADE,
                occurred_at TEXT NOT NULL,
                session_date TEXT NOT NULL,
                rating INTEGER NOT NULL,
                duration_minutes REAL NOT NULL,
                load REAL NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS gps_sessions (
                session_id TEXT PRIMARY KEY,
                athlete_id TEXT NOT NULL REFERENCES athletes(id) ON DELETE CASCADE,
                occurred_at TEXT NOT NULL,
                session_date TEXT NOT NULL,
                distance_m REAL NOT NULL,
                high_speed_efforts INTEGER NOT NULL,
                accelerations INTEGER NOT NULL,
                decelerations INTEGER NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_session_loads_athlete_time ON session_loads(athlete_id, occurred_at)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_gps_sessions_athlete_time ON gps_sessions(athlete_id, occurred_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Append a session load record exactly as given (no validation)
    ///
    /// # Errors
    ///
    /// Returns an error if the athlete does not exist or the write fails
    pub async fn insert_session_load(&self, record: &SessionLoadRecord) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO session_loads
                (session_id, athlete_id, occurred_at, session_date, rating, duration_minutes, load)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(record.session_id.to_string())
        .bind(record.athlete_id.to_string())
        .bind(record.occurred_at)
        .bind(record.session_date())
        .bind(record.rating)
        .bind(record.duration_minutes)
        .bind(record.load)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Append a GPS movement record
    ///
    /// # Errors
    ///
    /// Returns an error if the athlete does not exist or the write fails
    pub async fn insert_gps_session(&self, record: &GpsSessionRecord) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO gps_sessions
                (session_id, athlete_id, occurred_at, session_date, distance_m,
                 high_speed_efforts, accelerations, decelerations)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(record.session_id.to_string())
        .bind(record.athlete_id.to_string())
        .bind(record.occurred_at)
        .bind(record.session_date())
        .bind(record.distance_m)
        .bind(count_to_i64(record.high_speed_efforts))
        .bind(count_to_i64(record.accelerations))
        .bind(count_to_i64(record.decelerations))
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    fn row_to_session(row: &SqliteRow) -> Result<SessionLoadRecord, DatabaseError> {
        let athlete_id: String = row.try_get("athlete_id")?;
        let session_id: String = row.try_get("session_id")?;
        Ok(SessionLoadRecord {
            athlete_id: parse_uuid(SESSIONS, &athlete_id)?,
            session_id: parse_uuid(SESSIONS, &session_id)?,
            occurred_at: row.try_get("occurred_at")?,
            rating: row.try_get("rating")?,
            duration_minutes: row.try_get("duration_minutes")?,
            load: row.try_get("load")?,
        })
    }

    fn row_to_gps(row: &SqliteRow) -> Result<GpsSessionRecord, DatabaseError> {
        let athlete_id: String = row.try_get("athlete_id")?;
        let session_id: String = row.try_get("session_id")?;
        Ok(GpsSessionRecord {
            athlete_id: parse_uuid(GPS, &athlete_id)?,
            session_id: parse_uuid(GPS, &session_id)?,
            occurred_at: row.try_get("occurred_at")?,
            distance_m: row.try_get("distance_m")?,
            high_speed_efforts: count_from_i64(GPS, row.try_get("high_speed_efforts")?)?,
            accelerations: count_from_i64(GPS, row.try_get("accelerations")?)?,
            decelerations: count_from_i64(GPS, row.try_get("decelerations")?)?,
        })
    }
}

#[async_trait]
impl SessionLedger for Database {
    async fn get_session_loads(
        &self,
        athlete_id: Uuid,
        up_to: NaiveDate,
        limit_by_count: usize,
    ) -> AppResult<Vec<SessionLoad>> {
        let rows = sqlx::query(
            r"
            SELECT session_date, load FROM session_loads
            WHERE athlete_id = $1 AND session_date <= $2
            ORDER BY occurred_at DESC, session_id DESC
            LIMIT $3
            ",
        )
        .bind(athlete_id.to_string())
        .bind(up_to)
        .bind(i64::try_from(limit_by_count).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        let mut loads = rows
            .iter()
            .map(|row| -> Result<SessionLoad, DatabaseError> {
                Ok(SessionLoad {
                    date: row.try_get("session_date")?,
                    load: row.try_get("load")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        loads.reverse();
        Ok(loads)
    }

    async fn get_session_records(
        &self,
        athlete_id: Uuid,
        up_to: Option<NaiveDate>,
    ) -> AppResult<Vec<SessionLoadRecord>> {
        let rows = sqlx::query(
            r"
            SELECT session_id, athlete_id, occurred_at, rating, duration_minutes, load
            FROM session_loads
            WHERE athlete_id = $1 AND ($2 IS NULL OR session_date <= $2)
            ORDER BY occurred_at, session_id
            ",
        )
        .bind(athlete_id.to_string())
        .bind(up_to)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(rows
            .iter()
            .map(Self::row_to_session)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn get_gps_sessions(
        &self,
        athlete_id: Uuid,
        up_to: Option<NaiveDate>,
    ) -> AppResult<Vec<GpsSessionRecord>> {
        let rows = sqlx::query(
            r"
            SELECT session_id, athlete_id, occurred_at, distance_m,
                   high_speed_efforts, accelerations, decelerations
            FROM gps_sessions
            WHERE athlete_id = $1 AND ($2 IS NULL OR session_date <= $2)
            ORDER BY occurred_at, session_id
            ",
        )
        .bind(athlete_id.to_string())
        .bind(up_to)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(rows
            .iter()
            .map(Self::row_to_gps)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
