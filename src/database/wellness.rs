// ABOUTME: Wellness survey storage and the WellnessSource implementation
// ABOUTME: One score per athlete per day; the latest on or before a date drives the wellness factor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use super::{parse_uuid, Database, DatabaseError};
use crate::ledger::WellnessSource;
use async_trait::async_trait;
use chrono::NaiveDate;
use loadguard_core::errors::AppResult;
use loadguard_core::models::WellnessRecord;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

const TABLE: &str = "wellness_records";

impl Database {
    /// Create the wellness table
    pub(super) async fn migrate_wellness(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS wellness_records (
                athlete_id TEXT NOT NULL REFERENCES athletes(id) ON DELETE CASCADE,
                recorded_on TEXT NOT NULL,
                score REAL NOT NULL,
                PRIMARY KEY (athlete_id, recorded_on)
            )
            ",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Record a wellness score, replacing any score for the same day
    ///
    /// # Errors
    ///
    /// Returns an error if the athlete does not exist or the write fails
    pub async fn insert_wellness(&self, record: &WellnessRecord) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO wellness_records (athlete_id, recorded_on, score) VALUES ($1, $2, $3)
            ON CONFLICT(athlete_id, recorded_on) DO UPDATE SET score = excluded.score
            ",
        )
        .bind(record.athlete_id.to_string())
        .bind(record.recorded_on)
        .bind(record.score)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    fn row_to_wellness(row: &SqliteRow) -> Result<WellnessRecord, DatabaseError> {
        let athlete_id: String = row.try_get("athlete_id")?;
        Ok(WellnessRecord {
            athlete_id: parse_uuid(TABLE, &athlete_id)?,
            recorded_on: row.try_get("recorded_on")?,
            score: row.try_get("score")?,
        })
    }
}

#[async_trait]
impl WellnessSource for Database {
    async fn get_latest_wellness(
        &self,
        athlete_id: Uuid,
        as_of: NaiveDate,
    ) -> AppResult<Option<f64>> {
        let score: Option<f64> = sqlx::query_scalar(
            r"
            SELECT score FROM wellness_records
            WHERE athlete_id = $1 AND recorded_on <= $2
            ORDER BY recorded_on DESC
            LIMIT 1
            ",
        )
        .bind(athlete_id.to_string())
        .bind(as_of)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(score)
    }

    async fn get_wellness_records(
        &self,
        athlete_id: Uuid,
        up_to: Option<NaiveDate>,
    ) -> AppResult<Vec<WellnessRecord>> {
        let rows = sqlx::query(
            r"
            SELECT athlete_id, recorded_on, score FROM wellness_records
            WHERE athlete_id = $1 AND ($2 IS NULL OR recorded_on <= $2)
            ORDER BY recorded_on
            ",
        )
        .bind(athlete_id.to_string())
        .bind(up_to)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(rows
            .iter()
            .map(Self::row_to_wellness)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
