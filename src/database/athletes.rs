// ABOUTME: Athlete reference data storage and the AthleteDirectory implementation
// ABOUTME: Read-only for the engine; the insert helper serves seeding and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use super::{parse_uuid, Database, DatabaseError};
use crate::ledger::AthleteDirectory;
use async_trait::async_trait;
use loadguard_core::errors::AppResult;
use loadguard_core::models::Athlete;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

const TABLE: &str = "athletes";

impl Database {
    /// Create the athletes table
    pub(super) async fn migrate_athletes(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS athletes (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                active BOOLEAN NOT NULL DEFAULT 1
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_athletes_active ON athletes(active)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert or update an athlete
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails
    pub async fn upsert_athlete(&self, athlete: &Athlete) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO athletes (id, name, active) VALUES ($1, $2, $3)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name, active = excluded.active
            ",
        )
        .bind(athlete.id.to_string())
        .bind(&athlete.name)
        .bind(athlete.active)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    fn row_to_athlete(row: &SqliteRow) -> Result<Athlete, DatabaseError> {
        let id: String = row.try_get("id")?;
        Ok(Athlete {
            id: parse_uuid(TABLE, &id)?,
            name: row.try_get("name")?,
            active: row.try_get("active")?,
        })
    }
}

#[async_trait]
impl AthleteDirectory for Database {
    async fn list_active_athletes(&self) -> AppResult<Vec<Athlete>> {
        let rows = sqlx::query("SELECT id, name, active FROM athletes WHERE active = 1 ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(rows
            .iter()
            .map(Self::row_to_athlete)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn get_athlete(&self, athlete_id: Uuid) -> AppResult<Option<Athlete>> {
        let row = sqlx::query("SELECT id, name, active FROM athletes WHERE id = $1")
            .bind(athlete_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(row.as_ref().map(Self::row_to_athlete).transpose()?)
    }
}
