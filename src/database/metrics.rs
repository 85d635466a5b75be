// ABOUTME: Derived weekly load metrics and risk assessments, the engine's only writable tables
// ABOUTME: Implements MetricSink with transactional upserts keyed by (athlete_id, week_start)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use super::{count_from_i64, count_to_i64, parse_uuid, Database, DatabaseError};
use crate::ledger::MetricSink;
use async_trait::async_trait;
use chrono::NaiveDate;
use loadguard_core::errors::AppResult;
use loadguard_core::models::{
    FactorScore, MetricSet, MetricValue, RiskAssessment, RiskCategory, RiskTier, WeeklyLoadMetric,
};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

const METRICS: &str = "weekly_load_metrics";
const ASSESSMENTS: &str = "risk_assessments";

const METRIC_COLUMNS: &str = "athlete_id, week_start, session_count, total_load, mean_load, \
     stdev_load, monotony, strain, acute_load, chronic_load, acwr, \
     z_monotony, z_strain, z_acwr, tier_monotony, tier_strain, tier_acwr";

const ASSESSMENT_COLUMNS: &str =
    "athlete_id, week_start, category, composite_score, components, explanation";

fn parse_tier(raw: &str) -> Result<RiskTier, DatabaseError> {
    RiskTier::parse(raw).ok_or_else(|| DatabaseError::corrupt(METRICS, format!("unknown tier {raw:?}")))
}

impl Database {
    /// Create the derived-metric tables
    pub(super) async fn migrate_metrics(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS weekly_load_metrics (
                athlete_id TEXT NOT NULL REFERENCES athletes(id) ON DELETE CASCADE,
                week_start TEXT NOT NULL,
                session_count INTEGER NOT NULL,
                total_load REAL NOT NULL,
                mean_load REAL NOT NULL,
                stdev_load REAL,
                monotony REAL,
                strain REAL,
                acute_load REAL NOT NULL,
                chronic_load REAL NOT NULL,
                acwr REAL NOT NULL,
                z_monotony REAL,
                z_strain REAL,
                z_acwr REAL,
                tier_monotony TEXT NOT NULL,
                tier_strain TEXT NOT NULL,
                tier_acwr TEXT NOT NULL,
                PRIMARY KEY (athlete_id, week_start)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS risk_assessments (
                athlete_id TEXT NOT NULL,
                week_start TEXT NOT NULL,
                category TEXT NOT NULL CHECK (category IN ('low', 'medium', 'high', 'not_assessable')),
                composite_score REAL,
                components TEXT NOT NULL,
                explanation TEXT NOT NULL,
                PRIMARY KEY (athlete_id, week_start),
                FOREIGN KEY (athlete_id, week_start)
                    REFERENCES weekly_load_metrics(athlete_id, week_start) ON DELETE CASCADE
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Every stored metric for an athlete, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded
    pub async fn list_weekly_metrics(&self, athlete_id: Uuid) -> AppResult<Vec<WeeklyLoadMetric>> {
        let sql = format!(
            "SELECT {METRIC_COLUMNS} FROM weekly_load_metrics WHERE athlete_id = $1 ORDER BY week_start"
        );
        let rows = sqlx::query(&sql)
            .bind(athlete_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(rows
            .iter()
            .map(Self::row_to_metric)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Every stored assessment for an athlete, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded
    pub async fn list_risk_assessments(&self, athlete_id: Uuid) -> AppResult<Vec<RiskAssessment>> {
        let sql = format!(
            "SELECT {ASSESSMENT_COLUMNS} FROM risk_assessments WHERE athlete_id = $1 ORDER BY week_start"
        );
        let rows = sqlx::query(&sql)
            .bind(athlete_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(rows
            .iter()
            .map(Self::row_to_assessment)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn row_to_metric(row: &SqliteRow) -> Result<WeeklyLoadMetric, DatabaseError> {
        let athlete_id: String = row.try_get("athlete_id")?;
        let tier_monotony: String = row.try_get("tier_monotony")?;
        let tier_strain: String = row.try_get("tier_strain")?;
        let tier_acwr: String = row.try_get("tier_acwr")?;

        Ok(WeeklyLoadMetric {
            athlete_id: parse_uuid(METRICS, &athlete_id)?,
            week_start: row.try_get("week_start")?,
            session_count: count_from_i64(METRICS, row.try_get("session_count")?)?,
            total_load: row.try_get("total_load")?,
            mean_load: row.try_get("mean_load")?,
            stdev_load: MetricValue::from_option(row.try_get("stdev_load")?),
            monotony: MetricValue::from_option(row.try_get("monotony")?),
            strain: MetricValue::from_option(row.try_get("strain")?),
            acute_load: row.try_get("acute_load")?,
            chronic_load: row.try_get("chronic_load")?,
            acwr: row.try_get("acwr")?,
            z_scores: MetricSet {
                monotony: MetricValue::from_option(row.try_get("z_monotony")?),
                strain: MetricValue::from_option(row.try_get("z_strain")?),
                acwr: MetricValue::from_option(row.try_get("z_acwr")?),
            },
            tiers: MetricSet {
                monotony: parse_tier(&tier_monotony)?,
                strain: parse_tier(&tier_strain)?,
                acwr: parse_tier(&tier_acwr)?,
            },
        })
    }

    fn row_to_assessment(row: &SqliteRow) -> Result<RiskAssessment, DatabaseError> {
        let athlete_id: String = row.try_get("athlete_id")?;
        let category: String = row.try_get("category")?;
        let components: String = row.try_get("components")?;

        Ok(RiskAssessment {
            athlete_id: parse_uuid(ASSESSMENTS, &athlete_id)?,
            week_start: row.try_get("week_start")?,
            category: RiskCategory::parse(&category).ok_or_else(|| {
                DatabaseError::corrupt(ASSESSMENTS, format!("unknown category {category:?}"))
            })?,
            composite_score: row.try_get("composite_score")?,
            components: serde_json::from_str::<Vec<FactorScore>>(&components)?,
            explanation: row.try_get("explanation")?,
        })
    }
}

#[async_trait]
impl MetricSink for Database {
    async fn upsert_week(
        &self,
        metric: &WeeklyLoadMetric,
        assessment: &RiskAssessment,
    ) -> AppResult<()> {
        let components = serde_json::to_string(&assessment.components).map_err(DatabaseError::from)?;
        let athlete_id = metric.athlete_id.to_string();

        // Dropping the transaction on an early return rolls it back
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        sqlx::query(
            r"
            INSERT INTO weekly_load_metrics (
                athlete_id, week_start, session_count, total_load, mean_load,
                stdev_load, monotony, strain, acute_load, chronic_load, acwr,
                z_monotony, z_strain, z_acwr, tier_monotony, tier_strain, tier_acwr
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT(athlete_id, week_start) DO UPDATE SET
                session_count = excluded.session_count,
                total_load = excluded.total_load,
                mean_load = excluded.mean_load,
                stdev_load = excluded.stdev_load,
                monotony = excluded.monotony,
                strain = excluded.strain,
                acute_load = excluded.acute_load,
                chronic_load = excluded.chronic_load,
                acwr = excluded.acwr,
                z_monotony = excluded.z_monotony,
                z_strain = excluded.z_strain,
                z_acwr = excluded.z_acwr,
                tier_monotony = excluded.tier_monotony,
                tier_strain = excluded.tier_strain,
                tier_acwr = excluded.tier_acwr
            ",
        )
        .bind(&athlete_id)
        .bind(metric.week_start)
        .bind(count_to_i64(metric.session_count))
        .bind(metric.total_load)
        .bind(metric.mean_load)
        .bind(metric.stdev_load.value())
        .bind(metric.monotony.value())
        .bind(metric.strain.value())
        .bind(metric.acute_load)
        .bind(metric.chronic_load)
        .bind(metric.acwr)
        .bind(metric.z_scores.monotony.value())
        .bind(metric.z_scores.strain.value())
        .bind(metric.z_scores.acwr.value())
        .bind(metric.tiers.monotony.as_str())
        .bind(metric.tiers.strain.as_str())
        .bind(metric.tiers.acwr.as_str())
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        sqlx::query(
            r"
            INSERT INTO risk_assessments
                (athlete_id, week_start, category, composite_score, components, explanation)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT(athlete_id, week_start) DO UPDATE SET
                category = excluded.category,
                composite_score = excluded.composite_score,
                components = excluded.components,
                explanation = excluded.explanation
            ",
        )
        .bind(&athlete_id)
        .bind(assessment.week_start)
        .bind(assessment.category.as_str())
        .bind(assessment.composite_score)
        .bind(components)
        .bind(&assessment.explanation)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn remove_week(&self, athlete_id: Uuid, week_start: NaiveDate) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM weekly_load_metrics WHERE athlete_id = $1 AND week_start = $2")
                .bind(athlete_id.to_string())
                .bind(week_start)
                .execute(&self.pool)
                .await
                .map_err(DatabaseError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_metric_history(
        &self,
        athlete_id: Uuid,
        before: NaiveDate,
    ) -> AppResult<Vec<WeeklyLoadMetric>> {
        let sql = format!(
            "SELECT {METRIC_COLUMNS} FROM weekly_load_metrics \
             WHERE athlete_id = $1 AND week_start < $2 ORDER BY week_start"
        );
        let rows = sqlx::query(&sql)
            .bind(athlete_id.to_string())
            .bind(before)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(rows
            .iter()
            .map(Self::row_to_metric)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn get_weekly_metric(
        &self,
        athlete_id: Uuid,
        week_start: NaiveDate,
    ) -> AppResult<Option<WeeklyLoadMetric>> {
        let sql = format!(
            "SELECT {METRIC_COLUMNS} FROM weekly_load_metrics WHERE athlete_id = $1 AND week_start = $2"
        );
        let row = sqlx::query(&sql)
            .bind(athlete_id.to_string())
            .bind(week_start)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(row.as_ref().map(Self::row_to_metric).transpose()?)
    }

    async fn get_risk_assessment(
        &self,
        athlete_id: Uuid,
        week_start: NaiveDate,
    ) -> AppResult<Option<RiskAssessment>> {
        let sql = format!(
            "SELECT {ASSESSMENT_COLUMNS} FROM risk_assessments WHERE athlete_id = $1 AND week_start = $2"
        );
        let row = sqlx::query(&sql)
            .bind(athlete_id.to_string())
            .bind(week_start)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(row.as_ref().map(Self::row_to_assessment).transpose()?)
    }
}
