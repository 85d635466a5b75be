// ABOUTME: SQLite database manager, connection pool, and schema migrations
// ABOUTME: Implements the ledger, wellness, athlete, and metric sink traits over one pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

//! # Database Management
//!
//! `SQLite` persistence for the engine. Upstream tables (`athletes`,
//! `session_loads`, `gps_sessions`, `wellness_records`) are written by
//! ingestion and only read here, apart from the insert helpers used for
//! seeding and tests. The engine owns `weekly_load_metrics` and
//! `risk_assessments`.
//!
//! Derived rows carry no timestamps, so recomputing an unchanged ledger
//! rewrites byte-identical rows.

mod athletes;
pub mod errors;
mod metrics;
mod sessions;
mod wellness;

pub use errors::DatabaseError;

use loadguard_core::errors::AppResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

use crate::logging::BatchLogger;

/// Pool size for file-backed databases
const FILE_POOL_CONNECTIONS: u32 = 8;

/// Wait for a locked database before failing a statement
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database manager for ledger reads and derived-metric writes
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect, creating the database file if needed, and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails, or a
    /// migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(DatabaseError::from)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        // An in-memory database lives only as long as its connections, so
        // keep exactly one open for the pool's lifetime.
        let in_memory = database_url.contains(":memory:");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(FILE_POOL_CONNECTIONS)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(DatabaseError::from)?;

        let db = Self { pool };
        db.migrate().await?;
        debug!(database_url, in_memory, "Database ready");
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any `CREATE` statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        let started = Instant::now();

        self.migrate_athletes().await?;
        self.migrate_sessions().await?;
        self.migrate_wellness().await?;
        self.migrate_metrics().await?;

        BatchLogger::log_database_operation(
            "migrate",
            "all",
            true,
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        );
        Ok(())
    }
}

/// Decode a TEXT uuid column
fn parse_uuid(table: &'static str, raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw)
        .map_err(|e| DatabaseError::corrupt(table, format!("invalid uuid {raw:?}: {e}")))
}

/// Encode a non-negative count for an INTEGER column
fn count_to_i64(value: u32) -> i64 {
    i64::from(value)
}

/// Decode an INTEGER count column
fn count_from_i64(table: &'static str, value: i64) -> Result<u32, DatabaseError> {
    u32::try_from(value)
        .map_err(|_| DatabaseError::corrupt(table, format!("count {value} out of range")))
}
