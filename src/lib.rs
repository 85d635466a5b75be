// ABOUTME: Main library entry point for the loadguard training-load risk engine
// ABOUTME: Wires collaborator traits, SQLite persistence, the batch driver, and the query facade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

#![deny(unsafe_code)]

//! # loadguard
//!
//! Converts per-session effort reports into weekly training-load metrics
//! (monotony, strain, acute:chronic workload ratio), classifies each into a
//! risk tier, and combines them with wellness self-reports into one risk
//! category per athlete-week, with a factor-by-factor explanation.
//!
//! ## Architecture
//!
//! - **`loadguard-core`**: error system, domain models, constants
//! - **`loadguard-intelligence`**: configuration and the pure computation
//!   pipeline (windows, metrics, tiers, composite)
//! - **This crate**: collaborator traits ([`ledger`]), `SQLite` storage
//!   ([`database`]), batch recomputation ([`batch`]), read access
//!   ([`query`]), and logging setup ([`logging`])
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use loadguard::batch::{BatchRecomputeDriver, RecomputeScope};
//! use loadguard::database::Database;
//! use loadguard::ledger::EngineResources;
//! use loadguard_intelligence::LoadRiskConfig;
//!
//! # async fn run() -> loadguard_core::errors::AppResult<()> {
//! let config = Arc::new(LoadRiskConfig::default());
//! let db = Arc::new(Database::new("sqlite:loadguard.db").await?);
//! let driver = BatchRecomputeDriver::new(EngineResources::from_backend(db), config);
//! let report = driver.recompute(RecomputeScope::All, None).await?;
//! println!("stored {} athlete-weeks", report.processed);
//! # Ok(())
//! # }
//! ```

/// Batch recomputation over athletes and weeks
pub mod batch;

/// `SQLite` persistence for upstream reads and derived writes
pub mod database;

/// Collaborator interfaces the engine reads from and writes to
pub mod ledger;

/// Structured logging setup
pub mod logging;

/// Read-only lookups of stored metrics and assessments
pub mod query;

pub use batch::{BatchRecomputeDriver, BatchRunReport, CancellationHandle, RecomputeScope};
pub use database::Database;
pub use ledger::{AthleteDirectory, EngineResources, MetricSink, SessionLedger, WellnessSource};
pub use query::{NotAssessableReason, QueryFacade, RiskAssessmentLookup, WeeklyMetricLookup};
