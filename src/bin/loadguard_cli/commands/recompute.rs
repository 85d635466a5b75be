// ABOUTME: Recompute command for loadguard-cli
// ABOUTME: Runs the batch driver and stops cleanly between units on Ctrl-C
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use loadguard::batch::{BatchRecomputeDriver, RecomputeScope};
use loadguard::database::Database;
use loadguard::ledger::EngineResources;
use loadguard_intelligence::LoadRiskConfig;
use tokio::signal;
use tracing::warn;
use uuid::Uuid;

use crate::display;

/// Recompute one athlete or all active athletes
pub async fn run(
    database: Arc<Database>,
    config: Arc<LoadRiskConfig>,
    athlete: Option<Uuid>,
    from_week: Option<NaiveDate>,
) -> Result<()> {
    let driver = BatchRecomputeDriver::new(EngineResources::from_backend(database), config);

    let cancellation = driver.cancellation_handle();
    let ctrl_c = tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight athlete-weeks");
            cancellation.cancel();
        }
    });

    let scope = athlete.map_or(RecomputeScope::All, RecomputeScope::Athlete);
    let report = driver.recompute(scope, from_week).await;
    ctrl_c.abort();

    display::print_report(&report?);
    Ok(())
}
