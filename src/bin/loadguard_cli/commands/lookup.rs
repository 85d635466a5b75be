// ABOUTME: Lookup commands for loadguard-cli
// ABOUTME: Prints stored weekly metrics and risk assessments as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use loadguard::database::Database;
use loadguard::ledger::EngineResources;
use loadguard::query::{QueryFacade, RiskAssessmentLookup};
use loadguard_intelligence::LoadRiskConfig;
use uuid::Uuid;

use crate::display;

/// Print the weekly metric and the windows it was computed from
pub async fn metric(
    database: Arc<Database>,
    config: &LoadRiskConfig,
    athlete: Uuid,
    week: NaiveDate,
) -> Result<()> {
    let facade = QueryFacade::new(EngineResources::from_backend(database), config);
    let lookup = facade.get_weekly_metric(athlete, week).await?;
    let windows = facade.get_load_windows(athlete, week).await?;
    display::print_json(&serde_json::json!({
        "lookup": lookup,
        "acute_window": windows.acute,
        "chronic_window_len": windows.chronic.len(),
    }))
}

/// Print the risk assessment, with its explanation on its own line
pub async fn assessment(
    database: Arc<Database>,
    config: &LoadRiskConfig,
    athlete: Uuid,
    week: NaiveDate,
) -> Result<()> {
    let facade = QueryFacade::new(EngineResources::from_backend(database), config);
    let lookup = facade.get_risk_assessment(athlete, week).await?;
    display::print_json(&lookup)?;
    if let RiskAssessmentLookup::Assessed(assessment) = &lookup {
        println!("\n{}", assessment.explanation);
    }
    Ok(())
}
