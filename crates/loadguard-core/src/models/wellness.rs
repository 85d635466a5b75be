// ABOUTME: Wellness self-report record consumed by the composite risk aggregator
// ABOUTME: One composite score per athlete per day on a bounded scale
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Daily wellness survey result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessRecord {
    /// Athlete the survey belongs to
    pub athlete_id: Uuid,
    /// Day the survey was answered
    pub recorded_on: NaiveDate,
    /// Composite wellness score (higher is better)
    pub score: f64,
}
