// ABOUTME: Core data models for the training-load risk engine
// ABOUTME: Re-exports athletes, ledger records, weekly metrics, and risk assessments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

//! # Data Models
//!
//! Typed records shared by every layer of the engine. Anything that can be
//! "not computed" is modelled explicitly ([`MetricValue::InsufficientData`],
//! [`RiskTier::InsufficientData`], [`RiskCategory::NotAssessable`]) rather than
//! as a zero, so a missing signal can never be read as "no risk".

mod assessment;
mod athlete;
mod metrics;
mod session;
mod wellness;

pub use assessment::{FactorScore, RiskAssessment, RiskCategory, RiskFactor};
pub use athlete::Athlete;
pub use metrics::{LoadMetric, MetricSet, MetricValue, RiskTier, WeeklyLoadMetric};
pub use session::{GpsSessionRecord, SessionLoad, SessionLoadRecord};
pub use wellness::WellnessRecord;
