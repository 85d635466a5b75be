// ABOUTME: Athlete-level risk assessment derived from weekly metrics and wellness
// ABOUTME: Defines RiskCategory, RiskFactor, FactorScore, and RiskAssessment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::metrics::{LoadMetric, MetricValue, RiskTier};

/// Final athlete-week injury risk category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    /// Composite below the lower cut point
    Low,
    /// Composite between the cut points
    Medium,
    /// Composite beyond the upper cut point
    High,
    /// Every factor lacked data; absence of signal is not evidence of safety
    NotAssessable,
}

impl RiskCategory {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::NotAssessable => "not_assessable",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "not_assessable" => Some(Self::NotAssessable),
            _ => None,
        }
    }

    /// Map a metric-style tier onto a category
    #[must_use]
    pub const fn from_tier(tier: RiskTier) -> Self {
        match tier {
            RiskTier::Low => Self::Low,
            RiskTier::Medium => Self::Medium,
            RiskTier::High => Self::High,
            RiskTier::InsufficientData => Self::NotAssessable,
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::NotAssessable => "Not assessable",
        };
        f.write_str(label)
    }
}

/// A contributor to the composite risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    /// Training monotony
    Monotony,
    /// Training strain
    Strain,
    /// Acute : chronic workload ratio
    Acwr,
    /// Most recent wellness self-report
    Wellness,
}

impl RiskFactor {
    /// Fixed order used for scoring and for the explanation text
    pub const ORDER: [Self; 4] = [Self::Monotony, Self::Strain, Self::Acwr, Self::Wellness];

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Monotony => "Monotony",
            Self::Strain => "Strain",
            Self::Acwr => "ACWR",
            Self::Wellness => "Wellness",
        }
    }
}

impl From<LoadMetric> for RiskFactor {
    fn from(metric: LoadMetric) -> Self {
        match metric {
            LoadMetric::Monotony => Self::Monotony,
            LoadMetric::Strain => Self::Strain,
            LoadMetric::Acwr => Self::Acwr,
        }
    }
}

/// One factor's contribution to an assessment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    /// Which factor
    pub factor: RiskFactor,
    /// Raw value the tier was derived from
    pub value: MetricValue,
    /// Tier of the value
    pub tier: RiskTier,
    /// Configured weight (before re-normalisation)
    pub weight: f64,
}

impl FactorScore {
    /// Severity on the 0-2 scale; `None` when the factor is excluded
    #[must_use]
    pub const fn severity(&self) -> Option<u8> {
        self.tier.severity()
    }

    /// Whether this factor contributes to the composite
    #[must_use]
    pub const fn is_included(&self) -> bool {
        self.tier.severity().is_some()
    }
}

/// Athlete-week risk rating with a reproducible explanation
///
/// Always recomputable from the weekly metric and wellness data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Athlete
    pub athlete_id: Uuid,
    /// Monday of the calendar week
    pub week_start: NaiveDate,
    /// Final category
    pub category: RiskCategory,
    /// Weighted mean severity of included factors; `None` when not assessable
    pub composite_score: Option<f64>,
    /// Every factor in [`RiskFactor::ORDER`], included or not
    pub components: Vec<FactorScore>,
    /// Deterministic, factor-by-factor explanation
    pub explanation: String,
}

impl RiskAssessment {
    /// Whether the assessment carries a real risk rating
    #[must_use]
    pub fn is_assessable(&self) -> bool {
        self.category != RiskCategory::NotAssessable
    }

    /// Component for `factor`
    #[must_use]
    pub fn component(&self, factor: RiskFactor) -> Option<&FactorScore> {
        self.components.iter().find(|c| c.factor == factor)
    }
}
