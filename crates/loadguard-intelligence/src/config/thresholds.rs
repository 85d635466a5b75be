// ABOUTME: Tier threshold tables for monotony, strain, ACWR, wellness, and composite score
// ABOUTME: Two strictly increasing cut points per table plus the direction risk grows in
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

//! Threshold Configuration
//!
//! Every classified quantity has a table of two cut points. Tables are
//! validated when the configuration is loaded, so classification itself can
//! never see an unordered table.

use loadguard_core::constants::thresholds;
use loadguard_core::models::{LoadMetric, RiskTier};
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Which end of the scale carries risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierDirection {
    /// Larger values are riskier (monotony, strain, ACWR, composite)
    HigherIsRiskier,
    /// Smaller values are riskier (wellness)
    LowerIsRiskier,
}

/// Two cut points splitting a scale into Low / Medium / High
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    /// Lower cut point
    pub lower: f64,
    /// Upper cut point, strictly greater than `lower`
    pub upper: f64,
    /// Which end of the scale carries risk
    pub direction: TierDirection,
}

impl ThresholdTable {
    /// Table where larger values are riskier
    #[must_use]
    pub const fn ascending(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            direction: TierDirection::HigherIsRiskier,
        }
    }

    /// Table where smaller values are riskier
    #[must_use]
    pub const fn descending(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            direction: TierDirection::LowerIsRiskier,
        }
    }

    /// Reject tables that are not finite and strictly increasing
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidThresholds` naming the table
    pub fn validate(&self, metric: &'static str) -> Result<(), ConfigError> {
        if self.lower.is_finite() && self.upper.is_finite() && self.lower < self.upper {
            Ok(())
        } else {
            Err(ConfigError::InvalidThresholds {
                metric,
                lower: self.lower,
                upper: self.upper,
            })
        }
    }

    /// Tier for a finite value
    ///
    /// Ascending: `v <= lower` is Low, `v <= upper` is Medium, else High.
    /// Descending: `v >= upper` is Low, `v >= lower` is Medium, else High.
    /// Non-finite values have no tier.
    #[must_use]
    pub fn tier(&self, value: f64) -> RiskTier {
        if !value.is_finite() {
            return RiskTier::InsufficientData;
        }
        match self.direction {
            TierDirection::HigherIsRiskier => {
                if value <= self.lower {
                    RiskTier::Low
                } else if value <= self.upper {
                    RiskTier::Medium
                } else {
                    RiskTier::High
                }
            }
            TierDirection::LowerIsRiskier => {
                if value >= self.upper {
                    RiskTier::Low
                } else if value >= self.lower {
                    RiskTier::Medium
                } else {
                    RiskTier::High
                }
            }
        }
    }
}

/// Names of the threshold tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMetric {
    /// Training monotony
    Monotony,
    /// Training strain
    Strain,
    /// Acute : chronic workload ratio
    Acwr,
    /// Wellness self-report
    Wellness,
    /// Composite severity score
    Composite,
}

impl ThresholdMetric {
    /// Every table, in validation order
    pub const ALL: [Self; 5] = [
        Self::Monotony,
        Self::Strain,
        Self::Acwr,
        Self::Wellness,
        Self::Composite,
    ];

    /// Stable identifier used in errors and env var names
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monotony => "monotony",
            Self::Strain => "strain",
            Self::Acwr => "acwr",
            Self::Wellness => "wellness",
            Self::Composite => "composite",
        }
    }
}

impl From<LoadMetric> for ThresholdMetric {
    fn from(metric: LoadMetric) -> Self {
        match metric {
            LoadMetric::Monotony => Self::Monotony,
            LoadMetric::Strain => Self::Strain,
            LoadMetric::Acwr => Self::Acwr,
        }
    }
}

/// All threshold tables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Monotony table
    pub monotony: ThresholdTable,
    /// Strain table
    pub strain: ThresholdTable,
    /// ACWR table
    pub acwr: ThresholdTable,
    /// Wellness table (descending)
    pub wellness: ThresholdTable,
    /// Composite severity table
    pub composite: ThresholdTable,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            monotony: ThresholdTable::ascending(thresholds::MONOTONY.0, thresholds::MONOTONY.1),
            strain: ThresholdTable::ascending(thresholds::STRAIN.0, thresholds::STRAIN.1),
            acwr: ThresholdTable::ascending(thresholds::ACWR.0, thresholds::ACWR.1),
            wellness: ThresholdTable::descending(thresholds::WELLNESS.0, thresholds::WELLNESS.1),
            composite: ThresholdTable::ascending(
                thresholds::COMPOSITE.0,
                thresholds::COMPOSITE.1,
            ),
        }
    }
}

impl ThresholdConfig {
    /// Table for `metric`
    #[must_use]
    pub const fn table(&self, metric: ThresholdMetric) -> &ThresholdTable {
        match metric {
            ThresholdMetric::Monotony => &self.monotony,
            ThresholdMetric::Strain => &self.strain,
            ThresholdMetric::Acwr => &self.acwr,
            ThresholdMetric::Wellness => &self.wellness,
            ThresholdMetric::Composite => &self.composite,
        }
    }

    /// Mutable table for `metric`
    pub fn table_mut(&mut self, metric: ThresholdMetric) -> &mut ThresholdTable {
        match metric {
            ThresholdMetric::Monotony => &mut self.monotony,
            ThresholdMetric::Strain => &mut self.strain,
            ThresholdMetric::Acwr => &mut self.acwr,
            ThresholdMetric::Wellness => &mut self.wellness,
            ThresholdMetric::Composite => &mut self.composite,
        }
    }

    /// Validate every table
    ///
    /// # Errors
    ///
    /// Returns the first table that is not strictly increasing
    pub fn validate(&self) -> Result<(), ConfigError> {
        for metric in ThresholdMetric::ALL {
            self.table(metric).validate(metric.as_str())?;
        }
        Ok(())
    }
}
