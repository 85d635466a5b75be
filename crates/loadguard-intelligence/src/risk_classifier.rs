// ABOUTME: Maps metric values onto Low/Medium/High/InsufficientData tiers
// ABOUTME: Stateless lookups against validated threshold tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use loadguard_core::models::{LoadMetric, MetricSet, MetricValue, RiskCategory, RiskTier};

use crate::config::{ThresholdConfig, ThresholdMetric};
use crate::load_metrics::LoadSnapshot;

/// Tier classification for every configured metric
///
/// Holds a copy of the validated tables; calls share no state.
#[derive(Debug, Clone, Copy)]
pub struct RiskClassifier {
    thresholds: ThresholdConfig,
}

impl RiskClassifier {
    /// Create a classifier over validated threshold tables
    #[must_use]
    pub const fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    /// Tier of `value` in the `metric` table; missing values are `InsufficientData`
    #[must_use]
    pub fn classify(&self, metric: ThresholdMetric, value: MetricValue) -> RiskTier {
        value.value().map_or(RiskTier::InsufficientData, |v| {
            self.thresholds.table(metric).tier(v)
        })
    }

    /// Tiers of monotony, strain, and ACWR, each classified independently
    #[must_use]
    pub fn classify_load(&self, snapshot: &LoadSnapshot) -> MetricSet<RiskTier> {
        MetricSet::from_fn(|metric: LoadMetric| {
            self.classify(metric.into(), snapshot.metric(metric))
        })
    }

    /// Tier of a wellness score; no score means `InsufficientData`
    #[must_use]
    pub fn classify_wellness(&self, score: Option<f64>) -> RiskTier {
        self.classify(ThresholdMetric::Wellness, MetricValue::from_option(score))
    }

    /// Final category of a composite severity score
    #[must_use]
    pub fn classify_composite(&self, score: f64) -> RiskCategory {
        RiskCategory::from_tier(self.classify(ThresholdMetric::Composite, score.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> RiskClassifier {
        RiskClassifier::new(ThresholdConfig::default())
    }

    #[test]
    fn test_missing_value_is_never_low() {
        let c = classifier();
        for metric in ThresholdMetric::ALL {
            assert_eq!(
                c.classify(metric, MetricValue::InsufficientData),
                RiskTier::InsufficientData
            );
        }
        assert_eq!(c.classify_wellness(None), RiskTier::InsufficientData);
    }

    #[test]
    fn test_default_tables() {
        let c = classifier();
        assert_eq!(c.classify(ThresholdMetric::Monotony, 4.74.into()), RiskTier::High);
        assert_eq!(c.classify(ThresholdMetric::Acwr, 1.18.into()), RiskTier::Low);
        assert_eq!(c.classify(ThresholdMetric::Acwr, 1.4.into()), RiskTier::Medium);
        assert_eq!(c.classify(ThresholdMetric::Strain, 15_650.0.into()), RiskTier::High);
        assert_eq!(c.classify_wellness(Some(72.0)), RiskTier::Low);
        assert_eq!(c.classify_wellness(Some(35.0)), RiskTier::High);
    }

    #[test]
    fn test_every_finite_value_gets_exactly_one_tier() {
        let c = classifier();
        let mut v = -10.0;
        while v < 10.0 {
            let tier = c.classify(ThresholdMetric::Acwr, v.into());
            assert!(tier.severity().is_some());
            v += 0.05;
        }
    }

    #[test]
    fn test_composite_categories() {
        let c = classifier();
        assert_eq!(c.classify_composite(0.0), RiskCategory::Low);
        assert_eq!(c.classify_composite(4.0 / 3.0), RiskCategory::Medium);
        assert_eq!(c.classify_composite(2.0), RiskCategory::High);
    }
}
