// ABOUTME: Combines metric tiers and wellness into one athlete-week risk assessment
// ABOUTME: Re-normalised weighted severity plus a deterministic factor-by-factor explanation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

//! Composite Risk Aggregator
//!
//! Each factor's tier becomes a severity (Low 0, Medium 1, High 2). Factors
//! without data are recorded but excluded, and the remaining weights are
//! re-normalised so a missing factor never counts as "no risk". When nothing
//! can be scored the assessment is [`RiskCategory::NotAssessable`].
//!
//! The explanation text is built in a fixed order so that two runs over the
//! same data produce the same string and week-to-week output diffs cleanly.

use std::fmt::Write as _;

use loadguard_core::models::{
    FactorScore, GpsSessionRecord, LoadMetric, MetricValue, RiskAssessment, RiskCategory,
    RiskFactor, WeeklyLoadMetric,
};
use serde::{Deserialize, Serialize};

use crate::config::{CompositeWeights, LoadRiskConfig};
use crate::risk_classifier::RiskClassifier;

/// Movement-tracking totals for one calendar week
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementSummary {
    /// Tracked sessions
    pub sessions: u32,
    /// Total distance in meters
    pub distance_m: f64,
    /// High-speed efforts
    pub high_speed_efforts: u32,
    /// Accelerations
    pub accelerations: u32,
    /// Decelerations
    pub decelerations: u32,
}

impl MovementSummary {
    /// Sum the week's GPS records; `None` when there are none
    #[must_use]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a GpsSessionRecord>) -> Option<Self> {
        records.into_iter().fold(None, |acc, record| {
            let mut summary = acc.unwrap_or(Self {
                sessions: 0,
                distance_m: 0.0,
                high_speed_efforts: 0,
                accelerations: 0,
                decelerations: 0,
            });
            summary.sessions = summary.sessions.saturating_add(1);
            summary.distance_m += record.distance_m;
            summary.high_speed_efforts = summary
                .high_speed_efforts
                .saturating_add(record.high_speed_efforts);
            summary.accelerations = summary.accelerations.saturating_add(record.accelerations);
            summary.decelerations = summary.decelerations.saturating_add(record.decelerations);
            Some(summary)
        })
    }
}

/// Builds [`RiskAssessment`]s from classified weekly metrics
#[derive(Debug, Clone, Copy)]
pub struct CompositeRiskAggregator {
    classifier: RiskClassifier,
    weights: CompositeWeights,
    z_score_alert: f64,
}

impl CompositeRiskAggregator {
    /// Create an aggregator from the engine configuration
    #[must_use]
    pub const fn new(config: &LoadRiskConfig) -> Self {
        Self {
            classifier: RiskClassifier::new(config.thresholds),
            weights: config.weights,
            z_score_alert: config.baseline.z_score_alert,
        }
    }

    /// Assess one athlete-week
    ///
    /// `wellness` is the most recent score on or before the week's reference
    /// date. `movement` only enriches the explanation; it never changes the
    /// score.
    #[must_use]
    pub fn assess(
        &self,
        metric: &WeeklyLoadMetric,
        wellness: Option<f64>,
        movement: Option<&MovementSummary>,
    ) -> RiskAssessment {
        let components: Vec<FactorScore> = RiskFactor::ORDER
            .iter()
            .map(|&factor| self.factor_score(metric, factor, wellness))
            .collect();

        let composite_score = Self::composite_score(&components);
        let category = composite_score.map_or(RiskCategory::NotAssessable, |score| {
            self.classifier.classify_composite(score)
        });
        let explanation = self.explain(metric, category, composite_score, &components, movement);

        RiskAssessment {
            athlete_id: metric.athlete_id,
            week_start: metric.week_start,
            category,
            composite_score,
            components,
            explanation,
        }
    }

    fn weight(&self, factor: RiskFactor) -> f64 {
        match factor {
            RiskFactor::Monotony => self.weights.monotony,
            RiskFactor::Strain => self.weights.strain,
            RiskFactor::Acwr => self.weights.acwr,
            RiskFactor::Wellness => self.weights.wellness,
        }
    }

    fn factor_score(
        &self,
        metric: &WeeklyLoadMetric,
        factor: RiskFactor,
        wellness: Option<f64>,
    ) -> FactorScore {
        let (value, tier) = match factor {
            RiskFactor::Monotony => (metric.monotony, metric.tiers.monotony),
            RiskFactor::Strain => (metric.strain, metric.tiers.strain),
            RiskFactor::Acwr => (metric.metric(LoadMetric::Acwr), metric.tiers.acwr),
            RiskFactor::Wellness => (
                MetricValue::from_option(wellness),
                self.classifier.classify_wellness(wellness),
            ),
        };
        FactorScore {
            factor,
            value,
            tier,
            weight: self.weight(factor),
        }
    }

    /// Weighted mean severity over included factors; `None` when nothing counts
    fn composite_score(components: &[FactorScore]) -> Option<f64> {
        let (weighted, total_weight) = components
            .iter()
            .filter_map(|c| c.severity().map(|s| (f64::from(s), c.weight)))
            .fold((0.0, 0.0), |(sum, weights), (severity, weight)| {
                (sum + severity * weight, weights + weight)
            });
        (total_weight > 0.0).then(|| weighted / total_weight)
    }

    fn explain(
        &self,
        metric: &WeeklyLoadMetric,
        category: RiskCategory,
        composite_score: Option<f64>,
        components: &[FactorScore],
        movement: Option<&MovementSummary>,
    ) -> String {
        let included: Vec<&FactorScore> = components.iter().filter(|c| c.is_included()).collect();
        let excluded: Vec<&str> = components
            .iter()
            .filter(|c| !c.is_included())
            .map(|c| c.factor.label())
            .collect();

        let mut text = String::new();
        match composite_score {
            Some(score) => {
                let _ = write!(
                    text,
                    "Overall risk: {category} (composite {score:.2} from {} of {} factors).",
                    included.len(),
                    components.len()
                );
            }
            None => text.push_str("Overall risk: Not assessable (no factor has sufficient data)."),
        }

        for component in &included {
            if let Some(value) = component.value.value() {
                let _ = write!(
                    text,
                    " {} {} is {}.",
                    component.factor.label(),
                    format_factor_value(component.factor, value),
                    component.tier
                );
            }
        }

        if !excluded.is_empty() {
            let _ = write!(text, " Insufficient data for: {}.", excluded.join(", "));
        }

        for load_metric in LoadMetric::ALL {
            if let Some(z) = metric.z_scores.get(load_metric).value() {
                if z.abs() >= self.z_score_alert {
                    let direction = if z > 0.0 { "above" } else { "below" };
                    let _ = write!(
                        text,
                        " {} is {:.1} standard deviations {direction} this athlete's baseline.",
                        load_metric.label(),
                        z.abs()
                    );
                }
            }
        }

        if let Some(m) = movement {
            let _ = write!(
                text,
                " Movement: {} tracked sessions, {:.1} km, {} high-speed efforts, {} accelerations, {} decelerations.",
                m.sessions,
                m.distance_m / 1000.0,
                m.high_speed_efforts,
                m.accelerations,
                m.decelerations
            );
        }

        text
    }
}

/// Fixed-precision rendering per factor so explanations are reproducible
fn format_factor_value(factor: RiskFactor, value: f64) -> String {
    match factor {
        RiskFactor::Monotony | RiskFactor::Acwr => format!("{value:.2}"),
        RiskFactor::Strain => format!("{value:.0}"),
        RiskFactor::Wellness => format!("{value:.1}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use loadguard_core::models::{MetricSet, RiskTier};
    use std::iter;
    use uuid::Uuid;

    fn week(
        monotony: MetricValue,
        strain: MetricValue,
        acwr: f64,
        tiers: MetricSet<RiskTier>,
    ) -> WeeklyLoadMetric {
        WeeklyLoadMetric {
            athlete_id: Uuid::nil(),
            week_start: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap_or_default(),
            session_count: 7,
            total_load: 3300.0,
            mean_load: 471.4,
            stdev_load: MetricValue::Computed(99.4),
            monotony,
            strain,
            acute_load: 471.4,
            chronic_load: 400.0,
            acwr,
            z_scores: MetricSet::splat(MetricValue::Computed(0.0)),
            tiers,
        }
    }

    fn aggregator() -> CompositeRiskAggregator {
        CompositeRiskAggregator::new(&LoadRiskConfig::default())
    }

    #[test]
    fn test_mixed_signal_is_medium() {
        let metric = week(
            MetricValue::Computed(4.74),
            MetricValue::Computed(15_650.0),
            1.18,
            MetricSet {
                monotony: RiskTier::High,
                strain: RiskTier::High,
                acwr: RiskTier::Low,
            },
        );
        let assessment = aggregator().assess(&metric, None, None);

        assert_eq!(assessment.category, RiskCategory::Medium);
        let score = assessment.composite_score.unwrap_or_default();
        assert!((score - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(assessment.components.len(), 4);
        assert!(!assessment
            .component(RiskFactor::Wellness)
            .is_some_and(FactorScore::is_included));
        assert_eq!(
            assessment.explanation,
            "Overall risk: Medium (composite 1.33 from 3 of 4 factors). \
             Monotony 4.74 is High. Strain 15650 is High. ACWR 1.18 is Low. \
             Insufficient data for: Wellness."
        );
    }

    #[test]
    fn test_missing_factors_are_renormalised_not_zeroed() {
        let metric = week(
            MetricValue::InsufficientData,
            MetricValue::InsufficientData,
            1.6,
            MetricSet {
                monotony: RiskTier::InsufficientData,
                strain: RiskTier::InsufficientData,
                acwr: RiskTier::High,
            },
        );
        let assessment = aggregator().assess(&metric, Some(30.0), None);
        assert_eq!(assessment.composite_score, Some(2.0));
        assert_eq!(assessment.category, RiskCategory::High);
    }

    #[test]
    fn test_all_factors_missing_is_not_assessable() {
        let metric = week(
            MetricValue::InsufficientData,
            MetricValue::InsufficientData,
            1.0,
            MetricSet::splat(RiskTier::InsufficientData),
        );
        let assessment = aggregator().assess(&metric, None, None);

        assert_eq!(assessment.category, RiskCategory::NotAssessable);
        assert_eq!(assessment.composite_score, None);
        assert!(!assessment.is_assessable());
        assert!(assessment
            .explanation
            .starts_with("Overall risk: Not assessable"));
        assert!(assessment
            .explanation
            .ends_with("Insufficient data for: Monotony, Strain, ACWR, Wellness."));
    }

    #[test]
    fn test_context_sentences_follow_factors() {
        let mut metric = week(
            MetricValue::Computed(1.2),
            MetricValue::Computed(3000.0),
            1.0,
            MetricSet::splat(RiskTier::Low),
        );
        metric.z_scores.strain = MetricValue::Computed(-2.5);
        let gps = GpsSessionRecord {
            athlete_id: Uuid::nil(),
            session_id: Uuid::nil(),
            occurred_at: Utc::now(),
            distance_m: 6_250.0,
            high_speed_efforts: 12,
            accelerations: 20,
            decelerations: 18,
        };
        let movement = MovementSummary::from_records([&gps, &gps]);
        let assessment = aggregator().assess(&metric, Some(65.0), movement.as_ref());

        assert_eq!(assessment.category, RiskCategory::Low);
        assert!(assessment.explanation.ends_with(
            "Wellness 65.0 is Low. \
             Strain is 2.5 standard deviations below this athlete's baseline. \
             Movement: 2 tracked sessions, 12.5 km, 24 high-speed efforts, 40 accelerations, 36 decelerations."
        ));
    }

    #[test]
    fn test_explanation_is_deterministic() {
        let metric = week(
            MetricValue::Computed(1.7),
            MetricValue::Computed(5000.0),
            1.4,
            MetricSet::splat(RiskTier::Medium),
        );
        let first = aggregator().assess(&metric, Some(50.0), None);
        let second = aggregator().assess(&metric, Some(50.0), None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_gps_week_has_no_summary() {
        assert_eq!(MovementSummary::from_records(iter::empty::<&GpsSessionRecord>()), None);
    }
}
