// ABOUTME: End-to-end tests of the weekly pipeline from ledger rows to assessments
// ABOUTME: Covers uniform weeks, mixed-signal weeks, gating, and malformed-record isolation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use loadguard_core::models::{
    LoadMetric, MetricValue, RiskAssessment, RiskCategory, RiskFactor, RiskTier,
    SessionLoadRecord, WeeklyLoadMetric, WellnessRecord,
};
use loadguard_intelligence::config::{LoadRiskConfig, ThresholdMetric};
use loadguard_intelligence::{
    BaselineHistory, LoadMetricsCalculator, LoadRiskEngine, RiskClassifier, UpstreamDataError,
    WeekOutcome,
};
use uuid::Uuid;

/// Monday 2025-03-03
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

fn session(athlete: Uuid, day: NaiveDate, rating: i32, minutes: f64) -> SessionLoadRecord {
    let at = Utc.from_utc_datetime(&day.and_hms_opt(17, 0, 0).unwrap());
    SessionLoadRecord::new(athlete, Uuid::new_v4(), at, rating, minutes)
}

/// One session per day starting on `start`, each `(rating, minutes)`
fn daily(athlete: Uuid, start: NaiveDate, sessions: &[(i32, f64)]) -> Vec<SessionLoadRecord> {
    sessions
        .iter()
        .enumerate()
        .map(|(i, &(rating, minutes))| {
            session(athlete, start + Duration::days(i as i64), rating, minutes)
        })
        .collect()
}

fn computed(outcome: WeekOutcome) -> (WeeklyLoadMetric, RiskAssessment) {
    match outcome {
        WeekOutcome::Computed { metric, assessment } => (*metric, *assessment),
        WeekOutcome::Skipped { session_count } => {
            panic!("expected computed week, got skipped with {session_count} sessions")
        }
    }
}

#[test]
fn test_uniform_week_has_no_monotony() {
    let athlete = Uuid::new_v4();
    let engine = LoadRiskEngine::new(&LoadRiskConfig::default());
    let records = daily(athlete, monday(), &[(5, 60.0); 7]);
    let timeline = engine.timeline(athlete, records, vec![], vec![]);

    let (metric, assessment) = computed(
        engine
            .compute_week(&timeline, monday(), &BaselineHistory::default())
            .unwrap(),
    );

    assert_eq!(metric.session_count, 7);
    assert!((metric.total_load - 2100.0).abs() < 1e-9);
    assert_eq!(metric.stdev_load, MetricValue::Computed(0.0));
    assert_eq!(metric.monotony, MetricValue::InsufficientData);
    assert_eq!(metric.strain, MetricValue::InsufficientData);
    assert_eq!(metric.tiers.monotony, RiskTier::InsufficientData);
    assert_eq!(metric.tiers.strain, RiskTier::InsufficientData);
    assert_eq!(metric.tiers.acwr, RiskTier::Low);
    // only ACWR carries signal; the missing factors are not treated as Low
    assert_eq!(assessment.category, RiskCategory::Low);
    assert!(assessment
        .explanation
        .contains("Insufficient data for: Monotony, Strain, Wellness."));
}

#[test]
fn test_mixed_signal_week_is_medium() {
    let athlete = Uuid::new_v4();
    let engine = LoadRiskEngine::new(&LoadRiskConfig::default());

    // 21 prior sessions summing to 7900 so the 28-session chronic mean is 400
    let mut prior = vec![(5, 76.0); 19];
    prior.extend([(5, 68.0), (5, 68.0)]);
    let first_week = monday() - Duration::days(21);
    let mut records = daily(athlete, first_week, &prior);

    // acute loads 400, 500, 600, 300, 450, 550, 500
    let acute = [
        (8, 50.0),
        (10, 50.0),
        (10, 60.0),
        (5, 60.0),
        (9, 50.0),
        (10, 55.0),
        (10, 50.0),
    ];
    records.extend(daily(athlete, monday(), &acute));
    let timeline = engine.timeline(athlete, records, vec![], vec![]);
    assert_eq!(timeline.weeks().len(), 4);

    let (metric, assessment) = computed(
        engine
            .compute_week(&timeline, monday(), &BaselineHistory::default())
            .unwrap(),
    );

    assert!((metric.mean_load - 471.428_571).abs() < 1e-5);
    assert!((metric.chronic_load - 400.0).abs() < 1e-9);
    assert!((metric.acwr - 1.178_571).abs() < 1e-5);
    let monotony = metric.monotony.value().unwrap();
    assert!((monotony - 4.7426).abs() < 1e-3);
    assert_eq!(metric.tiers.monotony, RiskTier::High);
    assert_eq!(metric.tiers.strain, RiskTier::High);
    assert_eq!(metric.tiers.acwr, RiskTier::Low);

    assert_eq!(assessment.category, RiskCategory::Medium);
    let wellness = assessment.component(RiskFactor::Wellness).unwrap();
    assert_eq!(wellness.tier, RiskTier::InsufficientData);
}

#[test]
fn test_single_session_window() {
    let athlete = Uuid::new_v4();
    let mut config = LoadRiskConfig::default();
    config.windows.min_sessions = 1;
    let engine = LoadRiskEngine::new(&config);
    let timeline = engine.timeline(athlete, daily(athlete, monday(), &[(7, 45.0)]), vec![], vec![]);

    let (metric, _) = computed(
        engine
            .compute_week(&timeline, monday(), &BaselineHistory::default())
            .unwrap(),
    );
    assert_eq!(metric.stdev_load, MetricValue::InsufficientData);
    assert_eq!(metric.monotony, MetricValue::InsufficientData);
    assert_eq!(metric.strain, MetricValue::InsufficientData);
}

#[test]
fn test_uniform_fractional_durations_have_no_monotony() {
    let engine = LoadRiskEngine::new(&LoadRiskConfig::default());
    for (rating, minutes) in [(9, 45.3), (3, 47.1), (7, 33.3), (4, 52.7)] {
        let athlete = Uuid::new_v4();
        let records = daily(athlete, monday(), &[(rating, minutes); 7]);
        let timeline = engine.timeline(athlete, records, vec![], vec![]);

        let (metric, _) = computed(
            engine
                .compute_week(&timeline, monday(), &BaselineHistory::default())
                .unwrap(),
        );

        assert_eq!(metric.stdev_load, MetricValue::Computed(0.0), "{rating} x {minutes}");
        assert_eq!(metric.monotony, MetricValue::InsufficientData, "{rating} x {minutes}");
        assert_eq!(metric.strain, MetricValue::InsufficientData, "{rating} x {minutes}");
        assert_eq!(metric.tiers.monotony, RiskTier::InsufficientData);
        assert_eq!(metric.tiers.strain, RiskTier::InsufficientData);
    }
}

#[test]
fn test_zero_chronic_load_classifies_high() {
    let config = LoadRiskConfig::default();
    let calculator = LoadMetricsCalculator::new(&config.windows, &config.baseline);
    let classifier = RiskClassifier::new(config.thresholds);

    let acwr = calculator.acwr(350.0, 0.0);
    assert!(acwr.is_finite());
    assert_eq!(
        classifier.classify(ThresholdMetric::Acwr, acwr.into()),
        RiskTier::High
    );
}

#[test]
fn test_sparse_week_is_skipped() {
    let athlete = Uuid::new_v4();
    let engine = LoadRiskEngine::new(&LoadRiskConfig::default());
    let timeline = engine.timeline(
        athlete,
        daily(athlete, monday(), &[(6, 60.0), (4, 30.0)]),
        vec![],
        vec![],
    );

    let outcome = engine
        .compute_week(&timeline, monday(), &BaselineHistory::default())
        .unwrap();
    assert_eq!(outcome, WeekOutcome::Skipped { session_count: 2 });
}

#[test]
fn test_malformed_session_fails_only_its_week() {
    let athlete = Uuid::new_v4();
    let engine = LoadRiskEngine::new(&LoadRiskConfig::default());
    let next_week = monday() + Duration::days(7);

    let mut records = daily(athlete, monday(), &[(5, 60.0), (6, 60.0), (7, 60.0)]);
    let mut corrupted = session(athlete, monday() + Duration::days(4), 5, 60.0);
    corrupted.load = 9_999.0;
    records.push(corrupted);
    records.extend(daily(athlete, next_week, &[(5, 40.0), (6, 50.0), (7, 60.0)]));

    let timeline = engine.timeline(athlete, records, vec![], vec![]);
    let history = BaselineHistory::default();

    assert!(matches!(
        engine.compute_week(&timeline, monday(), &history),
        Err(UpstreamDataError::LoadMismatch { .. })
    ));

    let (metric, _) = computed(engine.compute_week(&timeline, next_week, &history).unwrap());
    assert_eq!(metric.session_count, 3);
    // chronic window holds the six valid sessions only
    let expected_chronic = (300.0 + 360.0 + 420.0 + 200.0 + 300.0 + 420.0) / 6.0;
    assert!((metric.chronic_load - expected_chronic).abs() < 1e-9);
}

#[test]
fn test_latest_wellness_drives_the_wellness_factor() {
    let athlete = Uuid::new_v4();
    let engine = LoadRiskEngine::new(&LoadRiskConfig::default());
    let records = daily(athlete, monday(), &[(5, 60.0), (6, 60.0), (7, 60.0)]);
    let wellness = vec![
        WellnessRecord {
            athlete_id: athlete,
            recorded_on: monday() - Duration::days(3),
            score: 80.0,
        },
        WellnessRecord {
            athlete_id: athlete,
            recorded_on: monday() + Duration::days(5),
            score: 35.0,
        },
        // after the week's Sunday, must be ignored
        WellnessRecord {
            athlete_id: athlete,
            recorded_on: monday() + Duration::days(8),
            score: 90.0,
        },
    ];
    let timeline = engine.timeline(athlete, records, vec![], wellness);

    let (_, assessment) = computed(
        engine
            .compute_week(&timeline, monday(), &BaselineHistory::default())
            .unwrap(),
    );
    let factor = assessment.component(RiskFactor::Wellness).unwrap();
    assert_eq!(factor.value, MetricValue::Computed(35.0));
    assert_eq!(factor.tier, RiskTier::High);
}

#[test]
fn test_malformed_latest_wellness_fails_the_week() {
    let athlete = Uuid::new_v4();
    let engine = LoadRiskEngine::new(&LoadRiskConfig::default());
    let records = daily(athlete, monday(), &[(5, 60.0), (6, 60.0), (7, 60.0)]);
    let wellness = vec![WellnessRecord {
        athlete_id: athlete,
        recorded_on: monday() + Duration::days(2),
        score: 250.0,
    }];
    let timeline = engine.timeline(athlete, records, vec![], wellness);

    assert!(matches!(
        engine.compute_week(&timeline, monday(), &BaselineHistory::default()),
        Err(UpstreamDataError::WellnessOutOfRange { .. })
    ));
}

#[test]
fn test_z_scores_use_own_history() {
    let athlete = Uuid::new_v4();
    let engine = LoadRiskEngine::new(&LoadRiskConfig::default());

    // six weeks of varied training, processed oldest first
    let mut records = Vec::new();
    for week in 0..6_i64 {
        let start = monday() + Duration::days(7 * week);
        let extra = 5.0 * week as f64;
        records.extend(daily(
            athlete,
            start,
            &[(4, 40.0 + extra), (8, 70.0), (6, 55.0 + extra), (3, 30.0)],
        ));
    }
    let timeline = engine.timeline(athlete, records, vec![], vec![]);

    let mut history = BaselineHistory::default();
    let mut last = None;
    for week in timeline.weeks().to_vec() {
        let (metric, _) = computed(engine.compute_week(&timeline, week, &history).unwrap());
        history.push(&metric);
        last = Some(metric);
    }

    // the sixth week has five prior weeks, enough for a baseline
    let last = last.unwrap();
    let strain_z = last.z_scores.strain.value().unwrap();
    assert!(strain_z > 1.0, "rising strain should sit above baseline: {strain_z}");
    assert!(last.z_scores.acwr.value().unwrap() > 0.0);
    assert_eq!(history.values(LoadMetric::Acwr).len(), 6);
}

#[test]
fn test_weeks_from_skips_earlier_weeks() {
    let athlete = Uuid::new_v4();
    let engine = LoadRiskEngine::new(&LoadRiskConfig::default());
    let mut records = daily(athlete, monday(), &[(5, 60.0)]);
    records.extend(daily(athlete, monday() + Duration::days(14), &[(5, 60.0)]));
    let timeline = engine.timeline(athlete, records, vec![], vec![]);

    // a mid-week date selects its whole week
    let from = monday() + Duration::days(10);
    assert_eq!(timeline.weeks().len(), 2);
    assert_eq!(timeline.weeks_from(Some(from)), &[monday() + Duration::days(14)]);
    assert_eq!(timeline.weeks_from(None).len(), 2);
}
