// ABOUTME: Integration tests for the query facade over stored metrics and assessments
// ABOUTME: Checks NotComputed and NotAssessable results, explanations, and ledger windows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    add_corrupt_session, add_gps, add_session, add_training_week, add_wellness, create_athlete,
    create_test_database, day, resources, test_config, week,
};
use loadguard::batch::{BatchRecomputeDriver, RecomputeScope};
use loadguard::ledger::MetricSink;
use loadguard::query::{
    NotAssessableReason, QueryFacade, RiskAssessmentLookup, WeeklyMetricLookup,
};
use loadguard_core::models::{RiskCategory, RiskFactor, RiskTier};

#[tokio::test]
async fn test_uncomputed_week_is_distinguishable() {
    let database = create_test_database().await.unwrap();
    let athlete = create_athlete(&database, "Fresh").await.unwrap();
    let facade = QueryFacade::new(resources(&database), &test_config());

    assert_eq!(
        facade.get_weekly_metric(athlete, week(0)).await.unwrap(),
        WeeklyMetricLookup::NotComputed
    );
    assert_eq!(
        facade.get_risk_assessment(athlete, week(0)).await.unwrap(),
        RiskAssessmentLookup::NotAssessable(NotAssessableReason::NotComputed)
    );
}

#[tokio::test]
async fn test_stored_week_is_returned_for_any_day_in_it() {
    let database = create_test_database().await.unwrap();
    let athlete = create_athlete(&database, "Stored").await.unwrap();
    add_training_week(&database, athlete, week(0), 0.0).await.unwrap();
    add_training_week(&database, athlete, week(1), 0.0).await.unwrap();

    let config = test_config();
    BatchRecomputeDriver::new(resources(&database), config.clone())
        .recompute(RecomputeScope::All, None)
        .await
        .unwrap();
    let facade = QueryFacade::new(resources(&database), &config);

    let WeeklyMetricLookup::Computed(metric) =
        facade.get_weekly_metric(athlete, day(week(1), 4)).await.unwrap()
    else {
        panic!("week 1 should be computed");
    };
    assert_eq!(metric.week_start, week(1));
    assert_eq!(metric.session_count, 4);
    assert!((metric.total_load - 1315.0).abs() < 1e-9);

    let RiskAssessmentLookup::Assessed(assessment) =
        facade.get_risk_assessment(athlete, week(1)).await.unwrap()
    else {
        panic!("week 1 should be assessed");
    };
    assert!(assessment.explanation.starts_with("Overall risk: "));
    assert_eq!(assessment.components.len(), 4);
    assert_eq!(
        assessment.component(RiskFactor::Wellness).map(|c| c.tier),
        Some(RiskTier::InsufficientData)
    );
    assert!(assessment.explanation.contains("Insufficient data for: Wellness."));
}

#[tokio::test]
async fn test_all_factors_missing_reads_as_not_assessable() {
    let database = create_test_database().await.unwrap();
    let athlete = create_athlete(&database, "Hollow").await.unwrap();
    add_training_week(&database, athlete, week(0), 0.0).await.unwrap();
    BatchRecomputeDriver::new(resources(&database), test_config())
        .recompute(RecomputeScope::All, None)
        .await
        .unwrap();

    let metric = database
        .get_weekly_metric(athlete, week(0))
        .await
        .unwrap()
        .unwrap();
    let mut assessment = database
        .get_risk_assessment(athlete, week(0))
        .await
        .unwrap()
        .unwrap();
    assessment.category = RiskCategory::NotAssessable;
    assessment.composite_score = None;
    database.upsert_week(&metric, &assessment).await.unwrap();

    let facade = QueryFacade::new(resources(&database), &test_config());
    assert_eq!(
        facade.get_risk_assessment(athlete, week(0)).await.unwrap(),
        RiskAssessmentLookup::NotAssessable(NotAssessableReason::InsufficientData)
    );
    // The metric itself is still there
    assert!(matches!(
        facade.get_weekly_metric(athlete, week(0)).await.unwrap(),
        WeeklyMetricLookup::Computed(_)
    ));
}

#[tokio::test]
async fn test_wellness_and_movement_flow_into_assessment() {
    let database = create_test_database().await.unwrap();
    let athlete = create_athlete(&database, "Tracked").await.unwrap();
    add_training_week(&database, athlete, week(0), 0.0).await.unwrap();
    let tracked = add_session(&database, athlete, day(week(0), 6), 5, 40.0)
        .await
        .unwrap();
    add_gps(&database, &tracked, 6_500.0).await.unwrap();
    add_wellness(&database, athlete, day(week(0), 1), 80.0).await.unwrap();
    add_wellness(&database, athlete, day(week(0), 5), 35.0).await.unwrap();
    // After the week's Sunday; must not be used
    add_wellness(&database, athlete, day(week(1), 0), 90.0).await.unwrap();

    let config = test_config();
    BatchRecomputeDriver::new(resources(&database), config.clone())
        .recompute(RecomputeScope::All, None)
        .await
        .unwrap();
    let facade = QueryFacade::new(resources(&database), &config);

    let RiskAssessmentLookup::Assessed(assessment) =
        facade.get_risk_assessment(athlete, week(0)).await.unwrap()
    else {
        panic!("week 0 should be assessed");
    };
    let wellness = assessment.component(RiskFactor::Wellness).unwrap();
    assert_eq!(wellness.value.value(), Some(35.0));
    assert_eq!(wellness.tier, RiskTier::High);
    assert!(assessment.explanation.contains("Wellness 35.0 is High."));
    assert!(assessment
        .explanation
        .contains("Movement: 1 tracked sessions, 6.5 km, 12 high-speed efforts"));
}

#[tokio::test]
async fn test_load_windows_come_from_the_ledger() {
    let database = create_test_database().await.unwrap();
    let athlete = create_athlete(&database, "Windows").await.unwrap();
    add_training_week(&database, athlete, week(0), 0.0).await.unwrap();
    add_training_week(&database, athlete, week(1), 0.0).await.unwrap();
    add_training_week(&database, athlete, week(2), 0.0).await.unwrap();

    let facade = QueryFacade::new(resources(&database), &test_config());
    let windows = facade.get_load_windows(athlete, week(1)).await.unwrap();

    assert_eq!(
        windows.acute,
        vec![180.0, 525.0, 250.0, 360.0, 180.0, 525.0, 250.0]
    );
    assert_eq!(windows.chronic.len(), 8);
}

#[tokio::test]
async fn test_load_windows_leave_out_malformed_sessions() {
    let database = create_test_database().await.unwrap();
    let athlete = create_athlete(&database, "Corrupt").await.unwrap();
    add_training_week(&database, athlete, week(0), 0.0).await.unwrap();
    add_training_week(&database, athlete, week(1), 0.0).await.unwrap();
    add_corrupt_session(&database, athlete, day(week(1), 6)).await.unwrap();

    let facade = QueryFacade::new(resources(&database), &test_config());
    let windows = facade.get_load_windows(athlete, week(1)).await.unwrap();

    assert!(!windows.acute.contains(&9_999.0));
    assert!(!windows.chronic.contains(&9_999.0));
    assert_eq!(
        windows.acute,
        vec![180.0, 525.0, 250.0, 360.0, 180.0, 525.0, 250.0]
    );
    assert_eq!(windows.chronic.len(), 8);
}
