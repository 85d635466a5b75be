// ABOUTME: Upstream record validation for session loads and wellness scores
// ABOUTME: Malformed rows become typed errors scoped to the athlete-week they belong to
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use chrono::NaiveDate;
use loadguard_core::constants::scales::LOAD_TOLERANCE;
use loadguard_core::errors::AppError;
use loadguard_core::models::{SessionLoadRecord, WellnessRecord};
use thiserror::Error;
use uuid::Uuid;

use crate::config::ScaleConfig;

/// A ledger or wellness row that violates the input contract
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpstreamDataError {
    /// Effort rating outside the configured scale
    #[error("session {session_id}: rating {rating} outside {min}..={max}")]
    RatingOutOfRange {
        /// Offending session
        session_id: Uuid,
        /// Recorded rating
        rating: i32,
        /// Scale minimum
        min: i32,
        /// Scale maximum
        max: i32,
    },

    /// Duration not finite or not positive
    #[error("session {session_id}: duration {duration_minutes} must be finite and > 0")]
    InvalidDuration {
        /// Offending session
        session_id: Uuid,
        /// Recorded duration in minutes
        duration_minutes: f64,
    },

    /// Load negative or not finite
    #[error("session {session_id}: load {load} must be finite and >= 0")]
    InvalidLoad {
        /// Offending session
        session_id: Uuid,
        /// Recorded load
        load: f64,
    },

    /// Load disagrees with rating x duration
    #[error("session {session_id}: load {load} != rating x duration ({expected})")]
    LoadMismatch {
        /// Offending session
        session_id: Uuid,
        /// Recorded load
        load: f64,
        /// `rating x duration_minutes`
        expected: f64,
    },

    /// Wellness score outside the configured scale
    #[error("wellness on {recorded_on}: score {score} outside {min}..={max}")]
    WellnessOutOfRange {
        /// Survey day
        recorded_on: NaiveDate,
        /// Recorded score
        score: f64,
        /// Scale minimum
        min: f64,
        /// Scale maximum
        max: f64,
    },
}

impl From<UpstreamDataError> for AppError {
    fn from(error: UpstreamDataError) -> Self {
        Self::upstream_data(error.to_string())
    }
}

/// Checks upstream rows against the configured input scales
#[derive(Debug, Clone, Copy)]
pub struct RecordValidator {
    scales: ScaleConfig,
}

impl RecordValidator {
    /// Create a validator for the configured scales
    #[must_use]
    pub const fn new(scales: ScaleConfig) -> Self {
        Self { scales }
    }

    /// Validate one session load record
    ///
    /// # Errors
    ///
    /// Returns the first violated rule: rating range, duration, load sign, or
    /// `load == rating x duration`
    pub fn validate_session(&self, record: &SessionLoadRecord) -> Result<(), UpstreamDataError> {
        let ScaleConfig {
            min_rating,
            max_rating,
            ..
        } = self.scales;
        if !(min_rating..=max_rating).contains(&record.rating) {
            return Err(UpstreamDataError::RatingOutOfRange {
                session_id: record.session_id,
                rating: record.rating,
                min: min_rating,
                max: max_rating,
            });
        }
        if !(record.duration_minutes.is_finite() && record.duration_minutes > 0.0) {
            return Err(UpstreamDataError::InvalidDuration {
                session_id: record.session_id,
                duration_minutes: record.duration_minutes,
            });
        }
        if !(record.load.is_finite() && record.load >= 0.0) {
            return Err(UpstreamDataError::InvalidLoad {
                session_id: record.session_id,
                load: record.load,
            });
        }
        let expected = record.expected_load();
        if (record.load - expected).abs() > LOAD_TOLERANCE * expected.max(1.0) {
            return Err(UpstreamDataError::LoadMismatch {
                session_id: record.session_id,
                load: record.load,
                expected,
            });
        }
        Ok(())
    }

    /// Validate one wellness record
    ///
    /// # Errors
    ///
    /// Returns `WellnessOutOfRange` for non-finite or out-of-scale scores
    pub fn validate_wellness(&self, record: &WellnessRecord) -> Result<(), UpstreamDataError> {
        let (min, max) = (self.scales.min_wellness, self.scales.max_wellness);
        if record.score.is_finite() && (min..=max).contains(&record.score) {
            Ok(())
        } else {
            Err(UpstreamDataError::WellnessOutOfRange {
                recorded_on: record.recorded_on,
                score: record.score,
                min,
                max,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use loadguard_core::errors::ErrorCode;

    fn record(rating: i32, duration: f64) -> SessionLoadRecord {
        let at = Utc
            .with_ymd_and_hms(2025, 3, 4, 17, 0, 0)
            .single()
            .unwrap_or_default();
        SessionLoadRecord::new(Uuid::nil(), Uuid::nil(), at, rating, duration)
    }

    fn validator() -> RecordValidator {
        RecordValidator::new(ScaleConfig::default())
    }

    #[test]
    fn test_well_formed_session_passes() {
        assert_eq!(validator().validate_session(&record(7, 60.0)), Ok(()));
    }

    #[test]
    fn test_rating_out_of_range() {
        assert!(matches!(
            validator().validate_session(&record(11, 60.0)),
            Err(UpstreamDataError::RatingOutOfRange { rating: 11, .. })
        ));
        assert!(matches!(
            validator().validate_session(&record(0, 60.0)),
            Err(UpstreamDataError::RatingOutOfRange { .. })
        ));
    }

    #[test]
    fn test_bad_duration_and_load() {
        assert!(matches!(
            validator().validate_session(&record(5, 0.0)),
            Err(UpstreamDataError::InvalidDuration { .. })
        ));
        assert!(matches!(
            validator().validate_session(&record(5, f64::NAN)),
            Err(UpstreamDataError::InvalidDuration { .. })
        ));

        let mut tampered = record(5, 60.0);
        tampered.load = 999.0;
        assert!(matches!(
            validator().validate_session(&tampered),
            Err(UpstreamDataError::LoadMismatch { .. })
        ));

        tampered.load = -300.0;
        assert!(matches!(
            validator().validate_session(&tampered),
            Err(UpstreamDataError::InvalidLoad { .. })
        ));
    }

    #[test]
    fn test_wellness_range() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap_or_default();
        let ok = WellnessRecord {
            athlete_id: Uuid::nil(),
            recorded_on: day,
            score: 55.0,
        };
        assert_eq!(validator().validate_wellness(&ok), Ok(()));

        let bad = WellnessRecord { score: 140.0, ..ok };
        assert!(matches!(
            validator().validate_wellness(&bad),
            Err(UpstreamDataError::WellnessOutOfRange { .. })
        ));
    }

    #[test]
    fn test_converts_to_upstream_app_error() {
        let err: AppError = UpstreamDataError::InvalidLoad {
            session_id: Uuid::nil(),
            load: -1.0,
        }
        .into();
        assert_eq!(err.code, ErrorCode::UpstreamDataInvalid);
    }
}
