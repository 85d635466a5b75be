// ABOUTME: Unified error handling for the loadguard engine
// ABOUTME: Defines error codes, athlete-week error context, and the AppError/AppResult types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

//! # Unified Error Handling System
//!
//! Every fallible engine operation returns [`AppResult`]. Errors carry an
//! [`ErrorCode`] that places them in one of the engine's failure classes
//! (configuration, upstream data, persistence, internal) plus the athlete-week
//! key they occurred under, so batch reports and logs can name the failing unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Standard error codes used throughout the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Caller supplied an invalid argument
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,

    // Resource Management (4000-4999)
    /// Requested athlete or record does not exist
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,

    // Upstream data (5000-5999)
    /// A ledger or wellness record failed validation
    #[serde(rename = "UPSTREAM_DATA_INVALID")]
    UpstreamDataInvalid = 5000,

    // Configuration (6000-6999)
    /// Configuration present but invalid
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Database operation failed
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
    /// Persisting derived state failed
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 9002,
    /// Serialization or deserialization failed
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::UpstreamDataInvalid => "An upstream record is malformed",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::StorageError => "Storage operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether a failure with this code may succeed when attempted again
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::DatabaseError | Self::StorageError)
    }
}

/// Additional context that can be attached to errors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Athlete the failing operation belonged to
    pub athlete_id: Option<Uuid>,
    /// Calendar week (Monday) the failing operation belonged to
    pub week_start: Option<NaiveDate>,
}

/// Unified error type for the engine
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Attach the athlete id to the error context
    #[must_use]
    pub const fn with_athlete(mut self, athlete_id: Uuid) -> Self {
        self.context.athlete_id = Some(athlete_id);
        self
    }

    /// Attach the calendar week to the error context
    #[must_use]
    pub const fn with_week(mut self, week_start: NaiveDate) -> Self {
        self.context.week_start = Some(week_start);
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Resource not found
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Malformed upstream ledger or wellness record
    #[must_use]
    pub fn upstream_data(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamDataInvalid, message)
    }

    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Database error
    #[must_use]
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Persistence error for derived state
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Internal error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)?;
        match (self.context.athlete_id, self.context.week_start) {
            (Some(athlete), Some(week)) => write!(f, " [athlete={athlete} week={week}]"),
            (Some(athlete), None) => write!(f, " [athlete={athlete}]"),
            (None, Some(week)) => write!(f, " [week={week}]"),
            (None, None) => Ok(()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string())
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_unit_key() {
        let athlete = Uuid::nil();
        let week = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap_or_default();
        let error = AppError::upstream_data("rating 14 outside 1..=10")
            .with_athlete(athlete)
            .with_week(week);

        let rendered = error.to_string();
        assert!(rendered.contains("rating 14"));
        assert!(rendered.contains("week=2025-03-03"));
        assert!(rendered.contains(&athlete.to_string()));
    }

    #[test]
    fn test_only_persistence_codes_are_retryable() {
        assert!(ErrorCode::DatabaseError.is_retryable());
        assert!(ErrorCode::StorageError.is_retryable());
        assert!(!ErrorCode::UpstreamDataInvalid.is_retryable());
        assert!(!ErrorCode::ConfigInvalid.is_retryable());
    }

    #[test]
    fn test_error_code_serializes_screaming_case() {
        let json = serde_json::to_string(&ErrorCode::UpstreamDataInvalid).unwrap_or_default();
        assert_eq!(json, "\"UPSTREAM_DATA_INVALID\"");
    }
}
