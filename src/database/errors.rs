// ABOUTME: Structured error types for database operations
// ABOUTME: Maps sqlx failures and corrupt rows onto the unified AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use loadguard_core::errors::{AppError, ErrorCode};
use thiserror::Error;

/// Database-layer failures
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Driver or query failure
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// A stored value could not be decoded into a domain type
    #[error("corrupt row in {table}: {reason}")]
    CorruptRow {
        /// Table the row came from
        table: &'static str,
        /// What failed to decode
        reason: String,
    },

    /// JSON column could not be encoded or decoded
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DatabaseError {
    /// Corrupt-row error for `table`
    #[must_use]
    pub fn corrupt(table: &'static str, reason: impl Into<String>) -> Self {
        Self::CorruptRow {
            table,
            reason: reason.into(),
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(error: DatabaseError) -> Self {
        let code = match &error {
            DatabaseError::Query(_) => ErrorCode::DatabaseError,
            DatabaseError::CorruptRow { .. } => ErrorCode::UpstreamDataInvalid,
            DatabaseError::Serialization(_) => ErrorCode::SerializationError,
        };
        let message = error.to_string();
        Self::new(code, message).with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_errors_are_retryable() {
        let err: AppError = DatabaseError::Query(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.code.is_retryable());
    }

    #[test]
    fn test_corrupt_rows_are_not_retried() {
        let err: AppError = DatabaseError::corrupt("session_loads", "bad uuid").into();
        assert_eq!(err.code, ErrorCode::UpstreamDataInvalid);
        assert!(!err.code.is_retryable());
        assert!(err.message.contains("session_loads"));
    }
}
