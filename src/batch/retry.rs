// ABOUTME: Bounded exponential backoff for persistence writes of one athlete-week
// ABOUTME: Only retryable error codes are retried; everything else is returned on first failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use loadguard_core::errors::AppResult;
use loadguard_intelligence::config::BatchConfig;
use tokio::time::sleep;
use tracing::error;
use uuid::Uuid;

use crate::logging::BatchLogger;

/// Retry policy for sink writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles each time
    pub initial_backoff_ms: u64,
}

impl RetryPolicy {
    /// Policy from the batch configuration
    #[must_use]
    pub const fn from_config(config: &BatchConfig) -> Self {
        Self {
            max_attempts: config.max_persist_attempts,
            initial_backoff_ms: config.initial_backoff_ms,
        }
    }

    /// Backoff after failed attempt number `attempt` (1-based)
    #[must_use]
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial_backoff_ms.saturating_mul(1_u64 << shift)
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempts are exhausted
    ///
    /// # Errors
    ///
    /// Returns the last error from `operation`, with the unit key attached
    pub async fn run<F, Fut, T>(
        &self,
        athlete_id: Uuid,
        week_start: NaiveDate,
        mut operation: F,
    ) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    attempt += 1;
                    if !e.code.is_retryable() || attempt >= self.max_attempts {
                        error!(
                            athlete_id = %athlete_id,
                            week_start = %week_start,
                            attempts = attempt,
                            error = %e,
                            "Persistence gave up"
                        );
                        return Err(e.with_athlete(athlete_id).with_week(week_start));
                    }
                    let backoff_ms = self.backoff_ms(attempt);
                    BatchLogger::log_retry(athlete_id, week_start, attempt, backoff_ms, &e.message);
                    sleep(Duration::from_millis(backoff_ms)).await;
                }
            }
        }
    }
}
