// ABOUTME: Engine constants grouped by domain (windows, thresholds, scales, batch)
// ABOUTME: Pure data constants used as defaults by the configuration layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

//! Constants module
//!
//! Defaults live here so the configuration layer, the CLI and the tests agree
//! on a single set of values.

/// Rolling window sizes, in sessions
pub mod windows {
    /// Acute window: most recent sessions reflecting short-term stress
    pub const DEFAULT_ACUTE_SESSIONS: usize = 7;
    /// Chronic window: 4x the acute window
    pub const DEFAULT_CHRONIC_SESSIONS: usize = 28;
    /// Minimum sessions in a calendar week before metrics are stored
    pub const DEFAULT_MIN_SESSIONS: usize = 3;
    /// Floor for the chronic mean in the ACWR denominator
    pub const DEFAULT_ACWR_EPSILON: f64 = 1e-3;
}

/// Self-referential baseline used for z-scores
pub mod baseline {
    /// Prior computed weeks needed before a z-score is meaningful
    pub const MIN_HISTORY_WEEKS: usize = 4;
    /// Most recent prior weeks considered for the baseline
    pub const DEFAULT_BASELINE_WEEKS: usize = 12;
    /// Absolute z-score at which the explanation calls out a deviation
    pub const DEFAULT_Z_SCORE_ALERT: f64 = 2.0;
}

/// Default tier cut points (`lower`, `upper`)
pub mod thresholds {
    /// Monotony above 2.0 is the classic high-risk marker
    pub const MONOTONY: (f64, f64) = (1.5, 2.0);
    /// Weekly strain in arbitrary units (RPE x minutes x monotony)
    pub const STRAIN: (f64, f64) = (4000.0, 6000.0);
    /// ACWR above 1.5 is the "danger zone"
    pub const ACWR: (f64, f64) = (1.3, 1.5);
    /// Wellness below the lower cut point is high severity
    pub const WELLNESS: (f64, f64) = (40.0, 60.0);
    /// Composite severity on the 0-2 scale
    pub const COMPOSITE: (f64, f64) = (0.5, 1.5);
}

/// Bounded input scales
pub mod scales {
    /// Lowest valid session effort rating
    pub const MIN_EFFORT_RATING: u8 = 1;
    /// Highest valid session effort rating
    pub const MAX_EFFORT_RATING: u8 = 10;
    /// Lowest valid wellness score
    pub const MIN_WELLNESS_SCORE: f64 = 0.0;
    /// Highest valid wellness score
    pub const MAX_WELLNESS_SCORE: f64 = 100.0;
    /// Tolerance when checking `load == rating * duration`
    pub const LOAD_TOLERANCE: f64 = 1e-6;
}

/// Batch driver defaults
pub mod batch {
    /// Athletes processed concurrently
    pub const DEFAULT_MAX_CONCURRENT_ATHLETES: usize = 4;
    /// Persistence attempts per athlete-week before the unit is reported failed
    pub const DEFAULT_MAX_PERSIST_ATTEMPTS: u32 = 3;
    /// First backoff delay between persistence attempts
    pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 50;
}

/// Service identity used in structured logs
pub mod service_names {
    /// Engine service name
    pub const LOADGUARD: &str = "loadguard";
}
