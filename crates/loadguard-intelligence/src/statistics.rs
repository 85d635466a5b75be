// ABOUTME: Descriptive statistics shared by the metrics calculator and z-score baseline
// ABOUTME: Mean and sample standard deviation over f64 slices
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors
#![allow(clippy::cast_precision_loss)] // Safe: window lengths are far below 2^52

/// Ulps of the center below which a spread counts as zero
const NOISE_ULPS: f64 = 64.0;

/// Arithmetic mean; `None` for an empty slice
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (N-1 denominator); `None` below two values
///
/// Identical values give exactly `0.0`, even when their mean is not
/// representable.
#[must_use]
pub fn sample_stdev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    if values.iter().all(|v| v.to_bits() == values[0].to_bits()) {
        return Some(0.0);
    }
    let avg = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Whether `stdev` is rounding noise relative to `center`
///
/// Treat the spread as zero when it is within a few ulps of the center's
/// magnitude; dividing by it would only amplify floating-point error.
#[must_use]
pub fn is_negligible_spread(stdev: f64, center: f64) -> bool {
    stdev <= NOISE_ULPS * f64::EPSILON * center.abs().max(1.0)
}
