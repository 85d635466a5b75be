// ABOUTME: Output formatting helpers for loadguard-cli
// ABOUTME: Run summaries for humans, lookups as pretty JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors

use anyhow::Result;
use loadguard::batch::BatchRunReport;
use serde::Serialize;

/// Print a recompute summary followed by every failed unit
pub fn print_report(report: &BatchRunReport) {
    println!("\nRecompute finished{}", if report.cancelled { " (cancelled)" } else { "" });
    println!("{}", "=".repeat(60));
    println!("   Stored:  {}", report.processed);
    println!("   Skipped: {}", report.skipped);
    println!("   Failed:  {}", report.failed.len());

    if report.failed.is_empty() {
        return;
    }
    println!("\nFailed athlete-weeks:");
    for unit in &report.failed {
        let week = unit
            .week_start
            .map_or_else(|| "-".to_owned(), |w| w.to_string());
        println!(
            "   {} {} [{}] {}",
            unit.athlete_id, week, unit.stage, unit.reason
        );
    }
}

/// Pretty-print any serializable value on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
