// ABOUTME: loadguard CLI - recompute weekly load metrics, inspect results, and seed demo data
// ABOUTME: Thin command-line front end over the batch driver and the query facade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 loadguard contributors
//!
//! Usage:
//! ```bash
//! # Seed a deterministic demo ledger
//! loadguard-cli seed-demo --athletes 8 --weeks 16 --seed 7
//!
//! # Recompute every active athlete
//! loadguard-cli recompute
//!
//! # Recompute one athlete from a given week onwards
//! loadguard-cli recompute --athlete 6f1c... --from-week 2025-03-03
//!
//! # Inspect one athlete-week
//! loadguard-cli metric --athlete 6f1c... --week 2025-03-03
//! loadguard-cli assessment --athlete 6f1c... --week 2025-03-03
//! ```

mod commands;
mod display;

use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use loadguard::database::Database;
use loadguard::logging::LoggingConfig;
use loadguard_intelligence::LoadRiskConfig;
use tracing::info;
use uuid::Uuid;

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/loadguard.db";

#[derive(Parser)]
#[command(
    name = "loadguard-cli",
    about = "Training load aggregation and injury-risk classification",
    long_about = "Recompute weekly training-load metrics and risk assessments, inspect stored results, and seed demo data."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override (falls back to `DATABASE_URL`)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Recompute weekly metrics and assessments
    Recompute {
        /// Only this athlete (default: every active athlete)
        #[arg(long)]
        athlete: Option<Uuid>,

        /// Leave earlier weeks as stored (YYYY-MM-DD, any day of the week)
        #[arg(long)]
        from_week: Option<NaiveDate>,
    },

    /// Show the stored weekly metric for one athlete-week
    Metric {
        /// Athlete id
        #[arg(long)]
        athlete: Uuid,

        /// Any day in the week (YYYY-MM-DD)
        #[arg(long)]
        week: NaiveDate,
    },

    /// Show the stored risk assessment for one athlete-week
    Assessment {
        /// Athlete id
        #[arg(long)]
        athlete: Uuid,

        /// Any day in the week (YYYY-MM-DD)
        #[arg(long)]
        week: NaiveDate,
    },

    /// Write a deterministic synthetic ledger
    SeedDemo {
        /// Number of athletes
        #[arg(long, default_value = "6")]
        athletes: u32,

        /// Weeks of history per athlete
        #[arg(long, default_value = "12")]
        weeks: u32,

        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Monday of the first seeded week
        #[arg(long, default_value = "2025-01-06")]
        start: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging.level = "debug".into();
    }
    logging.init()?;

    let config = Arc::new(LoadRiskConfig::load().context("invalid engine configuration")?);

    let database_url = cli
        .database_url
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
    ensure_parent_dir(&database_url)?;
    info!("Connecting to database: {}", database_url);
    let database = Arc::new(
        Database::new(&database_url)
            .await
            .with_context(|| format!("cannot open {database_url}"))?,
    );

    match cli.command {
        Command::Recompute { athlete, from_week } => {
            commands::recompute::run(database, config, athlete, from_week).await?;
        }
        Command::Metric { athlete, week } => {
            commands::lookup::metric(database, &config, athlete, week).await?;
        }
        Command::Assessment { athlete, week } => {
            commands::lookup::assessment(database, &config, athlete, week).await?;
        }
        Command::SeedDemo {
            athletes,
            weeks,
            seed,
            start,
        } => {
            commands::seed::run(&database, athletes, weeks, seed, start).await?;
        }
    }

    Ok(())
}

/// `SQLite` creates the file but not its directory
fn ensure_parent_dir(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let path = path.trim_start_matches("//");
    if path.contains(":memory:") {
        return Ok(());
    }
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    Ok(())
}
