/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};

use pricing_fetcher::config::FetchPlan;
use pricing_fetcher::fetcher::FetchRunner;

// ── CLI argument definition ───────────────────────────────────────────────────

/// pricing-fetcher – scheduled pricing data downloads.
///
/// Example:
///   pricing-fetcher -c demos/fetch_jobs.yaml
///   pricing-fetcher -c demos/fetch_jobs.yaml --once
#[derive(Debug, Parser)]
#[command(
    name = "pricing-fetcher",
    about = "Scheduled pricing data fetcher",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML fetch configuration file.
    #[arg(short = 'c', long = "config")]
    config: PathBuf,

    /// Evaluate the schedules once against the current time, fetch whatever
    /// matches, and exit.
    #[arg(long = "once", default_value_t = false)]
    once: bool,

    /// Evaluate schedules against local wall-clock time instead of UTC.
    #[arg(short = 'l', long = "localtime", default_value_t = false)]
    local_time: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialise structured logging.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("pricing-fetcher starting up...");

    // ── Parse CLI arguments ───────────────────────────────────────────────────
    let cli = Cli::parse();

    info!(
        config     = %cli.config.display(),
        once       = cli.once,
        local_time = cli.local_time,
        "Configuration"
    );

    // ── Load fetch configuration ──────────────────────────────────────────────
    let mut plan = FetchPlan::new();
    if let Err(e) = plan.load_from_file(&cli.config) {
        error!("Failed to load fetch configuration: {:#}", e);
        process::exit(1);
    }

    // ── Run ───────────────────────────────────────────────────────────────────
    let mut runner = FetchRunner::new(plan.into_jobs(), cli.local_time);

    if cli.once {
        let fired = runner.run_once().await;
        info!(fired, "single evaluation complete");
        return;
    }

    runner.run().await
}
