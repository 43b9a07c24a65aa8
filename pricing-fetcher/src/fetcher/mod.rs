/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The fetch runner: evaluates schedules once a minute and performs the
//! HTTP downloads.
//!
//! ```text
//! wall clock ──► TimePoint ──► Schedule::matches ──► HTTP GET ──► output file
//!                               (per job, shared         (reqwest)
//!                                EvalContext)
//! ```
//!
//! # Concurrency
//! The runner is a single task.  It owns the one [`EvalContext`], so
//! `times` occurrence counters follow a single-writer discipline — no lock
//! is needed.  Jobs are evaluated in name order (the [`FetchPlan`] sorts
//! them) for deterministic logs.
//!
//! A failed download is logged and skipped; it never stops the runner or
//! the remaining jobs of the same tick.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, Timelike, Utc};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::FetchJob;
use crate::schedule::EvalContext;
use crate::timepoint::TimePoint;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Why a single fetch attempt failed.
///
/// Carried per job and per tick; the runner logs the variant and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP request could not be sent or the body could not be read.
    #[error("request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status code.
    #[error("server returned {status} for '{url}'")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The output directory or file could not be written.
    #[error("cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ── Single fetch ──────────────────────────────────────────────────────────────

/// File name for one fetched body: `<job>-<timestamp>.dat`.
///
/// The timestamp is the tick's minute (`%Y%m%dT%H%M`), so re-running a tick
/// overwrites its own output instead of accumulating duplicates.
pub fn output_file_name(job_name: &str, stamp: &str) -> String {
    format!("{job_name}-{stamp}.dat")
}

/// Download one job's URL and write the body under its output directory.
///
/// Returns the path written on success.
pub async fn fetch_job(
    client: &reqwest::Client,
    job: &FetchJob,
    stamp: &str,
) -> Result<PathBuf, FetchError> {
    let response = client
        .get(&job.url)
        .send()
        .await
        .map_err(|source| FetchError::Request {
            url: job.url.clone(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: job.url.clone(),
            status,
        });
    }

    let body = response.bytes().await.map_err(|source| FetchError::Request {
        url: job.url.clone(),
        source,
    })?;

    tokio::fs::create_dir_all(&job.output_dir)
        .await
        .map_err(|source| FetchError::Write {
            path: job.output_dir.clone(),
            source,
        })?;

    let path = job.output_dir.join(output_file_name(&job.name, stamp));
    tokio::fs::write(&path, &body)
        .await
        .map_err(|source| FetchError::Write {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}

// ── FetchRunner ───────────────────────────────────────────────────────────────

/// Drives all configured jobs against the wall clock.
pub struct FetchRunner {
    jobs: Vec<FetchJob>,
    client: reqwest::Client,
    ctx: EvalContext,
    /// Evaluate schedules against local wall-clock time instead of UTC.
    use_local_time: bool,
}

impl FetchRunner {
    /// Build a runner over the given jobs.
    pub fn new(jobs: Vec<FetchJob>, use_local_time: bool) -> Self {
        Self {
            jobs,
            client: reqwest::Client::new(),
            ctx: EvalContext::new(),
            use_local_time,
        }
    }

    /// Current naive wall-clock time in the configured zone.
    fn now(&self) -> NaiveDateTime {
        if self.use_local_time {
            Local::now().naive_local()
        } else {
            Utc::now().naive_utc()
        }
    }

    /// Evaluate every job against `at` and fetch the ones that fire.
    ///
    /// Returns the number of successful fetches.  Failures are logged per
    /// job and do not abort the tick.
    pub async fn tick(&mut self, at: TimePoint, stamp: &str) -> usize {
        let mut fired = 0usize;

        for job in &self.jobs {
            if !job.schedule.matches(at, &mut self.ctx) {
                continue;
            }

            debug!(job = %job.name, url = %job.url, "schedule matched, fetching");
            match fetch_job(&self.client, job, stamp).await {
                Ok(path) => {
                    fired += 1;
                    info!(job = %job.name, path = %path.display(), "fetched");
                }
                Err(e) => {
                    error!(job = %job.name, error = %e, "fetch failed");
                }
            }
        }

        fired
    }

    /// Evaluate and fetch once against the current wall clock.
    pub async fn run_once(&mut self) -> usize {
        let now = self.now();
        let at = TimePoint::from_datetime(&now);
        let stamp = now.format("%Y%m%dT%H%M").to_string();
        self.tick(at, &stamp).await
    }

    /// Run forever: sleep to the next minute boundary, then tick.
    pub async fn run(&mut self) {
        info!(
            jobs = self.jobs.len(),
            local_time = self.use_local_time,
            "fetch runner started"
        );

        loop {
            let seconds_left = 60 - u64::from(self.now().second().min(59));
            tokio::time::sleep(Duration::from_secs(seconds_left)).await;

            let fired = self.run_once().await;
            debug!(fired, "minute tick complete");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Schedule;
    use crate::timepoint::DayOfWeek;

    fn job(name: &str, schedule: Schedule) -> FetchJob {
        FetchJob {
            name: name.to_string(),
            url: "http://127.0.0.1:9/unreachable".to_string(),
            output_dir: PathBuf::from("data"),
            schedule,
        }
    }

    fn at(minute: u8, hour: u8) -> TimePoint {
        TimePoint::new(minute, hour, DayOfWeek::Monday, 1, 1)
    }

    #[test]
    fn output_file_name_embeds_job_and_stamp() {
        assert_eq!(
            output_file_name("btc_usd", "20260825T0630"),
            "btc_usd-20260825T0630.dat",
        );
    }

    #[tokio::test]
    async fn tick_skips_jobs_whose_schedule_does_not_match() {
        // No job matches, so no network request is ever attempted.
        let jobs = vec![
            job("a", Schedule::never()),
            job("b", Schedule::hours_of_the_day([6]).unwrap()),
        ];
        let mut runner = FetchRunner::new(jobs, false);

        let fired = runner.tick(at(0, 12), "20260825T1200").await;
        assert_eq!(fired, 0);
    }

    #[tokio::test]
    async fn tick_counts_failed_fetches_as_not_fired() {
        // The schedule matches but the URL is unreachable (port 9 /
        // discard); the failure must be swallowed, not propagated.
        let jobs = vec![job("a", Schedule::always())];
        let mut runner = FetchRunner::new(jobs, false);

        let fired = runner.tick(at(0, 6), "20260825T0600").await;
        assert_eq!(fired, 0);
    }

    #[tokio::test]
    async fn times_budget_persists_across_ticks() {
        let jobs = vec![job("capped", Schedule::times(Schedule::always(), 1))];
        let mut runner = FetchRunner::new(jobs, false);

        // First tick consumes the single occurrence (the fetch itself fails,
        // but the schedule matched and the budget is spent).
        runner.tick(at(0, 6), "t0").await;
        // Second tick: the budget is exhausted, so the schedule no longer
        // matches at all.
        let point = at(1, 6);
        assert!(!runner.jobs[0].schedule.matches(point, &mut runner.ctx));
    }
}
