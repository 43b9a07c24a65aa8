//! Fetch job configuration loading and schedule compilation.
//!
//! The expected YAML structure is:
//! ```yaml
//! fetches:
//!   btc_usd:
//!     url: "https://prices.example.com/btc-usd"
//!     output_dir: "data/btc_usd"
//!     schedule:
//!       any:
//!         - days_of_the_week: [wednesday]
//!         - hours_of_the_day: [6, 12]
//! ```
//!
//! Schedule expressions are declarative trees: leaves (`weeks`,
//! `days_of_the_week`, `hours_of_the_day`, `minutes_of_the_hour`,
//! `always`, `never`) and combinators (`any` = union, `all` = intersection,
//! `not`, `first_matches`).  They are deserialized into a private
//! [`ScheduleSpec`] and compiled into the real
//! [`Schedule`](crate::schedule::Schedule) algebra, so every validation
//! rule of the algebra (range checks, day names) applies to config input.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::schedule::{Schedule, ScheduleError};
use crate::timepoint::DayOfWeek;

// ── Errors ────────────────────────────────────────────────────────────────────

/// A schedule expression parsed as YAML but does not describe a valid
/// schedule.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A `days_of_the_week` entry names a day the parser does not know.
    #[error("unknown day name '{name}' (valid: sunday..saturday or sun..sat)")]
    UnknownDay { name: String },

    /// A numeric leaf value was out of range for its field.
    #[error(transparent)]
    Leaf(#[from] ScheduleError),
}

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    fetches: HashMap<String, FetchEntry>,
}

/// Per-job fields as they appear in the YAML file.
#[derive(Debug, Deserialize)]
struct FetchEntry {
    url: String,
    /// Directory fetched bodies are written into.  Defaults to `data/`.
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
    schedule: ScheduleSpec,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Declarative schedule expression, one YAML key per node kind.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ScheduleSpec {
    Always,
    Never,
    Weeks(Vec<u8>),
    DaysOfTheWeek(Vec<String>),
    HoursOfTheDay(Vec<u8>),
    MinutesOfTheHour(Vec<u8>),
    /// Union of the listed expressions.  An empty list never matches.
    Any(Vec<ScheduleSpec>),
    /// Intersection of the listed expressions.  An empty list always matches.
    All(Vec<ScheduleSpec>),
    Not(Box<ScheduleSpec>),
    /// First `limit` observed matches of `of`.
    FirstMatches {
        limit: u64,
        of: Box<ScheduleSpec>,
    },
}

impl ScheduleSpec {
    /// Compile the declarative expression into the schedule algebra.
    fn compile(&self) -> Result<Schedule, ConfigError> {
        match self {
            ScheduleSpec::Always => Ok(Schedule::always()),
            ScheduleSpec::Never => Ok(Schedule::never()),
            ScheduleSpec::Weeks(weeks) => Ok(Schedule::weeks(weeks.iter().copied())?),
            ScheduleSpec::DaysOfTheWeek(names) => {
                let days = names
                    .iter()
                    .map(|name| {
                        DayOfWeek::parse(name).ok_or_else(|| ConfigError::UnknownDay {
                            name: name.clone(),
                        })
                    })
                    .collect::<Result<Vec<DayOfWeek>, ConfigError>>()?;
                Ok(Schedule::days_of_the_week(days))
            }
            ScheduleSpec::HoursOfTheDay(hours) => {
                Ok(Schedule::hours_of_the_day(hours.iter().copied())?)
            }
            ScheduleSpec::MinutesOfTheHour(minutes) => {
                Ok(Schedule::minutes_of_the_hour(minutes.iter().copied())?)
            }
            // Folding from the identity keeps `any: []` = never and
            // `all: []` = always.
            ScheduleSpec::Any(items) => items.iter().try_fold(Schedule::never(), |acc, item| {
                Ok(Schedule::union(acc, item.compile()?))
            }),
            ScheduleSpec::All(items) => items.iter().try_fold(Schedule::always(), |acc, item| {
                Ok(Schedule::intersection(acc, item.compile()?))
            }),
            ScheduleSpec::Not(inner) => Ok(Schedule::negate(inner.compile()?)),
            ScheduleSpec::FirstMatches { limit, of } => Ok(Schedule::times(of.compile()?, *limit)),
        }
    }
}

// ── Public data structures ────────────────────────────────────────────────────

/// One compiled fetch job: what to download, where to put it, and when.
#[derive(Debug, Clone)]
pub struct FetchJob {
    pub name: String,
    pub url: String,
    pub output_dir: PathBuf,
    pub schedule: Schedule,
}

// ── FetchPlan ─────────────────────────────────────────────────────────────────

/// Loads the YAML configuration and holds the compiled fetch jobs.
#[derive(Debug, Default)]
pub struct FetchPlan {
    /// Jobs sorted by name for deterministic evaluation order.
    jobs: Vec<FetchJob>,

    /// Set to `true` after a successful [`load_from_file`](Self::load_from_file).
    loaded: bool,
}

impl FetchPlan {
    /// Creates a new, empty `FetchPlan`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `path` and compiles every job's schedule expression.
    ///
    /// * An empty `fetches:` section is accepted with a warning — the runner
    ///   will simply idle.
    /// * Calling this method a second time replaces all previously loaded
    ///   jobs.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is
    /// structurally invalid, or any schedule expression fails to compile.
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        info!("Loading fetch configuration from: {}", path.display());

        // Reset state before (re-)loading
        self.jobs.clear();
        self.loaded = false;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        for (name, entry) in file.fetches {
            let schedule = entry
                .schedule
                .compile()
                .with_context(|| format!("Invalid schedule for fetch job '{name}'"))?;

            debug!(
                "  Job: {} | url: {} | output: {}",
                name,
                entry.url,
                entry.output_dir.display(),
            );

            self.jobs.push(FetchJob {
                name,
                url: entry.url,
                output_dir: entry.output_dir,
                schedule,
            });
        }

        if self.jobs.is_empty() {
            warn!("No fetch jobs found in configuration file — the runner will idle");
        }

        self.jobs.sort_by(|a, b| a.name.cmp(&b.name));
        self.loaded = true;

        info!("Successfully loaded {} fetch job(s)", self.jobs.len());
        for job in &self.jobs {
            info!(
                "  Job: {} | url: {} | output: {}",
                job.name,
                job.url,
                job.output_dir.display(),
            );
        }

        Ok(())
    }

    /// All compiled jobs, sorted by name.
    pub fn jobs(&self) -> &[FetchJob] {
        &self.jobs
    }

    /// Consume the plan, yielding the jobs for the runner.
    pub fn into_jobs(self) -> Vec<FetchJob> {
        self.jobs
    }

    /// Returns the job with the given name, if configured.
    pub fn job(&self, name: &str) -> Option<&FetchJob> {
        self.jobs.iter().find(|j| j.name == name)
    }

    /// Returns `true` after a successful call to [`load_from_file`](Self::load_from_file).
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
