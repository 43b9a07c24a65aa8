/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The schedule algebra: an immutable expression tree of time predicates.
//!
//! A [`Schedule`] decides whether a fetch should fire at a given
//! [`TimePoint`].  Leaves test one field of the point against a set
//! (minutes, hours, days of the week, weeks of the month); combinators
//! compose leaves with boolean OR ([`Schedule::union`]), AND
//! ([`Schedule::intersection`]) and NOT ([`Schedule::negate`]); and
//! [`Schedule::times`] caps a schedule at its first `n` observed matches.
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | Tree shape | Single `enum`, matched exhaustively — no open subclassing |
//! | Child ownership | `Arc<Schedule>` — shared substructure, never deep-copied |
//! | Leaf validation | Reject out-of-range values at construction ([`ScheduleError`]) |
//! | Empty leaf set | Accepted; it never matches |
//! | `times` counting | Counter lives in a caller-owned [`EvalContext`], not in the tree |
//!
//! # Algebraic laws
//! For trees without `times` nodes, evaluation is a pure boolean function of
//! the time point, and the usual laws hold and are tested below:
//! associativity and commutativity of union/intersection, double negation,
//! and De Morgan.  `Schedule::never()` is the union identity,
//! `Schedule::always()` the intersection identity.
//!
//! With `times` nodes the tree is still immutable but evaluation consumes
//! occurrence budget from the context.  Evaluation short-circuits, so a
//! `times` node only counts occurrences it actually observes — e.g. the
//! right side of a union is not consulted (and not counted) when the left
//! side already matched.
//!
//! # Example
//! ```rust,ignore
//! let sched = Schedule::union(
//!     Schedule::days_of_the_week([DayOfWeek::Wednesday]),
//!     Schedule::hours_of_the_day([6, 12])?,
//! );
//! let fire = sched.matches_at(TimePoint::from_datetime(&Utc::now()));
//! ```

pub mod error;

pub use error::ScheduleError;

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::timepoint::{DayOfWeek, TimePoint};

// ── Occurrence counters ───────────────────────────────────────────────────────

/// Process-wide source of fresh counter ids for `times` nodes.
static NEXT_COUNTER_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of one `times` node's occurrence counter.
///
/// Assigned once when the node is built.  Cloning a `Schedule` clones the
/// id, so clones and `Arc`-shared references to the same node draw from the
/// same budget — "the same node" keeps meaning the same occurrence stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CounterId(u64);

impl CounterId {
    fn fresh() -> Self {
        CounterId(NEXT_COUNTER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Mutable state threaded through evaluation: one occurrence count per
/// `times` node.
///
/// The context — not the tree — owns all mutable state, so `Schedule` stays
/// `Send + Sync` and freely shareable.  The caller decides the counting
/// scope by deciding when to create or [`reset`](Self::reset) a context:
/// one context per process run means "first n matches ever this run"; a
/// context reset at midnight means "first n matches per day".
///
/// Concurrent evaluation against one context requires exclusive access
/// (`&mut`), which the borrow checker enforces.
#[derive(Debug, Default)]
pub struct EvalContext {
    counts: HashMap<CounterId, u64>,
}

impl EvalContext {
    /// Create an empty context: every `times` node has its full budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all occurrence counts, restoring every `times` budget.
    pub fn reset(&mut self) {
        self.counts.clear();
    }

    /// Occurrences observed so far for the given counter.
    pub fn count(&self, id: CounterId) -> u64 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    /// Record one more occurrence and return the new total.
    fn observe(&mut self, id: CounterId) -> u64 {
        let count = self.counts.entry(id).or_insert(0);
        *count += 1;
        *count
    }
}

// ── Schedule ──────────────────────────────────────────────────────────────────

/// An immutable time-predicate expression tree.
///
/// Built once via the constructors below, then evaluated any number of
/// times with [`matches`](Self::matches).  Children are reference-counted,
/// so combining two schedules never copies their subtrees, and one subtree
/// may appear under several parents.
#[derive(Debug, Clone)]
pub enum Schedule {
    /// Matches every time point.  Identity for [`intersection`](Self::intersection).
    Always,
    /// Matches no time point.  Identity for [`union`](Self::union).
    Never,
    /// Matches when the point's week-of-month is in the set.
    Weeks(BTreeSet<u8>),
    /// Matches when the point's day-of-week is in the set.
    DaysOfWeek(BTreeSet<DayOfWeek>),
    /// Matches when the point's hour is in the set.
    Hours(BTreeSet<u8>),
    /// Matches when the point's minute is in the set.
    Minutes(BTreeSet<u8>),
    /// Matches exactly when the child does not.
    Not(Arc<Schedule>),
    /// Matches when either child matches.
    Union(Arc<Schedule>, Arc<Schedule>),
    /// Matches when both children match.
    Intersection(Arc<Schedule>, Arc<Schedule>),
    /// Matches on the first `limit` observed matches of `inner`, then never
    /// again until the evaluation context is reset.
    Times {
        inner: Arc<Schedule>,
        limit: u64,
        counter: CounterId,
    },
}

impl Schedule {
    // ── Leaf constructors ─────────────────────────────────────────────────────

    /// The always-matching schedule.
    pub fn always() -> Self {
        Schedule::Always
    }

    /// The never-matching schedule.
    pub fn never() -> Self {
        Schedule::Never
    }

    /// Match the given weeks of the month (1–5).
    ///
    /// Duplicates are collapsed; order is irrelevant.  An empty list yields
    /// a leaf that never matches.
    ///
    /// # Errors
    /// [`ScheduleError::WeekOutOfRange`] for any value outside 1–5.
    pub fn weeks(weeks: impl IntoIterator<Item = u8>) -> Result<Self, ScheduleError> {
        let mut set = BTreeSet::new();
        for week in weeks {
            if !(1..=5).contains(&week) {
                return Err(ScheduleError::WeekOutOfRange { week });
            }
            set.insert(week);
        }
        Ok(Schedule::Weeks(set))
    }

    /// Match the given days of the week.
    ///
    /// Infallible: [`DayOfWeek`] cannot hold an invalid day.  An empty list
    /// yields a leaf that never matches.
    pub fn days_of_the_week(days: impl IntoIterator<Item = DayOfWeek>) -> Self {
        Schedule::DaysOfWeek(days.into_iter().collect())
    }

    /// Match the given hours of the day (0–23).
    ///
    /// # Errors
    /// [`ScheduleError::HourOutOfRange`] for any value above 23.
    pub fn hours_of_the_day(hours: impl IntoIterator<Item = u8>) -> Result<Self, ScheduleError> {
        let mut set = BTreeSet::new();
        for hour in hours {
            if hour > 23 {
                return Err(ScheduleError::HourOutOfRange { hour });
            }
            set.insert(hour);
        }
        Ok(Schedule::Hours(set))
    }

    /// Match the given minutes of the hour (0–59).
    ///
    /// # Errors
    /// [`ScheduleError::MinuteOutOfRange`] for any value above 59.
    pub fn minutes_of_the_hour(
        minutes: impl IntoIterator<Item = u8>,
    ) -> Result<Self, ScheduleError> {
        let mut set = BTreeSet::new();
        for minute in minutes {
            if minute > 59 {
                return Err(ScheduleError::MinuteOutOfRange { minute });
            }
            set.insert(minute);
        }
        Ok(Schedule::Minutes(set))
    }

    // ── Combinators ───────────────────────────────────────────────────────────

    /// Matches when either schedule matches (boolean OR).
    ///
    /// Accepts owned schedules or `Arc<Schedule>` clones, so subtrees can be
    /// shared between parents without copying.
    pub fn union(a: impl Into<Arc<Schedule>>, b: impl Into<Arc<Schedule>>) -> Self {
        Schedule::Union(a.into(), b.into())
    }

    /// Matches when both schedules match (boolean AND).
    pub fn intersection(a: impl Into<Arc<Schedule>>, b: impl Into<Arc<Schedule>>) -> Self {
        Schedule::Intersection(a.into(), b.into())
    }

    /// Matches exactly when the given schedule does not (boolean NOT).
    pub fn negate(inner: impl Into<Arc<Schedule>>) -> Self {
        Schedule::Not(inner.into())
    }

    /// Matches on the first `limit` observed matches of `inner`.
    ///
    /// The occurrence counter lives in the [`EvalContext`], keyed by an id
    /// assigned here, so the caller controls the counting scope.  A limit of
    /// `0` never matches.
    pub fn times(inner: impl Into<Arc<Schedule>>, limit: u64) -> Self {
        Schedule::Times {
            inner: inner.into(),
            limit,
            counter: CounterId::fresh(),
        }
    }

    // ── Evaluation ────────────────────────────────────────────────────────────

    /// Evaluate this schedule against a time point.
    ///
    /// Pure, total and deterministic apart from the occurrence counters in
    /// `ctx`, which only `Times` nodes touch.  Union and intersection
    /// short-circuit, so subtrees that cannot affect the outcome are not
    /// evaluated (and their `times` budgets are not consumed).
    pub fn matches(&self, at: TimePoint, ctx: &mut EvalContext) -> bool {
        match self {
            Schedule::Always => true,
            Schedule::Never => false,
            Schedule::Weeks(set) => set.contains(&at.week),
            Schedule::DaysOfWeek(set) => set.contains(&at.day),
            Schedule::Hours(set) => set.contains(&at.hour),
            Schedule::Minutes(set) => set.contains(&at.minute),
            Schedule::Not(inner) => !inner.matches(at, ctx),
            Schedule::Union(left, right) => left.matches(at, ctx) || right.matches(at, ctx),
            Schedule::Intersection(left, right) => {
                left.matches(at, ctx) && right.matches(at, ctx)
            }
            Schedule::Times {
                inner,
                limit,
                counter,
            } => {
                if !inner.matches(at, ctx) {
                    return false;
                }
                ctx.observe(*counter) <= *limit
            }
        }
    }

    /// Evaluate against a throwaway context.
    ///
    /// Convenience for trees without `Times` nodes.  A tree *with* `Times`
    /// nodes sees a fresh budget on every call, so occurrence limits do not
    /// accumulate — hold an [`EvalContext`] across calls if they should.
    pub fn matches_at(&self, at: TimePoint) -> bool {
        self.matches(at, &mut EvalContext::new())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
