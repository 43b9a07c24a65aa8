/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error type for schedule construction.
//!
//! The algebra itself is total — [`Schedule::matches`] cannot fail — so the
//! only error surface is construction-time validation of leaf values.  The
//! policy here is **reject at construction**: an out-of-range hour or minute
//! in a leaf set is a configuration mistake, and silently producing a
//! never-matching schedule would hide it until someone notices a fetch that
//! never fires.
//!
//! [`Schedule::matches`]: super::Schedule::matches

use thiserror::Error;

/// A leaf constructor was given a value outside its field's valid range.
///
/// Every variant carries the offending value so the config layer can report
/// exactly what was wrong without re-parsing anything.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// Minute values must lie in 0–59.
    #[error("minute {minute} is out of range (valid: 0-59)")]
    MinuteOutOfRange { minute: u8 },

    /// Hour values must lie in 0–23.
    #[error("hour {hour} is out of range (valid: 0-23)")]
    HourOutOfRange { hour: u8 },

    /// Week-of-month values must lie in 1–5.
    #[error("week-of-month {week} is out of range (valid: 1-5)")]
    WeekOutOfRange { week: u8 },
}
