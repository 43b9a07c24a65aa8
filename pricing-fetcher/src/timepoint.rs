/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Calendar point against which schedules are evaluated.
//!
//! A [`TimePoint`] is a fully-specified position within a month: minute of
//! the hour, hour of the day, day of the week, week of the month and month
//! of the year.  It is the sole input to
//! [`Schedule::matches`](crate::schedule::Schedule::matches).
//!
//! # Invariant
//! Callers supply a valid calendar point (normally via
//! [`TimePoint::from_datetime`]).  The schedule algebra performs no calendar
//! arithmetic and does not re-validate the point — an out-of-range field
//! simply fails every membership test.

use chrono::{Datelike, Timelike, Weekday};

// ── DayOfWeek ─────────────────────────────────────────────────────────────────

/// Day of the week, Sunday through Saturday.
///
/// A dedicated enum rather than a bare integer so that an invalid day cannot
/// be constructed anywhere in the pipeline.  The conversion from calendar
/// libraries happens once, at [`DayOfWeek::from_weekday`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    /// All seven days, Sunday first.  Handy for exhaustive iteration.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    /// Convert from a `chrono` weekday.
    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => DayOfWeek::Sunday,
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
        }
    }

    /// Parse a day name as it appears in the YAML configuration.
    ///
    /// Accepts the full English name or the three-letter abbreviation, in
    /// any case.  Returns `None` for anything else.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sunday" | "sun" => Some(DayOfWeek::Sunday),
            "monday" | "mon" => Some(DayOfWeek::Monday),
            "tuesday" | "tue" => Some(DayOfWeek::Tuesday),
            "wednesday" | "wed" => Some(DayOfWeek::Wednesday),
            "thursday" | "thu" => Some(DayOfWeek::Thursday),
            "friday" | "fri" => Some(DayOfWeek::Friday),
            "saturday" | "sat" => Some(DayOfWeek::Saturday),
            _ => None,
        }
    }
}

// ── TimePoint ─────────────────────────────────────────────────────────────────

/// One evaluation instant, at minute resolution.
///
/// `Copy` on purpose: a `TimePoint` is five small integers and is passed by
/// value throughout the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePoint {
    /// Minute of the hour, 0–59.
    pub minute: u8,
    /// Hour of the day, 0–23.
    pub hour: u8,
    /// Day of the week.
    pub day: DayOfWeek,
    /// Week of the month, 1–5 (days 1–7 are week 1, days 8–14 week 2, …).
    pub week: u8,
    /// Month of the year, 1–12.
    pub month: u8,
}

impl TimePoint {
    /// Build a `TimePoint` from explicit fields.
    pub fn new(minute: u8, hour: u8, day: DayOfWeek, week: u8, month: u8) -> Self {
        Self {
            minute,
            hour,
            day,
            week,
            month,
        }
    }

    /// Derive a `TimePoint` from any `chrono` date-time value
    /// (`DateTime<Utc>`, `NaiveDateTime`, …).
    ///
    /// Week-of-month follows the simple 7-day-block convention: days 1–7 are
    /// week 1, days 8–14 week 2, and so on up to week 5.
    pub fn from_datetime<T: Datelike + Timelike>(datetime: &T) -> Self {
        Self {
            minute: datetime.minute() as u8,
            hour: datetime.hour() as u8,
            day: DayOfWeek::from_weekday(datetime.weekday()),
            week: ((datetime.day() - 1) / 7 + 1) as u8,
            month: datetime.month() as u8,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    // ── DayOfWeek ─────────────────────────────────────────────────────────────

    #[test]
    fn from_weekday_covers_all_days() {
        assert_eq!(DayOfWeek::from_weekday(Weekday::Sun), DayOfWeek::Sunday);
        assert_eq!(DayOfWeek::from_weekday(Weekday::Mon), DayOfWeek::Monday);
        assert_eq!(DayOfWeek::from_weekday(Weekday::Wed), DayOfWeek::Wednesday);
        assert_eq!(DayOfWeek::from_weekday(Weekday::Sat), DayOfWeek::Saturday);
    }

    #[test]
    fn parse_accepts_full_names_any_case() {
        assert_eq!(DayOfWeek::parse("Wednesday"), Some(DayOfWeek::Wednesday));
        assert_eq!(DayOfWeek::parse("SUNDAY"), Some(DayOfWeek::Sunday));
        assert_eq!(DayOfWeek::parse("friday"), Some(DayOfWeek::Friday));
    }

    #[test]
    fn parse_accepts_three_letter_abbreviations() {
        assert_eq!(DayOfWeek::parse("mon"), Some(DayOfWeek::Monday));
        assert_eq!(DayOfWeek::parse("Thu"), Some(DayOfWeek::Thursday));
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert_eq!(DayOfWeek::parse("funday"), None);
        assert_eq!(DayOfWeek::parse(""), None);
        assert_eq!(DayOfWeek::parse("w"), None);
    }

    #[test]
    fn all_lists_seven_distinct_days() {
        let mut days = DayOfWeek::ALL.to_vec();
        days.dedup();
        assert_eq!(days.len(), 7);
    }

    // ── TimePoint::from_datetime ──────────────────────────────────────────────

    #[test]
    fn from_datetime_extracts_fields() {
        // 2026-08-19 is a Wednesday
        let tp = TimePoint::from_datetime(&naive(2026, 8, 19, 6, 30));
        assert_eq!(tp.minute, 30);
        assert_eq!(tp.hour, 6);
        assert_eq!(tp.day, DayOfWeek::Wednesday);
        assert_eq!(tp.month, 8);
    }

    #[test]
    fn week_of_month_boundaries() {
        // day 1 and day 7 fall in week 1
        assert_eq!(TimePoint::from_datetime(&naive(2026, 8, 1, 0, 0)).week, 1);
        assert_eq!(TimePoint::from_datetime(&naive(2026, 8, 7, 0, 0)).week, 1);
        // day 8 starts week 2
        assert_eq!(TimePoint::from_datetime(&naive(2026, 8, 8, 0, 0)).week, 2);
        // day 29 starts week 5
        assert_eq!(TimePoint::from_datetime(&naive(2026, 8, 29, 0, 0)).week, 5);
        assert_eq!(TimePoint::from_datetime(&naive(2026, 8, 31, 0, 0)).week, 5);
    }

    #[test]
    fn from_datetime_midnight_first_of_month() {
        let tp = TimePoint::from_datetime(&naive(2026, 1, 1, 0, 0));
        assert_eq!(tp.minute, 0);
        assert_eq!(tp.hour, 0);
        assert_eq!(tp.week, 1);
        assert_eq!(tp.month, 1);
        // 2026-01-01 is a Thursday
        assert_eq!(tp.day, DayOfWeek::Thursday);
    }
}
