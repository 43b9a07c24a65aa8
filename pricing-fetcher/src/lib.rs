/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! pricing-fetcher – scheduled pricing data downloads
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── timepoint/   – TimePoint + DayOfWeek (evaluation input)
//! ├── schedule/    – the schedule algebra (expression tree + evaluator)
//! ├── config/      – YAML fetch jobs, schedule expression compilation
//! └── fetcher/     – minute-tick runner + HTTP download
//! ```

pub mod config;
pub mod fetcher;
pub mod schedule;
pub mod timepoint;
