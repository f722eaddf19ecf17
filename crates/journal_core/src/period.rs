//! crates/journal_core/src/period.rs
//!
//! Date arithmetic for the natural keys prompts are stored under.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc, Weekday};

use crate::domain::WritingKind;

/// The weekday a new fiction prompt becomes available.
pub const FICTION_WEEK_START: Weekday = Weekday::Sat;

/// The calendar date at the given fixed offset.
pub fn local_date(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

pub fn local_today(offset: FixedOffset) -> NaiveDate {
    local_date(Utc::now(), offset)
}

pub fn daily_period_key(today: NaiveDate) -> NaiveDate {
    today
}

/// The most recent Saturday, inclusive of `today`.
pub fn weekly_period_key(today: NaiveDate) -> NaiveDate {
    let since = (7 + today.weekday().num_days_from_sunday()
        - FICTION_WEEK_START.num_days_from_sunday())
        % 7;
    today - Duration::days(i64::from(since))
}

pub fn period_key(kind: WritingKind, today: NaiveDate) -> NaiveDate {
    match kind {
        WritingKind::Daily => daily_period_key(today),
        WritingKind::Fiction => weekly_period_key(today),
    }
}

/// Days left before the next fiction prompt; a full week on the day one arrives.
pub fn days_until_next_fiction_prompt(today: NaiveDate) -> u32 {
    let since = (weekly_period_key(today) - today).num_days().unsigned_abs() as u32;
    7 - since
}
