//! Calendar arithmetic consumed by the tilers.
//!
//! All instants are local wall-clock `NaiveDateTime`s; no timezone
//! conversion happens here. Week-relative operations honour the configured
//! [`WeekStart`].

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

pub const MINUTES_IN_DAY: u32 = 1440;

/// First day of the calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Monday,
    #[default]
    Sunday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeUtils {
    week_start: WeekStart,
}

impl TimeUtils {
    pub fn new(week_start: WeekStart) -> Self {
        Self { week_start }
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    // ── Comparison ─────────────────────────────────────────────────────────

    pub fn is_before(&self, a: NaiveDateTime, b: NaiveDateTime) -> bool {
        a < b
    }

    pub fn is_after(&self, a: NaiveDateTime, b: NaiveDateTime) -> bool {
        a > b
    }

    // ── Arithmetic ─────────────────────────────────────────────────────────

    pub fn add_days(&self, date: NaiveDate, days: i64) -> NaiveDate {
        date + Duration::days(days)
    }

    pub fn add_weeks(&self, date: NaiveDate, weeks: i64) -> NaiveDate {
        date + Duration::weeks(weeks)
    }

    /// Fractional minutes from `from` to `to` (negative when `to` is earlier).
    pub fn minutes_between(&self, from: NaiveDateTime, to: NaiveDateTime) -> f64 {
        (to - from).num_milliseconds() as f64 / 60_000.0
    }

    /// `left - right` in calendar days, ignoring time of day.
    pub fn difference_in_calendar_days(&self, left: NaiveDate, right: NaiveDate) -> i64 {
        (left - right).num_days()
    }

    // ── Boundaries ─────────────────────────────────────────────────────────

    pub fn start_of_day(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN)
    }

    /// Last millisecond of the day.
    pub fn end_of_day(&self, date: NaiveDate) -> NaiveDateTime {
        self.start_of_day(date) + Duration::days(1) - Duration::milliseconds(1)
    }

    pub fn start_of_week(&self, date: NaiveDate) -> NaiveDate {
        date - Duration::days(self.week_day(date) as i64)
    }

    pub fn end_of_week(&self, date: NaiveDate) -> NaiveDate {
        self.start_of_week(date) + Duration::days(6)
    }

    /// Zero-based index of `date` within its week (0 = configured week start).
    pub fn week_day(&self, date: NaiveDate) -> u32 {
        let day = date.weekday().num_days_from_monday();
        let first = self.week_start.weekday().num_days_from_monday();
        (day + 7 - first) % 7
    }

    /// Last calendar day an event touches, treating `ends_at` as exclusive.
    ///
    /// An event ending exactly at midnight does not cover the day it ends on,
    /// unless it is zero-length.
    pub fn last_covered_day(&self, starts_at: NaiveDateTime, ends_at: NaiveDateTime) -> NaiveDate {
        let end_date = ends_at.date();
        if ends_at > starts_at && ends_at.time() == NaiveTime::MIN {
            end_date - Duration::days(1)
        } else {
            end_date
        }
    }

    // ── Intervals ──────────────────────────────────────────────────────────

    /// Every date from `start` to `end`, both inclusive.
    pub fn each_day_of_interval(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start.iter_days().take_while(|d| *d <= end).collect()
    }

    /// The first day of every week touching `[start, end]`.
    pub fn each_week_of_interval(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut weeks = Vec::new();
        let mut cursor = self.start_of_week(start);
        while cursor <= end {
            weeks.push(cursor);
            cursor = self.add_weeks(cursor, 1);
        }
        weeks
    }

    // ── Formatting ─────────────────────────────────────────────────────────

    /// Locale week number; week 1 is the week containing January 1st.
    pub fn week_number(&self, date: NaiveDate) -> u32 {
        let week_start = self.start_of_week(date);
        let this_year = self.start_of_week(jan_first(date.year()).unwrap_or(date));
        let next_year = jan_first(date.year() + 1).map(|d| self.start_of_week(d));

        let base = match next_year {
            Some(next) if date >= next => next,
            _ => this_year,
        };
        ((week_start - base).num_days() / 7 + 1) as u32
    }

    /// `yyyy-MM-dd` key used to bucket events by date.
    pub fn format_date_key(&self, date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }
}

fn jan_first(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}
