//! Multi-week grid layout for the month view.
//!
//! Events are ordered shortest first, bucketed by the date they start on and
//! then placed one row at a time: each pass over the visible days places at
//! most one event per date, skipping past the days a placed event covers.
//! Events crossing a week boundary are split into one tile per week.
//! A date that already holds `max_per_slot` events takes no more; its
//! remaining events are dropped.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::{debug, trace};
use serde::Serialize;

use crate::config::MaxPerSlot;
use crate::error::{Result, TilerError};
use crate::event::{Continuity, TimedEvent};
use crate::time::TimeUtils;

/// Resolved options for the month tiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthTilerConfig {
    /// Maximum number of events starting on any one date.
    pub max_per_slot: MaxPerSlot,
}

impl MonthTilerConfig {
    pub fn new(max_per_slot: u32) -> Result<Self> {
        Ok(Self {
            max_per_slot: MaxPerSlot::try_from(max_per_slot)?,
        })
    }
}

/// Visible dates `[start, end)`, normally whole weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthRange {
    /// # Errors
    /// Returns `TilerError::InvalidRange` unless `start < end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(TilerError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The whole weeks covering the given calendar month.
    pub fn covering_month(time: &TimeUtils, year: i32, month: u32) -> Result<Self> {
        let (first, last) = month_bounds(year, month)?;
        Self::new(
            time.start_of_week(first),
            time.add_days(time.end_of_week(last), 1),
        )
    }

    /// Last visible date.
    pub fn last_day(&self) -> NaiveDate {
        self.end - Duration::days(1)
    }
}

/// 1-based grid column span `[x_start, x_end)` within a week row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGeometry {
    pub x_start: u32,
    pub x_end: u32,
}

/// One week's segment of an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTile<'a, E> {
    pub id: usize,
    pub event: &'a E,
    pub continuous: Continuity,
    pub geometry: MonthGeometry,
}

/// Tiles placed in one week, in placement order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRow<'a, E> {
    pub week_number: u32,
    pub tiles: Vec<MonthTile<'a, E>>,
}

/// Week rows keyed by the first date of each week.
pub type MonthLayout<'a, E> = BTreeMap<NaiveDate, WeekRow<'a, E>>;

#[derive(Debug)]
struct Candidate<'a, E> {
    event: &'a E,
    starts_at: NaiveDateTime,
    anchor: NaiveDate,
    last_day: NaiveDate,
    span_days: i64,
    priority: Option<i32>,
}

#[derive(Debug, Clone, Copy)]
pub struct MonthTiler {
    config: MonthTilerConfig,
    time: TimeUtils,
}

impl MonthTiler {
    pub fn new(config: MonthTilerConfig, time: TimeUtils) -> Self {
        Self { config, time }
    }

    /// Lay out every event intersecting `range`.
    pub fn layout<'a, E: TimedEvent>(&self, events: &'a [E], range: MonthRange) -> MonthLayout<'a, E> {
        self.layout_within(events, range, range.start, range.last_day())
    }

    /// Lay out a calendar month on the whole weeks that cover it.
    ///
    /// With `show_sibling_dates` off, events touching only the leading or
    /// trailing days of neighbouring months are left out.
    pub fn layout_month<'a, E: TimedEvent>(
        &self,
        events: &'a [E],
        year: i32,
        month: u32,
        show_sibling_dates: bool,
    ) -> Result<MonthLayout<'a, E>> {
        let range = MonthRange::covering_month(&self.time, year, month)?;
        if show_sibling_dates {
            return Ok(self.layout(events, range));
        }
        let (first, last) = month_bounds(year, month)?;
        Ok(self.layout_within(events, range, first, last))
    }

    fn layout_within<'a, E: TimedEvent>(
        &self,
        events: &'a [E],
        range: MonthRange,
        focus_start: NaiveDate,
        focus_end: NaiveDate,
    ) -> MonthLayout<'a, E> {
        let t = &self.time;
        let last_visible = range.last_day();

        let mut candidates: Vec<Candidate<'a, E>> = events
            .iter()
            .filter_map(|event| {
                let starts_at = event.starts_at();
                let start_day = starts_at.date();
                let last_day = t.last_covered_day(starts_at, event.ends_at());
                if start_day > focus_end || last_day < focus_start {
                    return None;
                }
                Some(Candidate {
                    event,
                    starts_at,
                    anchor: start_day.max(range.start),
                    last_day,
                    span_days: t.difference_in_calendar_days(last_day, start_day),
                    priority: event.priority(),
                })
            })
            .collect();

        // Shortest first; explicit priority (highest first) breaks ties.
        candidates.sort_by(|a, b| {
            a.span_days
                .cmp(&b.span_days)
                .then_with(|| b.priority.cmp(&a.priority))
        });

        let mut by_date: HashMap<NaiveDate, Vec<usize>> = HashMap::new();
        for (i, c) in candidates.iter().enumerate() {
            by_date.entry(c.anchor).or_default().push(i);
        }

        let mut layout: MonthLayout<'a, E> = t
            .each_week_of_interval(range.start, last_visible)
            .into_iter()
            .map(|week| {
                (
                    week,
                    WeekRow {
                        week_number: t.week_number(week),
                        tiles: Vec::new(),
                    },
                )
            })
            .collect();

        let max_per_slot = self.config.max_per_slot.get();
        let mut rows_used: HashMap<NaiveDate, usize> = HashMap::new();
        let mut exhausted: HashSet<NaiveDate> = HashSet::new();
        let mut touched = 0;
        let mut next_id = 1;

        while touched < candidates.len() {
            let mut day = range.start;
            while day <= last_visible && touched < candidates.len() {
                let Some(bucket) = by_date.get(&day) else {
                    day = t.add_days(day, 1);
                    continue;
                };

                let row = rows_used.get(&day).copied().unwrap_or(0);
                if row >= max_per_slot {
                    if exhausted.insert(day) {
                        let dropped = bucket.len().saturating_sub(row);
                        if dropped > 0 {
                            debug!("{} events on {} dropped: date is full", dropped, day);
                        }
                        touched += dropped;
                    }
                    day = t.add_days(day, 1);
                    continue;
                }

                let Some(&index) = bucket.get(row) else {
                    day = t.add_days(day, 1);
                    continue;
                };

                rows_used.insert(day, row + 1);
                touched += 1;
                day = self.place(&candidates[index], range, &mut layout, &mut next_id);
            }
        }

        trace!(
            "month layout {}..{}: {} tiles from {} events",
            range.start,
            range.end,
            next_id - 1,
            candidates.len()
        );

        layout
    }

    /// Emit one tile per visible week the event covers; returns the next
    /// date the row walk should visit.
    fn place<'a, E>(
        &self,
        candidate: &Candidate<'a, E>,
        range: MonthRange,
        layout: &mut MonthLayout<'a, E>,
        next_id: &mut usize,
    ) -> NaiveDate {
        let t = &self.time;
        let mut current = candidate.anchor;
        let mut continuing = candidate.starts_at.date() < current;

        loop {
            let week_start = t.start_of_week(current);
            // Ranges need not end on a week boundary.
            let row_end = t.end_of_week(current).min(range.last_day());
            let continues = candidate.last_day > row_end;

            let tile = MonthTile {
                id: *next_id,
                event: candidate.event,
                continuous: Continuity {
                    start: continuing,
                    end: continues,
                },
                geometry: MonthGeometry {
                    x_start: t.week_day(current) + 1,
                    x_end: t.week_day(if continues { row_end } else { candidate.last_day }) + 2,
                },
            };
            *next_id += 1;

            match layout.get_mut(&week_start) {
                Some(row) => row.tiles.push(tile),
                None => debug!("week of {} is not visible; tile skipped", week_start),
            }

            if !continues {
                return t.add_days(candidate.last_day, 1);
            }

            let next_week = t.add_weeks(week_start, 1);
            if next_week >= range.end {
                return next_week;
            }
            current = next_week;
            continuing = true;
        }
    }
}

fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let first =
        NaiveDate::from_ymd_opt(year, month, 1).ok_or(TilerError::InvalidMonth { year, month })?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or(TilerError::InvalidMonth { year, month })?;
    Ok((first, next - Duration::days(1)))
}
