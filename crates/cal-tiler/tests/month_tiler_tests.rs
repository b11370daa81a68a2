//! Tests for the month grid tiler.

use cal_tiler::event::{Event, EventId};
use cal_tiler::month::{MonthLayout, MonthRange, MonthTiler, MonthTilerConfig};
use cal_tiler::time::{TimeUtils, WeekStart};
use cal_tiler::TilerError;
use chrono::{NaiveDate, NaiveDateTime};

// ── Helpers ─────────────────────────────────────────────────────────────────

/// A date in 2026. March 1st 2026 is a Sunday.
fn d(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, day).unwrap()
}

fn at(month: u32, day: u32, hour: u32) -> NaiveDateTime {
    d(month, day).and_hms_opt(hour, 0, 0).unwrap()
}

fn ev(id: i64, start: NaiveDateTime, end: NaiveDateTime) -> Event {
    Event::new(id, start, end)
}

fn tiler(max_per_slot: u32) -> MonthTiler {
    MonthTiler::new(
        MonthTilerConfig::new(max_per_slot).unwrap(),
        TimeUtils::default(),
    )
}

/// Sunday-start weeks covering March 2026: Mar 1 .. Apr 4.
fn march() -> MonthRange {
    MonthRange::covering_month(&TimeUtils::default(), 2026, 3).unwrap()
}

fn ids_in_week(layout: &MonthLayout<'_, Event>, week: NaiveDate) -> Vec<EventId> {
    layout[&week].tiles.iter().map(|t| t.event.id.clone()).collect()
}

fn total_tiles(layout: &MonthLayout<'_, Event>) -> usize {
    layout.values().map(|row| row.tiles.len()).sum()
}

// ── Geometry ────────────────────────────────────────────────────────────────

#[test]
fn monday_to_wednesday_midnight_spans_two_columns() {
    // Ends at Wednesday 00:00, so Monday and Tuesday are covered.
    let events = vec![ev(1, at(3, 2, 0), at(3, 4, 0))];

    let layout = tiler(5).layout(&events, march());

    assert_eq!(total_tiles(&layout), 1);
    let tile = &layout[&d(3, 1)].tiles[0];
    assert_eq!(tile.geometry.x_start, 2);
    assert_eq!(tile.geometry.x_end, 4);
    assert!(!tile.continuous.start);
    assert!(!tile.continuous.end);
}

#[test]
fn event_ending_mid_wednesday_covers_wednesday() {
    let events = vec![ev(1, at(3, 2, 9), at(3, 4, 17))];

    let layout = tiler(5).layout(&events, march());

    let tile = &layout[&d(3, 1)].tiles[0];
    assert_eq!(tile.geometry.x_start, 2);
    assert_eq!(tile.geometry.x_end, 5);
}

#[test]
fn zero_length_event_occupies_its_day() {
    let events = vec![ev(1, at(3, 10, 9), at(3, 10, 9))];

    let layout = tiler(5).layout(&events, march());

    let tile = &layout[&d(3, 8)].tiles[0];
    assert_eq!(tile.geometry.x_start, 3);
    assert_eq!(tile.geometry.x_end, 4);
}

#[test]
fn monday_start_shifts_columns() {
    let time = TimeUtils::new(WeekStart::Monday);
    let range = MonthRange::covering_month(&time, 2026, 3).unwrap();
    let tiler = MonthTiler::new(MonthTilerConfig::new(5).unwrap(), time);
    let events = vec![ev(1, at(3, 2, 0), at(3, 4, 0))];

    let layout = tiler.layout(&events, range);

    assert_eq!(range.start, d(2, 23));
    let tile = &layout[&d(3, 2)].tiles[0];
    assert_eq!(tile.geometry.x_start, 1);
    assert_eq!(tile.geometry.x_end, 3);
}

// ── Week splitting ──────────────────────────────────────────────────────────

#[test]
fn event_spanning_three_weeks_is_split_per_week() {
    // Thursday Mar 5 to Tuesday Mar 17.
    let events = vec![ev(1, at(3, 5, 10), at(3, 17, 12))];

    let layout = tiler(5).layout(&events, march());

    assert_eq!(total_tiles(&layout), 3);

    let first = &layout[&d(3, 1)].tiles[0];
    assert_eq!((first.geometry.x_start, first.geometry.x_end), (5, 8));
    assert_eq!((first.continuous.start, first.continuous.end), (false, true));

    let middle = &layout[&d(3, 8)].tiles[0];
    assert_eq!((middle.geometry.x_start, middle.geometry.x_end), (1, 8));
    assert_eq!((middle.continuous.start, middle.continuous.end), (true, true));

    let last = &layout[&d(3, 15)].tiles[0];
    assert_eq!((last.geometry.x_start, last.geometry.x_end), (1, 4));
    assert_eq!((last.continuous.start, last.continuous.end), (true, false));
}

#[test]
fn event_starting_before_range_is_anchored_at_range_start() {
    // Friday Feb 27 to Tuesday Mar 3; the grid starts Sunday Mar 1.
    let events = vec![ev(1, at(2, 27, 10), at(3, 3, 10))];

    let layout = tiler(5).layout(&events, march());

    let tile = &layout[&d(3, 1)].tiles[0];
    assert_eq!((tile.geometry.x_start, tile.geometry.x_end), (1, 4));
    assert!(tile.continuous.start);
    assert!(!tile.continuous.end);
}

#[test]
fn event_running_past_range_stops_at_last_week() {
    // Friday Apr 3 to Apr 10; the grid ends Saturday Apr 4.
    let events = vec![ev(1, at(4, 3, 9), at(4, 10, 9))];

    let layout = tiler(5).layout(&events, march());

    assert_eq!(total_tiles(&layout), 1);
    let tile = &layout[&d(3, 29)].tiles[0];
    assert_eq!((tile.geometry.x_start, tile.geometry.x_end), (6, 8));
    assert!(!tile.continuous.start);
    assert!(tile.continuous.end);
}

#[test]
fn range_ending_mid_week_clamps_last_segment() {
    // Grid Mar 1 .. Wednesday Mar 11; event Monday Mar 9 to Friday Mar 20.
    let range = MonthRange::new(d(3, 1), d(3, 12)).unwrap();
    let events = vec![ev(1, at(3, 9, 9), at(3, 20, 9))];

    let layout = tiler(5).layout(&events, range);

    assert_eq!(total_tiles(&layout), 1);
    let tile = &layout[&d(3, 8)].tiles[0];
    assert_eq!((tile.geometry.x_start, tile.geometry.x_end), (2, 5));
    assert!(!tile.continuous.start);
    assert!(tile.continuous.end);
}

// ── Week buckets ────────────────────────────────────────────────────────────

#[test]
fn every_visible_week_has_a_row() {
    let events: Vec<Event> = Vec::new();

    let layout = tiler(5).layout(&events, march());

    let weeks: Vec<NaiveDate> = layout.keys().copied().collect();
    assert_eq!(weeks, vec![d(3, 1), d(3, 8), d(3, 15), d(3, 22), d(3, 29)]);
    let numbers: Vec<u32> = layout.values().map(|row| row.week_number).collect();
    assert_eq!(numbers, vec![10, 11, 12, 13, 14]);
    assert!(layout.values().all(|row| row.tiles.is_empty()));
}

#[test]
fn events_outside_range_are_ignored() {
    let events = vec![
        ev(1, at(2, 10, 9), at(2, 10, 10)),
        ev(2, at(4, 20, 9), at(4, 20, 10)),
    ];

    let layout = tiler(5).layout(&events, march());

    assert_eq!(total_tiles(&layout), 0);
}

// ── Row ordering and capacity ───────────────────────────────────────────────

#[test]
fn per_date_cap_drops_extra_events() {
    let events: Vec<Event> = (1..=4u32)
        .map(|i| ev(i64::from(i), at(3, 10, 8 + i), at(3, 10, 9 + i)))
        .collect();

    let layout = tiler(2).layout(&events, march());

    assert_eq!(total_tiles(&layout), 2);
    assert_eq!(
        ids_in_week(&layout, d(3, 8)),
        vec![EventId::Number(1), EventId::Number(2)]
    );
}

#[test]
fn shorter_events_take_earlier_rows() {
    let events = vec![
        ev(1, at(3, 10, 9), at(3, 12, 17)),
        ev(2, at(3, 10, 9), at(3, 10, 10)),
    ];

    let layout = tiler(5).layout(&events, march());

    assert_eq!(
        ids_in_week(&layout, d(3, 8)),
        vec![EventId::Number(2), EventId::Number(1)]
    );
}

#[test]
fn explicit_priority_breaks_duration_ties() {
    let events = vec![
        ev(1, at(3, 10, 9), at(3, 10, 10)),
        ev(2, at(3, 10, 11), at(3, 10, 12)).with_priority(5),
    ];

    let layout = tiler(5).layout(&events, march());

    assert_eq!(
        ids_in_week(&layout, d(3, 8)),
        vec![EventId::Number(2), EventId::Number(1)]
    );
}

#[test]
fn events_skipped_by_a_long_bar_are_placed_next_pass() {
    // With one row per date: A (Mon-Thu) is placed first on Monday and the
    // walk jumps past Tuesday. B also starts Monday and is over capacity.
    // C on Tuesday must still be placed on the following pass.
    let events = vec![
        ev(1, at(3, 2, 9), at(3, 5, 9)),
        ev(2, at(3, 2, 9), at(3, 6, 9)),
        ev(3, at(3, 3, 9), at(3, 3, 10)),
    ];

    let layout = tiler(1).layout(&events, march());

    assert_eq!(
        ids_in_week(&layout, d(3, 1)),
        vec![EventId::Number(1), EventId::Number(3)]
    );
    let a = &layout[&d(3, 1)].tiles[0];
    assert_eq!((a.geometry.x_start, a.geometry.x_end), (2, 6));
}

#[test]
fn tile_ids_are_unique() {
    let events = vec![
        ev(1, at(3, 5, 10), at(3, 17, 12)),
        ev(2, at(3, 10, 9), at(3, 10, 10)),
        ev(3, at(3, 24, 9), at(3, 26, 10)),
    ];

    let layout = tiler(5).layout(&events, march());

    let mut ids: Vec<usize> = layout
        .values()
        .flat_map(|row| row.tiles.iter().map(|t| t.id))
        .collect();
    let count = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), count);
    assert_eq!(count, 5);
}

// ── Month helpers ───────────────────────────────────────────────────────────

#[test]
fn sibling_month_events_follow_config() {
    // Thursday Apr 2 is visible in the March grid but outside March itself.
    let events = vec![ev(1, at(4, 2, 9), at(4, 2, 10))];
    let t = tiler(5);

    let with_siblings = t.layout_month(&events, 2026, 3, true).unwrap();
    let without = t.layout_month(&events, 2026, 3, false).unwrap();

    assert_eq!(total_tiles(&with_siblings), 1);
    assert_eq!(total_tiles(&without), 0);
    assert_eq!(with_siblings.len(), without.len());
}

#[test]
fn invalid_range_and_month_are_rejected() {
    assert!(matches!(
        MonthRange::new(d(3, 8), d(3, 1)),
        Err(TilerError::InvalidRange { .. })
    ));
    assert!(matches!(
        tiler(5).layout_month(&Vec::<Event>::new(), 2026, 0, true),
        Err(TilerError::InvalidMonth { .. })
    ));
}
