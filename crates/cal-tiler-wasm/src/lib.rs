//! WASM bindings for cal-tiler.
//!
//! Exposes day, week, group and month layout to the JavaScript calendar front end via
//! `wasm-bindgen`. Events, configs and layouts cross the boundary as JSON
//! strings; output field names are camelCase to match the front end.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p cal-tiler-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/cal-tiler-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/cal_tiler_wasm.wasm
//! ```

use std::collections::BTreeMap;

use cal_tiler::{
    order_groups, CalendarConfig, Continuity, DayTile, DayTiler, Event, EventId, MonthLayout,
    MonthTiler, TimeUtils,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// Input format for events passed from JavaScript.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventInput {
    id: EventId,
    starts_at: String,
    ends_at: String,
    #[serde(default)]
    priority: Option<i32>,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DayTileDto {
    id: usize,
    event_id: EventId,
    continuous: Continuity,
    column_index: usize,
    x_offset: f64,
    width: f64,
    y_start: u32,
    y_end: u32,
}

impl From<&DayTile<'_, Event>> for DayTileDto {
    fn from(t: &DayTile<'_, Event>) -> Self {
        Self {
            id: t.id,
            event_id: t.event.id.clone(),
            continuous: t.continuous,
            column_index: t.column_index,
            x_offset: t.geometry.x_offset,
            width: t.geometry.width,
            y_start: t.geometry.y_start,
            y_end: t.geometry.y_end,
        }
    }
}

#[derive(Serialize)]
struct GroupDto {
    id: String,
    tiles: Vec<DayTileDto>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MonthTileDto {
    id: usize,
    event_id: EventId,
    continuous: Continuity,
    x_start: u32,
    x_end: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WeekRowDto {
    week_number: u32,
    tiles: Vec<MonthTileDto>,
}

fn month_dto(layout: &MonthLayout<'_, Event>, time: &TimeUtils) -> BTreeMap<String, WeekRowDto> {
    layout
        .iter()
        .map(|(week, row)| {
            let tiles = row
                .tiles
                .iter()
                .map(|t| MonthTileDto {
                    id: t.id,
                    event_id: t.event.id.clone(),
                    continuous: t.continuous,
                    x_start: t.geometry.x_start,
                    x_end: t.geometry.x_end,
                })
                .collect();
            (
                time.format_date_key(*week),
                WeekRowDto {
                    week_number: row.week_number,
                    tiles,
                },
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Helpers: parse inputs
// ---------------------------------------------------------------------------

/// Parse an ISO 8601 datetime string into a local wall-clock instant.
///
/// Accepts both RFC 3339 (with offset, e.g., "2026-03-16T09:00:00+01:00"),
/// whose local time is kept as written, and naive local time
/// (e.g., "2026-03-16T09:00:00").
fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date '{}': {}", s, e))
}

/// Parse `YYYY-MM` into a year and month.
fn parse_month(s: &str) -> Result<(i32, u32), String> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .map_err(|e| format!("Invalid month '{}': {}", s, e))?;
    Ok((first.year(), first.month()))
}

/// Convert a JSON array of `{id, startsAt, endsAt, priority?, data?}` objects into events.
fn parse_events_json(json: &str) -> Result<Vec<Event>, String> {
    let inputs: Vec<EventInput> =
        serde_json::from_str(json).map_err(|e| format!("Invalid events JSON: {}", e))?;

    inputs
        .into_iter()
        .map(|input| {
            let mut event = Event::new(
                input.id,
                parse_datetime(&input.starts_at)?,
                parse_datetime(&input.ends_at)?,
            );
            event.priority = input.priority;
            event.data = input.data;
            event.validate().map_err(|e| e.to_string())?;
            Ok(event)
        })
        .collect()
}

fn parse_config(json: Option<&str>) -> Result<CalendarConfig, String> {
    match json {
        Some(json) => CalendarConfig::from_json(json).map_err(|e| e.to_string()),
        None => Ok(CalendarConfig::default()),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// Layout entry points (JsValue-free so they run under `cargo test`)
// ---------------------------------------------------------------------------

fn layout_day_json(
    events_json: &str,
    date: &str,
    config_json: Option<&str>,
) -> Result<String, String> {
    let events = parse_events_json(events_json)?;
    let date = parse_date(date)?;
    let config = parse_config(config_json)?;

    let tiler = DayTiler::new(config.day().tiler_config(), config.time_utils());
    let tiles = tiler.layout(&events, date).map_err(|e| e.to_string())?;

    let dtos: Vec<DayTileDto> = tiles.iter().map(DayTileDto::from).collect();
    to_json(&dtos)
}

fn layout_week_json(
    events_json: &str,
    date: &str,
    config_json: Option<&str>,
) -> Result<String, String> {
    let events = parse_events_json(events_json)?;
    let date = parse_date(date)?;
    let config = parse_config(config_json)?;
    let view = config.week();

    let time = config.time_utils();

    let tiler = DayTiler::new(view.tiler_config(), time);
    let days = tiler
        .layout_week(&events, date, &view.show_days)
        .map_err(|e| e.to_string())?;

    let dtos: BTreeMap<String, Vec<DayTileDto>> = days
        .iter()
        .map(|(day, tiles)| {
            (
                time.format_date_key(*day),
                tiles.iter().map(DayTileDto::from).collect(),
            )
        })
        .collect();
    to_json(&dtos)
}

fn layout_group_json(
    events_json: &str,
    date: &str,
    config_json: Option<&str>,
) -> Result<String, String> {
    let events = parse_events_json(events_json)?;
    let date = parse_date(date)?;
    let config = parse_config(config_json)?;
    let view = config.group();

    let tiler = DayTiler::new(view.tiler_config(), config.time_utils());
    let mut groups = tiler
        .layout_groups(&events, date, |e| e.group_key(view.group_by.as_deref()))
        .map_err(|e| e.to_string())?;
    order_groups(&mut groups, &view.group_order);

    let dtos: Vec<GroupDto> = groups
        .into_iter()
        .map(|g| GroupDto {
            id: g.id,
            tiles: g.tiles.iter().map(DayTileDto::from).collect(),
        })
        .collect();
    to_json(&dtos)
}

fn layout_month_json(
    events_json: &str,
    month: &str,
    config_json: Option<&str>,
) -> Result<String, String> {
    let events = parse_events_json(events_json)?;
    let (year, month) = parse_month(month)?;
    let config = parse_config(config_json)?;
    let view = config.month();

    let time = config.time_utils();

    let tiler = MonthTiler::new(view.tiler_config(), time);
    let layout = tiler
        .layout_month(&events, year, month, view.show_sibling_month_dates_events)
        .map_err(|e| e.to_string())?;

    to_json(&month_dto(&layout, &time))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Lay out one day's time grid.
///
/// Returns a JSON array of tiles with `id`, `eventId`, `continuous`,
/// `columnIndex`, `xOffset`, `width`, `yStart` and `yEnd`.
///
/// # Arguments
/// - `events_json` -- JSON array of `{id, startsAt, endsAt, priority?, data?}`
/// - `date` -- Day to render (e.g., "2026-03-16")
/// - `config_json` -- Optional calendar config JSON
#[wasm_bindgen(js_name = "layoutDay")]
pub fn layout_day(
    events_json: &str,
    date: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    layout_day_json(events_json, date, config_json.as_deref()).map_err(|e| JsValue::from_str(&e))
}

/// Lay out every visible day of the week containing `date`.
///
/// Returns a JSON object keyed by `yyyy-MM-dd`, each value an array of day
/// tiles as returned by `layoutDay`.
#[wasm_bindgen(js_name = "layoutWeek")]
pub fn layout_week(
    events_json: &str,
    date: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    layout_week_json(events_json, date, config_json.as_deref()).map_err(|e| JsValue::from_str(&e))
}

/// Lay out one day with each group of events on its own time grid.
///
/// Events are grouped by the `views.group.groupBy` key of their `data`.
/// Returns a JSON array of `{id, tiles}`, ordered by `views.group.groupOrder`
/// and then by first appearance.
#[wasm_bindgen(js_name = "layoutGroup")]
pub fn layout_group(
    events_json: &str,
    date: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    layout_group_json(events_json, date, config_json.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}

/// Lay out the month grid covering `month` (e.g., "2026-03").
///
/// Returns a JSON object keyed by each week's first date, each value
/// `{weekNumber, tiles}` with tiles carrying `xStart`/`xEnd` grid columns.
#[wasm_bindgen(js_name = "layoutMonth")]
pub fn layout_month(
    events_json: &str,
    month: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    layout_month_json(events_json, month, config_json.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}
