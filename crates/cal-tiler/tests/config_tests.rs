//! Tests for JSON configuration loading and three-tier resolution.

use cal_tiler::config::{CalendarConfig, MaxPerSlot, SlotDuration};
use cal_tiler::time::WeekStart;
use cal_tiler::TilerError;
use chrono::Weekday;

#[test]
fn empty_document_resolves_to_defaults() {
    let config = CalendarConfig::from_json("{}").unwrap();

    let day = config.day();
    assert_eq!(day.slot_duration.minutes(), 30);
    assert_eq!(day.max_events_per_slot.get(), 30);

    let week = config.week();
    assert_eq!(week.show_days.len(), 7);

    let month = config.month();
    assert_eq!(month.max_events_per_slot.get(), 10);
    assert!(month.show_sibling_month_dates_events);

    assert_eq!(config.time_utils().week_start(), WeekStart::Sunday);
}

#[test]
fn global_override_applies_to_every_view() {
    let config = CalendarConfig::from_json(r#"{"config": {"maxEventsPerSlot": 4}}"#).unwrap();

    assert_eq!(config.day().max_events_per_slot.get(), 4);
    assert_eq!(config.week().max_events_per_slot.get(), 4);
    assert_eq!(config.month().max_events_per_slot.get(), 4);
}

#[test]
fn view_override_beats_global() {
    let json = r#"{
        "config": {"slotDuration": 15, "maxEventsPerSlot": 4},
        "views": {
            "day": {"slotDuration": 60},
            "month": {"maxEventsPerSlot": 2, "showSiblingMonthDatesEvents": false}
        }
    }"#;
    let config = CalendarConfig::from_json(json).unwrap();

    assert_eq!(config.day().slot_duration.minutes(), 60);
    assert_eq!(config.day().max_events_per_slot.get(), 4);
    assert_eq!(config.week().slot_duration.minutes(), 15);
    assert_eq!(config.month().max_events_per_slot.get(), 2);
    assert!(!config.month().show_sibling_month_dates_events);
}

#[test]
fn group_view_resolves_its_own_options() {
    let defaults = CalendarConfig::default().group();
    assert_eq!(defaults.slot_duration.minutes(), 30);
    assert_eq!(defaults.max_events_per_slot.get(), 30);
    assert_eq!(defaults.group_by, None);
    assert!(defaults.group_order.is_empty());

    let json = r#"{
        "config": {"slotDuration": 15, "maxEventsPerSlot": 4},
        "views": {"group": {"maxEventsPerSlot": 2, "groupBy": "room", "groupOrder": ["B", "A"]}}
    }"#;
    let group = CalendarConfig::from_json(json).unwrap().group();

    assert_eq!(group.slot_duration.minutes(), 15);
    assert_eq!(group.max_events_per_slot.get(), 2);
    assert_eq!(group.group_by.as_deref(), Some("room"));
    assert_eq!(group.group_order, vec!["B", "A"]);
    assert_eq!(group.tiler_config().max_per_slot.get(), 2);
}

#[test]
fn week_start_and_visible_days_parse() {
    let json = r#"{
        "locale": {"weekStartsOn": "monday"},
        "views": {"week": {"showDays": ["Mon", "Tue", "Wed", "Thu", "Fri"]}}
    }"#;
    let config = CalendarConfig::from_json(json).unwrap();

    assert_eq!(config.time_utils().week_start(), WeekStart::Monday);
    assert_eq!(
        config.week().show_days,
        vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri
        ]
    );
}

#[test]
fn resolved_views_feed_tiler_configs() {
    let config =
        CalendarConfig::from_json(r#"{"config": {"slotDuration": 20, "maxEventsPerSlot": 3}}"#)
            .unwrap();

    let day = config.day().tiler_config();
    assert_eq!(day.slot_duration, SlotDuration::try_from(20).unwrap());
    assert_eq!(day.max_per_slot, MaxPerSlot::try_from(3).unwrap());

    let month = config.month().tiler_config();
    assert_eq!(month.max_per_slot.get(), 3);
}

// ── Validation ──────────────────────────────────────────────────────────────

#[test]
fn slot_duration_not_dividing_a_day_is_rejected() {
    let err = CalendarConfig::from_json(r#"{"config": {"slotDuration": 7}}"#).unwrap_err();
    assert!(matches!(err, TilerError::Config(_)));
    assert!(err.to_string().contains("slot duration"));
}

#[test]
fn zero_max_events_is_rejected() {
    let err =
        CalendarConfig::from_json(r#"{"views": {"day": {"maxEventsPerSlot": 0}}}"#).unwrap_err();
    assert!(matches!(err, TilerError::Config(_)));
}

#[test]
fn unknown_week_start_is_rejected() {
    let err = CalendarConfig::from_json(r#"{"locale": {"weekStartsOn": "friday"}}"#).unwrap_err();
    assert!(matches!(err, TilerError::Config(_)));
}

#[test]
fn malformed_json_is_rejected() {
    assert!(CalendarConfig::from_json("{not json").is_err());
}

#[test]
fn resolved_config_serializes_camel_case() {
    let config = CalendarConfig::from_json("{}").unwrap();
    let json = serde_json::to_value(config.month()).unwrap();
    assert_eq!(json["maxEventsPerSlot"], 10);
    assert_eq!(json["showSiblingMonthDatesEvents"], true);
}
