//! View configuration: validated scalars, defaults and three-tier resolution.
//!
//! A [`CalendarConfig`] mirrors the JSON shape the front end sends: global
//! overrides under `config`, locale options under `locale`, and per-view
//! overrides under `views`. Each option resolves as
//! `view override → global override → view default`.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::day::DayTilerConfig;
use crate::error::{Result, TilerError};
use crate::month::MonthTilerConfig;
use crate::time::{TimeUtils, WeekStart, MINUTES_IN_DAY};

/// Pick the first present value, falling back to `default`.
pub fn resolve<T>(view: Option<T>, global: Option<T>, default: T) -> T {
    view.or(global).unwrap_or(default)
}

/// Length of one day-view slot in minutes. Always divides a day evenly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SlotDuration(u32);

impl SlotDuration {
    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for SlotDuration {
    type Error = TilerError;

    fn try_from(minutes: u32) -> Result<Self> {
        if minutes == 0 || minutes > MINUTES_IN_DAY || MINUTES_IN_DAY % minutes != 0 {
            return Err(TilerError::InvalidSlotDuration(minutes));
        }
        Ok(Self(minutes))
    }
}

impl From<SlotDuration> for u32 {
    fn from(d: SlotDuration) -> u32 {
        d.0
    }
}

/// Cap on concurrent events (day columns, or month rows per date).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct MaxPerSlot(u32);

impl MaxPerSlot {
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u32> for MaxPerSlot {
    type Error = TilerError;

    fn try_from(n: u32) -> Result<Self> {
        if n == 0 {
            return Err(TilerError::InvalidMaxPerSlot(n));
        }
        Ok(Self(n))
    }
}

impl From<MaxPerSlot> for u32 {
    fn from(m: MaxPerSlot) -> u32 {
        m.0
    }
}

// ---------------------------------------------------------------------------
// Partial (user-supplied) configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommonOverrides {
    pub slot_duration: Option<SlotDuration>,
    pub max_events_per_slot: Option<MaxPerSlot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocaleOptions {
    pub week_starts_on: Option<WeekStart>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DayOverrides {
    pub slot_duration: Option<SlotDuration>,
    pub max_events_per_slot: Option<MaxPerSlot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeekOverrides {
    pub slot_duration: Option<SlotDuration>,
    pub max_events_per_slot: Option<MaxPerSlot>,
    pub show_days: Option<Vec<Weekday>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonthOverrides {
    pub max_events_per_slot: Option<MaxPerSlot>,
    pub show_sibling_month_dates_events: Option<bool>,
}

/// `groupBy` names a key of each event's `data`; events without it land in
/// the `"default"` group. `groupOrder` lists group ids to render first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupOverrides {
    pub slot_duration: Option<SlotDuration>,
    pub max_events_per_slot: Option<MaxPerSlot>,
    pub group_by: Option<String>,
    pub group_order: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOverrides {
    pub day: DayOverrides,
    pub week: WeekOverrides,
    pub month: MonthOverrides,
    pub group: GroupOverrides,
}

/// User-supplied calendar configuration; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub config: CommonOverrides,
    pub locale: LocaleOptions,
    pub views: ViewOverrides,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayViewConfig {
    pub slot_duration: SlotDuration,
    pub max_events_per_slot: MaxPerSlot,
}

impl Default for DayViewConfig {
    fn default() -> Self {
        Self {
            slot_duration: SlotDuration(30),
            max_events_per_slot: MaxPerSlot(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekViewConfig {
    pub slot_duration: SlotDuration,
    pub max_events_per_slot: MaxPerSlot,
    pub show_days: Vec<Weekday>,
}

impl Default for WeekViewConfig {
    fn default() -> Self {
        Self {
            slot_duration: SlotDuration(30),
            max_events_per_slot: MaxPerSlot(30),
            show_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthViewConfig {
    pub max_events_per_slot: MaxPerSlot,
    pub show_sibling_month_dates_events: bool,
}

impl Default for MonthViewConfig {
    fn default() -> Self {
        Self {
            max_events_per_slot: MaxPerSlot(10),
            show_sibling_month_dates_events: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupViewConfig {
    pub slot_duration: SlotDuration,
    pub max_events_per_slot: MaxPerSlot,
    pub group_by: Option<String>,
    pub group_order: Vec<String>,
}

impl Default for GroupViewConfig {
    fn default() -> Self {
        Self {
            slot_duration: SlotDuration(30),
            max_events_per_slot: MaxPerSlot(30),
            group_by: None,
            group_order: Vec::new(),
        }
    }
}

impl CalendarConfig {
    /// Parse a JSON config document. Invalid scalars are rejected here.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn time_utils(&self) -> TimeUtils {
        TimeUtils::new(self.locale.week_starts_on.unwrap_or_default())
    }

    pub fn day(&self) -> DayViewConfig {
        let defaults = DayViewConfig::default();
        let view = &self.views.day;
        DayViewConfig {
            slot_duration: resolve(
                view.slot_duration,
                self.config.slot_duration,
                defaults.slot_duration,
            ),
            max_events_per_slot: resolve(
                view.max_events_per_slot,
                self.config.max_events_per_slot,
                defaults.max_events_per_slot,
            ),
        }
    }

    pub fn week(&self) -> WeekViewConfig {
        let defaults = WeekViewConfig::default();
        let view = &self.views.week;
        WeekViewConfig {
            slot_duration: resolve(
                view.slot_duration,
                self.config.slot_duration,
                defaults.slot_duration,
            ),
            max_events_per_slot: resolve(
                view.max_events_per_slot,
                self.config.max_events_per_slot,
                defaults.max_events_per_slot,
            ),
            // No global override exists for the visible days.
            show_days: resolve(view.show_days.clone(), None, defaults.show_days),
        }
    }

    pub fn month(&self) -> MonthViewConfig {
        let defaults = MonthViewConfig::default();
        let view = &self.views.month;
        MonthViewConfig {
            max_events_per_slot: resolve(
                view.max_events_per_slot,
                self.config.max_events_per_slot,
                defaults.max_events_per_slot,
            ),
            show_sibling_month_dates_events: resolve(
                view.show_sibling_month_dates_events,
                None,
                defaults.show_sibling_month_dates_events,
            ),
        }
    }

    pub fn group(&self) -> GroupViewConfig {
        let defaults = GroupViewConfig::default();
        let view = &self.views.group;
        GroupViewConfig {
            slot_duration: resolve(
                view.slot_duration,
                self.config.slot_duration,
                defaults.slot_duration,
            ),
            max_events_per_slot: resolve(
                view.max_events_per_slot,
                self.config.max_events_per_slot,
                defaults.max_events_per_slot,
            ),
            group_by: resolve(view.group_by.clone().map(Some), None, defaults.group_by),
            group_order: resolve(view.group_order.clone(), None, defaults.group_order),
        }
    }
}

impl DayViewConfig {
    pub fn tiler_config(&self) -> DayTilerConfig {
        DayTilerConfig {
            max_per_slot: self.max_events_per_slot,
            slot_duration: self.slot_duration,
        }
    }
}

impl WeekViewConfig {
    pub fn tiler_config(&self) -> DayTilerConfig {
        DayTilerConfig {
            max_per_slot: self.max_events_per_slot,
            slot_duration: self.slot_duration,
        }
    }
}

impl GroupViewConfig {
    pub fn tiler_config(&self) -> DayTilerConfig {
        DayTilerConfig {
            max_per_slot: self.max_events_per_slot,
            slot_duration: self.slot_duration,
        }
    }
}

impl MonthViewConfig {
    pub fn tiler_config(&self) -> MonthTilerConfig {
        MonthTilerConfig {
            max_per_slot: self.max_events_per_slot,
        }
    }
}
