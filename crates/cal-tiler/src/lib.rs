//! # cal-tiler
//!
//! Deterministic event tiling for calendar grids.
//!
//! Given already-materialized, already-localized events, the tilers compute
//! where each one is drawn: which column and what share of the lane width it
//! gets on a day's time grid, and which day columns it spans on each row of a
//! month grid. Layout degrades by omission: events with no visible extent, or
//! beyond the configured per-slot capacity, are left out rather than failing
//! the render.
//!
//! ## Modules
//!
//! - [`day`] — day, week and group time-grid layout (columns, offsets, widths)
//! - [`month`] — month grid layout with per-week splitting and a per-date cap
//! - [`graph`] — longest-path resolution over the day tiler's adjacency DAG
//! - [`time`] — calendar arithmetic with a configurable week start
//! - [`config`] — view options, defaults and three-tier resolution
//! - [`event`] — event input types
//! - [`error`] — Error types

pub mod config;
pub mod day;
pub mod error;
pub mod event;
pub mod graph;
pub mod month;
pub mod time;

pub use config::{resolve, CalendarConfig, GroupViewConfig, MaxPerSlot, SlotDuration};
pub use day::{order_groups, DayGeometry, DayGroup, DayTile, DayTiler, DayTilerConfig};
pub use error::TilerError;
pub use event::{Continuity, Event, EventId, TimedEvent};
pub use graph::{Graph, LongestPaths};
pub use month::{MonthGeometry, MonthLayout, MonthRange, MonthTile, MonthTiler, MonthTilerConfig, WeekRow};
pub use time::{TimeUtils, WeekStart};
