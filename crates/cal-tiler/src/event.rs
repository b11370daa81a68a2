//! Event input types shared by the day and month tilers.
//!
//! Tilers are generic over [`TimedEvent`], so callers can lay out their own
//! event structs directly. [`Event`] is the serde-friendly default used by the
//! CLI and WASM bindings.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TilerError};

/// Identity of an event as supplied by the caller (numeric or string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Number(n) => write!(f, "{}", n),
            EventId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for EventId {
    fn from(n: i64) -> Self {
        EventId::Number(n)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        EventId::Text(s.to_string())
    }
}

/// Anything with a local start and end instant can be tiled.
///
/// Callers must guarantee `starts_at() <= ends_at()`; layouts of events that
/// break this are unspecified.
pub trait TimedEvent {
    fn starts_at(&self) -> NaiveDateTime;
    fn ends_at(&self) -> NaiveDateTime;

    /// Optional explicit ordering hint. Higher values win ties in the month view.
    fn priority(&self) -> Option<i32> {
        None
    }
}

/// Group assigned to events without a group key.
pub const DEFAULT_GROUP: &str = "default";

/// A materialized, already-localized calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    /// Opaque payload handed through to the renderer untouched.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

impl Event {
    pub fn new(id: impl Into<EventId>, starts_at: NaiveDateTime, ends_at: NaiveDateTime) -> Self {
        Self {
            id: id.into(),
            starts_at,
            ends_at,
            priority: None,
            data: serde_json::Value::Null,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Group id read from `data[field]`; `"default"` when unset or not a
    /// string or number.
    pub fn group_key(&self, field: Option<&str>) -> String {
        match field.and_then(|f| self.data.get(f)) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => DEFAULT_GROUP.to_string(),
        }
    }

    /// Reject events whose end precedes their start.
    pub fn validate(&self) -> Result<()> {
        if self.ends_at < self.starts_at {
            return Err(TilerError::InvalidEvent {
                id: self.id.to_string(),
                reason: format!("ends at {} before it starts at {}", self.ends_at, self.starts_at),
            });
        }
        Ok(())
    }
}

impl TimedEvent for Event {
    fn starts_at(&self) -> NaiveDateTime {
        self.starts_at
    }

    fn ends_at(&self) -> NaiveDateTime {
        self.ends_at
    }

    fn priority(&self) -> Option<i32> {
        self.priority
    }
}

impl<T: TimedEvent + ?Sized> TimedEvent for &T {
    fn starts_at(&self) -> NaiveDateTime {
        (**self).starts_at()
    }

    fn ends_at(&self) -> NaiveDateTime {
        (**self).ends_at()
    }

    fn priority(&self) -> Option<i32> {
        (**self).priority()
    }
}

/// Whether an event's true boundaries lie outside the rendered unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Continuity {
    pub start: bool,
    pub end: bool,
}
