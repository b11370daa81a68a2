//! Error types for cal-tiler operations.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TilerError {
    #[error("Invalid slot duration: {0} minutes (must be 1..=1440 and divide 1440)")]
    InvalidSlotDuration(u32),

    #[error("Invalid max events per slot: {0} (must be at least 1)")]
    InvalidMaxPerSlot(u32),

    #[error("Invalid range: {start} .. {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    /// The longest-path resolver reached a node that is still being expanded.
    #[error("Adjacency graph contains a cycle through node {node}")]
    CyclicGraph { node: usize },

    #[error("Invalid event {id}: {reason}")]
    InvalidEvent { id: String, reason: String },

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TilerError>;
