//! Time-grid layout for a single day.
//!
//! Events are converted to slot rows, greedily packed into columns, linked
//! into an adjacency graph as they are placed, and finally given horizontal
//! offsets and widths by walking the longest chains of that graph.
//!
//! Events with no visible height, and events that would open more than
//! `max_per_slot` concurrent columns, are left out of the result.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use log::{debug, trace};
use serde::Serialize;

use crate::config::{MaxPerSlot, SlotDuration};
use crate::error::Result;
use crate::event::{Continuity, TimedEvent};
use crate::graph::{Graph, LongestPaths};
use crate::time::{TimeUtils, MINUTES_IN_DAY};

/// Resolved options for the day tiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTilerConfig {
    /// Maximum number of side-by-side columns.
    pub max_per_slot: MaxPerSlot,
    pub slot_duration: SlotDuration,
}

impl DayTilerConfig {
    /// Validate raw scalars.
    ///
    /// # Errors
    /// Returns `TilerError::InvalidMaxPerSlot` for zero, and
    /// `TilerError::InvalidSlotDuration` for durations that do not divide a day.
    pub fn new(max_per_slot: u32, slot_duration_minutes: u32) -> Result<Self> {
        Ok(Self {
            max_per_slot: MaxPerSlot::try_from(max_per_slot)?,
            slot_duration: SlotDuration::try_from(slot_duration_minutes)?,
        })
    }
}

/// Horizontal span is normalized to the lane width; vertical span is in slots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayGeometry {
    pub x_offset: f64,
    pub width: f64,
    pub y_start: u32,
    pub y_end: u32,
}

/// A positioned event within one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTile<'a, E> {
    /// One-based position of the event in the input slice.
    pub id: usize,
    pub event: &'a E,
    pub continuous: Continuity,
    pub column_index: usize,
    pub geometry: DayGeometry,
}

/// One group's independent time grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup<'a, G, E> {
    pub id: G,
    pub tiles: Vec<DayTile<'a, E>>,
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Start,
    End,
}

#[derive(Debug)]
struct Draft {
    id: usize,
    index: usize,
    starts_at: NaiveDateTime,
    ends_at: NaiveDateTime,
    continuous: Continuity,
    y_start: u32,
    y_end: u32,
}

#[derive(Debug)]
struct Column {
    bottom_end: NaiveDateTime,
    last_tile: usize,
}

#[derive(Debug)]
struct Placed {
    draft: Draft,
    column: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct DayTiler {
    config: DayTilerConfig,
    time: TimeUtils,
}

impl DayTiler {
    pub fn new(config: DayTilerConfig, time: TimeUtils) -> Self {
        Self { config, time }
    }

    /// Lay out `events` on the time grid of `date`.
    ///
    /// Returned tiles are in column-placement order.
    ///
    /// # Errors
    /// Only fails if the resolver detects a cycle, which column assignment
    /// never produces.
    pub fn layout<'a, E: TimedEvent>(
        &self,
        events: &'a [E],
        date: NaiveDate,
    ) -> Result<Vec<DayTile<'a, E>>> {
        self.layout_subset(events, 0..events.len(), date)
    }

    /// Split `events` by `selector` and lay out each group on its own grid.
    ///
    /// Groups come back in order of first appearance; tile ids stay the
    /// event's position in the full input. Use [`order_groups`] to reorder.
    pub fn layout_groups<'a, E, G, F>(
        &self,
        events: &'a [E],
        date: NaiveDate,
        selector: F,
    ) -> Result<Vec<DayGroup<'a, G, E>>>
    where
        E: TimedEvent,
        G: PartialEq,
        F: Fn(&E) -> G,
    {
        let mut members: Vec<(G, Vec<usize>)> = Vec::new();
        for (index, event) in events.iter().enumerate() {
            let key = selector(event);
            match members.iter_mut().find(|(id, _)| *id == key) {
                Some((_, indices)) => indices.push(index),
                None => members.push((key, vec![index])),
            }
        }

        let mut groups = Vec::with_capacity(members.len());
        for (id, indices) in members {
            let tiles = self.layout_subset(events, indices, date)?;
            groups.push(DayGroup { id, tiles });
        }
        Ok(groups)
    }

    fn layout_subset<'a, E: TimedEvent>(
        &self,
        events: &'a [E],
        indices: impl IntoIterator<Item = usize>,
        date: NaiveDate,
    ) -> Result<Vec<DayTile<'a, E>>> {
        let day_start = self.time.start_of_day(date);
        let day_end = self.time.end_of_day(date);

        let mut drafts = self.create_drafts(events, indices, day_start, day_end);
        sort_drafts(&mut drafts);
        let visible = drafts.len();

        let (placed, graph) = self.assign_columns(drafts);
        let (offsets, widths) = allocate_widths(&graph)?;

        trace!(
            "day layout {}: {} of {} visible events placed",
            date,
            placed.len(),
            visible
        );

        Ok(placed
            .into_iter()
            .enumerate()
            .map(|(node, p)| DayTile {
                id: p.draft.id,
                event: &events[p.draft.index],
                continuous: p.draft.continuous,
                column_index: p.column,
                geometry: DayGeometry {
                    x_offset: offsets[node],
                    width: widths[node],
                    y_start: p.draft.y_start,
                    y_end: p.draft.y_end,
                },
            })
            .collect())
    }

    /// Lay out each visible day of the week containing `anchor`.
    ///
    /// Every day is an independent pass, so tile ids are unique per date.
    pub fn layout_week<'a, E: TimedEvent>(
        &self,
        events: &'a [E],
        anchor: NaiveDate,
        show_days: &[Weekday],
    ) -> Result<BTreeMap<NaiveDate, Vec<DayTile<'a, E>>>> {
        let first = self.time.start_of_week(anchor);
        let last = self.time.end_of_week(anchor);

        let mut days = BTreeMap::new();
        for date in self.time.each_day_of_interval(first, last) {
            if !show_days.contains(&date.weekday()) {
                continue;
            }
            days.insert(date, self.layout(events, date)?);
        }
        Ok(days)
    }

    fn create_drafts<E: TimedEvent>(
        &self,
        events: &[E],
        indices: impl IntoIterator<Item = usize>,
        day_start: NaiveDateTime,
        day_end: NaiveDateTime,
    ) -> Vec<Draft> {
        indices
            .into_iter()
            .filter_map(|index| {
                let event = &events[index];
                let starts_at = event.starts_at();
                let ends_at = event.ends_at();
                let draft = Draft {
                    id: index + 1,
                    index,
                    starts_at,
                    ends_at,
                    continuous: Continuity {
                        start: self.time.is_before(starts_at, day_start),
                        end: self.time.is_after(ends_at, day_end),
                    },
                    y_start: self.slot_offset(day_start, starts_at, Bound::Start),
                    y_end: self.slot_offset(day_start, ends_at, Bound::End),
                };
                if draft.y_start == draft.y_end {
                    debug!("tile {} dropped: no visible height", draft.id);
                    return None;
                }
                Some(draft)
            })
            .collect()
    }

    fn slot_offset(&self, day_start: NaiveDateTime, time: NaiveDateTime, bound: Bound) -> u32 {
        let minutes = self
            .time
            .minutes_between(day_start, time)
            .clamp(0.0, MINUTES_IN_DAY as f64);
        let offset = minutes / self.config.slot_duration.minutes() as f64;
        match bound {
            Bound::Start => offset.floor() as u32,
            Bound::End => offset.ceil() as u32,
        }
    }

    /// Greedy column packing. Graph node `n` is `placed[n]`.
    fn assign_columns(&self, drafts: Vec<Draft>) -> (Vec<Placed>, Graph) {
        let mut columns: Vec<Column> = Vec::new();
        let mut graph = Graph::new();
        let mut placed = Vec::with_capacity(drafts.len());

        for draft in drafts {
            let column = columns
                .iter()
                .position(|c| c.bottom_end <= draft.starts_at)
                .unwrap_or(columns.len());

            if column + 1 > self.config.max_per_slot.get() {
                debug!("tile {} dropped: all {} columns busy", draft.id, column);
                continue;
            }

            let node = graph.add_node();
            match columns.get_mut(column) {
                Some(c) => {
                    c.bottom_end = draft.ends_at;
                    c.last_tile = node;
                }
                None => columns.push(Column {
                    bottom_end: draft.ends_at,
                    last_tile: node,
                }),
            }

            // The last tile in the column to the left precedes this one.
            let predecessor = column.checked_sub(1).map(|c| columns[c].last_tile);
            if let Some(p) = predecessor {
                graph.link(p, node);
            }

            // The first still-running column to the right blocks this tile;
            // the new tile now sits between it and the predecessor.
            if let Some(blocking) = columns[column + 1..]
                .iter()
                .find(|c| c.bottom_end > draft.starts_at)
            {
                graph.link(node, blocking.last_tile);
                if let Some(p) = predecessor {
                    graph.unlink(p, blocking.last_tile);
                }
            }

            placed.push(Placed { draft, column });
        }

        (placed, graph)
    }
}

/// Move groups named in `order` to the front, in that order; the rest keep
/// their relative order.
pub fn order_groups<G: PartialEq, E>(groups: &mut [DayGroup<'_, G, E>], order: &[G]) {
    groups.sort_by_key(|g| {
        order
            .iter()
            .position(|id| *id == g.id)
            .unwrap_or(order.len())
    });
}

/// Start row ascending; longer tiles first on ties. Stable.
fn sort_drafts(drafts: &mut [Draft]) {
    drafts.sort_by(|a, b| a.y_start.cmp(&b.y_start).then(b.y_end.cmp(&a.y_end)));
}

/// Assign `(x_offset, width)` to every node by walking spines longest first.
fn allocate_widths(graph: &Graph) -> Result<(Vec<f64>, Vec<f64>)> {
    if graph.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }
    let spines = LongestPaths::crawl(graph)?.spines();

    let mut offsets: Vec<Option<f64>> = vec![None; graph.len()];
    let mut widths: Vec<Option<f64>> = vec![None; graph.len()];

    for spine in &spines {
        for (idx, &node) in spine.iter().enumerate() {
            if widths[node].is_some() {
                continue;
            }
            let offset = match idx.checked_sub(1).map(|i| spine[i]) {
                Some(prev) => offsets[prev].unwrap_or(0.0) + widths[prev].unwrap_or(0.0),
                None => 0.0,
            };
            offsets[node] = Some(offset);
            widths[node] = Some(tile_width(spine, idx, offset, &offsets, &widths));
        }
    }

    Ok((
        offsets.into_iter().map(|o| o.unwrap_or(0.0)).collect(),
        widths.into_iter().map(|w| w.unwrap_or(1.0)).collect(),
    ))
}

fn tile_width(
    spine: &[usize],
    idx: usize,
    offset: f64,
    offsets: &[Option<f64>],
    widths: &[Option<f64>],
) -> f64 {
    // A later tile already anchored: share the gap up to it evenly.
    for (i, &later) in spine.iter().enumerate().skip(idx + 1) {
        if let Some(later_offset) = offsets[later] {
            return (later_offset - offset) / (i - idx) as f64;
        }
    }

    let mut unset = 0usize;
    let mut occupied = 0.0;
    for &node in spine {
        match widths[node] {
            Some(w) => occupied += w,
            None => unset += 1,
        }
    }
    (1.0 - occupied) / unset.max(1) as f64
}
