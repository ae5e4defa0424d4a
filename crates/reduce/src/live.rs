//! Live-event selection over a sorted schedule.

use chrono::{DateTime, Utc};
use sheetfeed_core::ScheduleEntry;

/// Pick the entry to surface as "live".
///
/// Scans forward from the first entry scheduled at or after `now` and
/// returns the first of those carrying a stream link. When no upcoming
/// entry has a stream (or nothing is upcoming at all), falls back to the
/// most recent streamed entry so a just-finished event stays watchable.
/// Returns `None` only when no entry anywhere has a stream.
///
/// `entries` must already be sorted ascending, as `parse_schedule` yields.
pub fn select_live(entries: &[ScheduleEntry], now: DateTime<Utc>) -> Option<ScheduleEntry> {
    let streamed =
        |entry: &&ScheduleEntry| entry.stream.as_deref().is_some_and(|s| !s.is_empty());
    let upcoming = entries.iter().position(|entry| entry.schedule >= now);
    upcoming
        .and_then(|start| entries[start..].iter().find(streamed))
        .or_else(|| entries.iter().rev().find(streamed))
        .cloned()
}
