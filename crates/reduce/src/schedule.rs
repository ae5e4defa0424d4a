//! Competition schedule parsing: fixed-offset timestamps, chronological order.

use chrono::{DateTime, FixedOffset};
use sheetfeed_core::{RawRow, ScheduleEntry};

use crate::error::ParseError;
use crate::rows::CompetitionRow;

/// Calendar format of the combined date + time cells, e.g. `2/1/2025 10:00`.
const SCHEDULE_FORMAT: &str = "%d/%m/%Y %H:%M %z";

/// The sheet carries no zone marker; it is maintained in UTC+7.
const SCHEDULE_OFFSET: &str = "+0700";

fn parse_instant(index: usize, date: &str, time: &str) -> Result<DateTime<FixedOffset>, ParseError> {
    let text = format!("{date} {time}");
    DateTime::parse_from_str(&format!("{text} {SCHEDULE_OFFSET}"), SCHEDULE_FORMAT).map_err(
        |source| ParseError::Schedule {
            row: index,
            text,
            source,
        },
    )
}

/// Parse competition rows into schedule entries sorted ascending by
/// scheduled instant. The sort is stable: entries with equal instants keep
/// their source row order.
pub fn parse_schedule(rows: &[RawRow]) -> Result<Vec<ScheduleEntry>, ParseError> {
    let mut entries = Vec::with_capacity(rows.len());
    for (index, raw) in rows.iter().enumerate() {
        let row = CompetitionRow::parse(index, raw)?;
        entries.push(ScheduleEntry {
            schedule: parse_instant(index, row.date, row.time)?,
            game: row.game.to_string(),
            team_left: row.team_left.to_string(),
            team_right: row.team_right.to_string(),
            result: row.result.to_string(),
            stream: row.stream.map(String::from),
        });
    }
    entries.sort_by_key(|entry| entry.schedule);
    Ok(entries)
}
