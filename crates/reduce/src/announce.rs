//! Announcement reduction: the newest row wins.

use sheetfeed_core::{Announcement, RawRow};

use crate::error::ParseError;
use crate::rows::AnnounceRow;

/// The most recent announcement. Rows append chronologically, so the last
/// row holds the current message; no rows means no announcement.
pub fn latest_announcement(rows: &[RawRow]) -> Result<Option<Announcement>, ParseError> {
    match rows.last() {
        Some(raw) => {
            let row = AnnounceRow::parse(rows.len() - 1, raw)?;
            Ok(Some(Announcement {
                message: row.message.to_string(),
            }))
        }
        None => Ok(None),
    }
}
