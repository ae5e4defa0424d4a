//! Typed views over raw rows. The source API drops trailing empty cells,
//! so optional columns may simply be missing from a row.

use sheetfeed_core::RawRow;

use crate::error::ParseError;

fn required(row: &RawRow, index: usize, cell: usize, expected: usize) -> Result<&str, ParseError> {
    row.get(cell).map(String::as_str).ok_or(ParseError::RowShape {
        row: index,
        expected,
        got: row.len(),
    })
}

fn optional(row: &RawRow, cell: usize) -> &str {
    row.get(cell).map(String::as_str).unwrap_or("")
}

/// Announce rows: `(message)`.
pub(crate) struct AnnounceRow<'a> {
    pub message: &'a str,
}

impl<'a> AnnounceRow<'a> {
    pub fn parse(index: usize, row: &'a RawRow) -> Result<Self, ParseError> {
        Ok(Self {
            message: required(row, index, 0, 1)?,
        })
    }
}

/// Score rows: `(score, team, [reason])`.
#[derive(Debug)]
pub(crate) struct ScoreRow<'a> {
    pub score_text: &'a str,
    pub team: &'a str,
    pub reason: &'a str,
}

impl<'a> ScoreRow<'a> {
    pub fn parse(index: usize, row: &'a RawRow) -> Result<Self, ParseError> {
        Ok(Self {
            score_text: required(row, index, 0, 2)?,
            team: required(row, index, 1, 2)?,
            reason: optional(row, 2),
        })
    }
}

/// Competition rows: `(date, time, game, team_left, team_right, [result], [stream])`.
pub(crate) struct CompetitionRow<'a> {
    pub date: &'a str,
    pub time: &'a str,
    pub game: &'a str,
    pub team_left: &'a str,
    pub team_right: &'a str,
    pub result: &'a str,
    pub stream: Option<&'a str>,
}

impl<'a> CompetitionRow<'a> {
    pub fn parse(index: usize, row: &'a RawRow) -> Result<Self, ParseError> {
        Ok(Self {
            date: required(row, index, 0, 5)?,
            time: required(row, index, 1, 5)?,
            game: required(row, index, 2, 5)?,
            team_left: required(row, index, 3, 5)?,
            team_right: required(row, index, 4, 5)?,
            result: optional(row, 5),
            // An empty stream cell means "no stream", same as a missing one.
            stream: row.get(6).map(String::as_str).filter(|s| !s.is_empty()),
        })
    }
}
