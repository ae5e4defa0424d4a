//! Score tallying: per-team running totals plus the ordered entry log.

use sheetfeed_core::{RawRow, ScoreEntry, ScoreLedger, TeamScore};

use crate::error::ParseError;
use crate::rows::ScoreRow;

/// Fold score rows into a per-team ledger. Teams are keyed in first
/// appearance order and each log keeps source row order, so the ledger
/// serializes identically for identical input.
pub fn tally_scores(rows: &[RawRow]) -> Result<ScoreLedger, ParseError> {
    let mut ledger = ScoreLedger::new();
    for (index, raw) in rows.iter().enumerate() {
        let row = ScoreRow::parse(index, raw)?;
        let score = row
            .score_text
            .trim()
            .parse::<i64>()
            .map_err(|source| ParseError::Score {
                row: index,
                text: row.score_text.to_string(),
                source,
            })?;
        let team = ledger
            .entry(row.team.to_string())
            .or_insert_with(TeamScore::zero);
        team.total += score;
        team.log.push(ScoreEntry {
            score,
            reason: row.reason.to_string(),
        });
    }
    Ok(ledger)
}

/// Zero-state ledger for a known team list. This is a presentation
/// fallback for an empty sheet; `tally_scores` itself never invents teams.
pub fn zeroed_ledger(teams: &[String]) -> ScoreLedger {
    teams
        .iter()
        .map(|team| (team.clone(), TeamScore::zero()))
        .collect()
}
