use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One published JSON file. Overwritten wholesale on each successful round;
/// absent values serialize as JSON `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Artifact {
    Announce,
    Score,
    Live,
    Schedule,
}

impl Artifact {
    /// File name inside the output directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Artifact::Announce => "announce.json",
            Artifact::Score => "score.json",
            Artifact::Live => "live.json",
            Artifact::Schedule => "compet.json",
        }
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

// ── Derived artifact values ───────────────────────────────────────────

/// The single most recent announcement message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub message: String,
}

/// One scored action: how many points and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: i64,
    pub reason: String,
}

/// Running total plus the ordered log of entries for one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScore {
    pub total: i64,
    pub log: Vec<ScoreEntry>,
}

impl TeamScore {
    pub fn zero() -> Self {
        Self { total: 0, log: Vec::new() }
    }
}

/// Per-team scores, keyed in first-appearance order so serialization is
/// deterministic for a given row input.
pub type ScoreLedger = IndexMap<String, TeamScore>;

/// One parsed, time-stamped competition event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub schedule: DateTime<FixedOffset>,
    pub game: String,
    pub team_left: String,
    pub team_right: String,
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
}
