use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artifact::Artifact;

/// One row of source data: the ordered string cells of a sheet row.
///
/// The source API returns ragged rows: trailing empty cells are dropped,
/// and empty cells in the middle come through as `""`.
pub type RawRow = Vec<String>;

/// One category of synchronized data. Immutable identity: determines the
/// source range, the default refresh period, and the output artifact(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    Announce,
    Score,
    Live,
    Competition,
}

impl Feed {
    /// Every feed, in the order tasks are wired at boot.
    pub const ALL: [Feed; 4] = [Feed::Announce, Feed::Score, Feed::Live, Feed::Competition];

    /// Short name used in routes, logs, and aggregation branch keys.
    pub fn name(&self) -> &'static str {
        match self {
            Feed::Announce => "announce",
            Feed::Score => "score",
            Feed::Live => "live",
            Feed::Competition => "compet",
        }
    }

    /// A1-notation range fetched from the source sheet.
    ///
    /// Live reads the competition range: the live pointer is derived from
    /// competition rows, with the stream link in column G.
    pub fn range(&self) -> &'static str {
        match self {
            Feed::Announce => "Announce!A2:A",
            Feed::Score => "Score!A2:C",
            Feed::Live => "Competition!A2:G",
            Feed::Competition => "Competition!A2:G",
        }
    }

    /// Default refresh period in seconds (overridable per feed via env).
    pub fn default_period_secs(&self) -> u64 {
        match self {
            Feed::Announce => 600,
            Feed::Score => 1200,
            Feed::Live => 600,
            Feed::Competition => 2400,
        }
    }

    /// Artifacts written by one round of this feed.
    ///
    /// Competition emits two: the full schedule plus a refreshed live
    /// pointer, since both derive from the same fetched rows.
    pub fn artifacts(&self) -> &'static [Artifact] {
        match self {
            Feed::Announce => &[Artifact::Announce],
            Feed::Score => &[Artifact::Score],
            Feed::Live => &[Artifact::Live],
            Feed::Competition => &[Artifact::Schedule, Artifact::Live],
        }
    }
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("unknown feed: {0}")]
pub struct UnknownFeed(pub String);

impl FromStr for Feed {
    type Err = UnknownFeed;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "announce" => Ok(Feed::Announce),
            "score" => Ok(Feed::Score),
            "live" => Ok(Feed::Live),
            "compet" => Ok(Feed::Competition),
            other => Err(UnknownFeed(other.to_string())),
        }
    }
}
