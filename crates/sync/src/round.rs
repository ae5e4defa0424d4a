//! Per-feed sync rounds: fetch the feed's range, reduce, write artifacts.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use sheetfeed_core::{Artifact, Feed};
use sheetfeed_reduce::{
    latest_announcement, parse_schedule, select_live, tally_scores, zeroed_ledger,
};
use sheetfeed_sheets::RowSource;
use sheetfeed_store::ArtifactStore;

use crate::aggregate::Aggregate;
use crate::error::SyncError;

/// One feed's fetch → reduce → write chain. Rounds are pure plumbing
/// around the reducers; retry and cadence live in [`SyncTask`].
///
/// [`SyncTask`]: crate::task::SyncTask
#[async_trait]
pub trait SyncRound: Send + Sync {
    fn feed(&self) -> Feed;
    async fn run(&self) -> Result<(), SyncError>;
}

// ── Announce ──────────────────────────────────────────────────

/// Latest announcement message → `announce.json` (no rows ⇒ `null`).
pub struct AnnounceRound {
    source: Arc<dyn RowSource>,
    store: Arc<ArtifactStore>,
}

impl AnnounceRound {
    pub fn new(source: Arc<dyn RowSource>, store: Arc<ArtifactStore>) -> Self {
        Self { source, store }
    }
}

#[async_trait]
impl SyncRound for AnnounceRound {
    fn feed(&self) -> Feed {
        Feed::Announce
    }

    async fn run(&self) -> Result<(), SyncError> {
        let rows = self.source.fetch_rows(self.feed().range()).await?;
        let announcement = latest_announcement(&rows)?;
        self.store.write(Artifact::Announce, &announcement)?;
        Ok(())
    }
}

// ── Score ─────────────────────────────────────────────────────

/// Score rows → per-team ledger → `score.json`. An empty sheet publishes
/// the zero-state ledger for the configured teams instead of `{}`.
pub struct ScoreRound {
    source: Arc<dyn RowSource>,
    store: Arc<ArtifactStore>,
    default_teams: Vec<String>,
}

impl ScoreRound {
    pub fn new(
        source: Arc<dyn RowSource>,
        store: Arc<ArtifactStore>,
        default_teams: Vec<String>,
    ) -> Self {
        Self { source, store, default_teams }
    }
}

#[async_trait]
impl SyncRound for ScoreRound {
    fn feed(&self) -> Feed {
        Feed::Score
    }

    async fn run(&self) -> Result<(), SyncError> {
        let rows = self.source.fetch_rows(self.feed().range()).await?;
        let ledger = if rows.is_empty() {
            zeroed_ledger(&self.default_teams)
        } else {
            tally_scores(&rows)?
        };
        self.store.write(Artifact::Score, &ledger)?;
        Ok(())
    }
}

// ── Live ──────────────────────────────────────────────────────

/// Competition rows → live-event selection → `live.json`.
pub struct LiveRound {
    source: Arc<dyn RowSource>,
    store: Arc<ArtifactStore>,
}

impl LiveRound {
    pub fn new(source: Arc<dyn RowSource>, store: Arc<ArtifactStore>) -> Self {
        Self { source, store }
    }
}

#[async_trait]
impl SyncRound for LiveRound {
    fn feed(&self) -> Feed {
        Feed::Live
    }

    async fn run(&self) -> Result<(), SyncError> {
        let rows = self.source.fetch_rows(self.feed().range()).await?;
        let entries = parse_schedule(&rows)?;
        let live = select_live(&entries, Utc::now());
        self.store.write(Artifact::Live, &live)?;
        Ok(())
    }
}

// ── Competition ───────────────────────────────────────────────

/// Competition rows → full sorted schedule plus a refreshed live pointer,
/// written as two aggregated branches with a single combined outcome.
pub struct CompetitionRound {
    source: Arc<dyn RowSource>,
    store: Arc<ArtifactStore>,
}

impl CompetitionRound {
    pub fn new(source: Arc<dyn RowSource>, store: Arc<ArtifactStore>) -> Self {
        Self { source, store }
    }
}

#[async_trait]
impl SyncRound for CompetitionRound {
    fn feed(&self) -> Feed {
        Feed::Competition
    }

    async fn run(&self) -> Result<(), SyncError> {
        let rows = self.source.fetch_rows(self.feed().range()).await?;
        let entries = parse_schedule(&rows)?;
        let live = select_live(&entries, Utc::now());

        let agg = Aggregate::new();
        let schedule_branch = agg.branch("compet", "write competition schedule");
        let live_branch = agg.branch("live", "write live pointer");

        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            match store.write(Artifact::Schedule, &entries) {
                Ok(()) => schedule_branch.succeed(()),
                Err(error) => schedule_branch.fail(error.into()),
            }
        });

        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            match store.write(Artifact::Live, &live) {
                Ok(()) => live_branch.succeed(()),
                Err(error) => live_branch.fail(error.into()),
            }
        });

        agg.join().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, FixedOffset, Utc};
    use serde_json::{json, Value};

    use sheetfeed_core::{Artifact, RawRow};
    use sheetfeed_sheets::{FetchError, RowSource};
    use sheetfeed_store::ArtifactStore;

    use super::*;

    struct FixedRows(Vec<RawRow>);

    #[async_trait]
    impl RowSource for FixedRows {
        async fn fetch_rows(&self, _range: &str) -> Result<Vec<RawRow>, FetchError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl RowSource for FailingSource {
        async fn fetch_rows(&self, range: &str) -> Result<Vec<RawRow>, FetchError> {
            Err(FetchError::Api(format!("503 Service Unavailable: {range}")))
        }
    }

    fn rows(cells: &[&[&str]]) -> Vec<RawRow> {
        cells
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn store() -> (tempfile::TempDir, Arc<ArtifactStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ArtifactStore::new(dir.path()).unwrap());
        (dir, store)
    }

    fn read_json(store: &ArtifactStore, artifact: Artifact) -> Value {
        serde_json::from_str(&store.read_to_string(artifact).unwrap()).unwrap()
    }

    /// Render an instant as the sheet's date and time cells (UTC+7).
    fn sheet_cells(at: DateTime<Utc>) -> (String, String) {
        let local = at.with_timezone(&FixedOffset::east_opt(7 * 3600).unwrap());
        (
            local.format("%d/%m/%Y").to_string(),
            local.format("%H:%M").to_string(),
        )
    }

    fn competition_row(at: DateTime<Utc>, game: &str, stream: Option<&str>) -> RawRow {
        let (date, time) = sheet_cells(at);
        let mut row = vec![
            date,
            time,
            game.to_string(),
            "plant".to_string(),
            "zombie".to_string(),
            String::new(),
        ];
        if let Some(stream) = stream {
            row.push(stream.to_string());
        }
        row
    }

    #[tokio::test]
    async fn announce_round_writes_the_latest_message() {
        let (_dir, store) = store();
        let round = AnnounceRound::new(
            Arc::new(FixedRows(rows(&[&["first"], &["second"]]))),
            Arc::clone(&store),
        );
        round.run().await.unwrap();
        assert_eq!(
            read_json(&store, Artifact::Announce),
            json!({ "message": "second" })
        );
    }

    #[tokio::test]
    async fn announce_round_empty_sheet_writes_null() {
        let (_dir, store) = store();
        let round = AnnounceRound::new(Arc::new(FixedRows(vec![])), Arc::clone(&store));
        round.run().await.unwrap();
        assert_eq!(store.read_to_string(Artifact::Announce).unwrap(), "null");
    }

    #[tokio::test]
    async fn score_round_writes_the_ledger() {
        let (_dir, store) = store();
        let round = ScoreRound::new(
            Arc::new(FixedRows(rows(&[
                &["10", "plant", "a"],
                &["3", "zombie", "c"],
                &["5", "plant", "b"],
            ]))),
            Arc::clone(&store),
            vec![],
        );
        round.run().await.unwrap();
        assert_eq!(
            read_json(&store, Artifact::Score),
            json!({
                "plant": { "total": 15, "log": [
                    { "score": 10, "reason": "a" },
                    { "score": 5, "reason": "b" },
                ]},
                "zombie": { "total": 3, "log": [
                    { "score": 3, "reason": "c" },
                ]},
            })
        );
    }

    #[tokio::test]
    async fn score_round_empty_sheet_writes_zeroed_teams() {
        let (_dir, store) = store();
        let round = ScoreRound::new(
            Arc::new(FixedRows(vec![])),
            Arc::clone(&store),
            vec!["plant".to_string(), "zombie".to_string()],
        );
        round.run().await.unwrap();
        assert_eq!(
            read_json(&store, Artifact::Score),
            json!({
                "plant": { "total": 0, "log": [] },
                "zombie": { "total": 0, "log": [] },
            })
        );
    }

    #[tokio::test]
    async fn live_round_selects_the_upcoming_streamed_entry() {
        let (_dir, store) = store();
        let now = Utc::now();
        let round = LiveRound::new(
            Arc::new(FixedRows(vec![
                competition_row(now - Duration::hours(2), "finished", None),
                competition_row(now + Duration::hours(1), "next", Some("https://s/next")),
            ])),
            Arc::clone(&store),
        );
        round.run().await.unwrap();

        let live = read_json(&store, Artifact::Live);
        assert_eq!(live["game"], "next");
        assert_eq!(live["stream"], "https://s/next");
    }

    #[tokio::test]
    async fn live_round_without_streams_writes_null() {
        let (_dir, store) = store();
        let now = Utc::now();
        let round = LiveRound::new(
            Arc::new(FixedRows(vec![
                competition_row(now + Duration::hours(1), "quiet", None),
            ])),
            Arc::clone(&store),
        );
        round.run().await.unwrap();
        assert_eq!(store.read_to_string(Artifact::Live).unwrap(), "null");
    }

    #[tokio::test]
    async fn competition_round_writes_schedule_and_live_together() {
        let (_dir, store) = store();
        let now = Utc::now();
        let round = CompetitionRound::new(
            Arc::new(FixedRows(vec![
                competition_row(now + Duration::hours(3), "later", None),
                competition_row(now + Duration::hours(1), "sooner", Some("https://s/live")),
            ])),
            Arc::clone(&store),
        );
        round.run().await.unwrap();

        let schedule = read_json(&store, Artifact::Schedule);
        let games: Vec<&str> = schedule
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["game"].as_str().unwrap())
            .collect();
        assert_eq!(games, ["sooner", "later"], "schedule must be sorted");

        let live = read_json(&store, Artifact::Live);
        assert_eq!(live["game"], "sooner");
    }

    #[tokio::test]
    async fn competition_round_reports_a_failed_write() {
        let dir = tempfile::tempdir().unwrap();
        let doomed = dir.path().join("doomed");
        let store = Arc::new(ArtifactStore::new(&doomed).unwrap());
        std::fs::remove_dir_all(&doomed).unwrap();

        let now = Utc::now();
        let round = CompetitionRound::new(
            Arc::new(FixedRows(vec![competition_row(now, "pvz", None)])),
            store,
        );
        let err = round.run().await.unwrap_err();
        assert!(matches!(err, SyncError::Aggregate { .. }));
        assert!(err.to_string().contains("failed"), "got: {err}");
    }

    #[tokio::test]
    async fn fetch_failure_short_circuits_the_round() {
        let (_dir, store) = store();
        let round = AnnounceRound::new(Arc::new(FailingSource), Arc::clone(&store));
        let err = round.run().await.unwrap_err();
        assert!(matches!(err, SyncError::Fetch(_)));
        assert!(
            store.read_to_string(Artifact::Announce).is_err(),
            "no artifact may be written on a failed fetch"
        );
    }

    #[tokio::test]
    async fn malformed_rows_leave_the_previous_artifact_in_place() {
        let (_dir, store) = store();

        let good = ScoreRound::new(
            Arc::new(FixedRows(rows(&[&["10", "plant", "a"]]))),
            Arc::clone(&store),
            vec![],
        );
        good.run().await.unwrap();

        let bad = ScoreRound::new(
            Arc::new(FixedRows(rows(&[&["lots", "plant", "a"]]))),
            Arc::clone(&store),
            vec![],
        );
        let err = bad.run().await.unwrap_err();
        assert!(matches!(err, SyncError::Parse(_)));

        let ledger = read_json(&store, Artifact::Score);
        assert_eq!(ledger["plant"]["total"], 10, "stale data beats no data");
    }
}
