//! Boot wiring: one sync task per feed, plus the all-feeds round.

use std::sync::Arc;

use indexmap::IndexMap;

use sheetfeed_core::{Config, Feed};
use sheetfeed_sheets::RowSource;
use sheetfeed_store::ArtifactStore;

use crate::aggregate::{Aggregate, BranchFailure};
use crate::round::{AnnounceRound, CompetitionRound, LiveRound, ScoreRound};
use crate::task::{SyncTask, TriggerKind};

/// The full set of sync tasks, one per feed, sharing a row source and an
/// artifact store.
pub struct FeedTasks {
    announce: Arc<SyncTask>,
    score: Arc<SyncTask>,
    live: Arc<SyncTask>,
    competition: Arc<SyncTask>,
}

impl FeedTasks {
    pub fn new(source: Arc<dyn RowSource>, store: Arc<ArtifactStore>, config: &Config) -> Self {
        let feeds = &config.feeds;
        Self {
            announce: SyncTask::new(
                feeds.period(Feed::Announce),
                Box::new(AnnounceRound::new(Arc::clone(&source), Arc::clone(&store))),
            ),
            score: SyncTask::new(
                feeds.period(Feed::Score),
                Box::new(ScoreRound::new(
                    Arc::clone(&source),
                    Arc::clone(&store),
                    feeds.default_teams.clone(),
                )),
            ),
            live: SyncTask::new(
                feeds.period(Feed::Live),
                Box::new(LiveRound::new(Arc::clone(&source), Arc::clone(&store))),
            ),
            competition: SyncTask::new(
                feeds.period(Feed::Competition),
                Box::new(CompetitionRound::new(source, store)),
            ),
        }
    }

    /// The task owning one feed.
    pub fn get(&self, feed: Feed) -> &Arc<SyncTask> {
        match feed {
            Feed::Announce => &self.announce,
            Feed::Score => &self.score,
            Feed::Live => &self.live,
            Feed::Competition => &self.competition,
        }
    }

    /// Tasks in [`Feed::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SyncTask>> {
        Feed::ALL.iter().map(|&feed| self.get(feed))
    }

    /// Trigger every feed concurrently and aggregate the outcomes: the
    /// first failure wins, otherwise the set of refreshed feed names.
    /// Each task rearms its own timer as part of its trigger.
    pub async fn sync_all(&self, kind: TriggerKind) -> Result<IndexMap<String, ()>, BranchFailure> {
        let agg = Aggregate::new();
        // Register every branch before spawning any settler; a fast feed
        // settling mid-registration would otherwise resolve the round
        // while siblings are still uncounted.
        let branches: Vec<_> = self
            .iter()
            .map(|task| {
                let feed = task.feed();
                (Arc::clone(task), agg.branch(feed.name(), format!("sync {feed}")))
            })
            .collect();
        for (task, branch) in branches {
            tokio::spawn(async move {
                match task.trigger(kind).await {
                    Ok(()) => branch.succeed(()),
                    Err(error) => branch.fail(error),
                }
            });
        }
        agg.join().await
    }
}
