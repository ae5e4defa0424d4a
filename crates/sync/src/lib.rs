//! The synchronization engine: self-rescheduling per-feed tasks, fan-in
//! aggregation for multi-write rounds, and the fetch → reduce → write
//! round for each feed.

pub mod aggregate;
pub mod error;
pub mod feeds;
pub mod round;
pub mod task;

pub use aggregate::{Aggregate, Branch, BranchFailure};
pub use error::SyncError;
pub use feeds::FeedTasks;
pub use round::{AnnounceRound, CompetitionRound, LiveRound, ScoreRound, SyncRound};
pub use task::{SyncTask, TriggerKind};
