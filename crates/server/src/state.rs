use std::path::PathBuf;

use sheetfeed_sync::FeedTasks;

/// Shared application state.
pub struct AppState {
    /// The four sync tasks, addressable by feed.
    pub tasks: FeedTasks,
    /// Directory served read-only under `/data`.
    pub artifact_dir: PathBuf,
}
