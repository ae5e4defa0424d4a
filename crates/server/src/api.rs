//! Sync control endpoints: health, the feed index, and manual refresh.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use sheetfeed_core::Feed;
use sheetfeed_sync::{SyncError, TriggerKind};

use crate::state::AppState;

// ── Health ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ── Feed index ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct FeedInfo {
    pub feed: &'static str,
    pub route: String,
    pub period_secs: u64,
    pub armed: bool,
    pub artifacts: Vec<&'static str>,
}

#[derive(Serialize)]
pub struct UpdateIndex {
    pub feeds: Vec<FeedInfo>,
}

/// GET /update: every feed, its refresh route, cadence, and outputs.
pub async fn update_index(State(state): State<Arc<AppState>>) -> Json<UpdateIndex> {
    let feeds = state
        .tasks
        .iter()
        .map(|task| {
            let feed = task.feed();
            FeedInfo {
                feed: feed.name(),
                route: format!("/update/{}", feed.name()),
                period_secs: task.period().as_secs(),
                armed: task.is_armed(),
                artifacts: feed.artifacts().iter().map(|a| a.file_name()).collect(),
            }
        })
        .collect();
    Json(UpdateIndex { feeds })
}

// ── Manual refresh: one feed ──────────────────────────────────

#[derive(Serialize)]
pub struct SyncOutcome {
    pub feed: &'static str,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Map one feed's round outcome onto a status code and body.
fn outcome_response(feed: Feed, result: Result<(), SyncError>) -> (StatusCode, Json<SyncOutcome>) {
    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(SyncOutcome {
                feed: feed.name(),
                outcome: "success",
                error: None,
            }),
        ),
        Err(error) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SyncOutcome {
                feed: feed.name(),
                outcome: "failed",
                error: Some(error.to_string()),
            }),
        ),
    }
}

/// GET|POST /update/{feed}: refresh one feed now. Resets its timer.
pub async fn update_feed(
    State(state): State<Arc<AppState>>,
    Path(feed): Path<String>,
) -> Result<(StatusCode, Json<SyncOutcome>), StatusCode> {
    let feed: Feed = feed.parse().map_err(|_| StatusCode::NOT_FOUND)?;
    let task = Arc::clone(state.tasks.get(feed));
    let result = task.trigger(TriggerKind::Manual).await;
    Ok(outcome_response(feed, result))
}

// ── Manual refresh: all feeds ─────────────────────────────────

#[derive(Serialize)]
pub struct SyncAllResponse {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feeds: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<FailedBranch>,
}

#[derive(Serialize)]
pub struct FailedBranch {
    pub name: String,
    pub detail: String,
    pub error: String,
}

/// POST /update: refresh every feed, first failure wins.
pub async fn update_all(State(state): State<Arc<AppState>>) -> (StatusCode, Json<SyncAllResponse>) {
    match state.tasks.sync_all(TriggerKind::Manual).await {
        Ok(refreshed) => (
            StatusCode::OK,
            Json(SyncAllResponse {
                outcome: "success",
                feeds: Some(refreshed.keys().cloned().collect()),
                failed: None,
            }),
        ),
        Err(failure) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SyncAllResponse {
                outcome: "failed",
                feeds: None,
                failed: Some(FailedBranch {
                    name: failure.name,
                    detail: failure.detail,
                    error: failure.error.to_string(),
                }),
            }),
        ),
    }
}
