use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::feed::Feed;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Split a comma-separated team list, dropping empty segments.
fn parse_teams(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|team| team.trim().to_string())
        .filter(|team| !team.is_empty())
        .collect()
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub sheets: SheetsConfig,
    pub output: OutputConfig,
    pub feeds: FeedsConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            sheets: SheetsConfig::from_env(),
            output: OutputConfig::from_env(),
            feeds: FeedsConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  server:  {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  sheets:  sheet_id={}, credential={}",
            self.sheets.sheet_id.as_deref().unwrap_or("(none)"),
            self.sheets.credential_kind(),
        );
        tracing::info!("  output:  data_dir={}", self.output.data_dir.display());
        tracing::info!(
            "  feeds:   announce={}s, score={}s, live={}s, competition={}s",
            self.feeds.announce_period_secs,
            self.feeds.score_period_secs,
            self.feeds.live_period_secs,
            self.feeds.competition_period_secs,
        );
        tracing::info!("  teams:   {}", self.feeds.default_teams.join(", "));
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_u16("PORT", 3000),
        }
    }
}

// ── Sheets source ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Spreadsheet identifier. Required at boot; `from_env` itself never fails.
    pub sheet_id: Option<String>,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
    /// Override of the Sheets API base URL (tests, proxies).
    pub base_url: Option<String>,
}

impl SheetsConfig {
    fn from_env() -> Self {
        Self {
            sheet_id: env_opt("SHEET_ID"),
            api_key: env_opt("SHEETS_API_KEY"),
            bearer_token: env_opt("SHEETS_BEARER_TOKEN"),
            base_url: env_opt("SHEETS_BASE_URL"),
        }
    }

    /// Which credential is configured, without exposing its value.
    pub fn credential_kind(&self) -> &'static str {
        if self.bearer_token.is_some() {
            "bearer_token"
        } else if self.api_key.is_some() {
            "api_key"
        } else {
            "(none)"
        }
    }
}

// ── Output ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the artifact JSON files are written into.
    pub data_dir: PathBuf,
}

impl OutputConfig {
    fn from_env() -> Self {
        Self {
            data_dir: PathBuf::from(env_or("DATA_DIR", "data")),
        }
    }
}

// ── Feeds ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsConfig {
    pub announce_period_secs: u64,
    pub score_period_secs: u64,
    pub live_period_secs: u64,
    pub competition_period_secs: u64,
    /// Teams published with zero state when the score sheet has no rows.
    pub default_teams: Vec<String>,
}

impl FeedsConfig {
    fn from_env() -> Self {
        Self {
            announce_period_secs: env_u64(
                "ANNOUNCE_PERIOD_SECS",
                Feed::Announce.default_period_secs(),
            ),
            score_period_secs: env_u64("SCORE_PERIOD_SECS", Feed::Score.default_period_secs()),
            live_period_secs: env_u64("LIVE_PERIOD_SECS", Feed::Live.default_period_secs()),
            competition_period_secs: env_u64(
                "COMPETITION_PERIOD_SECS",
                Feed::Competition.default_period_secs(),
            ),
            default_teams: parse_teams(&env_or("DEFAULT_TEAMS", "plant,zombie")),
        }
    }

    /// Refresh period for one feed.
    pub fn period(&self, feed: Feed) -> Duration {
        let secs = match feed {
            Feed::Announce => self.announce_period_secs,
            Feed::Score => self.score_period_secs,
            Feed::Live => self.live_period_secs,
            Feed::Competition => self.competition_period_secs,
        };
        Duration::from_secs(secs)
    }
}

// ── Tests ─────────────────────────────────────────────────────
