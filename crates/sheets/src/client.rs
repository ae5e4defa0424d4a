//! Google Sheets v4 `values.get` client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use sheetfeed_core::RawRow;

use crate::source::{FetchError, RowSource};

/// Where the Sheets API lives, unless overridden for tests or proxies.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

/// A pre-acquired credential. Acquisition (key issuance, OAuth exchange)
/// happens outside this service; we only attach the result to requests.
#[derive(Debug, Clone)]
pub enum SheetsCredential {
    /// Sent as the `key` query parameter.
    ApiKey(String),
    /// Sent as an `Authorization: Bearer` header.
    BearerToken(String),
}

/// Row source backed by the spreadsheet REST API.
pub struct SheetsClient {
    client: Client,
    base_url: String,
    sheet_id: String,
    credential: SheetsCredential,
}

impl SheetsClient {
    pub fn new(sheet_id: impl Into<String>, credential: SheetsCredential) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, sheet_id, credential)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        sheet_id: impl Into<String>,
        credential: SheetsCredential,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            sheet_id: sheet_id.into(),
            credential,
        }
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, self.sheet_id, range
        )
    }
}

/// Wire shape of a `values.get` response. The API omits `values` entirely
/// when the range holds no rows, and drops trailing empty cells per row.
#[derive(Debug, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<RawRow>,
}

#[async_trait]
impl RowSource for SheetsClient {
    async fn fetch_rows(&self, range: &str) -> Result<Vec<RawRow>, FetchError> {
        let url = self.values_url(range);
        debug!(range, "fetching rows");

        let request = match &self.credential {
            SheetsCredential::ApiKey(key) => self.client.get(&url).query(&[("key", key)]),
            SheetsCredential::BearerToken(token) => self.client.get(&url).bearer_auth(token),
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api(format!("{status}: {body}")));
        }

        let parsed: ValueRange = response.json().await?;
        Ok(parsed.values)
    }
}
