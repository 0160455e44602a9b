//! The score provider seam and the per-provider result record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use contentgen_content::ResolvedIdentity;

/// One provider's answer for one link.
///
/// `valid == false` means the lookup failed (HTTP error, timeout, unparseable
/// payload), not that the count was zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub provider: String,
    pub url: String,
    pub unique_key: String,
    pub value: u64,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub simulated: bool,
    pub fetched_at: DateTime<Utc>,
}

impl ScoreResult {
    /// A successful lookup.
    pub fn valid(provider: &str, identity: &ResolvedIdentity, value: u64) -> Self {
        Self {
            provider: provider.to_string(),
            url: identity.final_url.to_string(),
            unique_key: identity.unique_key.clone(),
            value,
            valid: true,
            error: None,
            simulated: false,
            fetched_at: Utc::now(),
        }
    }

    /// A failed lookup.
    pub fn invalid(provider: &str, identity: &ResolvedIdentity, error: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            url: identity.final_url.to_string(),
            unique_key: identity.unique_key.clone(),
            value: 0,
            valid: false,
            error: Some(error.into()),
            simulated: false,
            fetched_at: Utc::now(),
        }
    }
}

/// An external source of an engagement metric for a link.
///
/// Implementations never fail: lookup problems are reported as an invalid
/// [`ScoreResult`]. Retrying, if desired, belongs inside the implementation.
#[async_trait]
pub trait ScoreProvider: Send + Sync {
    /// Stable provider name, used in artifact file names.
    fn name(&self) -> &str;

    /// Look up the metric for one link.
    async fn score(&self, identity: &ResolvedIdentity) -> ScoreResult;
}

/// GET `url` and decode a JSON body; errors are rendered as text for the result record.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    url: Url,
) -> std::result::Result<T, String> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| format!("{url}: {e}"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("{url}: HTTP {status}"));
    }

    let body = response
        .text()
        .await
        .map_err(|e| format!("{url}: body read failed: {e}"))?;

    serde_json::from_str(&body).map_err(|e| format!("{url}: unparseable payload: {e}"))
}
