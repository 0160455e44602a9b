//! LinkedIn share counts.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use contentgen_content::ResolvedIdentity;
use contentgen_shared::{ContentGenError, Result};

use crate::provider::{ScoreProvider, ScoreResult, fetch_json};

/// Queries `<endpoint>?url=<url>&format=json` and reads `count`.
pub struct LinkedInCountProvider {
    client: Client,
    endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: Option<u64>,
}

impl LinkedInCountProvider {
    pub const NAME: &'static str = "linkedin";

    pub fn new(client: Client, endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            ContentGenError::config(format!("invalid LinkedIn endpoint {endpoint:?}: {e}"))
        })?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ScoreProvider for LinkedInCountProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn score(&self, identity: &ResolvedIdentity) -> ScoreResult {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("url", identity.final_url.as_str())
            .append_pair("format", "json");

        match fetch_json::<CountResponse>(&self.client, url).await {
            Ok(CountResponse { count: Some(count) }) => {
                debug!(url = %identity.final_url, count, "linkedin share count");
                ScoreResult::valid(Self::NAME, identity, count)
            }
            Ok(CountResponse { count: None }) => {
                ScoreResult::invalid(Self::NAME, identity, "response has no count")
            }
            Err(e) => ScoreResult::invalid(Self::NAME, identity, e),
        }
    }
}
