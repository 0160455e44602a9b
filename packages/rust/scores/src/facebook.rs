//! Facebook Graph share counts.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use contentgen_content::ResolvedIdentity;
use contentgen_shared::{ContentGenError, Result};

use crate::provider::{ScoreProvider, ScoreResult, fetch_json};

/// Queries `<endpoint>?id=<url>` and reads `share.share_count`.
pub struct FacebookGraphProvider {
    client: Client,
    endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct GraphResponse {
    #[serde(default)]
    share: Option<GraphShare>,
    #[serde(default)]
    error: Option<GraphError>,
}

#[derive(Debug, Deserialize)]
struct GraphShare {
    #[serde(default)]
    share_count: u64,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

impl FacebookGraphProvider {
    pub const NAME: &'static str = "facebook";

    pub fn new(client: Client, endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            ContentGenError::config(format!("invalid Facebook Graph endpoint {endpoint:?}: {e}"))
        })?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ScoreProvider for FacebookGraphProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn score(&self, identity: &ResolvedIdentity) -> ScoreResult {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("id", identity.final_url.as_str());

        match fetch_json::<GraphResponse>(&self.client, url).await {
            Ok(GraphResponse {
                error: Some(err), ..
            }) => ScoreResult::invalid(Self::NAME, identity, err.message),
            Ok(response) => {
                // A Graph object without `share` has never been shared.
                let count = response.share.map_or(0, |s| s.share_count);
                debug!(url = %identity.final_url, count, "facebook share count");
                ScoreResult::valid(Self::NAME, identity, count)
            }
            Err(e) => ScoreResult::invalid(Self::NAME, identity, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn identity() -> ResolvedIdentity {
        ResolvedIdentity {
            final_url: Url::parse("https://example.com/foo").unwrap(),
            hostname: "example.com".into(),
            slug: "example-foo".into(),
            unique_key: "k1".into(),
        }
    }

    #[tokio::test]
    async fn reads_share_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("id", "https://example.com/foo"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"id":"https://example.com/foo","share":{"comment_count":2,"share_count":41}}"#,
            ))
            .mount(&server)
            .await;

        let provider = FacebookGraphProvider::new(Client::new(), &server.uri()).unwrap();
        let result = provider.score(&identity()).await;

        assert!(result.valid);
        assert_eq!(result.value, 41);
        assert_eq!(result.provider, "facebook");
        assert_eq!(result.unique_key, "k1");
    }

    #[tokio::test]
    async fn missing_share_block_is_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"id":"https://example.com/foo"}"#),
            )
            .mount(&server)
            .await;

        let provider = FacebookGraphProvider::new(Client::new(), &server.uri()).unwrap();
        let result = provider.score(&identity()).await;
        assert!(result.valid);
        assert_eq!(result.value, 0);
    }

    #[tokio::test]
    async fn graph_error_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"error":{"message":"(#4) Application request limit reached"}}"#,
            ))
            .mount(&server)
            .await;

        let provider = FacebookGraphProvider::new(Client::new(), &server.uri()).unwrap();
        let result = provider.score(&identity()).await;
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("request limit"));
    }

    #[tokio::test]
    async fn http_failure_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider = FacebookGraphProvider::new(Client::new(), &server.uri()).unwrap();
        let result = provider.score(&identity()).await;
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("500"));
    }

    #[test]
    fn rejects_bad_endpoint() {
        assert!(FacebookGraphProvider::new(Client::new(), "not a url").is_err());
    }
}
