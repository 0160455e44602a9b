//! Target-resource harvesting for curated links.
//!
//! Turns the URL text of a bookmark into a [`TargetResource`]: well-formedness,
//! ignore policy, reachability, redirects, and open-graph metadata.

use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};
use url::Url;

use contentgen_shared::{ContentGenError, HarvestConfig, OpenGraph, Result, TargetResource};

/// Maximum number of redirects followed to reach the final URL.
const MAX_REDIRECTS: usize = 10;

/// Resolves curated URL text into target resources.
pub struct Harvester {
    client: Client,
    ignore_patterns: Vec<Regex>,
}

impl Harvester {
    /// Build a harvester; invalid ignore patterns are a config error.
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(config.timeout)
            .build()
            .map_err(|e| ContentGenError::Network(format!("failed to build HTTP client: {e}")))?;

        let ignore_patterns = config
            .ignore_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    ContentGenError::config(format!("invalid ignore pattern {p:?}: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            client,
            ignore_patterns,
        })
    }

    /// Harvest one resource. Never fails; problems are recorded on the resource.
    #[instrument(skip(self))]
    pub async fn harvest(&self, url_text: &str) -> TargetResource {
        let url_text = url_text.trim();
        let mut resource = TargetResource {
            original_url: url_text.to_string(),
            url_valid: false,
            destination_valid: false,
            final_url: None,
            ignore_reason: None,
            unique_key: unique_key(url_text),
            open_graph: OpenGraph::default(),
        };

        let url = match Url::parse(url_text) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => url,
            Ok(url) => {
                debug!(scheme = url.scheme(), "not an http(s) URL");
                return resource;
            }
            Err(e) => {
                debug!(error = %e, "URL text does not parse");
                return resource;
            }
        };
        resource.url_valid = true;

        if let Some(pattern) = self.ignore_patterns.iter().find(|p| p.is_match(url.as_str())) {
            resource.ignore_reason = Some(format!("matches ignore pattern {:?}", pattern.as_str()));
            return resource;
        }

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%url, error = %e, "target resource unreachable");
                return resource;
            }
        };

        resource.final_url = Some(response.url().clone());
        resource.destination_valid = response.status().is_success();
        if !resource.destination_valid {
            debug!(
                %url,
                status = %response.status(),
                "target resource answered with failure status"
            );
            return resource;
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_none_or(|ct| ct.contains("html"));

        if is_html {
            match response.text().await {
                Ok(body) => resource.open_graph = extract_open_graph(&body),
                Err(e) => debug!(%url, error = %e, "could not read resource body"),
            }
        }

        resource
    }
}

/// Stable key for a curated link: first 128 bits of SHA-256 over the URL text.
pub fn unique_key(url_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url_text.trim().as_bytes());
    let digest = hasher.finalize();
    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}

/// Read `og:title` and `og:description` meta tags.
pub fn extract_open_graph(html: &str) -> OpenGraph {
    let doc = Html::parse_document(html);
    OpenGraph {
        title: meta_property(&doc, "og:title"),
        description: meta_property(&doc, "og:description"),
    }
}

fn meta_property(doc: &Html, property: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[property="{property}"]"#)).ok()?;
    doc.select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::path;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(ignore: Vec<String>) -> HarvestConfig {
        HarvestConfig {
            user_agent: "contentgen-test".into(),
            timeout: Duration::from_secs(5),
            ignore_patterns: ignore,
            concurrency: 2,
        }
    }

    const ARTICLE: &str = r#"<html><head>
        <meta property="og:title" content="  OG Article Title ">
        <meta property="og:description" content="Shared description.">
        </head><body><p>Body</p></body></html>"#;

    #[test]
    fn unique_key_is_stable() {
        let a = unique_key("https://example.com/foo");
        assert_eq!(a, unique_key(" https://example.com/foo "));
        assert_eq!(a.len(), 32);
        assert_ne!(a, unique_key("https://example.com/bar"));
    }

    #[test]
    fn extracts_open_graph_tags() {
        let og = extract_open_graph(ARTICLE);
        assert_eq!(og.title.as_deref(), Some("OG Article Title"));
        assert_eq!(og.description.as_deref(), Some("Shared description."));

        let none = extract_open_graph("<html><head><title>x</title></head></html>");
        assert_eq!(none, OpenGraph::default());
    }

    #[tokio::test]
    async fn harvests_reachable_resource() {
        let server = MockServer::start().await;
        Mock::given(path("/article"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html; charset=utf-8")
                    .set_body_string(ARTICLE),
            )
            .mount(&server)
            .await;

        let harvester = Harvester::new(&config(vec![])).unwrap();
        let url = format!("{}/article", server.uri());
        let resource = harvester.harvest(&url).await;

        assert!(resource.url_valid);
        assert!(resource.destination_valid);
        assert_eq!(resource.final_url.unwrap().as_str(), url);
        assert_eq!(resource.open_graph.title.as_deref(), Some("OG Article Title"));
        assert_eq!(resource.unique_key, unique_key(&url));
    }

    #[tokio::test]
    async fn follows_redirects_to_final_url() {
        let server = MockServer::start().await;
        Mock::given(path("/short"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("location", format!("{}/article", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(path("/article"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE))
            .mount(&server)
            .await;

        let harvester = Harvester::new(&config(vec![])).unwrap();
        let resource = harvester.harvest(&format!("{}/short", server.uri())).await;
        assert!(resource.destination_valid);
        assert!(resource.final_url.unwrap().path().ends_with("/article"));
    }

    #[tokio::test]
    async fn failure_status_marks_destination_invalid() {
        let server = MockServer::start().await;
        Mock::given(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let harvester = Harvester::new(&config(vec![])).unwrap();
        let resource = harvester.harvest(&format!("{}/gone", server.uri())).await;
        assert!(resource.url_valid);
        assert!(!resource.destination_valid);
    }

    #[tokio::test]
    async fn ignore_policy_short_circuits() {
        let harvester =
            Harvester::new(&config(vec![r"^https://ignored\.example\.com/".into()])).unwrap();
        let resource = harvester.harvest("https://ignored.example.com/post").await;
        assert!(resource.url_valid);
        assert!(resource.ignore_reason.unwrap().contains("ignored"));
        assert!(resource.final_url.is_none());
    }

    #[tokio::test]
    async fn malformed_url_text() {
        let harvester = Harvester::new(&config(vec![])).unwrap();
        let resource = harvester.harvest("not a url").await;
        assert!(!resource.url_valid);
        assert!(!resource.destination_valid);

        let resource = harvester.harvest("ftp://example.com/file").await;
        assert!(!resource.url_valid);
    }

    #[test]
    fn invalid_ignore_pattern_is_config_error() {
        let err = Harvester::new(&config(vec!["(unclosed".into()])).err().unwrap();
        assert!(err.to_string().contains("invalid ignore pattern"));
    }
}
