//! Dropmark collections fetched over HTTP.
//!
//! A Dropmark collection is exported as JSON (`https://<user>.dropmark.com/<id>.json`).
//! Link items become curated content with a harvested target resource; text items
//! become plain content; every other item type passes through as unknown.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use contentgen_shared::{
    Collection, Content, ContentGenError, ContentItem, CuratedContent, EDITOR_URL_DIRECTIVE,
    HarvestConfig, Result,
};

use crate::harvester::Harvester;
use crate::source::ContentSource;

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DropmarkCollection {
    #[serde(default)]
    name: String,
    #[serde(default)]
    items: Vec<DropmarkItem>,
}

#[derive(Debug, Deserialize)]
struct DropmarkItem {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(rename = "type", default)]
    item_type: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    tags: Vec<DropmarkTag>,
    /// Dropmark page for the item.
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DropmarkTag {
    name: String,
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Loads a Dropmark collection and harvests every link item's target.
pub struct DropmarkSource {
    url: Url,
    client: Client,
    harvester: Harvester,
    concurrency: usize,
}

impl DropmarkSource {
    pub fn new(url: Url, config: &HarvestConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ContentGenError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url,
            client,
            harvester: Harvester::new(config)?,
            concurrency: config.concurrency.max(1),
        })
    }

    async fn fetch(&self) -> Result<DropmarkCollection> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| ContentGenError::Network(format!("GET {}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentGenError::Network(format!(
                "GET {} returned {status}",
                self.url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ContentGenError::Network(format!("reading {}: {e}", self.url)))?;

        serde_json::from_str(&body).map_err(|e| {
            ContentGenError::parse(format!("invalid Dropmark collection {}: {e}", self.url))
        })
    }

    async fn convert(&self, item: DropmarkItem) -> ContentItem {
        let kind = item.item_type.clone();
        match kind.as_str() {
            "link" => {
                let target = match item.link.as_deref().map(str::trim) {
                    Some(link) if !link.is_empty() => Some(self.harvester.harvest(link).await),
                    _ => None,
                };
                ContentItem::Curated(CuratedContent {
                    content: common_content(item),
                    target,
                })
            }
            "text" => ContentItem::Plain(common_content(item)),
            other => {
                debug!(item_type = other, name = %item.name, "unsupported Dropmark item type");
                ContentItem::Unknown
            }
        }
    }
}

#[async_trait]
impl ContentSource for DropmarkSource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    #[instrument(skip_all, fields(url = %self.url))]
    async fn load(&self) -> Result<Collection> {
        let raw = self.fetch().await?;
        info!(name = %raw.name, items = raw.items.len(), "Dropmark collection fetched");

        // `buffered` keeps source order while harvesting concurrently.
        let items: Vec<ContentItem> = stream::iter(raw.items)
            .map(|item| self.convert(item))
            .buffered(self.concurrency)
            .collect()
            .await;

        Ok(Collection {
            source: self.describe(),
            items,
        })
    }
}

fn common_content(item: DropmarkItem) -> Content {
    let created_on = item_timestamp(&item);

    let featured_image = item
        .thumbnail
        .as_deref()
        .and_then(|t| Url::parse(t.trim()).ok());

    let mut directives = BTreeMap::new();
    if let Some(page) = item.url.filter(|u| !u.trim().is_empty()) {
        directives.insert(
            EDITOR_URL_DIRECTIVE.to_string(),
            serde_json::Value::String(page),
        );
    }

    Content {
        title: item.name,
        summary: item.description.unwrap_or_default(),
        body: item.content.unwrap_or_default(),
        categories: item.tags.into_iter().map(|t| t.name).collect(),
        created_on,
        featured_image,
        directives,
    }
}

/// `created_at`, then `updated_at`, then the Unix epoch. Never the clock, so
/// reruns produce the same document date.
fn item_timestamp(item: &DropmarkItem) -> DateTime<Utc> {
    for text in [&item.created_at, &item.updated_at].into_iter().flatten() {
        match parse_timestamp(text) {
            Some(dt) => return dt,
            None => warn!(timestamp = %text, name = %item.name, "unparseable Dropmark timestamp"),
        }
    }
    warn!(name = %item.name, "Dropmark item has no usable timestamp, using the Unix epoch");
    DateTime::UNIX_EPOCH
}

/// Dropmark emits `2019-01-02 03:04:05 UTC`; RFC 3339 is accepted too.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S UTC")
        .ok()
        .map(|naive| naive.and_utc())
}
