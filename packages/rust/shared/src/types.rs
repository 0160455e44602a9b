//! Content data model shared by sources, resolvers, and the generator.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Directive key holding the page where an item can be edited.
pub const EDITOR_URL_DIRECTIVE: &str = "editorURL";

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// An ordered collection of content items, as supplied by a content source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// Human-readable origin of the collection (URL or file path).
    pub source: String,
    /// Items in source order.
    pub items: Vec<ContentItem>,
}

// ---------------------------------------------------------------------------
// ContentItem
// ---------------------------------------------------------------------------

/// A single content record. The `kind` field selects the variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentItem {
    /// A bookmark pointing at a target resource.
    Curated(CuratedContent),
    /// Plain content with no link.
    #[serde(rename = "content")]
    Plain(Content),
    /// Any discriminator this build does not understand.
    #[serde(other)]
    Unknown,
}

impl ContentItem {
    /// Common content fields, if the variant is recognized.
    pub fn content(&self) -> Option<&Content> {
        match self {
            Self::Curated(curated) => Some(&curated.content),
            Self::Plain(content) => Some(content),
            Self::Unknown => None,
        }
    }

    /// Discriminator name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Curated(_) => "curated",
            Self::Plain(_) => "content",
            Self::Unknown => "unknown",
        }
    }

    /// Open-graph metadata harvested from the target resource, if any.
    pub fn open_graph(&self) -> Option<&OpenGraph> {
        match self {
            Self::Curated(curated) => curated.target.as_ref().map(|t| &t.open_graph),
            _ => None,
        }
    }
}

/// Fields every recognized item carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// Title as supplied by the source, unprocessed.
    pub title: String,
    /// Summary as supplied by the source, unprocessed.
    #[serde(default)]
    pub summary: String,
    /// Body text; may begin with its own `---` front matter block.
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub categories: Vec<String>,
    pub created_on: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<Url>,
    /// Arbitrary key/value directives (e.g. `editorURL`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub directives: BTreeMap<String, serde_json::Value>,
}

impl Content {
    /// String value of a directive, if present and a string.
    pub fn directive_str(&self, key: &str) -> Option<&str> {
        self.directives.get(key).and_then(|v| v.as_str())
    }
}

/// A curated bookmark: common content plus its harvested target resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratedContent {
    #[serde(flatten)]
    pub content: Content,
    /// `None` when the source could not supply a resource for the link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetResource>,
}

// ---------------------------------------------------------------------------
// TargetResource
// ---------------------------------------------------------------------------

/// The harvested resource behind a curated link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetResource {
    /// URL text exactly as curated.
    pub original_url: String,
    /// The original URL text parsed as an absolute http(s) URL.
    pub url_valid: bool,
    /// The destination answered with a success status.
    pub destination_valid: bool,
    /// URL after following redirects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<Url>,
    /// Set when the resource matched an ignore policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_reason: Option<String>,
    /// Stable key derived from the original URL text.
    pub unique_key: String,
    #[serde(default)]
    pub open_graph: OpenGraph,
}

/// Social-preview metadata (`og:*` meta tags).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenGraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
