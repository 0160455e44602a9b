//! Content source seam and the local JSON snapshot source.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, instrument};
use url::Url;

use contentgen_shared::{Collection, ContentGenError, HarvestConfig, Result};

use crate::dropmark::DropmarkSource;

/// Anything that can supply an ordered [`Collection`].
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Human-readable origin, for logs and summaries.
    fn describe(&self) -> String;

    /// Load the whole collection. Failures here abort the run for this source.
    async fn load(&self) -> Result<Collection>;
}

/// A collection snapshot stored as JSON on disk.
///
/// Accepts either a full `{"source": .., "items": [..]}` document or a bare
/// item array.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum Snapshot {
    Full(Collection),
    Items(Vec<contentgen_shared::ContentItem>),
}

#[async_trait]
impl ContentSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Collection> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ContentGenError::io(&self.path, e))?;

        let collection = match serde_json::from_str::<Snapshot>(&raw) {
            Ok(Snapshot::Full(collection)) => collection,
            Ok(Snapshot::Items(items)) => Collection {
                source: self.describe(),
                items,
            },
            Err(e) => {
                return Err(ContentGenError::parse(format!(
                    "invalid collection snapshot {}: {e}",
                    self.path.display()
                )));
            }
        };

        info!(items = collection.items.len(), "collection loaded from file");
        Ok(collection)
    }
}

/// Pick a source for a `--from` argument: http(s) URLs are Dropmark
/// collections, anything else is a local snapshot path.
pub fn source_for(spec: &str, config: &HarvestConfig) -> Result<Box<dyn ContentSource>> {
    match Url::parse(spec) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            Ok(Box::new(DropmarkSource::new(url, config)?))
        }
        _ => Ok(Box::new(JsonFileSource::new(spec))),
    }
}
