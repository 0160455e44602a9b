//! Content sources for contentgen.
//!
//! This crate provides:
//! - [`ContentSource`]: the collection-loading seam
//! - [`JsonFileSource`]: local collection snapshots
//! - [`DropmarkSource`]: Dropmark collections over HTTP
//! - [`Harvester`]: target-resource resolution for curated links

pub mod dropmark;
pub mod harvester;
pub mod source;

pub use dropmark::DropmarkSource;
pub use harvester::{Harvester, extract_open_graph, unique_key};
pub use source::{ContentSource, JsonFileSource, source_for};
