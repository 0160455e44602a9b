//! Per-item content resolution.
//!
//! This crate provides:
//! - [`fields`]: title and summary resolution through the fallback chain
//! - [`identity`]: link validation, slugs, and globally-unique keys
//! - [`text`]: pure text helpers (slugs, hostnames, body front matter)

pub mod fields;
pub mod identity;
pub mod text;

pub use fields::{ResolvedFields, SummarySource, resolve_fields, resolve_summary};
pub use identity::{
    Identity, ResolvedIdentity, SkipReason, link_slug, plain_slug, resolve_identity, resolve_link,
};
pub use text::{make_url_safe, without_front_matter};
