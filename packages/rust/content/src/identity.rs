//! Link identity resolution: canonical URL, hostname, slug, and unique key.

use serde::Serialize;
use url::Url;

use contentgen_shared::{ContentItem, TargetResource};

use crate::text::{clean_title, hostname_without_tld, make_url_safe, simplified_hostname};

/// Identity of a curated link whose resource passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedIdentity {
    /// URL after redirects.
    pub final_url: Url,
    /// Host without `www.`.
    pub hostname: String,
    pub slug: String,
    pub unique_key: String,
}

/// Why an item produces no document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("missing target resource")]
    MissingTarget,

    #[error("ignored resource {url:?}: {reason}")]
    Ignored { url: String, reason: String },

    #[error(
        "invalid resource URL {url:?}; url valid: {url_valid}, destination valid: {destination_valid}"
    )]
    Invalid {
        url: String,
        url_valid: bool,
        destination_valid: bool,
    },

    #[error("final URL is missing or empty for {url:?}")]
    UnresolvedFinalUrl { url: String },

    #[error("title {title:?} has no letters or digits to build a slug from")]
    EmptySlug { title: String },
}

/// Result of identity resolution for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// A curated link with a validated resource.
    Link(ResolvedIdentity),
    /// Plain content; only a slug.
    Plain { slug: String },
    /// An item that must not produce a document.
    Skipped(SkipReason),
    /// The item variant is not recognized.
    Unrecognized,
}

impl Identity {
    /// Slug of a resolvable item.
    pub fn slug(&self) -> Option<&str> {
        match self {
            Self::Link(identity) => Some(&identity.slug),
            Self::Plain { slug } => Some(slug),
            Self::Skipped(_) | Self::Unrecognized => None,
        }
    }
}

/// Resolve the identity of an item.
pub fn resolve_identity(item: &ContentItem) -> Identity {
    match item {
        ContentItem::Curated(curated) => {
            match resolve_link(curated.target.as_ref(), &curated.content.title) {
                Ok(identity) => Identity::Link(identity),
                Err(reason) => Identity::Skipped(reason),
            }
        }
        ContentItem::Plain(content) => match plain_slug(&content.title) {
            slug if slug.is_empty() => Identity::Skipped(SkipReason::EmptySlug {
                title: content.title.clone(),
            }),
            slug => Identity::Plain { slug },
        },
        ContentItem::Unknown => Identity::Unrecognized,
    }
}

/// Validate a target resource and derive the link identity.
pub fn resolve_link(
    target: Option<&TargetResource>,
    title: &str,
) -> Result<ResolvedIdentity, SkipReason> {
    let resource = target.ok_or(SkipReason::MissingTarget)?;

    if let Some(reason) = &resource.ignore_reason {
        return Err(SkipReason::Ignored {
            url: resource.original_url.clone(),
            reason: reason.clone(),
        });
    }

    if !resource.url_valid || !resource.destination_valid {
        return Err(SkipReason::Invalid {
            url: resource.original_url.clone(),
            url_valid: resource.url_valid,
            destination_valid: resource.destination_valid,
        });
    }

    let final_url = resource
        .final_url
        .as_ref()
        .filter(|u| !u.as_str().is_empty() && u.host_str().is_some_and(|h| !h.is_empty()))
        .ok_or_else(|| SkipReason::UnresolvedFinalUrl {
            url: resource.original_url.clone(),
        })?;

    Ok(ResolvedIdentity {
        final_url: final_url.clone(),
        hostname: simplified_hostname(final_url),
        slug: link_slug(final_url, title),
        unique_key: resource.unique_key.clone(),
    })
}

/// `make_url_safe(hostname_without_tld + "-" + cleaned_title)`
pub fn link_slug(final_url: &Url, title: &str) -> String {
    make_url_safe(&format!(
        "{}-{}",
        hostname_without_tld(final_url),
        clean_title(title)
    ))
}

/// `make_url_safe(cleaned_title)`
pub fn plain_slug(title: &str) -> String {
    make_url_safe(&clean_title(title))
}
