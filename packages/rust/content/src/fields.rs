//! Title and summary resolution.
//!
//! The summary is taken from the first source that yields a non-empty string:
//!
//! 1. `description` in the body's own front matter
//! 2. the open-graph description of the target resource
//! 3. the first sentence of the body (front matter excluded)
//! 4. the item's original summary
//!
//! Later sources are never consulted once one succeeds.

use contentgen_shared::ContentItem;

use crate::text::{clean_title, first_sentence, front_matter_str, without_front_matter};

/// Which tier produced the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySource {
    BodyFrontMatter,
    OpenGraph,
    FirstSentence,
    Original,
}

/// Title and summary for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFields {
    pub title: String,
    pub summary: String,
    pub summary_source: SummarySource,
}

/// Resolve title and summary for a recognized item; `None` for unknown variants.
pub fn resolve_fields(item: &ContentItem) -> Option<ResolvedFields> {
    let content = item.content()?;
    let og = item.open_graph();

    let title = og
        .and_then(|og| og.title.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| clean_title(&content.title));

    let og_description = og.and_then(|og| og.description.as_deref());
    let (summary, summary_source) =
        resolve_summary(&content.body, og_description, &content.summary);

    Some(ResolvedFields {
        title,
        summary,
        summary_source,
    })
}

/// Walk the summary tiers in order and return the first non-empty value.
pub fn resolve_summary(
    body: &str,
    og_description: Option<&str>,
    original: &str,
) -> (String, SummarySource) {
    if let Some(s) = non_empty(front_matter_str(body, "description")) {
        return (s, SummarySource::BodyFrontMatter);
    }
    if let Some(s) = non_empty(og_description.map(str::to_string)) {
        return (s, SummarySource::OpenGraph);
    }
    if let Some(s) = non_empty(first_sentence(without_front_matter(body))) {
        return (s, SummarySource::FirstSentence);
    }

    (original.trim().to_string(), SummarySource::Original)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
