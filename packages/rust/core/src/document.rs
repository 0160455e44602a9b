//! Document assembly: resolved fields + identity + scores → one Hugo document.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use contentgen_content::{Identity, ResolvedFields, without_front_matter};
use contentgen_scores::AggregateScore;
use contentgen_shared::{ContentItem, EDITOR_URL_DIRECTIVE};

/// Front-matter date layout, e.g. `Wed Jan 2 03:04:05 UTC 2019`.
pub const DATE_FORMAT: &str = "%a %b %-d %H:%M:%S %Z %Y";

/// A static-site document. Every field except `body` is front matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub title: String,
    #[serde(rename = "description")]
    pub summary: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    pub date: String,
    #[serde(rename = "featuredimage", skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    /// Simplified hostname of the link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub slug: String,
    #[serde(rename = "uniquekey", skip_serializing_if = "Option::is_none")]
    pub unique_key: Option<String>,
    #[serde(rename = "editorURL", skip_serializing_if = "Option::is_none")]
    pub editor_url: Option<String>,
    #[serde(rename = "totalSharesCount", skip_serializing_if = "Option::is_none")]
    pub total_shares_count: Option<u64>,
    /// Valid provider values keyed by provider name.
    #[serde(rename = "providerGraphs", skip_serializing_if = "Option::is_none")]
    pub provider_graphs: Option<BTreeMap<String, u64>>,
    /// Raw body with any leading front matter removed.
    #[serde(skip)]
    pub body: String,
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Combine the per-item resolution results.
///
/// Returns `None` when the identity was skipped or the variant is not recognized.
pub fn assemble(
    item: &ContentItem,
    fields: &ResolvedFields,
    identity: &Identity,
    scores: Option<&AggregateScore>,
) -> Option<Document> {
    let content = item.content()?;

    let mut doc = Document {
        link: None,
        title: fields.title.clone(),
        summary: fields.summary.clone(),
        categories: content.categories.clone(),
        date: format_date(&content.created_on),
        featured_image: content.featured_image.as_ref().map(|u| u.to_string()),
        source: None,
        slug: String::new(),
        unique_key: None,
        editor_url: content
            .directive_str(EDITOR_URL_DIRECTIVE)
            .filter(|u| !u.is_empty())
            .map(str::to_string),
        total_shares_count: None,
        provider_graphs: None,
        body: without_front_matter(&content.body).to_string(),
    };

    match identity {
        Identity::Link(link) => {
            doc.link = Some(link.final_url.to_string());
            doc.source = Some(link.hostname.clone());
            doc.slug = link.slug.clone();
            doc.unique_key = Some(link.unique_key.clone());
            if let Some(scores) = scores {
                doc.total_shares_count = Some(scores.total);
                let graphs: BTreeMap<String, u64> = scores
                    .results
                    .iter()
                    .filter(|r| r.valid)
                    .map(|r| (r.provider.clone(), r.value))
                    .collect();
                doc.provider_graphs = (!graphs.is_empty()).then_some(graphs);
            }
        }
        Identity::Plain { slug } => doc.slug = slug.clone(),
        Identity::Skipped(_) | Identity::Unrecognized => return None,
    }

    Some(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use contentgen_content::{SkipReason, resolve_fields, resolve_identity};
    use contentgen_scores::ScoreResult;
    use contentgen_shared::{Content, CuratedContent, OpenGraph, TargetResource};
    use url::Url;

    fn content(title: &str, body: &str) -> Content {
        Content {
            title: title.into(),
            summary: "Original summary.".into(),
            body: body.into(),
            categories: vec!["news".into()],
            created_on: Utc.with_ymd_and_hms(2019, 1, 2, 3, 4, 5).unwrap(),
            featured_image: None,
            directives: Default::default(),
        }
    }

    fn curated() -> ContentItem {
        ContentItem::Curated(CuratedContent {
            content: content("Example  Post", "First sentence here. More."),
            target: Some(TargetResource {
                original_url: "https://example.com/foo".into(),
                url_valid: true,
                destination_valid: true,
                final_url: Some(Url::parse("https://www.example.com/foo").unwrap()),
                ignore_reason: None,
                unique_key: "k1".into(),
                open_graph: OpenGraph::default(),
            }),
        })
    }

    #[test]
    fn date_uses_fixed_layout() {
        let date = Utc.with_ymd_and_hms(2019, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_date(&date), "Wed Jan 2 03:04:05 UTC 2019");
    }

    #[test]
    fn assembles_link_document_with_scores() {
        let item = curated();
        let fields = resolve_fields(&item).unwrap();
        let identity = resolve_identity(&item);
        let Identity::Link(link) = &identity else {
            panic!("expected link identity");
        };
        let scores = AggregateScore::from_results(vec![
            ScoreResult::valid("facebook", link, 5),
            ScoreResult::invalid("linkedin", link, "boom"),
        ]);

        let doc = assemble(&item, &fields, &identity, Some(&scores)).unwrap();
        assert_eq!(doc.link.as_deref(), Some("https://www.example.com/foo"));
        assert_eq!(doc.source.as_deref(), Some("example.com"));
        assert_eq!(doc.slug, "example-example-post");
        assert_eq!(doc.unique_key.as_deref(), Some("k1"));
        assert_eq!(doc.total_shares_count, Some(5));
        let graphs = doc.provider_graphs.unwrap();
        assert_eq!(graphs.get("facebook"), Some(&5));
        assert!(!graphs.contains_key("linkedin"));
        assert_eq!(doc.summary, "First sentence here.");
    }

    #[test]
    fn plain_document_has_no_link_fields() {
        let item = ContentItem::Plain(content("Hello World", "---\ndescription: FM\n---\nBody."));
        let fields = resolve_fields(&item).unwrap();
        let doc = assemble(&item, &fields, &resolve_identity(&item), None).unwrap();
        assert_eq!(doc.slug, "hello-world");
        assert!(doc.link.is_none() && doc.unique_key.is_none() && doc.source.is_none());
        assert_eq!(doc.summary, "FM");
        assert_eq!(doc.body, "Body.");
    }

    #[test]
    fn editor_url_directive_is_copied() {
        let mut c = content("Hello", "Body.");
        c.directives.insert(
            EDITOR_URL_DIRECTIVE.into(),
            serde_json::Value::String("https://edit.example.com/1".into()),
        );
        let item = ContentItem::Plain(c);
        let fields = resolve_fields(&item).unwrap();
        let doc = assemble(&item, &fields, &resolve_identity(&item), None).unwrap();
        assert_eq!(doc.editor_url.as_deref(), Some("https://edit.example.com/1"));
    }

    #[test]
    fn skipped_identity_yields_nothing() {
        let item = curated();
        let fields = resolve_fields(&item).unwrap();
        let identity = Identity::Skipped(SkipReason::MissingTarget);
        assert!(assemble(&item, &fields, &identity, None).is_none());
    }
}
