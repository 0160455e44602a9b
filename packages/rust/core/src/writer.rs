//! Document writer: `<content dir>/<slug>.md` with YAML front matter.

use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use contentgen_shared::{ContentGenError, Result};

use crate::document::Document;

/// File name for a document.
pub fn content_filename(slug: &str) -> String {
    format!("{slug}.md")
}

/// `---\n<front matter>---\n<body>`; the body is written verbatim.
pub fn render(doc: &Document) -> Result<String> {
    let front_matter = serde_yaml::to_string(doc).map_err(|e| {
        ContentGenError::Serialization(format!("front matter for {:?}: {e}", doc.slug))
    })?;

    let mut out = String::with_capacity(front_matter.len() + doc.body.len() + 8);
    out.push_str("---\n");
    out.push_str(&front_matter);
    out.push_str("---\n");
    out.push_str(&doc.body);
    Ok(out)
}

/// Write a document into `content_dir`, replacing any previous version.
///
/// The file is written to a hidden sibling first and renamed into place. Each
/// write gets its own temp name, so concurrent writers of one slug never share
/// a temp file; the last rename wins.
pub fn write_document(content_dir: &Path, doc: &Document) -> Result<PathBuf> {
    if doc.slug.is_empty() {
        return Err(ContentGenError::validation(format!(
            "document {:?} has an empty slug",
            doc.title
        )));
    }
    let rendered = render(doc)?;
    let filename = content_filename(&doc.slug);
    let target = content_dir.join(&filename);
    let temp = content_dir.join(format!(".{filename}.{}.tmp", Uuid::now_v7()));

    std::fs::write(&temp, &rendered).map_err(|e| ContentGenError::io(&temp, e))?;
    if let Err(e) = std::fs::rename(&temp, &target) {
        let _ = std::fs::remove_file(&temp);
        return Err(ContentGenError::io(&target, e));
    }

    debug!(path = %target.display(), size = rendered.len(), "wrote document");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cg-writer-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn doc() -> Document {
        Document {
            link: Some("https://example.com/foo".into()),
            title: "Example Post".into(),
            summary: "A summary.".into(),
            categories: vec![],
            date: "Wed Jan 2 03:04:05 UTC 2019".into(),
            featured_image: None,
            source: Some("example.com".into()),
            slug: "example-example-post".into(),
            unique_key: Some("k1".into()),
            editor_url: None,
            total_shares_count: Some(12),
            provider_graphs: None,
            body: "Body text.\n\n---\nnot front matter\n".into(),
        }
    }

    #[test]
    fn render_layout() {
        let out = render(&doc()).unwrap();
        assert!(out.starts_with("---\nlink: "));
        assert!(out.contains("\ntitle: Example Post\n"));
        assert!(out.contains("description: A summary.\n"));
        assert!(out.contains("uniquekey: k1\n"));
        assert!(out.contains("totalSharesCount: 12\n"));
        assert!(!out.contains("categories"));
        assert!(!out.contains("featuredimage"));
        assert!(!out.contains("editorURL"));
        assert!(out.ends_with("---\nBody text.\n\n---\nnot front matter\n"));
    }

    #[test]
    fn front_matter_parses_back() {
        let out = render(&doc()).unwrap();
        let yaml = out
            .strip_prefix("---\n")
            .and_then(|rest| rest.split_once("---\n"))
            .map(|(fm, _)| fm)
            .unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(value["slug"].as_str(), Some("example-example-post"));
        assert_eq!(value["date"].as_str(), Some("Wed Jan 2 03:04:05 UTC 2019"));
    }

    #[test]
    fn writes_and_overwrites() {
        let dir = temp_dir();
        let path = write_document(&dir, &doc()).unwrap();
        assert_eq!(path, dir.join("example-example-post.md"));

        let mut second = doc();
        second.body = "Replaced.".into();
        write_document(&dir, &second).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("---\nReplaced."));
        let leftovers = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_slug_is_rejected() {
        let dir = temp_dir();
        let mut nameless = doc();
        nameless.slug = String::new();
        let err = write_document(&dir, &nameless).unwrap_err();
        assert!(matches!(err, ContentGenError::Validation { .. }));
        assert!(!dir.join(".md").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn concurrent_writers_of_one_slug_all_succeed() {
        let dir = temp_dir();
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let dir = dir.clone();
                std::thread::spawn(move || {
                    let mut same = doc();
                    same.body = format!("Writer {i}.");
                    write_document(&dir, &same)
                })
            })
            .collect();

        for handle in handles {
            let path = handle.join().unwrap().unwrap();
            assert_eq!(path, dir.join("example-example-post.md"));
        }
        let names: Vec<String> = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["example-example-post.md".to_string()]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = temp_dir().join("missing");
        let err = write_document(&dir, &doc()).unwrap_err();
        assert!(matches!(err, ContentGenError::Io { .. }));
    }
}
