//! Text helpers: title cleanup, slugs, hostnames, and body front matter.
//!
//! Everything here is a pure function of its input; identical input always
//! yields an identical slug.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

// ---------------------------------------------------------------------------
// Titles and slugs
// ---------------------------------------------------------------------------

/// Collapse runs of whitespace and trim.
pub fn clean_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase, hyphen-separated identifier safe for URLs and file names.
///
/// Latin accents fold to ASCII; letters and digits of other scripts are kept
/// lowercased. Input without any letter or digit yields an empty string.
pub fn make_url_safe(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c == '\'' || c == '\u{2019}' {
            continue;
        }
        let folded = fold_char(c);
        if folded.is_none() && !c.is_alphanumeric() {
            pending_dash = true;
            continue;
        }
        if pending_dash && !slug.is_empty() {
            slug.push('-');
        }
        pending_dash = false;
        match folded {
            Some(s) => slug.push_str(s),
            None => slug.extend(c.to_lowercase()),
        }
    }

    slug
}

/// Map a character to its lowercase ASCII form, or `None` when it has none.
fn fold_char(c: char) -> Option<&'static str> {
    const ALNUM: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

    if c.is_ascii_alphanumeric() {
        let lower = c.to_ascii_lowercase();
        let idx = ALNUM.find(lower)?;
        return Some(&ALNUM[idx..idx + 1]);
    }

    let s = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "a",
        'æ' | 'Æ' => "ae",
        'ç' | 'Ç' => "c",
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => "i",
        'ñ' | 'Ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "o",
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => "u",
        'ý' | 'ÿ' | 'Ý' => "y",
        'ß' => "ss",
        '&' => "and",
        _ => return None,
    };
    Some(s)
}

// ---------------------------------------------------------------------------
// Hostnames
// ---------------------------------------------------------------------------

/// Host without a leading `www.`.
pub fn simplified_hostname(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// Simplified host with its last label removed (`example.com` → `example`).
pub fn hostname_without_tld(url: &Url) -> String {
    let host = simplified_hostname(url);
    match host.rsplit_once('.') {
        Some((name, _tld)) => name.to_string(),
        None => host,
    }
}

// ---------------------------------------------------------------------------
// Body front matter
// ---------------------------------------------------------------------------

/// Split a body into its `---` front matter block and the remaining text.
///
/// Returns `None` when the body does not open with a closed block.
pub fn split_front_matter(body: &str) -> Option<(&str, &str)> {
    let rest = body
        .strip_prefix("---\n")
        .or_else(|| body.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// The body with any leading front matter block removed.
pub fn without_front_matter(body: &str) -> &str {
    split_front_matter(body).map_or(body, |(_, rest)| rest)
}

/// A string value stored under `key` in the body's own front matter.
pub fn front_matter_str(body: &str, key: &str) -> Option<String> {
    let (yaml, _) = split_front_matter(body)?;
    let value: serde_yaml::Value = match serde_yaml::from_str(yaml) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "body front matter is not valid YAML");
            return None;
        }
    };
    value.get(key)?.as_str().map(str::to_string)
}

// ---------------------------------------------------------------------------
// First sentence
// ---------------------------------------------------------------------------

/// First sentence of the first prose paragraph of `text`.
///
/// Headings, fenced code, and images are skipped; Markdown links are reduced to
/// their text. Returns `None` when there is no prose.
pub fn first_sentence(text: &str) -> Option<String> {
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("valid regex"));
    static SENTENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(.+?[.!?])(?:\s|$)").expect("valid regex"));

    let mut paragraph: Vec<&str> = Vec::new();
    let mut in_code = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            in_code = !in_code;
            continue;
        }
        if in_code {
            continue;
        }
        if trimmed.is_empty() {
            if paragraph.is_empty() {
                continue;
            }
            break;
        }
        if trimmed.starts_with('#') || trimmed.starts_with("![") || trimmed.starts_with('<') {
            if paragraph.is_empty() {
                continue;
            }
            break;
        }
        paragraph.push(trimmed);
    }

    let joined = paragraph.join(" ");
    let plain = LINK_RE.replace_all(&joined, "$1");
    let plain = plain.trim();
    if plain.is_empty() {
        return None;
    }

    let sentence = SENTENCE_RE
        .captures(plain)
        .map_or(plain, |c| c.get(1).map_or(plain, |m| m.as_str()));
    Some(sentence.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_title_collapses_whitespace() {
        assert_eq!(clean_title("  Hello \n  World!  "), "Hello World!");
    }

    #[test]
    fn url_safe_slugs() {
        assert_eq!(make_url_safe("Hello World!"), "hello-world");
        assert_eq!(make_url_safe("example-Example Post"), "example-example-post");
        assert_eq!(make_url_safe("  --Rust's  2024 edition--  "), "rusts-2024-edition");
        assert_eq!(make_url_safe("Café & Crème"), "cafe-and-creme");
        assert_eq!(make_url_safe("?!  --"), "");
    }

    #[test]
    fn non_latin_titles_keep_their_letters() {
        assert_eq!(make_url_safe("日本語の記事"), "日本語の記事");
        assert_eq!(make_url_safe("Привет мир"), "привет-мир");
        assert_eq!(make_url_safe("Ελληνικά!"), "ελληνικά");
        assert_eq!(make_url_safe("Rust и Go"), "rust-и-go");
    }

    #[test]
    fn slugs_are_deterministic() {
        let input = "The  Quick/Brown: Fox?";
        assert_eq!(make_url_safe(input), make_url_safe(input));
        assert_eq!(make_url_safe(input), "the-quick-brown-fox");
    }

    #[test]
    fn hostnames() {
        let url = Url::parse("https://www.example.com/foo").unwrap();
        assert_eq!(simplified_hostname(&url), "example.com");
        assert_eq!(hostname_without_tld(&url), "example");

        let url = Url::parse("https://blog.example.org/").unwrap();
        assert_eq!(simplified_hostname(&url), "blog.example.org");
        assert_eq!(hostname_without_tld(&url), "blog.example");

        let url = Url::parse("http://localhost:8080/").unwrap();
        assert_eq!(hostname_without_tld(&url), "localhost");
    }

    #[test]
    fn splits_front_matter() {
        let body = "---\ndescription: From the body\ntags: [a]\n---\n# Heading\n\nText.";
        let (yaml, rest) = split_front_matter(body).unwrap();
        assert!(yaml.contains("description: From the body"));
        assert_eq!(rest, "# Heading\n\nText.");
        assert_eq!(without_front_matter(body), "# Heading\n\nText.");
        assert_eq!(
            front_matter_str(body, "description").as_deref(),
            Some("From the body")
        );
    }

    #[test]
    fn unclosed_front_matter_is_body() {
        let body = "---\ndescription: never closed\n";
        assert!(split_front_matter(body).is_none());
        assert_eq!(without_front_matter(body), body);
        assert!(front_matter_str(body, "description").is_none());
    }

    #[test]
    fn front_matter_non_string_value_is_ignored() {
        let body = "---\ndescription: 42\n---\nText.";
        assert_eq!(front_matter_str(body, "description"), None);
        let body = "---\ndescription: [unclosed\n---\nText.";
        assert_eq!(front_matter_str(body, "description"), None);
    }

    #[test]
    fn first_sentence_skips_headings_and_code() {
        let text = "# Title\n\n```\ncode. here.\n```\nThis is the first. And a second.";
        assert_eq!(first_sentence(text).as_deref(), Some("This is the first."));
    }

    #[test]
    fn first_sentence_strips_links_and_spans_lines() {
        let text = "Read [the guide](https://example.com/guide)\nbefore starting! Then more.";
        assert_eq!(
            first_sentence(text).as_deref(),
            Some("Read the guide before starting!")
        );
    }

    #[test]
    fn first_sentence_without_terminator_uses_paragraph() {
        assert_eq!(first_sentence("Just a fragment").as_deref(), Some("Just a fragment"));
        assert_eq!(first_sentence("\n\n# Only a heading\n"), None);
        assert_eq!(first_sentence(""), None);
    }
}
