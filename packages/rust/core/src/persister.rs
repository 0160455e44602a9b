//! Score persister: one JSON artifact per provider result.

use std::path::{Path, PathBuf};

use tracing::debug;

use contentgen_scores::{AggregateScore, ScoreResult};
use contentgen_shared::{ContentGenError, Result};

/// `<unique key>.<provider>.json`, or `<unique key>.<provider>-error.json` for
/// invalid results.
pub fn score_artifact_filename(unique_key: &str, result: &ScoreResult) -> String {
    if result.valid {
        format!("{unique_key}.{}.json", result.provider)
    } else {
        format!("{unique_key}.{}-error.json", result.provider)
    }
}

/// Write one artifact.
pub fn write_score(scores_dir: &Path, unique_key: &str, result: &ScoreResult) -> Result<PathBuf> {
    let path = scores_dir.join(score_artifact_filename(unique_key, result));
    let json = serde_json::to_string_pretty(result).map_err(|e| {
        ContentGenError::Serialization(format!("score {}: {e}", path.display()))
    })?;
    std::fs::write(&path, json).map_err(|e| ContentGenError::io(&path, e))?;
    debug!(path = %path.display(), valid = result.valid, "wrote score artifact");
    Ok(path)
}

/// Write every result of an aggregate. One failure does not stop the others.
pub fn persist_scores(
    scores_dir: &Path,
    unique_key: &str,
    scores: &AggregateScore,
) -> Vec<Result<PathBuf>> {
    scores
        .results
        .iter()
        .map(|result| write_score(scores_dir, unique_key, result))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentgen_content::ResolvedIdentity;
    use url::Url;

    fn identity() -> ResolvedIdentity {
        ResolvedIdentity {
            final_url: Url::parse("https://example.com/foo").unwrap(),
            hostname: "example.com".into(),
            slug: "example-foo".into(),
            unique_key: "k1".into(),
        }
    }

    #[test]
    fn error_suffix_only_for_invalid() {
        let id = identity();
        let ok = ScoreResult::valid("facebook", &id, 3);
        let bad = ScoreResult::invalid("linkedin", &id, "timed out");
        assert_eq!(score_artifact_filename("k1", &ok), "k1.facebook.json");
        assert_eq!(score_artifact_filename("k1", &bad), "k1.linkedin-error.json");
    }

    #[test]
    fn persists_each_result() {
        let dir = std::env::temp_dir().join(format!("cg-scores-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();

        let id = identity();
        let scores = AggregateScore::from_results(vec![
            ScoreResult::valid("facebook", &id, 3),
            ScoreResult::invalid("linkedin", &id, "timed out"),
        ]);
        let written = persist_scores(&dir, "k1", &scores);
        assert!(written.iter().all(|r| r.is_ok()));

        let raw = std::fs::read_to_string(dir.join("k1.linkedin-error.json")).unwrap();
        let back: ScoreResult = serde_json::from_str(&raw).unwrap();
        assert!(!back.valid);
        assert_eq!(back.error.as_deref(), Some("timed out"));
        assert!(dir.join("k1.facebook.json").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directory_reports_each_failure() {
        let dir = std::env::temp_dir().join(format!("cg-scores-missing-{}", uuid::Uuid::now_v7()));
        let id = identity();
        let scores = AggregateScore::from_results(vec![
            ScoreResult::valid("facebook", &id, 1),
            ScoreResult::valid("linkedin", &id, 2),
        ]);
        let written = persist_scores(&dir, "k1", &scores);
        assert_eq!(written.iter().filter(|r| r.is_err()).count(), 2);
    }
}
