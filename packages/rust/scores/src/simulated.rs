//! Deterministic placeholder scores for runs that must not call real APIs.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use contentgen_content::ResolvedIdentity;

use crate::provider::{ScoreProvider, ScoreResult};

/// Stands in for a named provider; the value depends only on the name and the unique key.
pub struct SimulatedProvider {
    name: String,
}

impl SimulatedProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Placeholder value in `0..1000`.
pub fn simulated_value(provider: &str, unique_key: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(provider.as_bytes());
    hasher.update(b":");
    hasher.update(unique_key.as_bytes());
    let digest = hasher.finalize();
    u64::from(u16::from_be_bytes([digest[0], digest[1]])) % 1000
}

#[async_trait]
impl ScoreProvider for SimulatedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn score(&self, identity: &ResolvedIdentity) -> ScoreResult {
        let mut result = ScoreResult::valid(
            &self.name,
            identity,
            simulated_value(&self.name, &identity.unique_key),
        );
        result.simulated = true;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn values_are_deterministic_and_bounded() {
        let a = simulated_value("facebook", "key-1");
        assert_eq!(a, simulated_value("facebook", "key-1"));
        assert!(a < 1000);
    }

    #[tokio::test]
    async fn results_are_marked_simulated() {
        let identity = ResolvedIdentity {
            final_url: Url::parse("https://example.com/foo").unwrap(),
            hostname: "example.com".into(),
            slug: "example-foo".into(),
            unique_key: "key-1".into(),
        };
        let provider = SimulatedProvider::new("linkedin");
        let result = provider.score(&identity).await;
        assert!(result.valid);
        assert!(result.simulated);
        assert_eq!(result.value, simulated_value("linkedin", "key-1"));
    }
}
