//! Score aggregation across providers.
//!
//! The aggregate total sums valid results only. Invalid providers stay in
//! [`AggregateScore::results`] so they are persisted and counted, but they
//! never contribute a value.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use contentgen_content::ResolvedIdentity;
use contentgen_shared::{ContentGenError, Result, ScoresConfig};

use crate::facebook::FacebookGraphProvider;
use crate::linkedin::LinkedInCountProvider;
use crate::provider::{ScoreProvider, ScoreResult};
use crate::simulated::SimulatedProvider;

/// All provider results for one link plus their roll-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateScore {
    pub results: Vec<ScoreResult>,
    /// Sum of `value` over valid results.
    pub total: u64,
}

impl AggregateScore {
    pub fn from_results(results: Vec<ScoreResult>) -> Self {
        let total = results.iter().filter(|r| r.valid).map(|r| r.value).sum();
        Self { results, total }
    }

    /// Names of providers whose lookup failed.
    pub fn invalid_providers(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|r| !r.valid)
            .map(|r| r.provider.as_str())
    }
}

/// Fans a link out to every configured provider.
///
/// Simulation is fixed when the aggregator is built and applies to the whole run.
pub struct ScoreAggregator {
    providers: Vec<Arc<dyn ScoreProvider>>,
    timeout: Duration,
    simulated: bool,
}

impl ScoreAggregator {
    /// Aggregate over real providers, each call bounded by `timeout`.
    pub fn new(providers: Vec<Arc<dyn ScoreProvider>>, timeout: Duration) -> Self {
        Self {
            providers,
            timeout,
            simulated: false,
        }
    }

    /// Aggregate over deterministic placeholders with the given provider names.
    pub fn simulated(names: &[&str]) -> Self {
        let providers = names
            .iter()
            .map(|name| Arc::new(SimulatedProvider::new(*name)) as Arc<dyn ScoreProvider>)
            .collect();
        Self {
            providers,
            timeout: Duration::from_secs(1),
            simulated: true,
        }
    }

    /// Facebook Graph + LinkedIn, or their simulated stand-ins.
    pub fn from_config(config: &ScoresConfig, simulate: bool) -> Result<Self> {
        if simulate {
            return Ok(Self::simulated(&[
                FacebookGraphProvider::NAME,
                LinkedInCountProvider::NAME,
            ]));
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ContentGenError::Network(format!("failed to build HTTP client: {e}")))?;

        let providers: Vec<Arc<dyn ScoreProvider>> = vec![
            Arc::new(FacebookGraphProvider::new(client.clone(), &config.facebook_endpoint)?),
            Arc::new(LinkedInCountProvider::new(client, &config.linkedin_endpoint)?),
        ];

        Ok(Self::new(providers, config.timeout))
    }

    pub fn is_simulated(&self) -> bool {
        self.simulated
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Query every provider concurrently; results keep provider order.
    #[instrument(skip_all, fields(url = %identity.final_url, key = %identity.unique_key))]
    pub async fn aggregate(&self, identity: &ResolvedIdentity) -> AggregateScore {
        let lookups = self.providers.iter().map(|provider| async move {
            match tokio::time::timeout(self.timeout, provider.score(identity)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        provider = provider.name(),
                        timeout_ms = self.timeout.as_millis(),
                        "score lookup timed out"
                    );
                    ScoreResult::invalid(
                        provider.name(),
                        identity,
                        format!("timed out after {}ms", self.timeout.as_millis()),
                    )
                }
            }
        });

        let aggregate = AggregateScore::from_results(join_all(lookups).await);
        debug!(
            total = aggregate.total,
            invalid = aggregate.invalid_providers().count(),
            "scores aggregated"
        );
        aggregate
    }
}
