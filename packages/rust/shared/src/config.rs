//! Application configuration for contentgen.
//!
//! User config lives at `~/.contentgen/contentgen.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ContentGenError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "contentgen.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".contentgen";

// ---------------------------------------------------------------------------
// Config structs (matching contentgen.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generator defaults.
    #[serde(default)]
    pub generator: GeneratorSection,

    /// HTTP client settings used for collections and harvesting.
    #[serde(default)]
    pub http: HttpSection,

    /// Score provider settings.
    #[serde(default)]
    pub scores: ScoresSection,

    /// Target-resource harvesting policy.
    #[serde(default)]
    pub harvest: HarvestSection,
}

/// `[generator]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSection {
    /// Collection identifier used to namespace the content and scores paths.
    #[serde(default = "default_content_id")]
    pub content_id: String,

    /// Create missing destination directories instead of failing.
    #[serde(default = "default_true")]
    pub create_dest_paths: bool,

    /// Number of items processed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Replace score providers with deterministic placeholders.
    #[serde(default)]
    pub simulate_scores: bool,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            content_id: default_content_id(),
            create_dest_paths: true,
            concurrency: default_concurrency(),
            simulate_scores: false,
        }
    }
}

fn default_content_id() -> String {
    "posts".into()
}
fn default_true() -> bool {
    true
}
fn default_concurrency() -> usize {
    8
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSection {
    /// User-Agent header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds.
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_http_timeout(),
        }
    }
}

fn default_user_agent() -> String {
    concat!("contentgen/", env!("CARGO_PKG_VERSION")).into()
}
fn default_http_timeout() -> u64 {
    90
}

/// `[scores]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoresSection {
    /// Upper bound for a single provider call, in seconds.
    #[serde(default = "default_score_timeout")]
    pub timeout_secs: u64,

    /// Facebook Graph endpoint.
    #[serde(default = "default_facebook_endpoint")]
    pub facebook_endpoint: String,

    /// LinkedIn share-count endpoint.
    #[serde(default = "default_linkedin_endpoint")]
    pub linkedin_endpoint: String,
}

impl Default for ScoresSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_score_timeout(),
            facebook_endpoint: default_facebook_endpoint(),
            linkedin_endpoint: default_linkedin_endpoint(),
        }
    }
}

fn default_score_timeout() -> u64 {
    15
}
fn default_facebook_endpoint() -> String {
    "https://graph.facebook.com/".into()
}
fn default_linkedin_endpoint() -> String {
    "https://www.linkedin.com/countserv/count/share".into()
}

/// `[harvest]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestSection {
    /// URL regex patterns; matching resources are ignored.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Concurrent resource fetches while loading a collection.
    #[serde(default = "default_harvest_concurrency")]
    pub concurrency: usize,
}

impl Default for HarvestSection {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            concurrency: default_harvest_concurrency(),
        }
    }
}

fn default_harvest_concurrency() -> usize {
    10
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime generator configuration.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Root of the static-site content store.
    pub home_path: PathBuf,
    /// Collection identifier (namespaces `content/` and `data/scores/`).
    pub content_id: String,
    /// Create missing destination directories.
    pub create_dest_paths: bool,
    /// Emit progress reporting.
    pub verbose: bool,
    /// Run with simulated score providers.
    pub simulate_scores: bool,
    /// Worker pool size.
    pub concurrency: usize,
}

impl GeneratorConfig {
    /// Build a runtime config for `home_path` from the loaded app config.
    pub fn from_app(config: &AppConfig, home_path: impl Into<PathBuf>) -> Self {
        Self {
            home_path: home_path.into(),
            content_id: config.generator.content_id.clone(),
            create_dest_paths: config.generator.create_dest_paths,
            verbose: false,
            simulate_scores: config.generator.simulate_scores,
            concurrency: config.generator.concurrency,
        }
    }

    /// `<home>/content/<content_id>`
    pub fn content_path(&self) -> PathBuf {
        self.home_path.join("content").join(&self.content_id)
    }

    /// `<home>/data/scores/<content_id>`
    pub fn scores_path(&self) -> PathBuf {
        self.home_path
            .join("data")
            .join("scores")
            .join(&self.content_id)
    }
}

/// Runtime score provider configuration.
#[derive(Debug, Clone)]
pub struct ScoresConfig {
    pub timeout: Duration,
    pub facebook_endpoint: String,
    pub linkedin_endpoint: String,
    pub user_agent: String,
}

impl From<&AppConfig> for ScoresConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.scores.timeout_secs),
            facebook_endpoint: config.scores.facebook_endpoint.clone(),
            linkedin_endpoint: config.scores.linkedin_endpoint.clone(),
            user_agent: config.http.user_agent.clone(),
        }
    }
}

/// Runtime configuration for loading collections and harvesting resources.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub ignore_patterns: Vec<String>,
    pub concurrency: usize,
}

impl From<&AppConfig> for HarvestConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.http.user_agent.clone(),
            timeout: Duration::from_secs(config.http.timeout_secs),
            ignore_patterns: config.harvest.ignore_patterns.clone(),
            concurrency: config.harvest.concurrency,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.contentgen/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ContentGenError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.contentgen/contentgen.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ContentGenError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ContentGenError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ContentGenError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ContentGenError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ContentGenError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
