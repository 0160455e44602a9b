//! Shared types, error model, and configuration for contentgen.
//!
//! This crate is the foundation depended on by all other contentgen crates.
//! It provides:
//! - [`ContentGenError`]: the unified error type
//! - The content model ([`Collection`], [`ContentItem`], [`TargetResource`])
//! - Configuration ([`AppConfig`], runtime configs, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, GeneratorConfig, GeneratorSection, HarvestConfig, HarvestSection, HttpSection,
    ScoresConfig, ScoresSection, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{ContentGenError, Result};
pub use types::{
    Collection, Content, ContentItem, CuratedContent, EDITOR_URL_DIRECTIVE, OpenGraph,
    TargetResource,
};
