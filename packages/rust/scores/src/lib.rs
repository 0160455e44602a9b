//! Engagement scores for curated links.
//!
//! This crate provides:
//! - [`ScoreProvider`]: the provider seam and [`ScoreResult`] record
//! - [`FacebookGraphProvider`], [`LinkedInCountProvider`]: HTTP providers
//! - [`SimulatedProvider`]: deterministic placeholders for offline runs
//! - [`ScoreAggregator`]: concurrent lookup with per-call timeouts

pub mod aggregate;
pub mod facebook;
pub mod linkedin;
pub mod provider;
pub mod simulated;

pub use aggregate::{AggregateScore, ScoreAggregator};
pub use facebook::FacebookGraphProvider;
pub use linkedin::LinkedInCountProvider;
pub use provider::{ScoreProvider, ScoreResult};
pub use simulated::{SimulatedProvider, simulated_value};
