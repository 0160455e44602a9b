//! Document generation for contentgen.
//!
//! This crate ties together field resolution, link identity, score aggregation,
//! and file output into the concurrent [`Generator`] pipeline.

pub mod document;
pub mod persister;
pub mod pipeline;
pub mod writer;

pub use document::{DATE_FORMAT, Document, assemble, format_date};
pub use persister::{persist_scores, score_artifact_filename, write_score};
pub use pipeline::{
    ErrorCategory, GenerationError, GenerationReport, Generator, ProgressReporter, RunSummary,
    SilentProgress,
};
pub use writer::{content_filename, render, write_document};
