//! Generation pipeline: collection → documents + score artifacts.
//!
//! A fixed pool of workers pulls `(index, item)` pairs from a shared queue and
//! reports exactly one [`ItemOutcome`] per item on a completion channel. Only
//! the orchestrating task touches the error list and the counters.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument, warn};

use contentgen_content::{Identity, resolve_fields, resolve_identity};
use contentgen_scores::ScoreAggregator;
use contentgen_shared::{Collection, ContentGenError, ContentItem, GeneratorConfig, Result};

use crate::document::assemble;
use crate::persister::persist_scores;
use crate::writer::write_document;

// ---------------------------------------------------------------------------
// Errors and outcomes
// ---------------------------------------------------------------------------

/// Kind of per-item failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    /// The item was deliberately not turned into a document.
    Skip,
    /// A document or score artifact could not be written.
    Io,
    /// The worker handling the item stopped before reporting.
    Aborted,
}

/// A recorded, non-fatal failure tied to one collection item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("item {index}: {message}")]
pub struct GenerationError {
    pub index: usize,
    pub category: ErrorCategory,
    pub message: String,
}

impl GenerationError {
    fn new(index: usize, category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            index,
            category,
            message: message.into(),
        }
    }
}

#[derive(Debug)]
enum ItemStatus {
    Generated(PathBuf),
    Skipped,
    Failed,
}

/// What one worker reports for one item.
#[derive(Debug)]
struct ItemOutcome {
    index: usize,
    status: ItemStatus,
    errors: Vec<GenerationError>,
    invalid_providers: Vec<String>,
}

impl ItemOutcome {
    fn skipped(index: usize, error: Option<GenerationError>) -> Self {
        Self {
            index,
            status: ItemStatus::Skipped,
            errors: error.into_iter().collect(),
            invalid_providers: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary and report
// ---------------------------------------------------------------------------

/// Counters for a completed run, built from the completion channel.
///
/// `items_generated + items_skipped + items_failed == items_read`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub source: String,
    pub content_path: PathBuf,
    pub simulated: bool,
    pub items_read: usize,
    pub items_generated: usize,
    pub items_skipped: usize,
    pub items_failed: usize,
    /// Invalid score results per provider name.
    pub invalid_scores: BTreeMap<String, usize>,
    pub elapsed: Duration,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Generated {} posts in {:?} from {} items read ({:?}), skipped {}, failed {}, Simulating scores: {}",
            self.items_generated,
            self.content_path.display().to_string(),
            self.items_read,
            self.source,
            self.items_skipped,
            self.items_failed,
            self.simulated
        )?;
        for (provider, count) in &self.invalid_scores {
            write!(f, ", {provider} errors: {count}")?;
        }
        Ok(())
    }
}

/// Everything a completed run exposes.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub summary: RunSummary,
    /// Sorted by item index.
    pub errors: Vec<GenerationError>,
}

impl GenerationReport {
    pub fn errors_for(&self, index: usize) -> impl Iterator<Item = &GenerationError> {
        self.errors.iter().filter(move |e| e.index == index)
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting generation status.
pub trait ProgressReporter: Send + Sync {
    /// Called once before any item is dispatched.
    fn started(&self, source: &str, total: usize);
    /// Called once per completion signal.
    fn item_completed(&self, completed: usize, total: usize);
    /// Called when the run completes.
    fn finished(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn started(&self, _source: &str, _total: usize) {}
    fn item_completed(&self, _completed: usize, _total: usize) {}
    fn finished(&self, _summary: &RunSummary) {}
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

struct WorkerContext {
    content_dir: PathBuf,
    scores_dir: PathBuf,
    aggregator: ScoreAggregator,
}

/// Generates Hugo documents for one content collection at a time.
pub struct Generator {
    config: GeneratorConfig,
    ctx: Arc<WorkerContext>,
}

impl Generator {
    /// Validate or create the content and scores directories.
    ///
    /// This is the only fatal step; everything after it is recorded per item.
    #[instrument(
        skip_all,
        fields(home = %config.home_path.display(), content_id = %config.content_id)
    )]
    pub fn new(config: GeneratorConfig, aggregator: ScoreAggregator) -> Result<Self> {
        let content_dir = config.content_path();
        let scores_dir = config.scores_path();
        ensure_dir(&content_dir, config.create_dest_paths)?;
        ensure_dir(&scores_dir, config.create_dest_paths)?;

        Ok(Self {
            config,
            ctx: Arc::new(WorkerContext {
                content_dir,
                scores_dir,
                aggregator,
            }),
        })
    }

    pub fn content_dir(&self) -> &Path {
        &self.ctx.content_dir
    }

    pub fn scores_dir(&self) -> &Path {
        &self.ctx.scores_dir
    }

    /// Process every item of `collection` and wait for all of them.
    ///
    /// `progress` is only advanced when the config asks for verbose output.
    #[instrument(skip_all, fields(source = %collection.source, items = collection.items.len()))]
    pub async fn generate(
        &self,
        collection: Collection,
        progress: &dyn ProgressReporter,
    ) -> GenerationReport {
        let progress: &dyn ProgressReporter = if self.config.verbose {
            progress
        } else {
            &SilentProgress
        };
        let start = Instant::now();
        let total = collection.items.len();
        let source = collection.source;

        let mut summary = RunSummary {
            source: source.clone(),
            content_path: self.ctx.content_dir.clone(),
            simulated: self.ctx.aggregator.is_simulated(),
            items_read: total,
            invalid_scores: self
                .ctx
                .aggregator
                .provider_names()
                .into_iter()
                .map(|name| (name.to_string(), 0))
                .collect(),
            ..RunSummary::default()
        };
        let mut errors: Vec<GenerationError> = Vec::new();

        info!(total, "starting generation");
        progress.started(&source, total);

        let (work_tx, work_rx) = mpsc::unbounded_channel::<(usize, ContentItem)>();
        for entry in collection.items.into_iter().enumerate() {
            // The receiver is alive until the workers drop it.
            let _ = work_tx.send(entry);
        }
        drop(work_tx);

        let work_rx = Arc::new(Mutex::new(work_rx));
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<ItemOutcome>();
        let workers = self.config.concurrency.max(1).min(total.max(1));

        for worker in 0..workers {
            let work_rx = Arc::clone(&work_rx);
            let done_tx = done_tx.clone();
            let ctx = Arc::clone(&self.ctx);
            tokio::spawn(async move {
                loop {
                    let next = work_rx.lock().await.recv().await;
                    let Some((index, item)) = next else { break };
                    let outcome = process_item(&ctx, index, item).await;
                    if done_tx.send(outcome).is_err() {
                        break;
                    }
                }
                debug!(worker, "worker finished");
            });
        }
        drop(done_tx);

        let mut reported = vec![false; total];
        let mut completed = 0;
        while let Some(outcome) = done_rx.recv().await {
            completed += 1;
            reported[outcome.index] = true;
            match outcome.status {
                ItemStatus::Generated(path) => {
                    summary.items_generated += 1;
                    debug!(index = outcome.index, path = %path.display(), "document generated");
                }
                ItemStatus::Skipped => summary.items_skipped += 1,
                ItemStatus::Failed => summary.items_failed += 1,
            }
            for provider in outcome.invalid_providers {
                *summary.invalid_scores.entry(provider).or_default() += 1;
            }
            errors.extend(outcome.errors);
            progress.item_completed(completed, total);
        }

        // Every sender is gone; anything unreported belonged to a worker that died.
        for (index, _) in reported.iter().enumerate().filter(|(_, done)| !**done) {
            warn!(index, "item never reported a completion");
            completed += 1;
            summary.items_failed += 1;
            errors.push(GenerationError::new(
                index,
                ErrorCategory::Aborted,
                "worker stopped before reporting a result",
            ));
            progress.item_completed(completed, total);
        }

        errors.sort_by_key(|e| e.index);
        summary.elapsed = start.elapsed();

        info!(
            generated = summary.items_generated,
            skipped = summary.items_skipped,
            failed = summary.items_failed,
            errors = errors.len(),
            elapsed_ms = summary.elapsed.as_millis(),
            "generation complete"
        );
        progress.finished(&summary);

        GenerationReport { summary, errors }
    }
}

/// Resolve, score, assemble, and write one item.
async fn process_item(ctx: &WorkerContext, index: usize, item: ContentItem) -> ItemOutcome {
    let Some(fields) = resolve_fields(&item) else {
        warn!(index, kind = item.kind(), "unrecognized content item, skipping");
        return ItemOutcome::skipped(index, None);
    };

    let identity = resolve_identity(&item);
    let link = match &identity {
        Identity::Link(link) => Some(link),
        Identity::Plain { .. } => None,
        Identity::Skipped(reason) => {
            debug!(index, %reason, "skipping item");
            return ItemOutcome::skipped(
                index,
                Some(GenerationError::new(
                    index,
                    ErrorCategory::Skip,
                    format!("skipping item {index}: {reason}"),
                )),
            );
        }
        Identity::Unrecognized => return ItemOutcome::skipped(index, None),
    };

    let scores = match link {
        Some(link) => Some(ctx.aggregator.aggregate(link).await),
        None => None,
    };
    let invalid_providers: Vec<String> = scores
        .iter()
        .flat_map(|s| s.invalid_providers().map(str::to_string))
        .collect();

    let Some(doc) = assemble(&item, &fields, &identity, scores.as_ref()) else {
        return ItemOutcome::skipped(index, None);
    };

    let content_dir = ctx.content_dir.clone();
    let scores_dir = ctx.scores_dir.clone();
    let unique_key = link.map(|l| l.unique_key.clone());

    let written = tokio::task::spawn_blocking(move || {
        let document = write_document(&content_dir, &doc);
        let artifacts = match (&scores, &unique_key) {
            (Some(scores), Some(key)) => persist_scores(&scores_dir, key, scores),
            _ => Vec::new(),
        };
        (document, artifacts)
    })
    .await;

    let (document, artifacts) = match written {
        Ok(written) => written,
        Err(e) => {
            return ItemOutcome {
                index,
                status: ItemStatus::Failed,
                errors: vec![GenerationError::new(
                    index,
                    ErrorCategory::Io,
                    format!("write task for item {index} failed: {e}"),
                )],
                invalid_providers,
            };
        }
    };

    let mut errors = Vec::new();
    let status = match document {
        Ok(path) => ItemStatus::Generated(path),
        Err(e) => {
            warn!(index, error = %e, "document write failed");
            errors.push(GenerationError::new(
                index,
                ErrorCategory::Io,
                format!("error writing document for item {index}: {e}"),
            ));
            ItemStatus::Failed
        }
    };
    for artifact in artifacts {
        if let Err(e) = artifact {
            warn!(index, error = %e, "score artifact write failed");
            errors.push(GenerationError::new(
                index,
                ErrorCategory::Io,
                format!("error writing score artifact for item {index}: {e}"),
            ));
        }
    }

    ItemOutcome {
        index,
        status,
        errors,
        invalid_providers,
    }
}

fn ensure_dir(dir: &Path, create: bool) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if !create {
        return Err(ContentGenError::validation(format!(
            "destination directory {} does not exist",
            dir.display()
        )));
    }
    std::fs::create_dir_all(dir).map_err(|e| ContentGenError::io(dir, e))?;
    info!(path = %dir.display(), "created destination directory");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
