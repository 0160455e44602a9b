//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use contentgen_core::{Generator, ProgressReporter, RunSummary};
use contentgen_scores::ScoreAggregator;
use contentgen_shared::{
    AppConfig, GeneratorConfig, HarvestConfig, ScoresConfig, init_config, load_config,
};
use contentgen_source::source_for;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// contentgen: turn curated collections into Hugo content.
#[derive(Parser)]
#[command(
    name = "contentgen",
    version,
    about = "Generate Hugo content and engagement scores from curated link collections.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate Hugo content from one or more collections.
    Hugo(HugoArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for `contentgen hugo`.
#[derive(Args, Debug)]
pub(crate) struct HugoArgs {
    /// Root of the Hugo site (content/ and data/ live below it).
    pub home: PathBuf,

    /// Collection to read: a Dropmark collection URL or a JSON snapshot path.
    /// Repeat to generate several collections in order.
    #[arg(long = "from", required = true)]
    pub from: Vec<String>,

    /// Collection identifier under content/ and data/scores/.
    #[arg(long)]
    pub content_id: Option<String>,

    /// Don't call Facebook, LinkedIn, etc.; simulate the values instead.
    #[arg(long)]
    pub simulate_scores: bool,

    /// Print an activity summary after each collection.
    #[arg(short, long)]
    pub summarize: bool,

    /// Hide the progress bar.
    #[arg(long)]
    pub no_progress: bool,

    /// Items processed concurrently.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// HTTP User-Agent header value.
    #[arg(long)]
    pub http_user_agent: Option<String>,

    /// Seconds to wait before giving up on an HTTP request.
    #[arg(long)]
    pub http_timeout_secs: Option<u64>,

    /// Fail instead of creating missing destination directories.
    #[arg(long)]
    pub no_create_dirs: bool,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = [
        "contentgen_cli",
        "contentgen_core",
        "contentgen_source",
        "contentgen_scores",
        "contentgen_content",
        "contentgen_shared",
    ]
    .iter()
    .map(|target| format!("{target}={level}"))
    .collect::<Vec<_>>()
    .join(",");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Hugo(args) => cmd_hugo(args).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// Fold command-line flags over the loaded config.
fn apply_overrides(config: &mut AppConfig, args: &HugoArgs) {
    if let Some(content_id) = &args.content_id {
        config.generator.content_id = content_id.clone();
    }
    if args.simulate_scores {
        config.generator.simulate_scores = true;
    }
    if let Some(concurrency) = args.concurrency {
        config.generator.concurrency = concurrency;
    }
    if args.no_create_dirs {
        config.generator.create_dest_paths = false;
    }
    if let Some(agent) = args.http_user_agent.as_ref().filter(|a| !a.is_empty()) {
        config.http.user_agent = agent.clone();
    }
    if let Some(secs) = args.http_timeout_secs.filter(|s| *s > 0) {
        config.http.timeout_secs = secs;
    }
}

async fn cmd_hugo(args: HugoArgs) -> Result<()> {
    let mut config = load_config()?;
    apply_overrides(&mut config, &args);

    let mut generator_config = GeneratorConfig::from_app(&config, &args.home);
    generator_config.verbose = !args.no_progress;
    let harvest_config = HarvestConfig::from(&config);
    let scores_config = ScoresConfig::from(&config);

    info!(
        home = %args.home.display(),
        content_id = %generator_config.content_id,
        simulate = generator_config.simulate_scores,
        user_agent = %harvest_config.user_agent,
        timeout_secs = harvest_config.timeout.as_secs(),
        "starting hugo generation"
    );

    let aggregator =
        ScoreAggregator::from_config(&scores_config, generator_config.simulate_scores)?;
    let generator = Generator::new(generator_config, aggregator)?;

    let mut failed_sources = Vec::new();
    for spec in &args.from {
        let source = source_for(spec, &harvest_config)?;
        let collection = match source.load().await {
            Ok(collection) => collection,
            Err(e) => {
                error!(source = %spec, error = %e, "failed to load collection");
                failed_sources.push(spec.clone());
                continue;
            }
        };

        let reporter = CliProgress::new();
        let report = generator.generate(collection, &reporter).await;

        for err in &report.errors {
            warn!(index = err.index, category = ?err.category, "{}", err.message);
        }
        if args.summarize {
            println!("{}", report.summary);
        }
    }

    if failed_sources.is_empty() {
        Ok(())
    } else {
        Err(eyre!(
            "could not load {} collection(s): {}",
            failed_sources.len(),
            failed_sources.join(", ")
        ))
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar, one tick per item.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn started(&self, source: &str, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_message(source.to_string());
    }

    fn item_completed(&self, completed: usize, _total: usize) {
        self.bar.set_position(completed as u64);
    }

    fn finished(&self, summary: &RunSummary) {
        self.bar.finish_with_message(format!(
            "Completed generating Hugo items from {:?}",
            summary.source
        ));
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
