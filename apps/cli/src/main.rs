//! contentgen CLI: curated collections to Hugo content.
//!
//! Reads Dropmark collections (or local JSON snapshots), writes one Markdown
//! document per item, and records engagement scores for every link.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
