//! `bithealth` command-line entry point.

mod cli;
mod commands;
mod logging;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.log_format);

    info!("Starting bithealth v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.rag_config().context("invalid configuration")?;
    let service = commands::build_service(&cli, &config).await?;

    if let Some(seed) = &cli.seed {
        let outcomes = service.batch_ingest(commands::read_inputs(seed)?).await;
        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        info!(seeded = outcomes.len() - failed, failed, "seed documents ingested");
    }

    let output = commands::execute(&service, &config, &cli).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
