//! cotiza-cli: backend for ingesting and consolidating quoting-tool
//! spreadsheet exports.

mod batch;
mod cli;
mod config;
mod export;
mod extract;
mod services;
mod storage;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use cli::commands::AppContext;
use cli::{Cli, Commands};
use config::Settings;
use storage::{LocalObjectStorage, ObjectStorage};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;
    settings.ensure_dirs()?;
    let pool = config::repository::connect(&settings.database_url).await?;
    let storage: Arc<dyn ObjectStorage> =
        Arc::new(LocalObjectStorage::new(settings.storage_dir.clone()));

    let ctx = AppContext {
        pool,
        storage,
        settings,
    };

    match cli.command {
        Commands::Ingest(args) => cli::commands::ingest::handle(&ctx, args).await,
        Commands::Report(args) => cli::commands::report::handle(&ctx, args).await,
        Commands::Export(args) => cli::commands::export::handle(&ctx, args).await,
        Commands::Stats(args) => cli::commands::stats::handle(&ctx, args).await,
    }
}
