//! Command-line interface

pub mod commands;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cotiza-cli",
    version,
    about = "Ingest and consolidate quoting-tool spreadsheet exports"
)]
pub struct Cli {
    /// Alternate config file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest one quote workbook and persist its record
    Ingest(IngestArgs),
    /// Process workbooks as a batch and publish a consolidated report
    Report(ReportArgs),
    /// Export persisted quotes to a consolidated workbook
    Export(ExportArgs),
    /// Aggregate statistics over persisted quotes
    Stats(StatsArgs),
}

#[derive(clap::Args)]
pub struct IngestArgs {
    /// Quote workbook to ingest
    pub file: PathBuf,
}

#[derive(clap::Args)]
pub struct ReportArgs {
    /// Quote workbooks to process
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(clap::Args)]
pub struct ExportArgs {
    /// Earliest processing date to include (YYYY-MM-DD)
    #[arg(long)]
    pub fecha_inicio: Option<NaiveDate>,

    /// Latest processing date to include (YYYY-MM-DD)
    #[arg(long)]
    pub fecha_fin: Option<NaiveDate>,

    /// Deal number substring
    #[arg(long)]
    pub num_deal: Option<String>,

    /// Client name substring
    #[arg(long)]
    pub cliente: Option<String>,

    /// Restrict product rows to one department
    #[arg(long)]
    pub departamento: Option<String>,

    /// Output workbook path
    #[arg(short, long, default_value = "consolidado.xlsx")]
    pub output: PathBuf,
}

#[derive(clap::Args)]
pub struct StatsArgs {
    /// Earliest processing date to include (YYYY-MM-DD)
    #[arg(long)]
    pub fecha_inicio: Option<NaiveDate>,

    /// Latest processing date to include (YYYY-MM-DD)
    #[arg(long)]
    pub fecha_fin: Option<NaiveDate>,
}
