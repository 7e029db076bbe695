//! Report command handler

use anyhow::{Result, bail};

use super::AppContext;
use crate::cli::ReportArgs;
use crate::services::ReportService;

pub async fn handle(ctx: &AppContext, args: ReportArgs) -> Result<()> {
    for file in &args.files {
        if !file.exists() {
            bail!("input file does not exist: {}", file.display());
        }
    }

    let service = ReportService::new(
        ctx.pool.clone(),
        ctx.storage.clone(),
        ctx.settings.clone(),
    );
    let summary = service.generate_report(args.files).await?;

    println!(
        "Report {} generated in {:.2}s",
        summary.report_id, summary.processing_time
    );
    println!(
        "  files:   {} processed, {} with errors",
        summary.processed_files, summary.files_with_errors
    );
    println!("  records: {}", summary.total_records);
    println!("  url:     {}", summary.download_url);
    for error in &summary.errors {
        println!("  failed:  {}: {}", error.file, error.error);
    }
    Ok(())
}
