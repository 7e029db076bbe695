//! Stats command handler

use anyhow::Result;

use super::AppContext;
use crate::cli::StatsArgs;
use crate::config::repository::processed::QuoteFilter;
use crate::services::ExportService;

pub async fn handle(ctx: &AppContext, args: StatsArgs) -> Result<()> {
    let filter = QuoteFilter {
        fecha_inicio: args.fecha_inicio,
        fecha_fin: args.fecha_fin,
        ..Default::default()
    };

    let service = ExportService::new(ctx.pool.clone());
    let stats = service.export_stats(&filter).await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
