//! Export command handler

use anyhow::Result;

use super::AppContext;
use crate::cli::ExportArgs;
use crate::config::repository::processed::QuoteFilter;
use crate::services::ExportService;

pub async fn handle(ctx: &AppContext, args: ExportArgs) -> Result<()> {
    let filter = QuoteFilter {
        fecha_inicio: args.fecha_inicio,
        fecha_fin: args.fecha_fin,
        num_deal: args.num_deal,
        cliente: args.cliente,
    };

    let service = ExportService::new(ctx.pool.clone());
    let summary = service
        .export_filtered(&filter, args.departamento.as_deref(), &args.output)
        .await?;

    println!("Exported {} product rows", summary.total_records);
    println!("  quotes:  {}", summary.total_files);
    println!("  deals:   {}", summary.unique_deals);
    println!("  clients: {}", summary.unique_clients);
    println!("  range:   {}", summary.date_range);
    println!("  output:  {}", args.output.display());
    Ok(())
}
