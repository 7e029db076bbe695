//! Ingest command handler

use anyhow::{Result, bail};

use super::AppContext;
use crate::cli::IngestArgs;
use crate::services::IngestService;

pub async fn handle(ctx: &AppContext, args: IngestArgs) -> Result<()> {
    if !args.file.exists() {
        bail!("input file does not exist: {}", args.file.display());
    }

    let service = IngestService::new(ctx.pool.clone());
    let record = service.ingest_file(&args.file).await?;

    println!("Ingested {}", record.nombre_archivo);
    println!("  history id:    {}", record.history_id);
    println!("  deal:          {}", record.num_deal);
    println!("  quote:         {}", record.num_oferta);
    println!("  revision:      {}", record.revision);
    println!("  client:        {}", record.cliente);
    println!("  product lines: {}", record.total_productos);
    println!(
        "  sale total:    {:.2}",
        record.resumen_estadistico.total_precio_venta
    );
    Ok(())
}
