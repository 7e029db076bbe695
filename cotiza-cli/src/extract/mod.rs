//! Spreadsheet-to-record extraction engine
//!
//! Turns one quoting-tool workbook into the canonical product-line schema in
//! three stages: locate the real header row and reshape the sheet into a
//! clean table, derive the fields the template only encodes positionally,
//! then project onto the canonical columns. The result is either a table (for
//! bulk consolidation) or a nested record (for single-file ingestion).

pub mod anchors;
pub mod derive;
pub mod project;
pub mod record;
pub mod reshape;
pub mod table;

pub use anchors::{AnchorLayout, QuoteMeta};
pub use record::{ProcessedQuote, ProductLine, ResumenEstadistico};
pub use table::Table;

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Reader, Xlsx, open_workbook};
use log::debug;

/// Run the full extraction pipeline over the first worksheet of `path`,
/// producing the canonical product-line table (bulk mode).
pub fn extract_product_lines(path: &Path) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .context("Workbook has no worksheets")?
        .context("Failed to read first worksheet")?;
    let table = Table::from_range(&range);

    let meta = anchors::extract_meta(&table);
    let reshaped = reshape::reshape(&table);
    let retained = reshape::product_row_indices(&reshaped);
    let enriched = derive::derive_fields(&reshaped, &retained, &meta);
    let canonical = project::project(&enriched);
    debug!(
        "extracted {} product lines from {}",
        canonical.height(),
        path.display()
    );
    Ok(canonical)
}

/// Run the pipeline and convert the result to the persisted record form
/// (single-file mode).
pub fn extract_record(path: &Path) -> Result<ProcessedQuote> {
    let table = extract_product_lines(path)?;
    let nombre = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    Ok(ProcessedQuote::from_table(&table, nombre))
}
