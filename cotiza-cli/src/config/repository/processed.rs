//! Repository for processed quote documents
//!
//! The nested parts of a `ProcessedQuote` (product lines, statistical
//! summary) are stored as JSON columns; the header fields are real columns so
//! the export filters run in SQL.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::extract::ProcessedQuote;

/// Filters for the consolidated export and its stats preview.
#[derive(Debug, Clone, Default)]
pub struct QuoteFilter {
    /// Inclusive start date on `created_at`.
    pub fecha_inicio: Option<NaiveDate>,
    /// Inclusive end date on `created_at`.
    pub fecha_fin: Option<NaiveDate>,
    /// Deal number substring.
    pub num_deal: Option<String>,
    /// Client name substring.
    pub cliente: Option<String>,
}

impl QuoteFilter {
    fn start_bound(&self) -> Option<DateTime<Utc>> {
        self.fecha_inicio
            .map(|d| d.and_hms_opt(0, 0, 0).expect("valid time").and_utc())
    }

    fn end_bound(&self) -> Option<DateTime<Utc>> {
        self.fecha_fin
            .map(|d| d.and_hms_opt(23, 59, 59).expect("valid time").and_utc())
    }

    /// Human-readable range for the summary sheet.
    pub fn date_range_label(&self) -> String {
        let fmt = |d: &Option<NaiveDate>| {
            d.map(|d| d.to_string()).unwrap_or_else(|| "N/A".to_string())
        };
        format!("{} - {}", fmt(&self.fecha_inicio), fmt(&self.fecha_fin))
    }
}

fn quote_from_row(row: &SqliteRow) -> Result<ProcessedQuote> {
    let productos_json: String = row.try_get("productos_json")?;
    let resumen_json: String = row.try_get("resumen_json")?;
    Ok(ProcessedQuote {
        history_id: row.try_get("history_id")?,
        num_deal: row.try_get("num_deal")?,
        num_oferta: row.try_get("num_oferta")?,
        revision: row.try_get("revision")?,
        cliente: row.try_get("cliente")?,
        nombre_archivo: row.try_get("nombre_archivo")?,
        productos: serde_json::from_str(&productos_json)
            .context("Failed to deserialize product lines")?,
        total_productos: row.try_get("total_productos")?,
        resumen_estadistico: serde_json::from_str(&resumen_json)
            .context("Failed to deserialize statistical summary")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Insert one processed quote. Returns the row id.
pub async fn save_processed_quote(pool: &SqlitePool, quote: &ProcessedQuote) -> Result<i64> {
    let productos_json =
        serde_json::to_string(&quote.productos).context("Failed to serialize product lines")?;
    let resumen_json = serde_json::to_string(&quote.resumen_estadistico)
        .context("Failed to serialize statistical summary")?;
    let result = sqlx::query(
        r#"
        INSERT INTO processed_quotes
            (history_id, num_deal, num_oferta, revision, cliente, nombre_archivo,
             productos_json, total_productos, resumen_json, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&quote.history_id)
    .bind(&quote.num_deal)
    .bind(&quote.num_oferta)
    .bind(&quote.revision)
    .bind(&quote.cliente)
    .bind(&quote.nombre_archivo)
    .bind(&productos_json)
    .bind(quote.total_productos)
    .bind(&resumen_json)
    .bind(quote.created_at)
    .execute(pool)
    .await
    .context("Failed to save processed quote")?;
    Ok(result.last_insert_rowid())
}

/// Fetch one processed quote by its history id.
pub async fn get_by_history_id(
    pool: &SqlitePool,
    history_id: &str,
) -> Result<Option<ProcessedQuote>> {
    let row = sqlx::query("SELECT * FROM processed_quotes WHERE history_id = ?")
        .bind(history_id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch processed quote")?;
    row.as_ref().map(quote_from_row).transpose()
}

/// List processed quotes matching the filter, newest first.
pub async fn list_filtered(pool: &SqlitePool, filter: &QuoteFilter) -> Result<Vec<ProcessedQuote>> {
    let mut sql = String::from("SELECT * FROM processed_quotes WHERE 1=1");
    if filter.start_bound().is_some() {
        sql.push_str(" AND created_at >= ?");
    }
    if filter.end_bound().is_some() {
        sql.push_str(" AND created_at <= ?");
    }
    if filter.num_deal.is_some() {
        sql.push_str(" AND num_deal LIKE ?");
    }
    if filter.cliente.is_some() {
        sql.push_str(" AND cliente LIKE ?");
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut query = sqlx::query(&sql);
    if let Some(start) = filter.start_bound() {
        query = query.bind(start);
    }
    if let Some(end) = filter.end_bound() {
        query = query.bind(end);
    }
    if let Some(deal) = &filter.num_deal {
        query = query.bind(format!("%{}%", deal));
    }
    if let Some(cliente) = &filter.cliente {
        query = query.bind(format!("%{}%", cliente));
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to list processed quotes")?;
    rows.iter().map(quote_from_row).collect()
}
