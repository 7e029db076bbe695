//! Idempotent schema setup

use anyhow::{Context, Result};
use sqlx::SqlitePool;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS processed_quotes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        history_id TEXT NOT NULL UNIQUE,
        num_deal TEXT NOT NULL,
        num_oferta TEXT NOT NULL,
        revision TEXT NOT NULL,
        cliente TEXT NOT NULL,
        nombre_archivo TEXT NOT NULL,
        productos_json TEXT NOT NULL,
        total_productos INTEGER NOT NULL,
        resumen_json TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_processed_quotes_created_at ON processed_quotes(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_processed_quotes_num_deal ON processed_quotes(num_deal)",
    "CREATE INDEX IF NOT EXISTS idx_processed_quotes_cliente ON processed_quotes(cliente)",
    r#"
    CREATE TABLE IF NOT EXISTS reports (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        filename TEXT NOT NULL,
        files_processed INTEGER NOT NULL,
        files_with_errors INTEGER NOT NULL,
        total_records INTEGER NOT NULL,
        status TEXT NOT NULL,
        file_size REAL NOT NULL,
        file_url TEXT,
        processing_time REAL NOT NULL,
        errors_json TEXT NOT NULL,
        error_message TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_reports_created_at ON reports(created_at)",
];

/// Apply the schema. Safe to run on every startup.
pub async fn run(pool: &SqlitePool) -> Result<()> {
    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to apply database schema")?;
    }
    Ok(())
}
