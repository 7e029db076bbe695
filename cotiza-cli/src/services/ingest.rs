//! Single-file ingestion: extract one quote workbook and persist the record

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use sqlx::SqlitePool;

use crate::config::repository::processed;
use crate::extract::{self, ProcessedQuote};

pub struct IngestService {
    pool: SqlitePool,
}

impl IngestService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run the extraction pipeline in record mode and persist the result.
    pub async fn ingest_file(&self, path: &Path) -> Result<ProcessedQuote> {
        let worker_path: PathBuf = path.to_path_buf();
        let record = tokio::task::spawn_blocking(move || extract::extract_record(&worker_path))
            .await
            .context("Extraction task failed")??;

        processed::save_processed_quote(&self.pool, &record).await?;
        info!(
            "ingested {} ({} product lines, deal {})",
            record.nombre_archivo, record.total_productos, record.num_deal
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::repository::test_pool;
    use rust_xlsxwriter::Workbook;

    fn write_minimal_workbook(path: &Path) {
        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.write_string(0, 0, "Factor STD").unwrap();
        ws.write_string(10, 0, "Precio Lista").unwrap();
        ws.write_string(10, 1, "#Item").unwrap();
        ws.write_string(10, 2, "Precio Compra Unitario").unwrap();
        ws.write_number(11, 0, 1.1).unwrap();
        ws.write_number(11, 1, 1.0).unwrap();
        ws.write_number(11, 2, 10.0).unwrap();
        workbook.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_ingest_persists_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quote.xlsx");
        write_minimal_workbook(&path);

        let service = IngestService::new(test_pool().await);
        let record = service.ingest_file(&path).await.unwrap();
        assert_eq!(record.total_productos, 1);

        let loaded = processed::get_by_history_id(&service.pool, &record.history_id)
            .await
            .unwrap()
            .expect("record persisted");
        assert_eq!(loaded.nombre_archivo, "quote.xlsx");
    }

    #[tokio::test]
    async fn test_ingest_propagates_extraction_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.xlsx");
        std::fs::write(&path, b"junk").unwrap();

        let service = IngestService::new(test_pool().await);
        assert!(service.ingest_file(&path).await.is_err());
    }
}
