//! Batch report generation
//!
//! Runs the bounded batch over the input files, writes the consolidated
//! workbook, uploads it to object storage, and records the run in the report
//! registry. The registry gets a row for failed runs too, so the history
//! shows every attempt.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use calamine::Data;
use chrono::{Local, Utc};
use log::info;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::batch::{BatchCoordinator, BatchOutcome, FileError};
use crate::config::Settings;
use crate::config::repository::reports::{self, Report, ReportStatus};
use crate::export::{self, ExportSummary};
use crate::storage::ObjectStorage;

/// What one `report` run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRunSummary {
    pub report_id: i64,
    pub filename: String,
    pub processed_files: usize,
    pub files_with_errors: usize,
    pub total_records: usize,
    pub errors: Vec<FileError>,
    pub download_url: String,
    pub processing_time: f64,
}

pub struct ReportService {
    pool: SqlitePool,
    storage: Arc<dyn ObjectStorage>,
    settings: Settings,
}

impl ReportService {
    pub fn new(pool: SqlitePool, storage: Arc<dyn ObjectStorage>, settings: Settings) -> Self {
        Self {
            pool,
            storage,
            settings,
        }
    }

    /// Process the input files as one batch and publish the consolidated
    /// workbook.
    pub async fn generate_report(&self, files: Vec<PathBuf>) -> Result<ReportRunSummary> {
        let coordinator = BatchCoordinator::new(self.settings.max_workers);
        let outcome = coordinator.process_files(&files).await;

        let Some(table) = &outcome.table else {
            self.record_failed_run(&outcome).await?;
            bail!(
                "no file could be processed ({} failures)",
                outcome.files_with_errors
            );
        };

        // The registry and the workbook both carry a human-readable
        // processing timestamp.
        let stamp = Local::now();
        let mut consolidated = table.clone();
        consolidated.add_column(
            "Fecha Procesamiento",
            vec![
                Data::String(stamp.format("%Y-%m-%d %H:%M:%S").to_string());
                consolidated.height()
            ],
        );

        let filename = format!("resultado_final_{}.xlsx", stamp.format("%Y%m%d_%H%M%S"));
        let output_path = self.settings.temp_dir.join(&filename);
        let summary = ExportSummary::for_table(
            &consolidated,
            outcome.processed_files,
            "N/A - N/A".to_string(),
        );
        export::write_consolidated(&consolidated, &summary, &output_path)?;

        let file_size = std::fs::metadata(&output_path)
            .with_context(|| format!("Failed to stat {}", output_path.display()))?
            .len() as f64
            / (1024.0 * 1024.0);
        let file_size = (file_size * 100.0).round() / 100.0;

        let download_url = self.storage.upload_file(&output_path, &filename).await?;
        tokio::fs::remove_file(&output_path).await.ok();

        let status = if outcome.files_with_errors == 0 {
            ReportStatus::Success
        } else {
            ReportStatus::Partial
        };
        let report = Report {
            id: None,
            filename: filename.clone(),
            files_processed: outcome.processed_files as i64,
            files_with_errors: outcome.files_with_errors as i64,
            total_records: outcome.total_records as i64,
            status,
            file_size,
            file_url: Some(download_url.clone()),
            processing_time: outcome.processing_time,
            errors: outcome.errors.clone(),
            error_message: None,
            created_at: Utc::now(),
        };
        let report_id = reports::insert_report(&self.pool, &report).await?;
        info!(
            "report {} generated: {} records from {}/{} files",
            report_id,
            outcome.total_records,
            outcome.processed_files,
            outcome.total_files
        );

        Ok(ReportRunSummary {
            report_id,
            filename,
            processed_files: outcome.processed_files,
            files_with_errors: outcome.files_with_errors,
            total_records: outcome.total_records,
            errors: outcome.errors,
            download_url,
            processing_time: outcome.processing_time,
        })
    }

    async fn record_failed_run(&self, outcome: &BatchOutcome) -> Result<()> {
        let report = Report {
            id: None,
            filename: "error_report".to_string(),
            files_processed: 0,
            files_with_errors: outcome.files_with_errors as i64,
            total_records: 0,
            status: ReportStatus::Error,
            file_size: 0.0,
            file_url: None,
            processing_time: outcome.processing_time,
            errors: outcome.errors.clone(),
            error_message: Some("no file could be processed".to_string()),
            created_at: Utc::now(),
        };
        reports::insert_report(&self.pool, &report).await?;
        Ok(())
    }
}
