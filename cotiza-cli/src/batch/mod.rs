//! Concurrent multi-file extraction
//!
//! `BatchCoordinator` fans the extraction pipeline out over a bounded pool of
//! blocking workers. Each file is processed independently: one failure never
//! aborts its siblings, and the batch boundary never raises — callers always
//! get a `BatchOutcome` with either the concatenated table or the collected
//! per-file errors.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::extract::{self, Table};

/// One failed file in a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub file: String,
    pub error: String,
}

/// Result of one batch run over N input files.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub success: bool,
    /// Concatenated canonical table; `None` when every file failed.
    pub table: Option<Table>,
    pub processed_files: usize,
    pub files_with_errors: usize,
    pub total_files: usize,
    pub total_records: usize,
    pub errors: Vec<FileError>,
    /// Wall-clock seconds, rounded to two decimals.
    pub processing_time: f64,
}

/// Bounded fan-out over the extraction pipeline.
#[derive(Debug, Clone)]
pub struct BatchCoordinator {
    max_workers: usize,
}

impl BatchCoordinator {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    /// Process every file through the extraction pipeline, at most
    /// `max_workers` at a time, and concatenate the successful tables
    /// row-wise preserving first-seen column order. Completion order is
    /// irrelevant; row order across files is not a contract.
    pub async fn process_files(&self, paths: &[PathBuf]) -> BatchOutcome {
        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.max_workers));

        let tasks = paths.iter().map(|path| {
            let semaphore = Arc::clone(&semaphore);
            let path = path.clone();
            async move {
                let _permit = semaphore.acquire_owned().await.unwrap();
                let file = file_label(&path);
                let worker_path = path.clone();
                let joined =
                    tokio::task::spawn_blocking(move || extract::extract_product_lines(&worker_path))
                        .await;
                match joined {
                    Ok(Ok(table)) => (file, Ok(table)),
                    Ok(Err(e)) => (file, Err(format!("{:#}", e))),
                    Err(e) => (file, Err(format!("extraction task failed: {}", e))),
                }
            }
        });

        let mut tables = Vec::new();
        let mut errors = Vec::new();
        for (file, result) in join_all(tasks).await {
            match result {
                Ok(table) => tables.push(table),
                Err(error) => {
                    warn!("failed to process {}: {}", file, error);
                    errors.push(FileError { file, error });
                }
            }
        }

        let processing_time = round2(started.elapsed().as_secs_f64());
        let processed_files = tables.len();
        if tables.is_empty() {
            return BatchOutcome {
                success: false,
                table: None,
                processed_files: 0,
                files_with_errors: errors.len(),
                total_files: paths.len(),
                total_records: 0,
                errors,
                processing_time,
            };
        }

        let table = Table::concat(&tables);
        let total_records = table.height();
        info!(
            "batch processed {}/{} files, {} records in {:.2}s",
            processed_files,
            paths.len(),
            total_records,
            processing_time
        );
        BatchOutcome {
            success: true,
            table: Some(table),
            processed_files,
            files_with_errors: errors.len(),
            total_files: paths.len(),
            total_records,
            errors,
            processing_time,
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unnamed>")
        .to_string()
}

fn round2(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}
