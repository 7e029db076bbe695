//! Repository for the batch report registry

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::batch::FileError;

/// Outcome class of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Success,
    Partial,
    Error,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Success => "success",
            ReportStatus::Partial => "partial",
            ReportStatus::Error => "error",
        }
    }

    fn parse(s: &str) -> ReportStatus {
        match s {
            "success" => ReportStatus::Success,
            "partial" => ReportStatus::Partial,
            _ => ReportStatus::Error,
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One batch run in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Row id; `None` before insertion.
    pub id: Option<i64>,
    pub filename: String,
    pub files_processed: i64,
    pub files_with_errors: i64,
    pub total_records: i64,
    pub status: ReportStatus,
    /// Consolidated workbook size in megabytes.
    pub file_size: f64,
    pub file_url: Option<String>,
    pub processing_time: f64,
    pub errors: Vec<FileError>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate registry counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportStats {
    pub total: i64,
    pub success: i64,
    pub errors: i64,
    pub this_month: i64,
}

fn report_from_row(row: &SqliteRow) -> Result<Report> {
    let status: String = row.try_get("status")?;
    let errors_json: String = row.try_get("errors_json")?;
    Ok(Report {
        id: Some(row.try_get("id")?),
        filename: row.try_get("filename")?,
        files_processed: row.try_get("files_processed")?,
        files_with_errors: row.try_get("files_with_errors")?,
        total_records: row.try_get("total_records")?,
        status: ReportStatus::parse(&status),
        file_size: row.try_get("file_size")?,
        file_url: row.try_get("file_url")?,
        processing_time: row.try_get("processing_time")?,
        errors: serde_json::from_str(&errors_json).context("Failed to deserialize file errors")?,
        error_message: row.try_get("error_message")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Insert one report. Returns the row id.
pub async fn insert_report(pool: &SqlitePool, report: &Report) -> Result<i64> {
    let errors_json =
        serde_json::to_string(&report.errors).context("Failed to serialize file errors")?;
    let result = sqlx::query(
        r#"
        INSERT INTO reports
            (filename, files_processed, files_with_errors, total_records, status,
             file_size, file_url, processing_time, errors_json, error_message, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&report.filename)
    .bind(report.files_processed)
    .bind(report.files_with_errors)
    .bind(report.total_records)
    .bind(report.status.as_str())
    .bind(report.file_size)
    .bind(&report.file_url)
    .bind(report.processing_time)
    .bind(&errors_json)
    .bind(&report.error_message)
    .bind(report.created_at)
    .execute(pool)
    .await
    .context("Failed to insert report")?;
    Ok(result.last_insert_rowid())
}

/// List reports newest first, with the total registry count for paging.
pub async fn list_reports(pool: &SqlitePool, limit: i64, offset: i64) -> Result<(i64, Vec<Report>)> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
        .fetch_one(pool)
        .await
        .context("Failed to count reports")?;
    let rows = sqlx::query("SELECT * FROM reports ORDER BY created_at DESC LIMIT ? OFFSET ?")
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list reports")?;
    let reports = rows.iter().map(report_from_row).collect::<Result<_>>()?;
    Ok((total, reports))
}

/// Fetch one report by id.
pub async fn get_report(pool: &SqlitePool, id: i64) -> Result<Option<Report>> {
    let row = sqlx::query("SELECT * FROM reports WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch report")?;
    row.as_ref().map(report_from_row).transpose()
}

/// Delete one report by id. Returns whether a row was removed.
pub async fn delete_report(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM reports WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete report")?;
    Ok(result.rows_affected() > 0)
}

/// Aggregate counters over the registry.
pub async fn stats(pool: &SqlitePool) -> Result<ReportStats> {
    let count = |sql: &'static str, bind: Option<DateTime<Utc>>| {
        let pool = pool.clone();
        async move {
            let mut query = sqlx::query_scalar::<_, i64>(sql);
            if let Some(value) = bind {
                query = query.bind(value);
            }
            query
                .fetch_one(&pool)
                .await
                .context("Failed to compute report stats")
        }
    };

    let start_of_month = Utc::now()
        .date_naive()
        .with_day(1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc());

    Ok(ReportStats {
        total: count("SELECT COUNT(*) FROM reports", None).await?,
        success: count("SELECT COUNT(*) FROM reports WHERE status = 'success'", None).await?,
        errors: count("SELECT COUNT(*) FROM reports WHERE status = 'error'", None).await?,
        this_month: count(
            "SELECT COUNT(*) FROM reports WHERE created_at >= ?",
            start_of_month,
        )
        .await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::repository::test_pool;

    fn report(filename: &str, status: ReportStatus) -> Report {
        Report {
            id: None,
            filename: filename.to_string(),
            files_processed: 2,
            files_with_errors: 1,
            total_records: 10,
            status,
            file_size: 0.5,
            file_url: Some("file:///store/reports/r.xlsx".into()),
            processing_time: 1.25,
            errors: vec![FileError {
                file: "bad.xlsx".into(),
                error: "not a workbook".into(),
            }],
            error_message: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let pool = test_pool().await;
        let mut expected = report("r1.xlsx", ReportStatus::Partial);
        let id = insert_report(&pool, &expected).await.unwrap();
        expected.id = Some(id);

        let loaded = get_report(&pool, id).await.unwrap().expect("report exists");
        assert_eq!(loaded, expected);
        assert!(get_report(&pool, id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let pool = test_pool().await;
        insert_report(&pool, &report("r1.xlsx", ReportStatus::Success))
            .await
            .unwrap();
        let id2 = insert_report(&pool, &report("r2.xlsx", ReportStatus::Error))
            .await
            .unwrap();

        let (total, reports) = list_reports(&pool, 50, 0).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(reports.len(), 2);

        assert!(delete_report(&pool, id2).await.unwrap());
        assert!(!delete_report(&pool, id2).await.unwrap());
        let (total, _) = list_reports(&pool, 50, 0).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_stats_counts_by_status() {
        let pool = test_pool().await;
        insert_report(&pool, &report("a.xlsx", ReportStatus::Success))
            .await
            .unwrap();
        insert_report(&pool, &report("b.xlsx", ReportStatus::Success))
            .await
            .unwrap();
        insert_report(&pool, &report("c.xlsx", ReportStatus::Error))
            .await
            .unwrap();

        let stats = stats(&pool).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.success, 2);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.this_month, 3);
    }
}
