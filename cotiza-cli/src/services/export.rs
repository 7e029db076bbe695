//! Consolidated export from persisted quotes

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Result, bail};
use log::info;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::config::repository::processed::{self, QuoteFilter};
use crate::export::{self, ExportSummary};

/// Stats preview for an export, before writing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    pub total_archivos: usize,
    pub total_productos: i64,
    pub deals_unicos: usize,
    pub clientes_unicos: usize,
    pub productos_por_departamento: BTreeMap<String, i64>,
}

pub struct ExportService {
    pool: SqlitePool,
}

impl ExportService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Export the quotes matching the filter as a consolidated workbook.
    pub async fn export_filtered(
        &self,
        filter: &QuoteFilter,
        departamento: Option<&str>,
        output: &Path,
    ) -> Result<ExportSummary> {
        let quotes = processed::list_filtered(&self.pool, filter).await?;
        if quotes.is_empty() {
            bail!("no records matched the export filters");
        }

        let table = export::consolidate_quotes(&quotes, departamento);
        let summary = ExportSummary::for_table(&table, quotes.len(), filter.date_range_label());
        export::write_consolidated(&table, &summary, output)?;
        info!(
            "exported {} product rows from {} stored quotes to {}",
            summary.total_records,
            quotes.len(),
            output.display()
        );
        Ok(summary)
    }

    /// Aggregate counters for the quotes matching the filter.
    pub async fn export_stats(&self, filter: &QuoteFilter) -> Result<ExportStats> {
        let quotes = processed::list_filtered(&self.pool, filter).await?;

        let total_productos = quotes.iter().map(|q| q.total_productos).sum();
        let deals_unicos = quotes
            .iter()
            .map(|q| q.num_deal.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len();
        let clientes_unicos = quotes
            .iter()
            .map(|q| q.cliente.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len();

        let mut productos_por_departamento = BTreeMap::new();
        for quote in &quotes {
            for producto in &quote.productos {
                let dept = if producto.departamento.is_empty() {
                    "Sin departamento".to_string()
                } else {
                    producto.departamento.clone()
                };
                *productos_por_departamento.entry(dept).or_insert(0) += 1;
            }
        }

        Ok(ExportStats {
            total_archivos: quotes.len(),
            total_productos,
            deals_unicos,
            clientes_unicos,
            productos_por_departamento,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::repository::test_pool;
    use crate::extract::{ProcessedQuote, Table};
    use calamine::Data;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    async fn seeded_pool() -> SqlitePool {
        let pool = test_pool().await;
        for (deal, cliente, dept) in [
            ("5001", "ACME", "UN VA"),
            ("5001", "ACME", "ILUM"),
            ("7002", "GLOBEX", "ILUM"),
        ] {
            let table = Table::new(
                vec![
                    "Cliente".into(),
                    "Num. Deal".into(),
                    "Num. Item".into(),
                    "Departamento".into(),
                ],
                vec![vec![s(cliente), s(deal), Data::Int(1), s(dept)]],
            );
            let quote = ProcessedQuote::from_table(&table, "f.xlsx");
            processed::save_processed_quote(&pool, &quote).await.unwrap();
        }
        pool
    }

    #[tokio::test]
    async fn test_export_stats_aggregates() {
        let service = ExportService::new(seeded_pool().await);
        let stats = service.export_stats(&QuoteFilter::default()).await.unwrap();
        assert_eq!(stats.total_archivos, 3);
        assert_eq!(stats.total_productos, 3);
        assert_eq!(stats.deals_unicos, 2);
        assert_eq!(stats.clientes_unicos, 2);
        assert_eq!(stats.productos_por_departamento.get("ILUM"), Some(&2));
        assert_eq!(stats.productos_por_departamento.get("UN VA"), Some(&1));
    }

    #[tokio::test]
    async fn test_export_filtered_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.xlsx");
        let service = ExportService::new(seeded_pool().await);

        let summary = service
            .export_filtered(&QuoteFilter::default(), None, &output)
            .await
            .unwrap();
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.total_files, 3);
        assert!(output.exists());
    }

    #[tokio::test]
    async fn test_export_filtered_department_restriction() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.xlsx");
        let service = ExportService::new(seeded_pool().await);

        let summary = service
            .export_filtered(&QuoteFilter::default(), Some("UN VA"), &output)
            .await
            .unwrap();
        assert_eq!(summary.total_records, 1);
    }

    #[tokio::test]
    async fn test_export_filtered_empty_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.xlsx");
        let service = ExportService::new(test_pool().await);
        assert!(
            service
                .export_filtered(&QuoteFilter::default(), None, &output)
                .await
                .is_err()
        );
    }
}
