//! Consolidated workbook output
//!
//! Both the batch flow and the database export converge here: one workbook
//! with the consolidated product rows and a small metrics sheet.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::Data;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::extract::Table;
use crate::extract::table::cell;

pub const PRODUCTS_SHEET: &str = "Productos Consolidados";
pub const SUMMARY_SHEET: &str = "Resumen";

/// Metrics written to the summary sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub total_records: usize,
    pub total_files: usize,
    /// Human-readable range of the query that selected the files.
    pub date_range: String,
    pub unique_deals: usize,
    pub unique_clients: usize,
}

impl ExportSummary {
    /// Compute the summary for a consolidated table: distinct deal numbers
    /// and clients come from the broadcast metadata columns.
    pub fn for_table(table: &Table, total_files: usize, date_range: String) -> ExportSummary {
        let distinct = |name: &str| {
            (0..table.height())
                .map(|row| table.text(row, name))
                .collect::<HashSet<_>>()
                .len()
        };
        ExportSummary {
            total_records: table.height(),
            total_files,
            date_range,
            unique_deals: distinct("Num. Deal"),
            unique_clients: distinct("Cliente"),
        }
    }
}

fn write_cell(ws: &mut Worksheet, row: u32, col: u16, value: &Data) -> Result<()> {
    match value {
        Data::Empty | Data::Error(_) => {}
        Data::String(s) => {
            ws.write_string(row, col, s)?;
        }
        Data::Int(i) => {
            ws.write_number(row, col, *i as f64)?;
        }
        Data::Float(f) if f.is_nan() => {}
        Data::Float(f) => {
            ws.write_number(row, col, *f)?;
        }
        Data::Bool(b) => {
            ws.write_string(row, col, b.to_string())?;
        }
        other => {
            ws.write_string(row, col, cell::display(other))?;
        }
    }
    Ok(())
}

/// Write the consolidated workbook: the product table on one sheet, the
/// metrics on another.
pub fn write_consolidated(table: &Table, summary: &ExportSummary, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let ws = workbook.add_worksheet();
    ws.set_name(PRODUCTS_SHEET)?;
    for (col, name) in table.columns().iter().enumerate() {
        ws.write_string(0, col as u16, name)?;
    }
    for row in 0..table.height() {
        for col in 0..table.width() {
            write_cell(ws, (row + 1) as u32, col as u16, table.cell(row, col))?;
        }
    }

    let ws = workbook.add_worksheet();
    ws.set_name(SUMMARY_SHEET)?;
    ws.write_string(0, 0, "Métrica")?;
    ws.write_string(0, 1, "Valor")?;
    let metrics: [(&str, String); 5] = [
        ("Total Registros", summary.total_records.to_string()),
        ("Total Archivos Procesados", summary.total_files.to_string()),
        ("Rango de Fechas", summary.date_range.clone()),
        ("Deals Únicos", summary.unique_deals.to_string()),
        ("Clientes Únicos", summary.unique_clients.to_string()),
    ];
    for (i, (name, value)) in metrics.iter().enumerate() {
        let row = (i + 1) as u32;
        ws.write_string(row, 0, *name)?;
        ws.write_string(row, 1, value)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save consolidated workbook: {}", path.display()))?;
    Ok(())
}

/// Columns of a consolidated export built from persisted quotes: the
/// broadcast metadata, the processing timestamp, then the canonical product
/// fields.
const CONSOLIDATED_COLUMNS: &[&str] = &[
    "Cliente",
    "Num. Deal",
    "Num. Oferta",
    "Revisión",
    "Fecha Procesamiento",
    "Num. Item",
    "Marca",
    "Código Completo",
    "Familia",
    "Departamento",
    "Cantidad",
    "Descuento STF",
    "Descuento CISAC",
    "Margen",
    "Fact. De Importación",
    "Costo de Importación",
    "Total C. Fijos",
    "Total C. Extras",
    "Días fabricación",
    "Peso (UNVA)",
    "Tiempo (UNVA)",
    "Moneda",
    "Precio Compra",
    "Precio Compra 2",
    "Precio venta",
    "Total",
];

/// Flatten persisted quotes into one consolidated table, one row per product
/// line, optionally restricted to a department.
pub fn consolidate_quotes(
    quotes: &[crate::extract::ProcessedQuote],
    departamento: Option<&str>,
) -> Table {
    let columns = CONSOLIDATED_COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut rows = Vec::new();
    for quote in quotes {
        let stamp = quote.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
        for producto in &quote.productos {
            if let Some(dept) = departamento {
                if producto.departamento != dept {
                    continue;
                }
            }
            rows.push(vec![
                Data::String(quote.cliente.clone()),
                Data::String(quote.num_deal.clone()),
                Data::String(quote.num_oferta.clone()),
                Data::String(quote.revision.clone()),
                Data::String(stamp.clone()),
                Data::String(producto.num_item.clone()),
                Data::String(producto.marca.clone()),
                Data::String(producto.codigo_completo.clone()),
                Data::String(producto.familia.clone()),
                Data::String(producto.departamento.clone()),
                Data::Float(producto.cantidad),
                Data::Float(producto.descuento_stf),
                Data::Float(producto.descuento_cisac),
                Data::Float(producto.margen),
                Data::Float(producto.fact_importacion),
                Data::Float(producto.costo_importacion),
                Data::Float(producto.total_c_fijos),
                Data::Float(producto.total_c_extras),
                Data::Int(producto.dias_fabricacion),
                Data::Float(producto.peso_unva),
                Data::Float(producto.tiempo_unva),
                Data::String(producto.moneda.clone()),
                Data::Float(producto.precio_compra),
                Data::Float(producto.precio_compra_2),
                Data::Float(producto.precio_venta),
                Data::Float(producto.total),
            ]);
        }
    }
    Table::new(columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Reader, Xlsx, open_workbook};

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    fn table() -> Table {
        Table::new(
            vec!["Cliente".into(), "Num. Deal".into(), "Total".into()],
            vec![
                vec![s("ACME"), Data::Int(5001), Data::Float(100.0)],
                vec![s("ACME"), Data::Int(5001), Data::Float(50.0)],
                vec![s("GLOBEX"), Data::Int(7002), Data::Float(75.0)],
            ],
        )
    }

    #[test]
    fn test_summary_counts_distinct_values() {
        let summary = ExportSummary::for_table(&table(), 2, "N/A - N/A".into());
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.unique_deals, 2);
        assert_eq!(summary.unique_clients, 2);
    }

    #[test]
    fn test_written_workbook_has_both_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let table = table();
        let summary = ExportSummary::for_table(&table, 2, "2026-01-01 - 2026-02-01".into());
        write_consolidated(&table, &summary, &path).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let names = workbook.sheet_names().to_vec();
        assert_eq!(names, vec![PRODUCTS_SHEET, SUMMARY_SHEET]);

        let range = workbook.worksheet_range(PRODUCTS_SHEET).unwrap();
        let header: Vec<String> = range
            .rows()
            .next()
            .unwrap()
            .iter()
            .map(cell::display)
            .collect();
        assert_eq!(header, vec!["Cliente", "Num. Deal", "Total"]);
        // Header plus three data rows
        assert_eq!(range.rows().count(), 4);

        let resumen = workbook.worksheet_range(SUMMARY_SHEET).unwrap();
        let first: Vec<String> = resumen
            .rows()
            .next()
            .unwrap()
            .iter()
            .map(cell::display)
            .collect();
        assert_eq!(first, vec!["Métrica", "Valor"]);
        assert_eq!(resumen.rows().count(), 6);
    }

    #[test]
    fn test_consolidate_quotes_flattens_and_filters() {
        use crate::extract::ProcessedQuote;

        let source = Table::new(
            vec![
                "Cliente".into(),
                "Num. Deal".into(),
                "Num. Item".into(),
                "Departamento".into(),
                "Total".into(),
            ],
            vec![
                vec![s("ACME"), s("5001"), Data::Int(1), s("UN VA"), Data::Float(10.0)],
                vec![s("ACME"), s("5001"), Data::Int(2), s("ILUM"), Data::Float(20.0)],
            ],
        );
        let quote = ProcessedQuote::from_table(&source, "q.xlsx");

        let all = consolidate_quotes(std::slice::from_ref(&quote), None);
        assert_eq!(all.height(), 2);
        assert_eq!(all.columns()[0], "Cliente");
        assert_eq!(all.text(0, "Cliente"), "ACME");
        assert!(all.column_index("Fecha Procesamiento").is_some());

        let filtered = consolidate_quotes(std::slice::from_ref(&quote), Some("ILUM"));
        assert_eq!(filtered.height(), 1);
        assert_eq!(filtered.text(0, "Num. Item"), "2");
    }
}
