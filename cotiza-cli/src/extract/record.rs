//! Record-mode output: the persisted document form of a processed quote
//!
//! One `ProcessedQuote` per ingested file: the broadcast header fields, one
//! `ProductLine` per canonical table row, and a statistical summary. Field
//! coercion is total: numeric fields default to 0 and text fields to the
//! empty string on missing or non-numeric cells.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::table::Table;

/// One canonical product line, with the field names the rest of the system
/// (and its consumers) observe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLine {
    pub num_item: String,
    pub marca: String,
    pub codigo_completo: String,
    pub familia: String,
    pub departamento: String,
    pub cantidad: f64,
    pub descuento_stf: f64,
    pub descuento_cisac: f64,
    pub margen: f64,
    pub fact_importacion: f64,
    pub costo_importacion: f64,
    pub total_c_fijos: f64,
    pub total_c_extras: f64,
    pub dias_fabricacion: i64,
    pub peso_unva: f64,
    pub tiempo_unva: f64,
    pub moneda: String,
    pub precio_compra: f64,
    pub precio_compra_2: f64,
    pub precio_venta: f64,
    pub total: f64,
}

impl ProductLine {
    /// Coerce one canonical table row into a product line.
    pub fn from_row(table: &Table, row: usize) -> ProductLine {
        let text = |name: &str| table.text(row, name);
        let number = |name: &str| table.number(row, name).unwrap_or(0.0);
        ProductLine {
            num_item: text("Num. Item"),
            marca: text("Marca"),
            codigo_completo: text("Código Completo"),
            familia: text("Familia"),
            departamento: text("Departamento"),
            cantidad: number("Cantidad"),
            descuento_stf: number("Descuento STF"),
            descuento_cisac: number("Descuento CISAC"),
            margen: number("Margen"),
            fact_importacion: number("Fact. De Importación"),
            costo_importacion: number("Costo de Importación"),
            total_c_fijos: number("Total C. Fijos"),
            total_c_extras: number("Total C. Extras"),
            dias_fabricacion: number("Días fabricación") as i64,
            peso_unva: number("Peso (UNVA)"),
            tiempo_unva: number("Tiempo (UNVA)"),
            moneda: text("Moneda"),
            precio_compra: number("Precio Compra"),
            precio_compra_2: number("Precio Compra 2"),
            precio_venta: number("Precio venta"),
            total: number("Total"),
        }
    }
}

/// Aggregates over one file's product lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumenEstadistico {
    pub total_precio_venta: f64,
    pub total_general: f64,
    pub cantidad_total: f64,
    pub margen_promedio: f64,
    pub productos_por_departamento: BTreeMap<String, i64>,
}

impl ResumenEstadistico {
    pub fn from_table(table: &Table) -> ResumenEstadistico {
        let sum = |name: &str| {
            (0..table.height())
                .filter_map(|row| table.number(row, name))
                .sum::<f64>()
        };
        // Mean over the cells that hold a value, like the tool's consumers
        // expect; an absent or all-empty column averages to 0.
        let margenes: Vec<f64> = (0..table.height())
            .filter_map(|row| table.number(row, "Margen"))
            .collect();
        let margen_promedio = if margenes.is_empty() {
            0.0
        } else {
            margenes.iter().sum::<f64>() / margenes.len() as f64
        };

        let mut productos_por_departamento = BTreeMap::new();
        if table.column_index("Departamento").is_some() {
            for row in 0..table.height() {
                let dept = table.text(row, "Departamento");
                if !dept.is_empty() {
                    *productos_por_departamento.entry(dept).or_insert(0) += 1;
                }
            }
        }

        ResumenEstadistico {
            total_precio_venta: sum("Precio venta"),
            total_general: sum("Total"),
            cantidad_total: sum("Cantidad"),
            margen_promedio,
            productos_por_departamento,
        }
    }
}

/// The persisted document for one ingested quote file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedQuote {
    pub history_id: String,
    pub num_deal: String,
    pub num_oferta: String,
    pub revision: String,
    pub cliente: String,
    pub nombre_archivo: String,
    pub productos: Vec<ProductLine>,
    pub total_productos: i64,
    pub resumen_estadistico: ResumenEstadistico,
    pub created_at: DateTime<Utc>,
}

impl ProcessedQuote {
    /// Convert a canonical table into the nested record form. The broadcast
    /// metadata columns are constant per file, so the first row supplies the
    /// header fields; an empty table yields empty header fields.
    pub fn from_table(table: &Table, nombre_archivo: &str) -> ProcessedQuote {
        let header = |name: &str| {
            if table.is_empty() {
                String::new()
            } else {
                table.text(0, name)
            }
        };
        let productos: Vec<ProductLine> = (0..table.height())
            .map(|row| ProductLine::from_row(table, row))
            .collect();

        ProcessedQuote {
            history_id: Uuid::new_v4().to_string(),
            num_deal: header("Num. Deal"),
            num_oferta: header("Num. Oferta"),
            revision: header("Revisión"),
            cliente: header("Cliente"),
            nombre_archivo: nombre_archivo.to_string(),
            total_productos: productos.len() as i64,
            resumen_estadistico: ResumenEstadistico::from_table(table),
            productos,
            created_at: Utc::now(),
        }
    }
}
