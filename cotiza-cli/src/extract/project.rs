//! Projection onto the canonical product-line schema
//!
//! The canonical mapping is the externally observed schema shared by the bulk
//! and single-file flows: a fixed ordered selection of source columns from the
//! quoting-tool template, renamed to the consolidated report labels. Source
//! columns missing from a particular template revision are silently skipped.

use super::table::Table;

/// (source column, canonical column), in canonical output order.
pub const CANONICAL_COLUMNS: &[(&str, &str)] = &[
    ("Cliente", "Cliente"),
    ("Num. Deal", "Num. Deal"),
    ("Num. Oferta", "Num. Oferta"),
    ("Revisión", "Revisión"),
    ("#Item", "Num. Item"),
    ("Marca_0", "Marca"),
    ("Código", "Código Completo"),
    ("Familia", "Familia"),
    ("Departamento", "Departamento"),
    ("Qty_1", "Cantidad"),
    ("STF_0", "Descuento STF"),
    ("Descuento CISAC", "Descuento CISAC"),
    ("Margen Total %", "Margen"),
    ("F.Importación", "Fact. De Importación"),
    ("Costo importación", "Costo de Importación"),
    ("Total Costos Fijos", "Total C. Fijos"),
    ("Aplicativos", "Total C. Extras"),
    ("WD", "Días fabricación"),
    ("Peso (UNVA)", "Peso (UNVA)"),
    ("Tiempo (UNVA)", "Tiempo (UNVA)"),
    ("Moneda1", "Moneda"),
    ("Precio Lista Unitario", "Precio Compra"),
    ("Precio Compra Unitario", "Precio Compra 2"),
    ("Precio Unitario Final", "Precio venta"),
    ("Precio Total Final", "Total"),
];

/// Project the enriched wide table onto the canonical schema: select the
/// source columns that exist, in canonical order, renamed to their canonical
/// labels.
pub fn project(table: &Table) -> Table {
    let selected: Vec<(usize, &str)> = CANONICAL_COLUMNS
        .iter()
        .filter_map(|(source, canonical)| {
            table.column_index(source).map(|idx| (idx, *canonical))
        })
        .collect();

    let columns = selected.iter().map(|(_, name)| name.to_string()).collect();
    let rows = (0..table.height())
        .map(|row| {
            selected
                .iter()
                .map(|&(col, _)| table.cell(row, col).clone())
                .collect()
        })
        .collect();
    Table::new(columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    #[test]
    fn test_project_selects_renames_and_orders() {
        let table = Table::new(
            vec![
                "Precio Compra Unitario".into(),
                "#Item".into(),
                "Cliente".into(),
                "ignored".into(),
            ],
            vec![vec![Data::Float(80.0), Data::Int(1), s("ACME"), s("junk")]],
        );
        let projected = project(&table);
        // Canonical order, canonical names, extras dropped
        assert_eq!(
            projected.columns(),
            &["Cliente", "Num. Item", "Precio Compra 2"]
        );
        assert_eq!(projected.value(0, "Num. Item"), &Data::Int(1));
        assert_eq!(projected.value(0, "Precio Compra 2"), &Data::Float(80.0));
        assert_eq!(projected.column_index("ignored"), None);
    }

    #[test]
    fn test_project_skips_missing_sources_silently() {
        let table = Table::new(vec!["Familia".into()], vec![vec![s("Sensores")]]);
        let projected = project(&table);
        assert_eq!(projected.columns(), &["Familia"]);
        assert_eq!(projected.height(), 1);
    }

    #[test]
    fn test_project_duplicate_aware_sources() {
        // The template carries Marca/Qty/STF more than once; the canonical
        // schema pins which occurrence wins (first Marca, second Qty, first
        // STF) via the deduplicated names.
        let table = Table::new(
            vec![
                "Marca_0".into(),
                "Marca_1".into(),
                "Qty_0".into(),
                "Qty_1".into(),
                "STF_0".into(),
                "STF_1".into(),
            ],
            vec![vec![
                s("BrandA"),
                s("BrandB"),
                Data::Int(99),
                Data::Int(4),
                Data::Float(0.15),
                Data::Float(0.99),
            ]],
        );
        let projected = project(&table);
        assert_eq!(projected.columns(), &["Marca", "Cantidad", "Descuento STF"]);
        assert_eq!(projected.value(0, "Marca"), &s("BrandA"));
        assert_eq!(projected.value(0, "Cantidad"), &Data::Int(4));
        assert_eq!(projected.value(0, "Descuento STF"), &Data::Float(0.15));
    }
}
