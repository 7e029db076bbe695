//! Derived fields over the reshaped table
//!
//! The source template annotates manufacturing rows with trailing detail
//! sub-rows: for a `UN VA` line, the weight lives 2 rows below and the time 6
//! rows below, in the net-price column. The convention is positional, so the
//! lookups run against the unfiltered reshaped table using each retained
//! row's original index. Everything out of range degrades to 0.

use calamine::Data;

use super::anchors::QuoteMeta;
use super::table::{Table, cell};

/// Department whose rows carry the weight/time detail sub-rows.
pub const NAMED_DEPARTMENT: &str = "UN VA";
pub const DEPARTMENT_COLUMN: &str = "Departamento";
/// Column the detail sub-rows write into, and the pivot for the adjacent
/// discount column.
pub const DETAIL_SOURCE_COLUMN: &str = "Precio Neto";
pub const WEIGHT_COLUMN: &str = "Peso (UNVA)";
pub const TIME_COLUMN: &str = "Tiempo (UNVA)";
/// Rows below a `UN VA` line where its weight detail sits.
pub const WEIGHT_ROW_OFFSET: usize = 2;
/// Rows below a `UN VA` line where its time detail sits.
pub const TIME_ROW_OFFSET: usize = 6;
pub const CISAC_COLUMN: &str = "Descuento CISAC";

pub const CLIENT_COLUMN: &str = "Cliente";
pub const DEAL_COLUMN: &str = "Num. Deal";
pub const QUOTE_COLUMN: &str = "Num. Oferta";
pub const REVISION_COLUMN: &str = "Revisión";

/// Detail value for one retained row: the net-price cell `offset` rows below
/// its original index, or 0 when the target row or the column is out of range.
fn detail_value(reshaped: &Table, original_row: usize, offset: usize) -> Data {
    let target = original_row + offset;
    if target >= reshaped.height() {
        return Data::Int(0);
    }
    match reshaped.column_index(DETAIL_SOURCE_COLUMN) {
        Some(col) => reshaped.cell(target, col).clone(),
        None => Data::Int(0),
    }
}

/// Build the enriched wide table: the retained rows of `reshaped` plus the
/// derived weight/time columns, the broadcast quote metadata, and the
/// adjacency-derived discount column.
pub fn derive_fields(reshaped: &Table, retained: &[usize], meta: &QuoteMeta) -> Table {
    let mut enriched = reshaped.select_rows(retained);

    let mut weights = Vec::with_capacity(retained.len());
    let mut times = Vec::with_capacity(retained.len());
    for &original_row in retained {
        let in_department =
            cell::as_str(reshaped.value(original_row, DEPARTMENT_COLUMN)) == Some(NAMED_DEPARTMENT);
        if in_department {
            weights.push(detail_value(reshaped, original_row, WEIGHT_ROW_OFFSET));
            times.push(detail_value(reshaped, original_row, TIME_ROW_OFFSET));
        } else {
            weights.push(Data::Int(0));
            times.push(Data::Int(0));
        }
    }
    enriched.add_column(WEIGHT_COLUMN, weights);
    enriched.add_column(TIME_COLUMN, times);

    let n = enriched.height();
    enriched.add_column(CLIENT_COLUMN, vec![meta.cliente.clone(); n]);
    enriched.add_column(DEAL_COLUMN, vec![meta.num_deal.clone(); n]);
    enriched.add_column(QUOTE_COLUMN, vec![Data::String(meta.num_oferta.clone()); n]);
    enriched.add_column(REVISION_COLUMN, vec![Data::String(meta.revision.clone()); n]);

    // The second discount is whatever column sits immediately after the
    // net-price column, located by index rather than name. No adjacent
    // column, no discount field.
    if let Some(pivot) = reshaped.column_index(DETAIL_SOURCE_COLUMN) {
        if pivot + 1 < reshaped.width() {
            let values = retained
                .iter()
                .map(|&row| reshaped.cell(row, pivot + 1).clone())
                .collect();
            enriched.add_column(CISAC_COLUMN, values);
        }
    }

    enriched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    fn meta() -> QuoteMeta {
        QuoteMeta {
            cliente: s("ACME S.A."),
            num_deal: Data::Int(5001),
            num_oferta: "77".into(),
            revision: "2".into(),
        }
    }

    /// Reshaped table with a UN VA summary row followed by detail sub-rows.
    fn reshaped() -> Table {
        Table::new(
            vec![
                "Departamento".into(),
                "Precio Neto".into(),
                "STF".into(),
                "Precio Compra Unitario".into(),
            ],
            vec![
                // row 0: UN VA product line
                vec![s("UN VA"), Data::Float(100.0), Data::Float(0.1), Data::Float(80.0)],
                // row 1: detail
                vec![Data::Empty, Data::Float(1.0), Data::Empty, Data::Empty],
                // row 2: weight detail for row 0
                vec![Data::Empty, Data::Float(12.5), Data::Empty, Data::Empty],
                // row 3: ordinary product line in another department
                vec![s("ILUM"), Data::Float(200.0), Data::Float(0.2), Data::Float(150.0)],
                // rows 4-5: more detail rows
                vec![Data::Empty, Data::Float(2.0), Data::Empty, Data::Empty],
                vec![Data::Empty, Data::Float(3.0), Data::Empty, Data::Empty],
                // row 6: time detail for row 0
                vec![Data::Empty, Data::Float(4.5), Data::Empty, Data::Empty],
            ],
        )
    }

    #[test]
    fn test_named_department_reads_offset_rows() {
        let table = reshaped();
        let enriched = derive_fields(&table, &[0, 3], &meta());

        // Row 0 is UN VA: weight from row 0+2, time from row 0+6
        assert_eq!(enriched.value(0, WEIGHT_COLUMN), &Data::Float(12.5));
        assert_eq!(enriched.value(0, TIME_COLUMN), &Data::Float(4.5));
    }

    #[test]
    fn test_other_departments_forced_to_zero() {
        let table = reshaped();
        let enriched = derive_fields(&table, &[0, 3], &meta());

        // Row 3 is not UN VA: zeros regardless of what the offset rows hold
        assert_eq!(enriched.value(1, WEIGHT_COLUMN), &Data::Int(0));
        assert_eq!(enriched.value(1, TIME_COLUMN), &Data::Int(0));
    }

    #[test]
    fn test_offset_beyond_table_defaults_to_zero() {
        let mut rows = vec![vec![
            s("UN VA"),
            Data::Float(100.0),
            Data::Float(0.1),
            Data::Float(80.0),
        ]];
        // One detail row only: +2 resolves, +6 does not
        rows.push(vec![Data::Empty, Data::Float(1.0), Data::Empty, Data::Empty]);
        rows.push(vec![Data::Empty, Data::Float(9.0), Data::Empty, Data::Empty]);
        let table = Table::new(
            vec![
                "Departamento".into(),
                "Precio Neto".into(),
                "STF".into(),
                "Precio Compra Unitario".into(),
            ],
            rows,
        );
        let enriched = derive_fields(&table, &[0], &meta());
        assert_eq!(enriched.value(0, WEIGHT_COLUMN), &Data::Float(9.0));
        assert_eq!(enriched.value(0, TIME_COLUMN), &Data::Int(0));
    }

    #[test]
    fn test_discount_from_adjacent_column() {
        let table = reshaped();
        let enriched = derive_fields(&table, &[0, 3], &meta());

        // The column after "Precio Neto" is "STF"; its values feed the
        // discount column for the retained rows.
        assert_eq!(enriched.value(0, CISAC_COLUMN), &Data::Float(0.1));
        assert_eq!(enriched.value(1, CISAC_COLUMN), &Data::Float(0.2));
    }

    #[test]
    fn test_discount_absent_without_adjacent_column() {
        let table = Table::new(
            vec!["Departamento".into(), "Precio Neto".into()],
            vec![vec![s("ILUM"), Data::Float(100.0)]],
        );
        let enriched = derive_fields(&table, &[0], &meta());
        assert_eq!(enriched.column_index(CISAC_COLUMN), None);
    }

    #[test]
    fn test_metadata_broadcast() {
        let table = reshaped();
        let enriched = derive_fields(&table, &[0, 3], &meta());
        for row in 0..2 {
            assert_eq!(enriched.value(row, CLIENT_COLUMN), &s("ACME S.A."));
            assert_eq!(enriched.value(row, DEAL_COLUMN), &Data::Int(5001));
            assert_eq!(enriched.value(row, QUOTE_COLUMN), &s("77"));
            assert_eq!(enriched.value(row, REVISION_COLUMN), &s("2"));
        }
    }
}
