//! Header location and table reshape
//!
//! A quoting-tool export sheet carries decorative and summary rows above and
//! below the actual price-list block. The true header row is located by
//! scanning a pivot column for a sentinel label, then promoted to column
//! names; everything at or above it is discarded.

use calamine::Data;
use log::warn;

use super::table::{Table, cell};

/// Column (by initial-header name) scanned for the header sentinel.
pub const PIVOT_COLUMN: &str = "Factor STD";
/// Sentinel label marking the true header row.
pub const HEADER_SENTINEL: &str = "Precio Lista";
/// Column deciding whether a row is a real product line.
pub const PURCHASE_PRICE_COLUMN: &str = "Precio Compra Unitario";
/// Placeholder the quoting tool writes into subtotal rows.
const PLACEHOLDER_SENTINEL: &str = "*";

/// Row index of the header sentinel in the pivot column, or 0 when absent.
///
/// The row-0 default mirrors the quoting tool's historical behavior: the
/// reshaped table is then near-empty and the row filter usually retains
/// nothing. That degenerate parse is worth seeing in logs, so it warns.
pub fn locate_header(table: &Table) -> usize {
    let Some(pivot) = table.column_index(PIVOT_COLUMN) else {
        warn!(
            "pivot column {:?} not found; defaulting header to row 0",
            PIVOT_COLUMN
        );
        return 0;
    };
    for row in 0..table.height() {
        if cell::as_str(table.cell(row, pivot)) == Some(HEADER_SENTINEL) {
            return row;
        }
    }
    warn!(
        "header sentinel {:?} not found in column {:?}; defaulting header to row 0",
        HEADER_SENTINEL, PIVOT_COLUMN
    );
    0
}

/// Reshape the sheet into a clean rectangular table: promote the located
/// header row to column names (deduplicated), discard rows at or above it,
/// reset row labels to a contiguous zero-based range, and drop columns that
/// are empty across all rows.
pub fn reshape(table: &Table) -> Table {
    let top = locate_header(table);
    let mut reshaped = table.promote_header(top);
    reshaped.drop_empty_columns();
    reshaped
}

/// Whether a purchase-price cell marks a real product line: present, non-zero,
/// and not the subtotal placeholder.
fn is_product_price(value: &Data) -> bool {
    if cell::is_missing(value) {
        return false;
    }
    match value {
        Data::Int(0) => false,
        Data::Float(f) if *f == 0.0 => false,
        Data::String(s) if s == PLACEHOLDER_SENTINEL => false,
        _ => true,
    }
}

/// Indices of the rows that are real product lines. A missing purchase-price
/// column retains nothing, which matches the degenerate default-header case.
pub fn product_row_indices(table: &Table) -> Vec<usize> {
    let Some(col) = table.column_index(PURCHASE_PRICE_COLUMN) else {
        warn!(
            "purchase price column {:?} not found; no product rows retained",
            PURCHASE_PRICE_COLUMN
        );
        return Vec::new();
    };
    (0..table.height())
        .filter(|&row| is_product_price(table.cell(row, col)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    /// Sheet with decorative rows, a sentinel header row, and data below it.
    fn sheet() -> Table {
        Table::from_grid(vec![
            vec![s("Factor STD"), s("x"), s("y")],
            vec![s("summary"), Data::Empty, Data::Empty],
            vec![s("Precio Lista"), s("#Item"), s("Precio Compra Unitario")],
            vec![Data::Float(1.1), Data::Int(1), Data::Float(10.0)],
            vec![Data::Float(1.1), Data::Int(2), s("*")],
            vec![Data::Float(1.1), Data::Int(3), Data::Float(0.0)],
            vec![Data::Float(1.1), Data::Int(4), Data::Empty],
            vec![Data::Float(1.1), Data::Int(5), Data::Float(7.5)],
        ])
    }

    #[test]
    fn test_locate_header_finds_sentinel_row() {
        assert_eq!(locate_header(&sheet()), 1);
    }

    #[test]
    fn test_locate_header_defaults_to_zero() {
        let table = Table::from_grid(vec![
            vec![s("Factor STD"), s("x")],
            vec![s("no sentinel here"), Data::Int(1)],
        ]);
        assert_eq!(locate_header(&table), 0);

        let no_pivot = Table::from_grid(vec![
            vec![s("a"), s("b")],
            vec![s("Precio Lista"), Data::Int(1)],
        ]);
        assert_eq!(locate_header(&no_pivot), 0);
    }

    #[test]
    fn test_reshape_promotes_header_and_resets_rows() {
        let reshaped = reshape(&sheet());
        assert_eq!(
            reshaped.columns(),
            &["Precio Lista", "#Item", "Precio Compra Unitario"]
        );
        assert_eq!(reshaped.height(), 5);
        // Row labels are contiguous from zero after the reshape
        assert_eq!(reshaped.value(0, "#Item"), &Data::Int(1));
        assert_eq!(reshaped.value(4, "#Item"), &Data::Int(5));
    }

    #[test]
    fn test_reshape_drops_all_empty_columns() {
        let table = Table::from_grid(vec![
            vec![s("Factor STD"), s("x"), s("y")],
            vec![s("Precio Lista"), s("#Item"), Data::Empty],
            vec![Data::Float(1.1), Data::Int(1), Data::Empty],
        ]);
        let reshaped = reshape(&table);
        // The unnamed all-empty third column disappears
        assert_eq!(reshaped.columns(), &["Precio Lista", "#Item"]);
    }

    #[test]
    fn test_product_row_filter() {
        let reshaped = reshape(&sheet());
        // Rows with 10.0 and 7.5 survive; '*', 0.0 and empty do not
        assert_eq!(product_row_indices(&reshaped), vec![0, 4]);
    }

    #[test]
    fn test_product_row_filter_missing_column() {
        let table = Table::new(vec!["A".into()], vec![vec![Data::Int(1)]]);
        assert!(product_row_indices(&table).is_empty());
    }

    #[test]
    fn test_product_row_filter_keeps_nonzero_strings() {
        let table = Table::new(
            vec![PURCHASE_PRICE_COLUMN.into()],
            vec![vec![s("12,50")], vec![s("*")], vec![Data::Int(-3)]],
        );
        assert_eq!(product_row_indices(&table), vec![0, 2]);
    }
}
