//! Loosely-typed tabular data backed by spreadsheet cells
//!
//! `Table` is the single abstraction all extraction stages operate on: named
//! columns over rows of raw `calamine` cells. Cell interpretation (missing,
//! numeric, textual) goes through the `cell` helpers so every default-value
//! decision lives in one place.

use calamine::{Data, Range};

static EMPTY_CELL: Data = Data::Empty;

/// Named columns over rows of raw spreadsheet cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Data>>,
}

impl Table {
    /// Build a table from explicit columns and rows. Rows are padded or
    /// truncated to the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Data>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Data::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Build a table from a worksheet range, using absolute cell positions so
    /// sheets whose used area does not start at A1 keep their coordinates.
    ///
    /// The first grid row names the columns (the quoting tool's own export
    /// header); all later rows are data.
    pub fn from_range(range: &Range<Data>) -> Self {
        let grid = match range.end() {
            Some((end_row, end_col)) => (0..=end_row)
                .map(|r| {
                    (0..=end_col)
                        .map(|c| range.get_value((r, c)).cloned().unwrap_or(Data::Empty))
                        .collect::<Vec<_>>()
                })
                .collect(),
            None => Vec::new(),
        };
        Self::from_grid(grid)
    }

    /// Build a table from a full grid of cells: row 0 becomes the column
    /// names, the remaining rows become data.
    pub fn from_grid(mut grid: Vec<Vec<Data>>) -> Self {
        if grid.is_empty() {
            return Self { columns: Vec::new(), rows: Vec::new() };
        }
        let header = grid.remove(0);
        let names = dedup_columns(header.iter().map(cell::display).collect());
        Self::new(names, grid)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column with this exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (row, column index). Out-of-range positions read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Data {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Cell at (row, column name). Missing columns read as empty.
    pub fn value(&self, row: usize, name: &str) -> &Data {
        match self.column_index(name) {
            Some(col) => self.cell(row, col),
            None => &EMPTY_CELL,
        }
    }

    /// Numeric view of a cell, `None` when missing or non-numeric.
    pub fn number(&self, row: usize, name: &str) -> Option<f64> {
        cell::as_f64(self.value(row, name))
    }

    /// Textual view of a cell, empty string when missing.
    pub fn text(&self, row: usize, name: &str) -> String {
        cell::display(self.value(row, name))
    }

    /// Promote `header_row` to column names: its cells (deduplicated) become
    /// the columns, rows at or above it are discarded, and the surviving rows
    /// are re-labeled to a contiguous zero-based range.
    pub fn promote_header(&self, header_row: usize) -> Table {
        let names: Vec<String> = match self.rows.get(header_row) {
            Some(row) => row.iter().map(cell::display).collect(),
            None => vec![String::new(); self.width()],
        };
        let names = dedup_columns(names);
        let rows = if header_row + 1 < self.rows.len() {
            self.rows[header_row + 1..].to_vec()
        } else {
            Vec::new()
        };
        Table::new(names, rows)
    }

    /// Drop columns whose cells are missing in every row.
    pub fn drop_empty_columns(&mut self) {
        let keep: Vec<usize> = (0..self.width())
            .filter(|&c| self.rows.iter().any(|row| !cell::is_missing(&row[c])))
            .collect();
        if keep.len() == self.width() {
            return;
        }
        self.columns = keep.iter().map(|&c| self.columns[c].clone()).collect();
        for row in &mut self.rows {
            *row = keep.iter().map(|&c| row[c].clone()).collect();
        }
    }

    /// New table containing only the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        let rows = indices
            .iter()
            .map(|&i| self.rows.get(i).cloned().unwrap_or_default())
            .collect();
        Table::new(self.columns.clone(), rows)
    }

    /// Append a column. Values are padded or truncated to the row count.
    pub fn add_column(&mut self, name: &str, mut values: Vec<Data>) {
        values.resize(self.height(), Data::Empty);
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Concatenate tables row-wise, preserving first-seen column order.
    /// Cells for columns a table does not carry read as empty.
    pub fn concat(tables: &[Table]) -> Table {
        let mut columns: Vec<String> = Vec::new();
        for table in tables {
            for name in &table.columns {
                if !columns.contains(name) {
                    columns.push(name.clone());
                }
            }
        }
        let mut rows = Vec::new();
        for table in tables {
            for r in 0..table.height() {
                let row = columns
                    .iter()
                    .map(|name| table.value(r, name).clone())
                    .collect();
                rows.push(row);
            }
        }
        Table { columns, rows }
    }
}

/// Rename duplicated column names to `<name>_0 .. <name>_{k-1}` in order of
/// appearance. Unique names pass through unchanged. Deterministic for
/// identical input.
pub fn dedup_columns(names: Vec<String>) -> Vec<String> {
    let mut totals: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for name in &names {
        *totals.entry(name.as_str()).or_insert(0) += 1;
    }
    let mut seen: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    names
        .iter()
        .map(|name| {
            if totals[name.as_str()] > 1 {
                let ordinal = seen.entry(name.clone()).or_insert(0);
                let renamed = format!("{}_{}", name, ordinal);
                *ordinal += 1;
                renamed
            } else {
                name.clone()
            }
        })
        .collect()
}

/// Cell interpretation policy. Empty cells, error cells, and NaN floats are
/// "missing"; everything else is a value.
pub mod cell {
    use calamine::Data;

    /// Whether a cell carries no usable value.
    pub fn is_missing(cell: &Data) -> bool {
        match cell {
            Data::Empty | Data::Error(_) => true,
            Data::Float(f) => f.is_nan(),
            Data::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric view. Numeric-looking strings parse; anything else is `None`.
    pub fn as_f64(cell: &Data) -> Option<f64> {
        match cell {
            Data::Int(i) => Some(*i as f64),
            Data::Float(f) if !f.is_nan() => Some(*f),
            Data::String(s) => s.trim().parse().ok(),
            Data::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Display form used for column names, metadata, and text fields.
    /// Missing cells render as the empty string; whole floats render without
    /// a fractional part.
    pub fn display(cell: &Data) -> String {
        match cell {
            Data::Empty | Data::Error(_) => String::new(),
            Data::String(s) => s.clone(),
            Data::Int(i) => i.to_string(),
            Data::Float(f) if f.is_nan() => String::new(),
            Data::Float(f) => {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Data::Bool(b) => b.to_string(),
            Data::DateTime(dt) => format!("{}", dt),
            Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        }
    }

    /// String view when the cell is a string, `None` otherwise.
    pub fn as_str(cell: &Data) -> Option<&str> {
        match cell {
            Data::String(s) => Some(s),
            _ => None,
        }
    }
}
