//! Fixed-coordinate metadata anchors for the quoting-tool sheet layout
//!
//! The quote header block (deal number, client, composite quote code) lives at
//! fixed cells whose position depends on the template variant. Each variant is
//! an anchor set; exactly one set is chosen per sheet, driven by whether the
//! primary deal cell is empty. New template variants become new `AnchorLayout`
//! arms instead of scattered conditionals.

use calamine::Data;
use log::debug;

use super::table::{Table, cell};

/// A fixed (row, column) position in the reshape input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

/// Coordinates of the quote header block for one template variant.
#[derive(Debug, Clone, Copy)]
pub struct AnchorSet {
    /// Deal number cell. Doubles as the layout discriminator for the primary set.
    pub deal: CellRef,
    /// Client name cell.
    pub client: CellRef,
    /// Composite `deal-quote-revision` code cell.
    pub composite: CellRef,
}

const PRIMARY: AnchorSet = AnchorSet {
    deal: CellRef { row: 233, col: 112 },
    client: CellRef { row: 238, col: 70 },
    composite: CellRef { row: 234, col: 112 },
};

const FALLBACK: AnchorSet = AnchorSet {
    deal: CellRef { row: 350, col: 112 },
    client: CellRef { row: 355, col: 70 },
    composite: CellRef { row: 351, col: 112 },
};

/// Template layout variants, in discriminator order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorLayout {
    Primary,
    Fallback,
}

impl AnchorLayout {
    /// Choose the layout for a sheet: the fallback set is used exactly when
    /// the primary deal cell is empty. Binary choice, never a mix.
    pub fn detect(table: &Table) -> AnchorLayout {
        let probe = PRIMARY.deal;
        if cell::is_missing(table.cell(probe.row, probe.col)) {
            AnchorLayout::Fallback
        } else {
            AnchorLayout::Primary
        }
    }

    pub fn anchors(&self) -> &'static AnchorSet {
        match self {
            AnchorLayout::Primary => &PRIMARY,
            AnchorLayout::Fallback => &FALLBACK,
        }
    }
}

/// Quote header metadata read from the chosen anchor set.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteMeta {
    pub cliente: Data,
    pub num_deal: Data,
    pub num_oferta: String,
    pub revision: String,
}

/// Read the quote header block from the sheet. Cells outside the sheet extent
/// read as empty, so undersized sheets yield empty metadata rather than an
/// error.
pub fn extract_meta(table: &Table) -> QuoteMeta {
    let layout = AnchorLayout::detect(table);
    let anchors = layout.anchors();
    debug!("quote header read from {:?} anchor set", layout);

    let composite = cell::display(table.cell(anchors.composite.row, anchors.composite.col));
    let (num_oferta, revision) = split_composite(&composite);

    QuoteMeta {
        cliente: table.cell(anchors.client.row, anchors.client.col).clone(),
        num_deal: table.cell(anchors.deal.row, anchors.deal.col).clone(),
        num_oferta,
        revision,
    }
}

/// Split the composite `deal-quote-revision` code. Only the 2nd and 3rd parts
/// are kept; missing parts default to the empty string.
pub fn split_composite(code: &str) -> (String, String) {
    let mut parts = code.split('-');
    parts.next();
    let quote = parts.next().unwrap_or("").to_string();
    let revision = parts.next().unwrap_or("").to_string();
    (quote, revision)
}
