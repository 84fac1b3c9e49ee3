use serde::{Deserialize, Serialize};

use crate::color::{CellColor, Color};
use crate::table::TableSnapshot;

/// Final style of one cell after a reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Color>,
    /// Cell carries a user-picked color. Rules skip manual data cells.
    #[serde(default)]
    pub manual: bool,
}

impl CellStyle {
    /// True when either color is set.
    pub fn is_styled(&self) -> bool {
        self.background.is_some() || self.text.is_some()
    }

    /// Write whichever of `bg`/`text` is set; `None` leaves that half alone.
    pub fn paint(&mut self, bg: Option<Color>, text: Option<Color>) {
        if bg.is_some() {
            self.background = bg;
        }
        if text.is_some() {
            self.text = text;
        }
    }

    pub fn paint_manual(&mut self, colors: &CellColor) {
        self.paint(colors.bg, colors.color);
        self.manual = true;
    }
}

/// Per-table style grid, shaped exactly like the `TableSnapshot` it was built
/// from. Both rule engines write into it and the reconciler reads from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleOverlay {
    pub rows: Vec<Vec<CellStyle>>,
}

impl StyleOverlay {
    pub fn for_table(table: &TableSnapshot) -> Self {
        Self {
            rows: table.rows.iter().map(|row| vec![CellStyle::default(); row.len()]).collect(),
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&CellStyle> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut CellStyle> {
        self.rows.get_mut(row).and_then(|r| r.get_mut(col))
    }

    /// Iterate `(row, col, style)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &CellStyle)> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, style)| (r, c, style)))
    }

    pub fn styled_count(&self) -> usize {
        self.iter().filter(|(_, _, s)| s.is_styled()).count()
    }
}
