use serde::{Deserialize, Serialize};

/// One cell as the host saw it: normalized text plus whether it was a header
/// cell (`<th>`). Header cells are never "claimed" by rule styling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub text: String,
    #[serde(default)]
    pub is_header: bool,
}

impl CellSnapshot {
    pub fn data(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_header: false }
    }

    pub fn header(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_header: true }
    }
}

/// Row-major text grid of a single table. Rows may be ragged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub rows: Vec<Vec<CellSnapshot>>,
}

impl TableSnapshot {
    pub fn new(rows: Vec<Vec<CellSnapshot>>) -> Self {
        Self { rows }
    }

    /// Build a grid of data cells from plain text.
    pub fn from_texts<S: AsRef<str>>(rows: &[Vec<S>]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|t| CellSnapshot::data(t.as_ref())).collect())
                .collect(),
        }
    }

    /// Build a grid whose first row is made of header cells.
    pub fn with_header<S: AsRef<str>>(rows: &[Vec<S>]) -> Self {
        let mut table = Self::from_texts(rows);
        if let Some(first) = table.rows.first_mut() {
            for cell in first {
                cell.is_header = true;
            }
        }
        table
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn max_columns(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn row_len(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Vec::len)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellSnapshot> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Text at (row, col), or `""` when the cell does not exist.
    pub fn text(&self, row: usize, col: usize) -> &str {
        self.cell(row, col).map_or("", |c| c.text.as_str())
    }

    /// First row containing a header cell; 0 when the table has none.
    pub fn header_row(&self) -> usize {
        self.rows
            .iter()
            .position(|row| row.iter().any(|c| c.is_header))
            .unwrap_or(0)
    }

    /// First row containing a data cell; 0 when the table has none.
    pub fn first_data_row(&self) -> usize {
        self.rows
            .iter()
            .position(|row| row.iter().any(|c| !c.is_header))
            .unwrap_or(0)
    }

    /// Rows that actually have a cell in `col`.
    pub fn rows_with_column(&self, col: usize) -> Vec<usize> {
        (0..self.rows.len()).filter(|&r| col < self.rows[r].len()).collect()
    }
}
