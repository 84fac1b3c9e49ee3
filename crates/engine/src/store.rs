//! Sparse manual colors: `document -> table -> row -> column -> CellColor`.
//!
//! Maps are created on first write. A cell whose two fields are both cleared
//! is removed, and row/table maps left empty are pruned with it.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tablecolor_core::{CellColor, Color, ColorField};

use crate::keyed::{ColumnColorMap, RowColorMap, TableColorMap};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ManualColorStore {
    documents: BTreeMap<String, TableColorMap>,
}

impl ManualColorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> impl Iterator<Item = (&str, &TableColorMap)> {
        self.documents.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn document(&self, doc: &str) -> Option<&TableColorMap> {
        self.documents.get(doc)
    }

    pub fn table(&self, doc: &str, table: usize) -> Option<&RowColorMap> {
        self.documents.get(doc)?.get(table)
    }

    /// Number of colored cells across every document.
    pub fn cell_count(&self) -> usize {
        self.documents
            .values()
            .flat_map(|tables| tables.iter())
            .flat_map(|(_, rows)| rows.iter())
            .map(|(_, cols)| cols.len())
            .sum()
    }

    pub fn get(&self, doc: &str, table: usize, row: usize, col: usize) -> Option<CellColor> {
        self.table(doc, table)?.get(row)?.get(col).copied()
    }

    /// Set or clear one field of a cell, keeping the other field. Returns the
    /// cell as it was before.
    pub fn set(
        &mut self,
        doc: &str,
        table: usize,
        row: usize,
        col: usize,
        field: ColorField,
        color: Option<Color>,
    ) -> Option<CellColor> {
        let previous = self.get(doc, table, row, col);
        let merged = previous.unwrap_or_default().with(field, color);
        self.put(doc, table, row, col, merged);
        previous
    }

    /// Replace a cell outright; an empty color deletes it.
    pub fn put(&mut self, doc: &str, table: usize, row: usize, col: usize, colors: CellColor) {
        if colors.is_empty() {
            self.delete(doc, table, row, col);
            return;
        }
        self.documents
            .entry(doc.to_string())
            .or_default()
            .get_or_default(table)
            .get_or_default(row)
            .insert(col, colors);
    }

    pub fn delete(&mut self, doc: &str, table: usize, row: usize, col: usize) -> Option<CellColor> {
        let rows = self.documents.get_mut(doc)?.get_mut(table)?;
        let removed = rows.get_mut(row)?.remove(col);
        self.prune(doc, table, row);
        removed
    }

    /// Current colors of a row, keyed by column.
    pub fn row(&self, doc: &str, table: usize, row: usize) -> ColumnColorMap {
        self.table(doc, table)
            .and_then(|rows| rows.get(row))
            .cloned()
            .unwrap_or_default()
    }

    /// Current colors of a column, as `row -> {col -> CellColor}`.
    pub fn column(&self, doc: &str, table: usize, col: usize) -> RowColorMap {
        let Some(rows) = self.table(doc, table) else {
            return RowColorMap::new();
        };
        rows.iter()
            .filter_map(|(r, cols)| {
                let colors = *cols.get(col)?;
                Some((r, std::iter::once((col, colors)).collect::<ColumnColorMap>()))
            })
            .collect()
    }

    /// Merge `color` into cells `0..width` of a row. Returns the whole row
    /// as it was before.
    pub fn set_row(
        &mut self,
        doc: &str,
        table: usize,
        row: usize,
        width: usize,
        field: ColorField,
        color: Option<Color>,
    ) -> ColumnColorMap {
        let previous = self.row(doc, table, row);
        for col in 0..width {
            self.set(doc, table, row, col, field, color);
        }
        previous
    }

    /// Merge `color` into column `col` of every row in `rows`. Returns the
    /// column as it was before.
    pub fn set_column(
        &mut self,
        doc: &str,
        table: usize,
        col: usize,
        rows: &[usize],
        field: ColorField,
        color: Option<Color>,
    ) -> RowColorMap {
        let previous = self.column(doc, table, col);
        for &row in rows {
            self.set(doc, table, row, col, field, color);
        }
        previous
    }

    /// Remove a row's colors, returning them.
    pub fn take_row(&mut self, doc: &str, table: usize, row: usize) -> ColumnColorMap {
        let removed = self
            .documents
            .get_mut(doc)
            .and_then(|tables| tables.get_mut(table))
            .and_then(|rows| rows.remove(row))
            .unwrap_or_default();
        self.prune(doc, table, row);
        removed
    }

    /// Remove a column's colors from every row, returning them.
    pub fn take_column(&mut self, doc: &str, table: usize, col: usize) -> RowColorMap {
        let previous = self.column(doc, table, col);
        for (row, _) in previous.iter() {
            self.delete(doc, table, row, col);
        }
        previous
    }

    /// Replace a row with `colors`; `None` or an empty map deletes it.
    pub fn restore_row(&mut self, doc: &str, table: usize, row: usize, colors: Option<&ColumnColorMap>) {
        self.take_row(doc, table, row);
        if let Some(colors) = colors {
            for (col, cell) in colors.iter() {
                self.put(doc, table, row, col, *cell);
            }
        }
    }

    /// Replace a column with `colors`; `None` or an empty map deletes it.
    /// Entries for other columns in `colors` are ignored.
    pub fn restore_column(&mut self, doc: &str, table: usize, col: usize, colors: Option<&RowColorMap>) {
        self.take_column(doc, table, col);
        if let Some(colors) = colors {
            for (row, cols) in colors.iter() {
                if let Some(cell) = cols.get(col) {
                    self.put(doc, table, row, col, *cell);
                }
            }
        }
    }

    pub fn clear_document(&mut self, doc: &str) -> bool {
        self.documents.remove(doc).is_some()
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    fn prune(&mut self, doc: &str, table: usize, row: usize) {
        let Some(tables) = self.documents.get_mut(doc) else {
            return;
        };
        if let Some(rows) = tables.get_mut(table) {
            if rows.get(row).is_some_and(|cols| cols.is_empty()) {
                rows.remove(row);
            }
            if rows.is_empty() {
                tables.remove(table);
            }
        }
        if tables.is_empty() {
            self.documents.remove(doc);
        }
    }
}

impl<'de> Deserialize<'de> for ManualColorStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => serde_json::Map::new(),
            other => {
                log::warn!("ignoring cell colors: expected an object, found {}", other);
                serde_json::Map::new()
            }
        };
        let documents = raw
            .into_iter()
            .filter_map(|(doc, value)| match serde_json::from_value::<TableColorMap>(value) {
                Ok(tables) => Some((doc, tables)),
                Err(e) => {
                    log::warn!("ignoring colors for '{}': {}", doc, e);
                    None
                }
            })
            .collect();
        Ok(Self { documents })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RED: Color = Color::from_hex(0xFF0000);
    const BLACK: Color = Color::from_hex(0x000000);

    #[test]
    fn test_set_merges_fields() {
        let mut store = ManualColorStore::new();
        assert_eq!(store.set("a.md", 0, 1, 2, ColorField::Background, Some(RED)), None);
        store.set("a.md", 0, 1, 2, ColorField::Text, Some(BLACK));
        assert_eq!(store.get("a.md", 0, 1, 2), Some(CellColor { bg: Some(RED), color: Some(BLACK) }));

        store.set("a.md", 0, 1, 2, ColorField::Background, None);
        assert_eq!(store.get("a.md", 0, 1, 2), Some(CellColor::text(BLACK)));
    }

    #[test]
    fn test_clearing_last_field_prunes() {
        let mut store = ManualColorStore::new();
        store.set("a.md", 0, 1, 2, ColorField::Background, Some(RED));
        store.set("a.md", 0, 1, 2, ColorField::Background, None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_row_roundtrip() {
        let mut store = ManualColorStore::new();
        store.set("d", 0, 0, 1, ColorField::Text, Some(BLACK));
        let before = store.set_row("d", 0, 0, 3, ColorField::Background, Some(RED));
        assert_eq!(before.len(), 1);
        assert_eq!(store.row("d", 0, 0).len(), 3);
        assert_eq!(store.get("d", 0, 0, 1), Some(CellColor { bg: Some(RED), color: Some(BLACK) }));

        store.restore_row("d", 0, 0, Some(&before));
        assert_eq!(store.row("d", 0, 0), before);

        store.restore_row("d", 0, 0, None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_column_roundtrip() {
        let mut store = ManualColorStore::new();
        store.set("d", 0, 2, 0, ColorField::Background, Some(BLACK));
        store.set("d", 0, 2, 1, ColorField::Background, Some(BLACK));
        let before = store.set_column("d", 0, 0, &[0, 1, 2], ColorField::Background, Some(RED));
        assert_eq!(before.len(), 1);
        assert_eq!(store.column("d", 0, 0).len(), 3);

        let taken = store.take_column("d", 0, 0);
        assert_eq!(taken.len(), 3);
        assert_eq!(store.get("d", 0, 2, 1), Some(CellColor::background(BLACK)));

        store.restore_column("d", 0, 0, Some(&before));
        assert_eq!(store.column("d", 0, 0), before);
    }

    #[test]
    fn test_clear_document() {
        let mut store = ManualColorStore::new();
        store.set("a", 0, 0, 0, ColorField::Background, Some(RED));
        store.set("b", 0, 0, 0, ColorField::Background, Some(RED));
        assert!(store.clear_document("a"));
        assert!(!store.clear_document("a"));
        assert_eq!(store.cell_count(), 1);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_serde_shape_and_lenient_load() {
        let mut store = ManualColorStore::new();
        store.set("notes/a.md", 1, 0, 3, ColorField::Background, Some(RED));
        assert_eq!(
            serde_json::to_value(&store).unwrap(),
            json!({"notes/a.md": {"table_1": {"row_0": {"col_3": {"bg": "#FF0000"}}}}})
        );

        let loaded: ManualColorStore = serde_json::from_value(json!({
            "good.md": {"table_0": {"row_0": {"col_0": {"color": "#000"}}}},
            "bad.md": [1, 2, 3]
        }))
        .unwrap();
        assert_eq!(loaded.cell_count(), 1);
        assert_eq!(loaded.get("good.md", 0, 0, 0), Some(CellColor::text(BLACK)));

        let empty: ManualColorStore = serde_json::from_value(serde_json::Value::Null).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_non_object_loads_empty() {
        for raw in [json!([1, 2]), json!("colors"), json!(7), json!(true)] {
            let store: ManualColorStore = serde_json::from_value(raw).unwrap();
            assert!(store.is_empty());
        }
    }
}
