//! User-facing color edits. Each operation changes the store and records
//! the matching undo entry in the same call.

use tablecolor_core::{CellColor, Color, ColorField};

use crate::history::{History, Region, RegionColors, UndoSnapshot};
use crate::store::ManualColorStore;

pub struct ColorEditor<'a> {
    store: &'a mut ManualColorStore,
    history: &'a mut History,
}

impl<'a> ColorEditor<'a> {
    pub fn new(store: &'a mut ManualColorStore, history: &'a mut History) -> Self {
        Self { store, history }
    }

    /// Set one field of a cell. `None` clears that field.
    pub fn pick_cell(
        &mut self,
        doc: &str,
        table: usize,
        row: usize,
        col: usize,
        field: ColorField,
        color: Option<Color>,
    ) -> bool {
        if doc.is_empty() {
            return false;
        }
        let old = self.store.set(doc, table, row, col, field, color);
        let new = self.store.get(doc, table, row, col);
        self.history.record(UndoSnapshot::new(
            doc,
            table,
            Region::Cell { row, col },
            old.map(RegionColors::Cell),
            new.map(RegionColors::Cell),
        ));
        true
    }

    /// Set one field on cells `0..width` of a row.
    pub fn pick_row(
        &mut self,
        doc: &str,
        table: usize,
        row: usize,
        width: usize,
        field: ColorField,
        color: Option<Color>,
    ) -> bool {
        if doc.is_empty() {
            return false;
        }
        let old = self.store.set_row(doc, table, row, width, field, color);
        let new = self.store.row(doc, table, row);
        self.history.record(UndoSnapshot::new(
            doc,
            table,
            Region::Row(row),
            Some(RegionColors::Row(old)),
            Some(RegionColors::Row(new)),
        ));
        true
    }

    /// Set one field on column `col` of every row in `rows`.
    pub fn pick_column(
        &mut self,
        doc: &str,
        table: usize,
        col: usize,
        rows: &[usize],
        field: ColorField,
        color: Option<Color>,
    ) -> bool {
        if doc.is_empty() {
            return false;
        }
        let old = self.store.set_column(doc, table, col, rows, field, color);
        let new = self.store.column(doc, table, col);
        self.history.record(UndoSnapshot::new(
            doc,
            table,
            Region::Column(col),
            Some(RegionColors::Column(old)),
            Some(RegionColors::Column(new)),
        ));
        true
    }

    /// Remove both colors from a cell. Returns false when there was nothing
    /// to remove.
    pub fn reset_cell(&mut self, doc: &str, table: usize, row: usize, col: usize) -> bool {
        if doc.is_empty() {
            return false;
        }
        let Some(old) = self.store.delete(doc, table, row, col) else {
            return false;
        };
        self.history.record(UndoSnapshot::new(
            doc,
            table,
            Region::Cell { row, col },
            Some(RegionColors::Cell(old)),
            None,
        ));
        true
    }

    pub fn reset_row(&mut self, doc: &str, table: usize, row: usize) -> bool {
        if doc.is_empty() {
            return false;
        }
        let old = self.store.take_row(doc, table, row);
        if old.is_empty() {
            return false;
        }
        self.history
            .record(UndoSnapshot::new(doc, table, Region::Row(row), Some(RegionColors::Row(old)), None));
        true
    }

    pub fn reset_column(&mut self, doc: &str, table: usize, col: usize) -> bool {
        if doc.is_empty() {
            return false;
        }
        let old = self.store.take_column(doc, table, col);
        if old.is_empty() {
            return false;
        }
        self.history.record(UndoSnapshot::new(
            doc,
            table,
            Region::Column(col),
            Some(RegionColors::Column(old)),
            None,
        ));
        true
    }

    /// Undo the last edit, returning it.
    pub fn undo(&mut self) -> Option<UndoSnapshot> {
        let snapshot = self.history.undo()?;
        snapshot.restore_old(self.store);
        log::debug!("undo {} on {} table {}", snapshot.region.operation_type(), snapshot.document, snapshot.table);
        Some(snapshot)
    }

    /// Redo the last undone edit, returning it.
    pub fn redo(&mut self) -> Option<UndoSnapshot> {
        let snapshot = self.history.redo()?;
        snapshot.restore_new(self.store);
        log::debug!("redo {} on {} table {}", snapshot.region.operation_type(), snapshot.document, snapshot.table);
        Some(snapshot)
    }

    /// Delete every manual color in every document. History is kept.
    pub fn clear_all(&mut self) {
        self.store.clear();
    }

    pub fn get(&self, doc: &str, table: usize, row: usize, col: usize) -> Option<CellColor> {
        self.store.get(doc, table, row, col)
    }
}
