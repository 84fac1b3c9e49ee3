//! Undo/Redo history for manual color edits.
//!
//! Each entry records the region an edit touched and its colors before and
//! after. Undo restores the "before" side, redo the "after" side; a side with
//! no colors deletes the region.

use serde::{Deserialize, Serialize, Serializer};
use tablecolor_core::CellColor;

use crate::keyed::{ColumnColorMap, RowColorMap};
use crate::rules::decode_list;
use crate::store::ManualColorStore;

pub const DEFAULT_CAPACITY: usize = 50;

/// Which part of a table an edit touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Cell { row: usize, col: usize },
    Row(usize),
    Column(usize),
}

impl Region {
    pub fn operation_type(&self) -> &'static str {
        match self {
            Region::Cell { .. } => "cell_color",
            Region::Row(_) => "row_color",
            Region::Column(_) => "column_color",
        }
    }

    fn coordinates(&self) -> Coordinates {
        match *self {
            Region::Cell { row, col } => Coordinates { row: Some(row), col: Some(col) },
            Region::Row(row) => Coordinates { row: Some(row), col: None },
            Region::Column(col) => Coordinates { row: None, col: Some(col) },
        }
    }
}

/// Colors of a region. The shape matches the region: a single cell, a row
/// keyed by column, or a column keyed by row then column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RegionColors {
    Cell(CellColor),
    Row(ColumnColorMap),
    Column(RowColorMap),
}

impl RegionColors {
    pub fn is_empty(&self) -> bool {
        match self {
            RegionColors::Cell(c) => c.is_empty(),
            RegionColors::Row(m) => m.is_empty(),
            RegionColors::Column(m) => m.is_empty(),
        }
    }

    fn decode(region: Region, value: serde_json::Value) -> Result<Option<Self>, serde_json::Error> {
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(match region {
            Region::Cell { .. } => RegionColors::Cell(serde_json::from_value(value)?),
            Region::Row(_) => RegionColors::Row(serde_json::from_value(value)?),
            Region::Column(_) => RegionColors::Column(serde_json::from_value(value)?),
        }))
    }
}

/// One recorded edit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawSnapshot")]
pub struct UndoSnapshot {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub document: String,
    pub table: usize,
    pub region: Region,
    pub old_colors: Option<RegionColors>,
    pub new_colors: Option<RegionColors>,
}

impl UndoSnapshot {
    pub fn new(
        document: impl Into<String>,
        table: usize,
        region: Region,
        old_colors: Option<RegionColors>,
        new_colors: Option<RegionColors>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp_millis(),
            document: document.into(),
            table,
            region,
            old_colors: old_colors.filter(|c| !c.is_empty()),
            new_colors: new_colors.filter(|c| !c.is_empty()),
        }
    }

    /// Put the region back the way it was before the edit.
    pub fn restore_old(&self, store: &mut ManualColorStore) {
        self.restore(store, self.old_colors.as_ref());
    }

    /// Put the region back the way the edit left it.
    pub fn restore_new(&self, store: &mut ManualColorStore) {
        self.restore(store, self.new_colors.as_ref());
    }

    fn restore(&self, store: &mut ManualColorStore, colors: Option<&RegionColors>) {
        let doc = self.document.as_str();
        match (self.region, colors) {
            (Region::Cell { row, col }, Some(RegionColors::Cell(c))) => store.put(doc, self.table, row, col, *c),
            (Region::Cell { row, col }, None) => {
                store.delete(doc, self.table, row, col);
            }
            (Region::Row(row), Some(RegionColors::Row(m))) => store.restore_row(doc, self.table, row, Some(m)),
            (Region::Row(row), None) => store.restore_row(doc, self.table, row, None),
            (Region::Column(col), Some(RegionColors::Column(m))) => {
                store.restore_column(doc, self.table, col, Some(m))
            }
            (Region::Column(col), None) => store.restore_column(doc, self.table, col, None),
            (region, Some(_)) => {
                log::warn!("snapshot colors do not fit {:?}; skipping restore", region);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct Coordinates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    row: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    col: Option<usize>,
}

/// Persisted form, as read back from storage.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    #[serde(default)]
    timestamp: i64,
    file_path: String,
    table_index: usize,
    #[serde(default)]
    coordinates: Coordinates,
    #[serde(default)]
    old_colors: serde_json::Value,
    #[serde(default)]
    new_colors: serde_json::Value,
}

impl TryFrom<RawSnapshot> for UndoSnapshot {
    type Error = String;

    fn try_from(raw: RawSnapshot) -> Result<Self, Self::Error> {
        let region = match (raw.coordinates.row, raw.coordinates.col) {
            (Some(row), Some(col)) => Region::Cell { row, col },
            (Some(row), None) => Region::Row(row),
            (None, Some(col)) => Region::Column(col),
            (None, None) => return Err("snapshot has no coordinates".to_string()),
        };
        let old_colors = RegionColors::decode(region, raw.old_colors).map_err(|e| format!("oldColors: {}", e))?;
        let new_colors = RegionColors::decode(region, raw.new_colors).map_err(|e| format!("newColors: {}", e))?;
        Ok(Self {
            timestamp: raw.timestamp,
            document: raw.file_path,
            table: raw.table_index,
            region,
            old_colors,
            new_colors,
        })
    }
}

/// Persisted form, as written to storage.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireSnapshot<'a> {
    timestamp: i64,
    operation_type: &'static str,
    file_path: &'a str,
    table_index: usize,
    coordinates: Coordinates,
    old_colors: Option<&'a RegionColors>,
    new_colors: Option<&'a RegionColors>,
}

impl Serialize for UndoSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireSnapshot {
            timestamp: self.timestamp,
            operation_type: self.region.operation_type(),
            file_path: &self.document,
            table_index: self.table,
            coordinates: self.region.coordinates(),
            old_colors: self.old_colors.as_ref(),
            new_colors: self.new_colors.as_ref(),
        }
        .serialize(serializer)
    }
}

/// Bounded linear undo/redo stacks.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<UndoSnapshot>,
    redo_stack: Vec<UndoSnapshot>,
    max_entries: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Rebuild from persisted stacks, oldest first. Stacks longer than the
    /// capacity keep their newest entries.
    pub fn from_stacks(mut undo_stack: Vec<UndoSnapshot>, mut redo_stack: Vec<UndoSnapshot>) -> Self {
        let max_entries = DEFAULT_CAPACITY;
        for stack in [&mut undo_stack, &mut redo_stack] {
            if stack.len() > max_entries {
                stack.drain(..stack.len() - max_entries);
            }
        }
        Self { undo_stack, redo_stack, max_entries }
    }

    /// Record an edit. Clears the redo stack.
    pub fn record(&mut self, snapshot: UndoSnapshot) {
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();

        // Limit history size
        if self.undo_stack.len() > self.max_entries {
            self.undo_stack.remove(0);
        }
    }

    /// Pop the last edit for undo. The caller restores its old colors.
    pub fn undo(&mut self) -> Option<UndoSnapshot> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(entry.clone());
        if self.redo_stack.len() > self.max_entries {
            self.redo_stack.remove(0);
        }
        Some(entry)
    }

    /// Pop from the redo stack. The caller restores its new colors.
    pub fn redo(&mut self) -> Option<UndoSnapshot> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(entry.clone());
        if self.undo_stack.len() > self.max_entries {
            self.undo_stack.remove(0);
        }
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_stack(&self) -> &[UndoSnapshot] {
        &self.undo_stack
    }

    pub fn redo_stack(&self) -> &[UndoSnapshot] {
        &self.redo_stack
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// Serialize one stack for storage.
pub fn stack_to_json(stack: &[UndoSnapshot]) -> Result<String, serde_json::Error> {
    serde_json::to_string(stack)
}

/// Read one stack back. Corrupt input gives an empty stack; individual bad
/// entries are dropped.
pub fn stack_from_json(json: &str) -> Vec<UndoSnapshot> {
    match serde_json::from_str::<serde_json::Value>(json) {
        Ok(value) => decode_list(value, "undo snapshot"),
        Err(e) => {
            log::warn!("undo history is not valid JSON, starting empty: {}", e);
            Vec::new()
        }
    }
}
