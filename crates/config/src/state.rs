//! Application state: the data blob plus undo history, loaded from and saved
//! to a [`KeyValueStore`].

use tablecolor_core::{Color, ColorField, TableSnapshot};
use tablecolor_engine::history::{stack_from_json, stack_to_json};
use tablecolor_engine::{ColorEditor, History, Reconciler, Reconciliation};

use crate::data::PluginData;
use crate::error::StoreError;
use crate::storage::{KeyValueStore, DATA_KEY, REDO_STACK_KEY, UNDO_STACK_KEY};

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub data: PluginData,
    pub history: History,
}

impl AppState {
    /// Load everything. Read failures and corrupt data give defaults.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let data = match store.read(DATA_KEY) {
            Ok(Some(json)) => PluginData::from_json(&json),
            Ok(None) => PluginData::default(),
            Err(e) => {
                log::warn!("could not read data, using defaults: {}", e);
                PluginData::default()
            }
        };

        let history = if data.settings.persist_undo_history {
            History::from_stacks(read_stack(store, UNDO_STACK_KEY), read_stack(store, REDO_STACK_KEY))
        } else {
            History::new()
        };

        log::debug!(
            "loaded {} simple rules, {} advanced rules, {} colored cells, {} undo entries",
            data.settings.coloring_rules.len(),
            data.settings.advanced_rules.len(),
            data.cell_data.cell_count(),
            history.undo_stack().len()
        );

        Self { data, history }
    }

    /// Save the data blob, and the undo stacks when history persistence is
    /// on. With persistence off, stale stacks are removed.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        store.write(DATA_KEY, &self.data.to_json()?)?;
        if self.data.settings.persist_undo_history {
            store.write(UNDO_STACK_KEY, &stack_to_json(self.history.undo_stack())?)?;
            store.write(REDO_STACK_KEY, &stack_to_json(self.history.redo_stack())?)?;
        } else {
            store.remove(UNDO_STACK_KEY)?;
            store.remove(REDO_STACK_KEY)?;
        }
        Ok(())
    }

    pub fn editor(&mut self) -> ColorEditor<'_> {
        ColorEditor::new(&mut self.data.cell_data, &mut self.history)
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.data.settings.numeric_mode())
    }

    /// Reconcile one table against the current rules and colors.
    pub fn reconcile(&self, table: &TableSnapshot, doc: &str, table_index: usize) -> Reconciliation {
        self.reconciler().reconcile(table, doc, table_index, &self.data.cell_data, &self.data.settings.rule_set())
    }

    /// Pick a color for one cell and remember it as recent.
    pub fn pick_cell(
        &mut self,
        doc: &str,
        table: usize,
        row: usize,
        col: usize,
        field: ColorField,
        color: Option<Color>,
    ) -> bool {
        let done = self.editor().pick_cell(doc, table, row, col, field, color);
        self.remember(done, color);
        done
    }

    pub fn pick_row(
        &mut self,
        doc: &str,
        table: usize,
        row: usize,
        width: usize,
        field: ColorField,
        color: Option<Color>,
    ) -> bool {
        let done = self.editor().pick_row(doc, table, row, width, field, color);
        self.remember(done, color);
        done
    }

    pub fn pick_column(
        &mut self,
        doc: &str,
        table: usize,
        col: usize,
        rows: &[usize],
        field: ColorField,
        color: Option<Color>,
    ) -> bool {
        let done = self.editor().pick_column(doc, table, col, rows, field, color);
        self.remember(done, color);
        done
    }

    fn remember(&mut self, done: bool, color: Option<Color>) {
        if let (true, Some(color)) = (done, color) {
            self.data.settings.push_recent_color(color);
        }
    }
}

fn read_stack(store: &dyn KeyValueStore, key: &str) -> Vec<tablecolor_engine::UndoSnapshot> {
    match store.read(key) {
        Ok(Some(json)) => stack_from_json(&json),
        Ok(None) => Vec::new(),
        Err(e) => {
            log::warn!("could not read {}: {}", key, e);
            Vec::new()
        }
    }
}
