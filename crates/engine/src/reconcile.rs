//! Merge rule styling with manual colors for one table.
//!
//! Order per call: mark manual cells, run simple rules, run advanced rules,
//! then paint manual colors onto every manual cell no rule claimed. Rules
//! skip manual data cells, so manual colors win there; header cells are
//! always open to rules, so a matching rule wins on a header.
//!
//! Every call starts from a fresh overlay, so the result depends only on
//! the inputs.

use tablecolor_core::{StyleOverlay, TableSnapshot};

use crate::advanced::AdvancedRuleEngine;
use crate::matcher::{MatchEvaluator, NumericMode};
use crate::rules::RuleSet;
use crate::simple::SimpleRuleEngine;
use crate::store::ManualColorStore;

/// Result of reconciling one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub styles: StyleOverlay,
    /// Cells painted from manual colors.
    pub manual_applied: usize,
    /// Cells painted by a rule.
    pub rule_claimed: usize,
}

#[derive(Debug, Default)]
pub struct Reconciler {
    evaluator: MatchEvaluator,
}

impl Reconciler {
    pub fn new(mode: NumericMode) -> Self {
        Self { evaluator: MatchEvaluator::new(mode) }
    }

    pub fn reconcile(
        &self,
        table: &TableSnapshot,
        doc: &str,
        table_index: usize,
        store: &ManualColorStore,
        rules: &RuleSet,
    ) -> Reconciliation {
        let mut styles = StyleOverlay::for_table(table);

        let mut manual = Vec::new();
        for (r, row) in table.rows.iter().enumerate() {
            for c in 0..row.len() {
                if let Some(colors) = store.get(doc, table_index, r, c) {
                    manual.push((r, c, colors));
                    if let Some(style) = styles.get_mut(r, c) {
                        style.manual = true;
                    }
                }
            }
        }

        SimpleRuleEngine::new(&self.evaluator).apply(table, &rules.simple, &mut styles);
        AdvancedRuleEngine::new(&self.evaluator).apply(table, &rules.advanced, &mut styles);

        let rule_claimed = styles.styled_count();

        let mut manual_applied = 0;
        for (r, c, colors) in manual {
            let Some(style) = styles.get_mut(r, c) else {
                continue;
            };
            if style.is_styled() {
                // A rule repainted this header cell.
                style.manual = false;
                continue;
            }
            style.paint_manual(&colors);
            manual_applied += 1;
        }

        log::debug!(
            "reconciled {} table {}: {} rule-styled, {} manual",
            doc,
            table_index,
            rule_claimed,
            manual_applied
        );

        Reconciliation { styles, manual_applied, rule_claimed }
    }
}

/// One-shot reconcile with a throwaway evaluator.
pub fn reconcile(
    table: &TableSnapshot,
    doc: &str,
    table_index: usize,
    store: &ManualColorStore,
    rules: &RuleSet,
    mode: NumericMode,
) -> Reconciliation {
    Reconciler::new(mode).reconcile(table, doc, table_index, store, rules)
}
