//! Advanced rules: several conditions folded with ANY/ALL/NONE.
//!
//! Runs after the simple engine over the same overlay, so data cells a
//! simple rule already painted stay as they are.
//!
//! Column conditions treat a cell missing from a short row as `""`. Row
//! header conditions look at every column of the widest row. `allCell` over
//! a row with no cells holds.

use tablecolor_core::{StyleOverlay, TableSnapshot};

use crate::matcher::MatchEvaluator;
use crate::paint::{paint_cell, paint_column, paint_row};
use crate::rules::{AdvancedRule, Condition, Scope, Target};

pub struct AdvancedRuleEngine<'e> {
    evaluator: &'e MatchEvaluator,
}

impl<'e> AdvancedRuleEngine<'e> {
    pub fn new(evaluator: &'e MatchEvaluator) -> Self {
        Self { evaluator }
    }

    pub fn apply(&self, table: &TableSnapshot, rules: &[AdvancedRule], overlay: &mut StyleOverlay) -> usize {
        let header_row = table.header_row();
        let mut painted = 0;

        for (i, rule) in rules.iter().enumerate() {
            if rule.is_inert() {
                log::trace!("advanced rule #{} is inert, skipping", i);
                continue;
            }
            let n = match rule.target {
                Target::Row => self.apply_row_rule(table, rule, header_row, overlay),
                Target::Column => self.apply_column_rule(table, rule, header_row, overlay),
                Target::Cell => self.apply_cell_rule(table, rule, header_row, overlay),
            };
            log::trace!(
                "advanced rule #{} {:?} ({:?}, {} conditions) painted {} cells",
                i,
                rule.name.as_deref().unwrap_or(""),
                rule.logic,
                rule.conditions.len(),
                n
            );
            painted += n;
        }
        painted
    }

    fn test(&self, cond: &Condition, text: &str) -> bool {
        self.evaluator.evaluate(text, cond.op, cond.value.as_ref())
    }

    fn any_in_row(&self, table: &TableSnapshot, cond: &Condition, row: usize) -> bool {
        (0..table.row_len(row)).any(|c| self.test(cond, table.text(row, c)))
    }

    /// Condition results for row `r` under a row-target rule.
    fn row_flags(&self, table: &TableSnapshot, rule: &AdvancedRule, header_row: usize, r: usize) -> Vec<bool> {
        rule.conditions
            .iter()
            .map(|cond| match cond.when {
                Scope::ColumnHeader => {
                    (0..table.max_columns()).any(|c| self.test(cond, table.text(header_row, c)))
                }
                Scope::Row => self.any_in_row(table, cond, r),
                scope => fold(scope, (0..table.row_len(r)).map(|c| self.test(cond, table.text(r, c)))),
            })
            .collect()
    }

    /// Condition results for column `c` under a column-target rule.
    fn column_flags(&self, table: &TableSnapshot, rule: &AdvancedRule, header_row: usize, c: usize) -> Vec<bool> {
        rule.conditions
            .iter()
            .map(|cond| match cond.when {
                Scope::ColumnHeader => self.test(cond, table.text(header_row, c)),
                Scope::Row => false,
                scope => fold(scope, (0..table.row_count()).map(|r| self.test(cond, table.text(r, c)))),
            })
            .collect()
    }

    fn apply_row_rule(
        &self,
        table: &TableSnapshot,
        rule: &AdvancedRule,
        header_row: usize,
        overlay: &mut StyleOverlay,
    ) -> usize {
        // Header-only rules would give the same answer on every row.
        let candidates: Vec<usize> = if rule.header_only() {
            (header_row < table.row_count()).then_some(header_row).into_iter().collect()
        } else {
            (0..table.row_count()).collect()
        };

        let mut painted = 0;
        for r in candidates {
            if rule.logic.combine(&self.row_flags(table, rule, header_row, r)) {
                painted += paint_row(table, overlay, r, rule.bg, rule.color);
            }
        }
        painted
    }

    fn apply_column_rule(
        &self,
        table: &TableSnapshot,
        rule: &AdvancedRule,
        header_row: usize,
        overlay: &mut StyleOverlay,
    ) -> usize {
        let mut painted = 0;
        for c in 0..table.max_columns() {
            if rule.logic.combine(&self.column_flags(table, rule, header_row, c)) {
                painted += paint_column(table, overlay, c, rule.bg, rule.color);
            }
        }
        painted
    }

    fn apply_cell_rule(
        &self,
        table: &TableSnapshot,
        rule: &AdvancedRule,
        header_row: usize,
        overlay: &mut StyleOverlay,
    ) -> usize {
        let mut painted = 0;
        for r in 0..table.row_count() {
            for c in 0..table.row_len(r) {
                let flags: Vec<bool> = rule
                    .conditions
                    .iter()
                    .map(|cond| match cond.when {
                        Scope::ColumnHeader => self.test(cond, table.text(header_row, c)),
                        Scope::Row => self.any_in_row(table, cond, r),
                        _ => self.test(cond, table.text(r, c)),
                    })
                    .collect();
                if rule.logic.combine(&flags) && paint_cell(table, overlay, r, c, rule.bg, rule.color) {
                    painted += 1;
                }
            }
        }
        painted
    }
}

/// `anyCell`/`allCell`/`noCell` over per-cell results. Unlike simple rules,
/// an empty set satisfies `allCell`.
fn fold<I>(scope: Scope, mut matches: I) -> bool
where
    I: Iterator<Item = bool>,
{
    match scope {
        Scope::AllCells => matches.all(|m| m),
        Scope::NoCells => !matches.any(|m| m),
        _ => matches.any(|m| m),
    }
}
