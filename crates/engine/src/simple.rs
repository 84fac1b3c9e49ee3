//! Simple rules: one test per rule, applied in list order.

use tablecolor_core::{StyleOverlay, TableSnapshot};

use crate::matcher::MatchEvaluator;
use crate::paint::{aggregate, paint_cell, paint_column, paint_row};
use crate::rules::{Scope, SimpleRule, Target};

pub struct SimpleRuleEngine<'e> {
    evaluator: &'e MatchEvaluator,
}

impl<'e> SimpleRuleEngine<'e> {
    pub fn new(evaluator: &'e MatchEvaluator) -> Self {
        Self { evaluator }
    }

    /// Run every rule over `table`, writing into `overlay`. Returns the
    /// number of cells painted.
    pub fn apply(&self, table: &TableSnapshot, rules: &[SimpleRule], overlay: &mut StyleOverlay) -> usize {
        let header_row = table.header_row();
        let first_data_row = table.first_data_row();
        let mut painted = 0;

        for (i, rule) in rules.iter().enumerate() {
            if rule.is_inert() {
                continue;
            }
            let n = match rule.target {
                Target::Cell => self.apply_cell_rule(table, rule, overlay),
                Target::Row => self.apply_row_rule(table, rule, first_data_row, overlay),
                Target::Column => self.apply_column_rule(table, rule, header_row, overlay),
            };
            log::trace!("simple rule #{} ({:?} {:?}) painted {} cells", i, rule.target, rule.op, n);
            painted += n;
        }
        painted
    }

    fn matches(&self, rule: &SimpleRule, text: &str) -> bool {
        self.evaluator.evaluate(text, rule.op, rule.value.as_ref())
    }

    fn apply_cell_rule(&self, table: &TableSnapshot, rule: &SimpleRule, overlay: &mut StyleOverlay) -> usize {
        // Cell targets only understand "the cell".
        if rule.when != Scope::TheCell {
            return 0;
        }
        let mut painted = 0;
        for (r, row) in table.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if self.matches(rule, &cell.text) && paint_cell(table, overlay, r, c, rule.bg, rule.color) {
                    painted += 1;
                }
            }
        }
        painted
    }

    fn apply_row_rule(
        &self,
        table: &TableSnapshot,
        rule: &SimpleRule,
        first_data_row: usize,
        overlay: &mut StyleOverlay,
    ) -> usize {
        let candidates: Vec<usize> = if rule.when == Scope::FirstRow {
            if first_data_row < table.row_count() {
                vec![first_data_row]
            } else {
                Vec::new()
            }
        } else {
            (0..table.row_count()).collect()
        };

        let mut painted = 0;
        for r in candidates {
            let hit = aggregate(rule.when, table.rows[r].iter().map(|cell| self.matches(rule, &cell.text)));
            if hit {
                painted += paint_row(table, overlay, r, rule.bg, rule.color);
            }
        }
        painted
    }

    fn apply_column_rule(
        &self,
        table: &TableSnapshot,
        rule: &SimpleRule,
        header_row: usize,
        overlay: &mut StyleOverlay,
    ) -> usize {
        let mut painted = 0;
        for c in 0..table.max_columns() {
            let hit = if rule.when == Scope::ColumnHeader {
                self.matches(rule, table.text(header_row, c))
            } else {
                aggregate(
                    rule.when,
                    table.rows_with_column(c).into_iter().map(|r| self.matches(rule, table.text(r, c))),
                )
            };
            if hit {
                painted += paint_column(table, overlay, c, rule.bg, rule.color);
            }
        }
        painted
    }
}
