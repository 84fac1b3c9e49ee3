//! HTML I/O: read tables out of a rendered document and write the reconciled
//! colors back in.

pub mod html;
pub mod render;

use serde::Serialize;
use tablecolor_core::StyleOverlay;
use tablecolor_engine::{ManualColorStore, Reconciler, RuleSet};

pub use html::{parse_document, parse_tables, CellRef, HtmlDocument, HtmlNode};
pub use render::{render, style_declarations, RenderError};

/// What reconciling one table produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReport {
    pub index: usize,
    pub rows: usize,
    pub columns: usize,
    pub rule_claimed: usize,
    pub manual_applied: usize,
    pub styles: StyleOverlay,
}

/// A document after every table in it went through the reconciler.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColoredDocument {
    #[serde(skip)]
    pub html: String,
    /// Cells that received an inline style.
    pub painted: usize,
    pub tables: Vec<TableReport>,
}

/// Reconcile every table of `html` for document `doc` and render the result.
pub fn color_document(
    html: &str,
    doc: &str,
    reconciler: &Reconciler,
    store: &ManualColorStore,
    rules: &RuleSet,
) -> Result<ColoredDocument, RenderError> {
    let parsed = parse_document(html);

    let mut tables = Vec::with_capacity(parsed.tables.len());
    for (index, table) in parsed.tables.iter().enumerate() {
        let result = reconciler.reconcile(table, doc, index, store, rules);
        tables.push(TableReport {
            index,
            rows: table.row_count(),
            columns: table.max_columns(),
            rule_claimed: result.rule_claimed,
            manual_applied: result.manual_applied,
            styles: result.styles,
        });
    }

    let styles: Vec<StyleOverlay> = tables.iter().map(|t| t.styles.clone()).collect();
    let (html, painted) = render(html, &parsed, &styles)?;
    log::debug!("colored {}: {} tables, {} cells painted", doc, tables.len(), painted);

    Ok(ColoredDocument { html, painted, tables })
}
