//! Table extraction from rendered HTML.
//!
//! Tables are numbered in document order. A table's rows are the `tr`
//! elements whose nearest enclosing table is that table, so rows of a nested
//! table belong to the nested table only. A row's cells are its `td`/`th`
//! children; `th` marks a header cell.

use std::collections::HashMap;
use std::sync::LazyLock;

use ego_tree::{NodeId, NodeRef};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use tablecolor_core::{CellSnapshot, TableSnapshot};
use tablecolor_engine::{extract, ContentNode, NodeKind};

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("BUG: hardcoded selector 'table' is statically valid"));

static TR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("BUG: hardcoded selector 'tr' is statically valid"));

static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td, th").expect("BUG: hardcoded selector 'td, th' is statically valid"));

/// Editor-internal wrappers that are not cell content.
const MARKER_CLASSES: [&str; 2] = ["cm-cursor", "cm-line"];

/// Where a `td`/`th` element sits in the table grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub table: usize,
    pub row: usize,
    pub col: usize,
}

/// Tables of one document, plus the grid position of every `td`/`th` in
/// document order (`None` for cells outside any row of a table).
#[derive(Debug, Clone, Default)]
pub struct HtmlDocument {
    pub tables: Vec<TableSnapshot>,
    pub cell_slots: Vec<Option<CellRef>>,
}

/// Content node backed by the parsed DOM.
#[derive(Clone, Copy)]
pub struct HtmlNode<'a>(pub NodeRef<'a, Node>);

impl ContentNode for HtmlNode<'_> {
    fn kind(&self) -> NodeKind {
        match self.0.value() {
            Node::Text(text) => NodeKind::Text(text.to_string()),
            Node::Element(el) => {
                if el.classes().any(|c| MARKER_CLASSES.contains(&c)) {
                    return NodeKind::EditorMarker;
                }
                match el.name() {
                    "a" => NodeKind::Link,
                    "img" => NodeKind::Image { alt: el.attr("alt").unwrap_or_default().to_string() },
                    "br" => NodeKind::LineBreak,
                    _ => NodeKind::Element,
                }
            }
            _ => NodeKind::Other,
        }
    }

    fn children(&self) -> Vec<Self> {
        self.0.children().map(HtmlNode).collect()
    }
}

fn nearest_table(node: NodeRef<'_, Node>) -> Option<NodeId> {
    node.ancestors()
        .find(|n| n.value().as_element().is_some_and(|e| e.name() == "table"))
        .map(|n| n.id())
}

fn row_cells(tr: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|e| matches!(e.value().name(), "td" | "th"))
}

/// Parse every table in `html`.
pub fn parse_document(html: &str) -> HtmlDocument {
    let dom = Html::parse_document(html);
    let mut tables = Vec::new();
    let mut positions: HashMap<NodeId, CellRef> = HashMap::new();

    for (t, table) in dom.select(&TABLE_SELECTOR).enumerate() {
        let mut rows = Vec::new();
        for tr in table.select(&TR_SELECTOR).filter(|tr| nearest_table(**tr) == Some(table.id())) {
            let row_index = rows.len();
            let row: Vec<CellSnapshot> = row_cells(tr)
                .enumerate()
                .map(|(c, cell)| {
                    positions.insert(cell.id(), CellRef { table: t, row: row_index, col: c });
                    CellSnapshot {
                        text: extract(&HtmlNode(*cell)),
                        is_header: cell.value().name() == "th",
                    }
                })
                .collect();
            rows.push(row);
        }
        tables.push(TableSnapshot::new(rows));
    }

    let cell_slots = dom.select(&CELL_SELECTOR).map(|cell| positions.get(&cell.id()).copied()).collect();

    log::debug!("parsed {} tables", tables.len());
    HtmlDocument { tables, cell_slots }
}

/// Just the table grids.
pub fn parse_tables(html: &str) -> Vec<TableSnapshot> {
    parse_document(html).tables
}
