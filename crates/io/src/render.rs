//! Styled HTML output.
//!
//! The rewriter streams the original markup and counts `td`/`th` start tags.
//! The k-th tag is the k-th entry of [`HtmlDocument::cell_slots`], which maps
//! it back to a grid position, so nested tables need no special casing.
//!
//! The mapping only holds when the rewriter and the parser see the same
//! cells. Markup with cells the parser discards (a `td` outside any table)
//! is counted first and returned unchanged.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use lol_html::errors::RewritingError;
use lol_html::{element, HtmlRewriter, Settings};
use tablecolor_core::{CellStyle, StyleOverlay};

use crate::html::HtmlDocument;

#[derive(Debug)]
pub enum RenderError {
    Rewrite(RewritingError),
    Utf8(std::string::FromUtf8Error),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Rewrite(e) => write!(f, "HTML rewrite error: {}", e),
            RenderError::Utf8(e) => write!(f, "rewritten HTML is not UTF-8: {}", e),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Rewrite(e) => Some(e),
            RenderError::Utf8(e) => Some(e),
        }
    }
}

impl From<RewritingError> for RenderError {
    fn from(e: RewritingError) -> Self {
        RenderError::Rewrite(e)
    }
}

/// Inline declarations for one cell style, `None` when nothing is set.
pub fn style_declarations(style: &CellStyle) -> Option<String> {
    let mut decls = Vec::new();
    if let Some(bg) = style.background {
        decls.push(format!("background-color: {}", bg));
    }
    if let Some(text) = style.text {
        decls.push(format!("color: {}", text));
    }
    (!decls.is_empty()).then(|| decls.join("; "))
}

fn merge_style(existing: Option<String>, decls: &str) -> String {
    match existing.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(prev) if prev.ends_with(';') => format!("{} {}", prev, decls),
        Some(prev) => format!("{}; {}", prev, decls),
        None => decls.to_string(),
    }
}

/// Number of `td`/`th` start tags in `html`, as the rewriter sees them.
pub fn count_cells(html: &str) -> Result<usize, RenderError> {
    let count = AtomicUsize::new(0);
    let mut counter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![element!("td, th", |_el| {
                count.fetch_add(1, Ordering::Relaxed);
                Ok(())
            })],
            ..Settings::default()
        },
        |_: &[u8]| {},
    );
    counter.write(html.as_bytes())?;
    counter.end()?;
    Ok(count.load(Ordering::Relaxed))
}

/// Rewrite `html`, adding inline colors for every styled cell. `styles` is
/// indexed like `doc.tables`. Returns the new markup and the number of cells
/// that got a style.
pub fn render(html: &str, doc: &HtmlDocument, styles: &[StyleOverlay]) -> Result<(String, usize), RenderError> {
    let tags = count_cells(html)?;
    if tags != doc.cell_slots.len() {
        log::warn!(
            "leaving markup unstyled: {} cell tags but {} parsed cells",
            tags,
            doc.cell_slots.len()
        );
        return Ok((html.to_string(), 0));
    }

    let mut output = Vec::with_capacity(html.len());
    let slot = AtomicUsize::new(0);
    let painted = AtomicUsize::new(0);

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![element!("td, th", |el| {
                let k = slot.fetch_add(1, Ordering::Relaxed);
                let style = doc
                    .cell_slots
                    .get(k)
                    .copied()
                    .flatten()
                    .and_then(|at| styles.get(at.table)?.get(at.row, at.col));
                if let Some(decls) = style.and_then(style_declarations) {
                    el.set_attribute("style", &merge_style(el.get_attribute("style"), &decls))?;
                    painted.fetch_add(1, Ordering::Relaxed);
                }
                Ok(())
            })],
            ..Settings::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter.write(html.as_bytes())?;
    rewriter.end()?;

    let result = String::from_utf8(output).map_err(RenderError::Utf8)?;
    Ok((result, painted.load(Ordering::Relaxed)))
}
