//! Normalized cell text.
//!
//! Rules match against what a reader sees in a cell, not its markup. Link
//! targets and image sources never leak into the text; editor cursor and
//! line markers are not content at all.

/// What a content node is, as far as text extraction cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Text(String),
    Link,
    Image { alt: String },
    LineBreak,
    /// Editor-internal cursor/line wrapper.
    EditorMarker,
    Element,
    Other,
}

/// A node of a cell's content tree. Implemented for the owned
/// [`CellContent`] tree here and for parsed HTML in the io crate.
pub trait ContentNode: Sized {
    fn kind(&self) -> NodeKind;
    fn children(&self) -> Vec<Self>;
}

/// Text of a cell given its root node. Trimmed; never mutates the tree.
pub fn extract<N: ContentNode>(cell: &N) -> String {
    let mut out = String::new();
    walk_children(cell, &mut out);
    out.trim().to_string()
}

fn walk_children<N: ContentNode>(node: &N, out: &mut String) {
    for child in node.children() {
        match child.kind() {
            NodeKind::Text(text) => out.push_str(&text),
            NodeKind::EditorMarker => {}
            NodeKind::Link => out.push_str(text_content(&child).trim()),
            NodeKind::Image { alt } => out.push_str(&alt),
            NodeKind::LineBreak => out.push('\n'),
            NodeKind::Element => walk_children(&child, out),
            NodeKind::Other => {}
        }
    }
}

/// All descendant text, markup ignored.
fn text_content<N: ContentNode>(node: &N) -> String {
    match node.kind() {
        NodeKind::Text(text) => text,
        _ => node.children().iter().map(text_content).collect(),
    }
}

/// Owned cell content, for hosts that do not hand over a DOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    Text(String),
    Link(Vec<CellContent>),
    Image { alt: Option<String> },
    LineBreak,
    Marker(Vec<CellContent>),
    Element(Vec<CellContent>),
    Comment(String),
}

impl CellContent {
    pub fn text(s: impl Into<String>) -> Self {
        CellContent::Text(s.into())
    }

    /// A cell root holding `children`.
    pub fn cell(children: Vec<CellContent>) -> Self {
        CellContent::Element(children)
    }
}

impl ContentNode for &CellContent {
    fn kind(&self) -> NodeKind {
        match self {
            CellContent::Text(s) => NodeKind::Text(s.clone()),
            CellContent::Link(_) => NodeKind::Link,
            CellContent::Image { alt } => NodeKind::Image { alt: alt.clone().unwrap_or_default() },
            CellContent::LineBreak => NodeKind::LineBreak,
            CellContent::Marker(_) => NodeKind::EditorMarker,
            CellContent::Element(_) => NodeKind::Element,
            CellContent::Comment(_) => NodeKind::Other,
        }
    }

    fn children(&self) -> Vec<Self> {
        match *self {
            CellContent::Link(c) | CellContent::Marker(c) | CellContent::Element(c) => c.iter().collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_cell(children: Vec<CellContent>) -> String {
        extract(&&CellContent::cell(children))
    }

    #[test]
    fn test_plain_text_trimmed() {
        assert_eq!(extract_cell(vec![CellContent::text("  hello  ")]), "hello");
    }

    #[test]
    fn test_link_contributes_text_only() {
        let text = extract_cell(vec![
            CellContent::text("see "),
            CellContent::Link(vec![CellContent::text(" Notes/Private ")]),
        ]);
        assert_eq!(text, "see Notes/Private");
    }

    #[test]
    fn test_image_alt_and_line_break() {
        let text = extract_cell(vec![
            CellContent::Image { alt: Some("logo".into()) },
            CellContent::LineBreak,
            CellContent::text("two"),
            CellContent::Image { alt: None },
        ]);
        assert_eq!(text, "logo\ntwo");
    }

    #[test]
    fn test_markers_and_comments_skipped() {
        let text = extract_cell(vec![
            CellContent::Marker(vec![CellContent::text("cursor")]),
            CellContent::Element(vec![CellContent::text("in"), CellContent::Comment("x".into())]),
            CellContent::text("side"),
        ]);
        assert_eq!(text, "inside");
    }

    #[test]
    fn test_extract_is_repeatable() {
        let cell = CellContent::cell(vec![CellContent::text(" a ")]);
        assert_eq!(extract(&&cell), extract(&&cell));
    }
}
