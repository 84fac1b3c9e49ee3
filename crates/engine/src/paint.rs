//! Shared by both rule engines: how a rule writes into the overlay, and how
//! a scope folds per-cell matches into one answer.

use tablecolor_core::{Color, StyleOverlay, TableSnapshot};

use crate::rules::Scope;

/// Paint one cell with a rule's colors, honoring the claim rule:
/// manual or already-styled data cells are left alone, header cells are
/// always repainted. Returns whether the cell was painted.
pub(crate) fn paint_cell(
    table: &TableSnapshot,
    overlay: &mut StyleOverlay,
    row: usize,
    col: usize,
    bg: Option<Color>,
    color: Option<Color>,
) -> bool {
    let Some(cell) = table.cell(row, col) else {
        return false;
    };
    let Some(style) = overlay.get_mut(row, col) else {
        return false;
    };
    if !cell.is_header && (style.manual || style.is_styled()) {
        return false;
    }
    style.paint(bg, color);
    true
}

pub(crate) fn paint_row(
    table: &TableSnapshot,
    overlay: &mut StyleOverlay,
    row: usize,
    bg: Option<Color>,
    color: Option<Color>,
) -> usize {
    (0..table.row_len(row))
        .filter(|&c| paint_cell(table, overlay, row, c, bg, color))
        .count()
}

pub(crate) fn paint_column(
    table: &TableSnapshot,
    overlay: &mut StyleOverlay,
    col: usize,
    bg: Option<Color>,
    color: Option<Color>,
) -> usize {
    table
        .rows_with_column(col)
        .into_iter()
        .filter(|&r| paint_cell(table, overlay, r, col, bg, color))
        .count()
}

/// Fold per-cell matches by scope. `allCell` needs at least one cell;
/// `noCell` holds when nothing matches; every other scope means "any".
pub(crate) fn aggregate<I>(scope: Scope, matches: I) -> bool
where
    I: IntoIterator<Item = bool>,
{
    let mut seen = false;
    let mut any = false;
    let mut all = true;
    for m in matches {
        seen = true;
        any |= m;
        all &= m;
    }
    match scope {
        Scope::AllCells => seen && all,
        Scope::NoCells => !any,
        _ => any,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate() {
        assert!(aggregate(Scope::AllCells, [true, true]));
        assert!(!aggregate(Scope::AllCells, Vec::<bool>::new()));
        assert!(aggregate(Scope::NoCells, Vec::<bool>::new()));
        assert!(!aggregate(Scope::NoCells, [false, true]));
        assert!(aggregate(Scope::AnyCell, [false, true]));
        assert!(aggregate(Scope::FirstRow, [true]));
    }

    #[test]
    fn test_claim_rule() {
        let table = TableSnapshot::with_header(&[vec!["H"], vec!["d"]]);
        let mut overlay = StyleOverlay::for_table(&table);
        let red = Some(Color::from_hex(0xFF0000));
        let blue = Some(Color::from_hex(0x0000FF));

        assert!(paint_cell(&table, &mut overlay, 0, 0, red, None));
        assert!(paint_cell(&table, &mut overlay, 0, 0, blue, None));
        assert_eq!(overlay.get(0, 0).unwrap().background, blue);

        assert!(paint_cell(&table, &mut overlay, 1, 0, red, None));
        assert!(!paint_cell(&table, &mut overlay, 1, 0, blue, None));
        assert_eq!(overlay.get(1, 0).unwrap().background, red);

        assert!(!paint_cell(&table, &mut overlay, 5, 0, red, None));
    }

    #[test]
    fn test_manual_data_cell_untouched() {
        let table = TableSnapshot::from_texts(&[vec!["a"]]);
        let mut overlay = StyleOverlay::for_table(&table);
        overlay.get_mut(0, 0).unwrap().manual = true;
        assert!(!paint_cell(&table, &mut overlay, 0, 0, Some(Color::from_hex(1)), None));
        assert!(!overlay.get(0, 0).unwrap().is_styled());
    }
}
