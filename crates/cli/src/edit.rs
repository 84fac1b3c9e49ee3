// pick / reset / undo / redo / colors clear

use std::path::Path;

use tablecolor_core::{Color, ColorField, TableSnapshot};
use tablecolor_engine::{Region, UndoSnapshot};
use tablecolor_io::parse_tables;

use crate::{document_id, read_text, CliError, Context, Coordinates, RegionKind};

/// The grid region an edit applies to, checked against the table.
enum Resolved {
    Cell { row: usize, col: usize },
    Row { row: usize, width: usize },
    Column { col: usize, rows: Vec<usize> },
}

fn parse_color(input: &str) -> Result<Option<Color>, CliError> {
    if input.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Color::parse(input)
        .map(Some)
        .map_err(|e| CliError::parse(e.to_string()).with_hint("use #RGB, #RRGGBB, rgb(r, g, b) or none"))
}

fn load_table(html: &Path, index: usize) -> Result<TableSnapshot, CliError> {
    let mut tables = parse_tables(&read_text(html)?);
    let count = tables.len();
    if index >= count {
        return Err(CliError::args(format!("{} has {} tables, no table {}", html.display(), count, index))
            .with_hint("tables are numbered from 0 in document order"));
    }
    Ok(tables.swap_remove(index))
}

fn resolve(table: &TableSnapshot, region: RegionKind, at: &Coordinates) -> Result<Resolved, CliError> {
    let need = |value: Option<usize>, flag: &str| {
        value.ok_or_else(|| CliError::args(format!("{:?} edits need {}", region, flag)))
    };

    match region {
        RegionKind::Cell => {
            let (row, col) = (need(at.row, "--row")?, need(at.col, "--col")?);
            if table.cell(row, col).is_none() {
                return Err(CliError::args(format!("no cell at row {}, column {}", row, col)));
            }
            Ok(Resolved::Cell { row, col })
        }
        RegionKind::Row => {
            let row = need(at.row, "--row")?;
            if row >= table.row_count() {
                return Err(CliError::args(format!("table has {} rows, no row {}", table.row_count(), row)));
            }
            Ok(Resolved::Row { row, width: table.row_len(row) })
        }
        RegionKind::Column => {
            let col = need(at.col, "--col")?;
            let rows = table.rows_with_column(col);
            if rows.is_empty() {
                return Err(CliError::args(format!("no row has a column {}", col)));
            }
            Ok(Resolved::Column { col, rows })
        }
    }
}

pub fn cmd_pick(
    ctx: &mut Context,
    region: RegionKind,
    html: &Path,
    at: Coordinates,
    field: ColorField,
    color: &str,
) -> Result<(), CliError> {
    let color = parse_color(color)?;
    let table = load_table(html, at.table)?;
    let doc = document_id(at.doc.clone(), html);

    let state = &mut ctx.state;
    let done = match resolve(&table, region, &at)? {
        Resolved::Cell { row, col } => state.pick_cell(&doc, at.table, row, col, field, color),
        Resolved::Row { row, width } => state.pick_row(&doc, at.table, row, width, field, color),
        Resolved::Column { col, ref rows } => state.pick_column(&doc, at.table, col, rows, field, color),
    };
    if !done {
        return Err(CliError::args("document id is empty"));
    }

    ctx.save()?;
    let shown = color.map_or_else(|| "none".to_string(), |c| c.to_string());
    println!("{:?} {} set to {} in {} table {}", region, field.as_str(), shown, doc, at.table);
    Ok(())
}

pub fn cmd_reset(ctx: &mut Context, region: RegionKind, html: &Path, at: Coordinates) -> Result<(), CliError> {
    let table = load_table(html, at.table)?;
    let doc = document_id(at.doc.clone(), html);

    let mut editor = ctx.state.editor();
    let removed = match resolve(&table, region, &at)? {
        Resolved::Cell { row, col } => editor.reset_cell(&doc, at.table, row, col),
        Resolved::Row { row, .. } => editor.reset_row(&doc, at.table, row),
        Resolved::Column { col, .. } => editor.reset_column(&doc, at.table, col),
    };

    if !removed {
        eprintln!("note: no manual colors there");
        return Ok(());
    }
    ctx.save()?;
    println!("{:?} colors removed in {} table {}", region, doc, at.table);
    Ok(())
}

fn describe(snapshot: &UndoSnapshot) -> String {
    let place = match snapshot.region {
        Region::Cell { row, col } => format!("cell ({}, {})", row, col),
        Region::Row(row) => format!("row {}", row),
        Region::Column(col) => format!("column {}", col),
    };
    format!("{} of {} table {}", place, snapshot.document, snapshot.table)
}

pub fn cmd_undo(ctx: &mut Context) -> Result<(), CliError> {
    let Some(snapshot) = ctx.state.editor().undo() else {
        return Err(CliError::general("nothing to undo"));
    };
    ctx.save()?;
    println!("undid {}", describe(&snapshot));
    Ok(())
}

pub fn cmd_redo(ctx: &mut Context) -> Result<(), CliError> {
    let Some(snapshot) = ctx.state.editor().redo() else {
        return Err(CliError::general("nothing to redo"));
    };
    ctx.save()?;
    println!("redid {}", describe(&snapshot));
    Ok(())
}

pub fn cmd_clear_colors(ctx: &mut Context, doc: Option<String>) -> Result<(), CliError> {
    match doc {
        Some(doc) => {
            if !ctx.state.data.cell_data.clear_document(&doc) {
                eprintln!("note: {} has no manual colors", doc);
                return Ok(());
            }
            println!("cleared manual colors in {}", doc);
        }
        None => {
            ctx.state.editor().clear_all();
            println!("cleared all manual colors");
        }
    }
    ctx.save()
}
