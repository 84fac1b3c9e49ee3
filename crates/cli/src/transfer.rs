// export / import / migrate

use std::path::{Path, PathBuf};

use tablecolor_config::storage::DATA_KEY;
use tablecolor_config::{KeyValueStore, PluginData};

use crate::{read_text, write_text, CliError, Context};

pub fn cmd_export(ctx: &Context, out: Option<PathBuf>) -> Result<(), CliError> {
    let json = ctx.state.data.export_json().map_err(CliError::store)?;
    match out {
        Some(path) => {
            write_text(&path, &json)?;
            eprintln!("exported to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

pub fn cmd_import(ctx: &mut Context, file: &Path) -> Result<(), CliError> {
    let json = read_text(file)?;
    ctx.state
        .data
        .import_json(&json)
        .map_err(|e| CliError::store(e).with_hint("expected a file written by `tcolor export`"))?;
    ctx.save()?;

    let data = &ctx.state.data;
    println!(
        "imported {}: {} simple rules, {} advanced rules, {} colored cells",
        file.display(),
        data.settings.coloring_rules.len(),
        data.settings.advanced_rules.len(),
        data.cell_data.cell_count()
    );
    Ok(())
}

/// Re-read the raw data file so the number of converted legacy rules can be
/// reported, then write it back in the current format.
pub fn cmd_migrate(ctx: &mut Context) -> Result<(), CliError> {
    let Some(raw) = ctx.store.read(DATA_KEY).map_err(CliError::store)? else {
        println!("no data file in {}", ctx.store.dir().display());
        return Ok(());
    };
    let mut data: PluginData = serde_json::from_str(&raw)
        .map_err(|e| CliError::parse(format!("{}: {}", ctx.store.path_for(DATA_KEY).display(), e)))?;

    let converted = data.migrate();
    ctx.state.data = data;
    ctx.save()?;
    println!("converted {} legacy rules", converted);
    Ok(())
}
