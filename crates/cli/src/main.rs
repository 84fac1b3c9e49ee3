// tcolor - color HTML table cells from rules and manual picks

mod edit;
mod exit_codes;
mod rules;
mod transfer;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tablecolor_config::{AppState, FileStore, RuleSort, StoreError};
use tablecolor_core::ColorField;
use tablecolor_io::{color_document, RenderError};

use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "tcolor")]
#[command(about = "Color HTML table cells from rules and manual picks")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Directory holding data.json and the undo stacks
    #[arg(long, global = true, env = "TCOLOR_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every table in an HTML document and write the styled markup
    #[command(after_help = "\
Examples:
  tcolor apply notes.html --doc notes/plan.md
  tcolor apply notes.html --doc notes/plan.md --out styled.html
  tcolor apply notes.html --json")]
    Apply {
        /// HTML document
        html: PathBuf,

        /// Document id the manual colors are stored under (default: the path)
        #[arg(long)]
        doc: Option<String>,

        /// Write styled HTML here instead of stdout
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,

        /// Print a JSON report of the reconciled tables
        #[arg(long)]
        json: bool,
    },

    /// Pick a color for a cell, row or column
    #[command(after_help = "\
Examples:
  tcolor pick cell notes.html --table 0 --row 2 --col 1 --color '#ffcc00'
  tcolor pick row notes.html --table 0 --row 3 --field text --color '#333'
  tcolor pick column notes.html --table 1 --col 0 --color none")]
    Pick {
        region: RegionKind,

        /// HTML document the table lives in
        html: PathBuf,

        #[command(flatten)]
        at: Coordinates,

        /// Which half of the style to set: bg or text
        #[arg(long, default_value = "bg")]
        field: ColorField,

        /// #RGB, #RRGGBB, rgb(r, g, b), or `none` to clear the field
        #[arg(long)]
        color: String,
    },

    /// Remove manual colors from a cell, row or column
    Reset {
        region: RegionKind,

        html: PathBuf,

        #[command(flatten)]
        at: Coordinates,
    },

    /// Undo the last color edit
    Undo,

    /// Redo the last undone color edit
    Redo,

    /// Inspect and edit coloring rules
    #[command(subcommand)]
    Rules(RulesCommands),

    /// Manual colors
    #[command(subcommand)]
    Colors(ColorsCommands),

    /// Export settings and colors as JSON
    Export {
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Merge an exported JSON file into the current data
    Import {
        file: PathBuf,
    },

    /// Convert legacy rules and rewrite the data file
    Migrate,
}

#[derive(Subcommand)]
enum RulesCommands {
    /// List rules in display order
    List {
        /// lastAdded, az, regexFirst, numbersFirst or mode (default: saved sort)
        #[arg(long)]
        sort: Option<RuleSort>,

        /// Only rules whose labels or value contain this text
        #[arg(long, default_value = "")]
        search: String,

        #[arg(long)]
        json: bool,
    },

    /// Append a simple rule
    #[command(after_help = "\
Examples:
  tcolor rules add --target cell --match gt --value 100 --bg '#ff0000'
  tcolor rules add --target row --when allCell --match isEmpty --color '#999'")]
    Add {
        /// cell, row or column
        #[arg(long, default_value = "cell")]
        target: String,

        /// theCell, anyCell, allCell, noCell, firstRow, columnHeader or row
        #[arg(long, default_value = "theCell")]
        when: String,

        /// Operator, e.g. contains, is, isRegex, gt, isEmpty
        #[arg(long = "match")]
        op: String,

        #[arg(long)]
        value: Option<String>,

        #[arg(long)]
        bg: Option<String>,

        #[arg(long)]
        color: Option<String>,
    },

    /// Remove the simple rule at INDEX (stored order)
    Remove {
        index: usize,
    },

    /// Move a simple rule to a new position
    Move {
        from: usize,
        to: usize,
    },

    /// Insert a copy of a simple rule right after it
    Duplicate {
        index: usize,
    },

    /// Remove all simple rules, or all advanced rules
    Clear {
        #[arg(long)]
        advanced: bool,
    },
}

#[derive(Subcommand)]
enum ColorsCommands {
    /// Delete manual colors in one document, or everywhere
    Clear {
        #[arg(long)]
        doc: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RegionKind {
    Cell,
    Row,
    Column,
}

#[derive(clap::Args, Debug)]
pub struct Coordinates {
    /// Document id (default: the HTML path)
    #[arg(long)]
    doc: Option<String>,

    /// Table index in document order
    #[arg(long, default_value_t = 0)]
    table: usize,

    #[arg(long)]
    row: Option<usize>,

    #[arg(long)]
    col: Option<usize>,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("TCOLOR_BUILD_COMMIT"), ")",
        "\nengine:  tablecolor-engine ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TCOLOR_BUILD_TARGET"),
        "\nprofile: ", env!("TCOLOR_BUILD_PROFILE"),
    )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let mut ctx = Context::open(cli.data_dir);

    let result = match cli.command {
        Commands::Apply { html, doc, out, json } => cmd_apply(&ctx, &html, doc, out, json),
        Commands::Pick { region, html, at, field, color } => {
            edit::cmd_pick(&mut ctx, region, &html, at, field, &color)
        }
        Commands::Reset { region, html, at } => edit::cmd_reset(&mut ctx, region, &html, at),
        Commands::Undo => edit::cmd_undo(&mut ctx),
        Commands::Redo => edit::cmd_redo(&mut ctx),
        Commands::Rules(command) => match command {
            RulesCommands::List { sort, search, json } => rules::cmd_list(&ctx, sort, &search, json),
            RulesCommands::Add { target, when, op, value, bg, color } => {
                rules::cmd_add(&mut ctx, &target, &when, &op, value, bg, color)
            }
            RulesCommands::Remove { index } => rules::cmd_remove(&mut ctx, index),
            RulesCommands::Move { from, to } => rules::cmd_move(&mut ctx, from, to),
            RulesCommands::Duplicate { index } => rules::cmd_duplicate(&mut ctx, index),
            RulesCommands::Clear { advanced } => rules::cmd_clear(&mut ctx, advanced),
        },
        Commands::Colors(ColorsCommands::Clear { doc }) => edit::cmd_clear_colors(&mut ctx, doc),
        Commands::Export { out } => transfer::cmd_export(&ctx, out),
        Commands::Import { file } => transfer::cmd_import(&mut ctx, &file),
        Commands::Migrate => transfer::cmd_migrate(&mut ctx),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn store(err: StoreError) -> Self {
        match err {
            StoreError::Io { .. } => Self::io(err.to_string()),
            StoreError::Serialize(_) => Self::parse(err.to_string()),
        }
    }

    pub fn render(err: RenderError) -> Self {
        Self::general(err.to_string())
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Loaded state plus where it came from.
pub struct Context {
    pub store: FileStore,
    pub state: AppState,
}

impl Context {
    fn open(data_dir: Option<PathBuf>) -> Self {
        let store = FileStore::new(data_dir.unwrap_or_else(FileStore::default_dir));
        log::debug!("data dir: {}", store.dir().display());
        let state = AppState::load(&store);
        Self { store, state }
    }

    pub fn save(&mut self) -> Result<(), CliError> {
        self.state.save(&mut self.store).map_err(CliError::store)
    }
}

pub fn read_text(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))
}

pub fn write_text(path: &Path, contents: &str) -> Result<(), CliError> {
    fs::write(path, contents).map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))
}

/// Document id for `html`: the explicit one, else the path as given.
pub fn document_id(doc: Option<String>, html: &Path) -> String {
    doc.unwrap_or_else(|| html.to_string_lossy().into_owned())
}

// ============================================================================
// apply
// ============================================================================

fn cmd_apply(ctx: &Context, html: &Path, doc: Option<String>, out: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let source = read_text(html)?;
    let doc = document_id(doc, html);

    let colored = color_document(
        &source,
        &doc,
        &ctx.state.reconciler(),
        &ctx.state.data.cell_data,
        &ctx.state.data.settings.rule_set(),
    )
    .map_err(CliError::render)?;

    if let Some(out) = &out {
        write_text(out, &colored.html)?;
    }

    if json {
        let report = serde_json::to_string_pretty(&colored).map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", report);
    } else if out.is_none() {
        print!("{}", colored.html);
    } else {
        eprintln!("{} tables, {} cells colored", colored.tables.len(), colored.painted);
    }
    Ok(())
}
