// Integration tests driving the tcolor binary end to end.
//
// Every test gets its own data directory, so nothing touches the user's
// config dir.
//
// Run with: cargo test -p tablecolor-cli --test cli_tests

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const TABLE_HTML: &str = "<table>\
<tr><th>Item</th><th>Qty</th></tr>\
<tr><td>bolts</td><td>500</td></tr>\
<tr><td>nuts</td><td>20</td></tr>\
</table>";

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let sandbox = Self { dir: tempfile::tempdir().unwrap() };
        fs::write(sandbox.html(), TABLE_HTML).unwrap();
        sandbox
    }

    fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    fn html(&self) -> PathBuf {
        self.dir.path().join("stock.html")
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_tcolor"))
            .env_remove("TCOLOR_DATA_DIR")
            .env("RUST_LOG", "off")
            .arg("--data-dir")
            .arg(self.data_dir())
            .args(args)
            .output()
            .expect("run tcolor")
    }

    fn ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "tcolor {:?} failed: {:?}\nstderr: {}",
            args,
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }

    fn apply(&self) -> String {
        let html = self.html();
        self.ok(&["apply", path_str(&html), "--doc", "stock.md"])
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn apply_without_rules_or_colors_is_unchanged() {
    let sb = Sandbox::new();
    assert_eq!(sb.apply(), TABLE_HTML);
}

#[test]
fn rule_colors_matching_cells() {
    let sb = Sandbox::new();
    sb.ok(&["rules", "add", "--target", "cell", "--match", "gt", "--value", "100", "--bg", "#f00"]);

    let out = sb.apply();
    assert!(out.contains(r#"<td style="background-color: #FF0000">500</td>"#));
    assert!(out.contains("<td>20</td>"));
}

#[test]
fn pick_undo_redo_cycle() {
    let sb = Sandbox::new();
    let html = sb.html();
    let html = path_str(&html);

    sb.ok(&["pick", "row", html, "--doc", "stock.md", "--row", "2", "--field", "text", "--color", "#00f"]);
    let out = sb.apply();
    assert!(out.contains(r#"<td style="color: #0000FF">nuts</td>"#));
    assert!(out.contains(r#"<td style="color: #0000FF">20</td>"#));

    let undo = sb.ok(&["undo"]);
    assert!(undo.contains("row 2 of stock.md table 0"));
    assert_eq!(sb.apply(), TABLE_HTML);

    sb.ok(&["redo"]);
    assert!(sb.apply().contains(r#"<td style="color: #0000FF">nuts</td>"#));
}

#[test]
fn manual_color_beats_rule_on_data_cell() {
    let sb = Sandbox::new();
    let html = sb.html();
    let html = path_str(&html);

    sb.ok(&["rules", "add", "--match", "contains", "--value", "bolts", "--bg", "#ff0000"]);
    sb.ok(&["pick", "cell", html, "--doc", "stock.md", "--row", "1", "--col", "0", "--color", "#00ff00"]);

    let out = sb.apply();
    assert!(out.contains(r#"<td style="background-color: #00FF00">bolts</td>"#));
}

#[test]
fn reset_removes_manual_colors() {
    let sb = Sandbox::new();
    let html = sb.html();
    let html = path_str(&html);

    sb.ok(&["pick", "column", html, "--doc", "stock.md", "--col", "1", "--color", "#abc"]);
    assert!(sb.apply().contains(r#"<td style="background-color: #AABBCC">500</td>"#));

    sb.ok(&["reset", "column", html, "--doc", "stock.md", "--col", "1"]);
    assert_eq!(sb.apply(), TABLE_HTML);

    // Nothing left to remove: a note, not an error.
    let again = sb.run(&["reset", "column", html, "--doc", "stock.md", "--col", "1"]);
    assert!(again.status.success());
    assert!(stderr(&again).contains("no manual colors"));
}

#[test]
fn undo_with_empty_history_fails() {
    let sb = Sandbox::new();
    let output = sb.run(&["undo"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("nothing to undo"));
}

#[test]
fn bad_color_is_a_parse_error() {
    let sb = Sandbox::new();
    let html = sb.html();
    let output = sb.run(&["pick", "cell", path_str(&html), "--row", "0", "--col", "0", "--color", "magenta"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("hint:"));
}

#[test]
fn out_of_range_coordinates_are_usage_errors() {
    let sb = Sandbox::new();
    let html = sb.html();
    let html = path_str(&html);

    let output = sb.run(&["pick", "cell", html, "--table", "3", "--row", "0", "--col", "0", "--color", "#fff"]);
    assert_eq!(output.status.code(), Some(2));

    let output = sb.run(&["pick", "row", html, "--row", "9", "--color", "#fff"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_html_is_an_io_error() {
    let sb = Sandbox::new();
    let missing = sb.dir.path().join("missing.html");
    let output = sb.run(&["apply", path_str(&missing)]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn rules_list_json_shape() {
    let sb = Sandbox::new();
    sb.ok(&["rules", "add", "--match", "isRegex", "--value", "^b", "--bg", "#111111"]);
    sb.ok(&["rules", "add", "--target", "row", "--when", "allCell", "--match", "isNotEmpty", "--color", "#222222"]);

    let stdout = sb.ok(&["rules", "list", "--json", "--sort", "mode"]);
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["sort"], "mode");
    assert_eq!(value["simple"][0]["index"], 0);
    assert_eq!(value["simple"][0]["rule"]["match"], "isRegex");
    assert_eq!(value["simple"][1]["rule"]["when"], "allCell");
    assert_eq!(value["advanced"], serde_json::json!([]));

    sb.ok(&["rules", "move", "1", "0"]);
    sb.ok(&["rules", "remove", "1"]);
    let stdout = sb.ok(&["rules", "list", "--json"]);
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["simple"].as_array().unwrap().len(), 1);
    assert_eq!(value["simple"][0]["rule"]["target"], "row");
}

#[test]
fn rules_add_rejects_unknown_operator() {
    let sb = Sandbox::new();
    let output = sb.run(&["rules", "add", "--match", "teleport", "--bg", "#fff"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("unknown operator 'teleport'"));
}

#[test]
fn export_then_import_into_fresh_data_dir() {
    let sb = Sandbox::new();
    let html = sb.html();
    sb.ok(&["rules", "add", "--match", "is", "--value", "nuts", "--bg", "#123456"]);
    sb.ok(&["pick", "cell", path_str(&html), "--doc", "stock.md", "--row", "0", "--col", "1", "--color", "#654321"]);

    let export = sb.dir.path().join("export.json");
    sb.ok(&["export", "--out", path_str(&export)]);
    let exported: serde_json::Value = serde_json::from_str(&fs::read_to_string(&export).unwrap()).unwrap();
    assert!(exported["exportDate"].is_string());

    let other = Sandbox::new();
    other.ok(&["import", path_str(&export)]);
    let out = other.apply();
    assert!(out.contains(r#"<td style="background-color: #123456">nuts</td>"#));
    assert!(out.contains(r#"<th style="background-color: #654321">Qty</th>"#));
}

#[test]
fn migrate_converts_legacy_rules() {
    let sb = Sandbox::new();
    fs::create_dir_all(sb.data_dir()).unwrap();
    fs::write(
        sb.data_dir().join("data.json"),
        r##"{"settings": {"rules": [{"match": "^n", "regex": true, "bg": "#0f0"}]}}"##,
    )
    .unwrap();

    let stdout = sb.ok(&["migrate"]);
    assert!(stdout.contains("converted 1 legacy rules"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(sb.data_dir().join("data.json")).unwrap()).unwrap();
    assert!(saved["settings"].get("rules").is_none());
    assert_eq!(saved["settings"]["coloringRules"][0]["match"], "isRegex");

    assert!(sb.apply().contains(r#"<td style="background-color: #00FF00">nuts</td>"#));
}

#[test]
fn colors_clear_for_one_document() {
    let sb = Sandbox::new();
    let html = sb.html();
    let html = path_str(&html);
    sb.ok(&["pick", "cell", html, "--doc", "stock.md", "--row", "1", "--col", "1", "--color", "#fff"]);
    sb.ok(&["pick", "cell", html, "--doc", "other.md", "--row", "1", "--col", "1", "--color", "#fff"]);

    sb.ok(&["colors", "clear", "--doc", "stock.md"]);
    assert_eq!(sb.apply(), TABLE_HTML);
    let other = sb.ok(&["apply", html, "--doc", "other.md"]);
    assert!(other.contains(r#"<td style="background-color: #FFFFFF">500</td>"#));
}

#[test]
fn long_version_reports_build_metadata() {
    let sb = Sandbox::new();
    let stdout = sb.ok(&["--version"]);
    assert!(stdout.starts_with(&format!("tcolor {} (", env!("CARGO_PKG_VERSION"))));
    assert!(stdout.contains("\nengine:  tablecolor-engine "));
    assert!(stdout.contains("\ntarget:  "));
    assert!(stdout.contains("\nprofile: "));
    assert!(!stdout.contains("()"));
}
