// rules list / add / remove / move / duplicate / clear

use serde::de::DeserializeOwned;
use serde_json::json;
use tablecolor_config::rule_list::{display_order, duplicate_item, move_item, remove_item};
use tablecolor_config::RuleSort;
use tablecolor_core::Color;
use tablecolor_engine::{AdvancedRule, CombineLogic, MatchOp, MatchValue, Scope, SimpleRule, Target};

use crate::{CliError, Context};

/// Decode a persisted enum name (`theCell`, `gt`, ...) the way the data file
/// spells it.
fn parse_name<T: DeserializeOwned>(what: &str, name: &str) -> Result<T, CliError> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .map_err(|_| CliError::parse(format!("unknown {} '{}'", what, name)))
}

fn parse_optional_color(input: Option<String>) -> Result<Option<Color>, CliError> {
    input
        .map(|s| Color::parse(&s).map_err(|e| CliError::parse(e.to_string())))
        .transpose()
}

fn colors_suffix(bg: Option<Color>, color: Option<Color>) -> String {
    let mut parts = Vec::new();
    if let Some(bg) = bg {
        parts.push(format!("bg {}", bg));
    }
    if let Some(color) = color {
        parts.push(format!("text {}", color));
    }
    parts.join(", ")
}

fn simple_line(rule: &SimpleRule) -> String {
    let value = rule.value.as_ref().map(MatchValue::as_text).unwrap_or_default();
    format!(
        "{} / {} / {} {}  {}",
        rule.target.label(),
        rule.when.label(),
        rule.op.label(),
        value,
        colors_suffix(rule.bg, rule.color)
    )
}

fn advanced_line(rule: &AdvancedRule) -> String {
    let logic = match rule.logic {
        CombineLogic::Any => "ANY",
        CombineLogic::All => "ALL",
        CombineLogic::None => "NONE",
    };
    format!(
        "{}: {} of {} conditions -> {}  {}",
        rule.name.as_deref().unwrap_or("(unnamed)"),
        logic,
        rule.conditions.len(),
        rule.target.label(),
        colors_suffix(rule.bg, rule.color)
    )
}

pub fn cmd_list(ctx: &Context, sort: Option<RuleSort>, search: &str, json: bool) -> Result<(), CliError> {
    let settings = &ctx.state.data.settings;
    let sort = sort.unwrap_or(settings.coloring_sort);
    let order = display_order(&settings.coloring_rules, sort, search);

    if json {
        let simple: Vec<_> = order
            .iter()
            .map(|&i| json!({"index": i, "rule": settings.coloring_rules[i]}))
            .collect();
        let advanced: Vec<_> = settings
            .advanced_rules
            .iter()
            .enumerate()
            .map(|(i, rule)| json!({"index": i, "rule": rule}))
            .collect();
        let out = json!({"sort": sort.as_str(), "simple": simple, "advanced": advanced});
        println!("{}", serde_json::to_string_pretty(&out).map_err(|e| CliError::general(e.to_string()))?);
        return Ok(());
    }

    println!("simple rules (sort: {})", sort.as_str());
    for &i in &order {
        println!("  [{}] {}", i, simple_line(&settings.coloring_rules[i]));
    }
    println!("advanced rules");
    for (i, rule) in settings.advanced_rules.iter().enumerate() {
        println!("  [{}] {}", i, advanced_line(rule));
    }
    Ok(())
}

pub fn cmd_add(
    ctx: &mut Context,
    target: &str,
    when: &str,
    op: &str,
    value: Option<String>,
    bg: Option<String>,
    color: Option<String>,
) -> Result<(), CliError> {
    let rule = SimpleRule {
        target: parse_name::<Target>("target", target)?,
        when: parse_name::<Scope>("scope", when)?,
        op: parse_name::<MatchOp>("operator", op)?,
        value: value.map(MatchValue::Text),
        bg: parse_optional_color(bg)?,
        color: parse_optional_color(color)?,
    };
    if rule.is_inert() {
        return Err(CliError::args("rule sets no color").with_hint("add --bg and/or --color"));
    }

    let rules = &mut ctx.state.data.settings.coloring_rules;
    rules.push(rule);
    let index = rules.len() - 1;
    ctx.save()?;
    println!("added rule [{}]", index);
    Ok(())
}

fn out_of_range(index: usize, len: usize) -> CliError {
    CliError::args(format!("no rule {} ({} simple rules)", index, len)).with_hint("see `tcolor rules list`")
}

pub fn cmd_remove(ctx: &mut Context, index: usize) -> Result<(), CliError> {
    let rules = &mut ctx.state.data.settings.coloring_rules;
    let len = rules.len();
    let removed = remove_item(rules, index).ok_or_else(|| out_of_range(index, len))?;
    ctx.save()?;
    println!("removed [{}] {}", index, simple_line(&removed));
    Ok(())
}

pub fn cmd_move(ctx: &mut Context, from: usize, to: usize) -> Result<(), CliError> {
    let rules = &mut ctx.state.data.settings.coloring_rules;
    let len = rules.len();
    if !move_item(rules, from, to) {
        return Err(out_of_range(from.max(to), len));
    }
    ctx.save()?;
    println!("moved rule {} to {}", from, to);
    Ok(())
}

pub fn cmd_duplicate(ctx: &mut Context, index: usize) -> Result<(), CliError> {
    let rules = &mut ctx.state.data.settings.coloring_rules;
    let len = rules.len();
    if !duplicate_item(rules, index) {
        return Err(out_of_range(index, len));
    }
    ctx.save()?;
    println!("duplicated rule {} as {}", index, index + 1);
    Ok(())
}

pub fn cmd_clear(ctx: &mut Context, advanced: bool) -> Result<(), CliError> {
    let settings = &mut ctx.state.data.settings;
    let (count, kind) = if advanced {
        (std::mem::take(&mut settings.advanced_rules).len(), "advanced")
    } else {
        (std::mem::take(&mut settings.coloring_rules).len(), "simple")
    };
    ctx.save()?;
    println!("removed {} {} rules", count, kind);
    Ok(())
}
