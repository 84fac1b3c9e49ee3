//! Rule definitions
//!
//! Two rule families share one operator taxonomy:
//!
//! - [`SimpleRule`]: one test, scoped to the cell, a row or a column.
//! - [`AdvancedRule`]: several [`Condition`]s combined with ANY/ALL/NONE.
//!
//! Field names follow the persisted settings format (`when`, `match`, `bg`,
//! `color`), so rules round-trip through the data file unchanged. Decoding is
//! strict per rule: an unknown operator, target or scope fails that rule, and
//! [`lenient_list`] drops it from the list instead of failing the whole load.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tablecolor_core::Color;

// ============================================================================
// Operator taxonomy
// ============================================================================

/// How a cell's text is compared with a rule value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchOp {
    Is,
    IsNot,
    IsRegex,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    NotStartsWith,
    NotEndsWith,
    IsEmpty,
    IsNotEmpty,
    Eq,
    Gt,
    Lt,
    Ge,
    Le,
}

impl MatchOp {
    pub const ALL: [MatchOp; 16] = [
        MatchOp::Is,
        MatchOp::IsNot,
        MatchOp::IsRegex,
        MatchOp::Contains,
        MatchOp::NotContains,
        MatchOp::StartsWith,
        MatchOp::EndsWith,
        MatchOp::NotStartsWith,
        MatchOp::NotEndsWith,
        MatchOp::IsEmpty,
        MatchOp::IsNotEmpty,
        MatchOp::Eq,
        MatchOp::Gt,
        MatchOp::Lt,
        MatchOp::Ge,
        MatchOp::Le,
    ];

    /// Human-readable label, as shown in rule lists.
    pub fn label(&self) -> &'static str {
        match self {
            MatchOp::Is => "Is",
            MatchOp::IsNot => "Is not",
            MatchOp::IsRegex => "Is regex",
            MatchOp::Contains => "Contains",
            MatchOp::NotContains => "Does not contain",
            MatchOp::StartsWith => "Starts with",
            MatchOp::EndsWith => "Ends with",
            MatchOp::NotStartsWith => "Does not start with",
            MatchOp::NotEndsWith => "Does not end with",
            MatchOp::IsEmpty => "Is empty",
            MatchOp::IsNotEmpty => "Is not empty",
            MatchOp::Eq => "Is equal to",
            MatchOp::Gt => "Is greater than",
            MatchOp::Lt => "Is less than",
            MatchOp::Ge => "Is greater than or equal to",
            MatchOp::Le => "Is less than or equal to",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, MatchOp::Eq | MatchOp::Gt | MatchOp::Lt | MatchOp::Ge | MatchOp::Le)
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, MatchOp::IsRegex)
    }
}

/// Structural unit a rule colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Cell,
    Row,
    Column,
}

impl Target {
    pub fn label(&self) -> &'static str {
        match self {
            Target::Cell => "Color cell",
            Target::Row => "Color row",
            Target::Column => "Color column",
        }
    }

    /// Grouping order used by the "mode" rule sort.
    pub fn rank(&self) -> u8 {
        match self {
            Target::Cell => 0,
            Target::Row => 1,
            Target::Column => 2,
        }
    }
}

/// Which cells within a target must satisfy the test (persisted as `when`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    #[default]
    #[serde(rename = "theCell")]
    TheCell,
    #[serde(rename = "anyCell")]
    AnyCell,
    #[serde(rename = "allCell")]
    AllCells,
    #[serde(rename = "noCell")]
    NoCells,
    #[serde(rename = "firstRow")]
    FirstRow,
    #[serde(rename = "columnHeader")]
    ColumnHeader,
    /// Only meaningful for advanced-rule conditions.
    #[serde(rename = "row")]
    Row,
}

impl Scope {
    pub fn label(&self) -> &'static str {
        match self {
            Scope::TheCell => "The cell",
            Scope::AnyCell => "Any cell",
            Scope::AllCells => "All cell",
            Scope::NoCells => "No cell",
            Scope::FirstRow => "First row",
            Scope::ColumnHeader => "Column header",
            Scope::Row => "Row",
        }
    }

    fn any_cell() -> Self {
        Scope::AnyCell
    }
}

/// How an advanced rule folds its condition flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineLogic {
    #[default]
    Any,
    All,
    None,
}

impl CombineLogic {
    pub fn combine(&self, flags: &[bool]) -> bool {
        match self {
            CombineLogic::Any => flags.iter().any(|&f| f),
            CombineLogic::All => flags.iter().all(|&f| f),
            CombineLogic::None => flags.iter().all(|&f| !f),
        }
    }
}

/// The comparison operand. Settings written by hand or by older versions
/// store numbers and booleans as JSON scalars, so all three are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl MatchValue {
    /// The operand as text, the way string operators see it.
    pub fn as_text(&self) -> String {
        match self {
            MatchValue::Number(n) => n.to_string(),
            MatchValue::Bool(b) => b.to_string(),
            MatchValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for MatchValue {
    fn from(s: &str) -> Self {
        MatchValue::Text(s.to_string())
    }
}

impl From<f64> for MatchValue {
    fn from(n: f64) -> Self {
        MatchValue::Number(n)
    }
}

impl From<i32> for MatchValue {
    fn from(n: i32) -> Self {
        MatchValue::Number(n as f64)
    }
}

// ============================================================================
// Simple rules
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleRule {
    pub target: Target,
    #[serde(default)]
    pub when: Scope,
    #[serde(rename = "match")]
    pub op: MatchOp,
    #[serde(default)]
    pub value: Option<MatchValue>,
    /// Text color.
    #[serde(default, deserialize_with = "optional_color")]
    pub color: Option<Color>,
    /// Background color.
    #[serde(default, deserialize_with = "optional_color")]
    pub bg: Option<Color>,
}

impl SimpleRule {
    pub fn new(target: Target, when: Scope, op: MatchOp, value: impl Into<MatchValue>) -> Self {
        Self {
            target,
            when,
            op,
            value: Some(value.into()),
            color: None,
            bg: None,
        }
    }

    pub fn with_bg(mut self, bg: Color) -> Self {
        self.bg = Some(bg);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// No color set: the rule cannot change anything.
    pub fn is_inert(&self) -> bool {
        self.bg.is_none() && self.color.is_none()
    }
}

// ============================================================================
// Advanced rules
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default = "Scope::any_cell")]
    pub when: Scope,
    #[serde(rename = "match")]
    pub op: MatchOp,
    #[serde(default)]
    pub value: Option<MatchValue>,
}

impl Condition {
    pub fn new(when: Scope, op: MatchOp, value: impl Into<MatchValue>) -> Self {
        Self { when, op, value: Some(value.into()) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvancedRule {
    #[serde(default)]
    pub logic: CombineLogic,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub target: Target,
    #[serde(default, deserialize_with = "optional_color")]
    pub color: Option<Color>,
    #[serde(default, deserialize_with = "optional_color")]
    pub bg: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AdvancedRule {
    pub fn new(logic: CombineLogic, target: Target, conditions: Vec<Condition>) -> Self {
        Self { logic, conditions, target, ..Self::default() }
    }

    pub fn with_bg(mut self, bg: Color) -> Self {
        self.bg = Some(bg);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn is_inert(&self) -> bool {
        self.conditions.is_empty() || (self.bg.is_none() && self.color.is_none())
    }

    /// Every condition tests a column header.
    pub fn header_only(&self) -> bool {
        !self.conditions.is_empty() && self.conditions.iter().all(|c| c.when == Scope::ColumnHeader)
    }
}

/// Both rule lists, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    pub simple: Vec<SimpleRule>,
    pub advanced: Vec<AdvancedRule>,
}

impl RuleSet {
    pub fn new(simple: Vec<SimpleRule>, advanced: Vec<AdvancedRule>) -> Self {
        Self { simple, advanced }
    }

    pub fn is_empty(&self) -> bool {
        self.simple.is_empty() && self.advanced.is_empty()
    }
}

// ============================================================================
// Boundary decoding
// ============================================================================

/// Colors in rule records may be `null`, `""` (cleared in the editor) or a
/// color string.
pub fn optional_color<'de, D>(deserializer: D) -> Result<Option<Color>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Color::parse(s).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Decode a list element by element, dropping records that do not decode.
/// A missing or non-array value yields an empty list.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(decode_list(raw, std::any::type_name::<T>()))
}

/// Same as [`lenient_list`] for a value already held in memory.
pub fn decode_list<T: DeserializeOwned>(raw: serde_json::Value, what: &str) -> Vec<T> {
    let items = match raw {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Null => return Vec::new(),
        other => {
            log::warn!("expected a list of {}, got {}; ignoring", what, other);
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<T>(item) {
            Ok(rule) => Some(rule),
            Err(e) => {
                log::warn!("dropping {} #{}: {}", what, i, e);
                None
            }
        })
        .collect()
}
