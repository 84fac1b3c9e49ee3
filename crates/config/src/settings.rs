// Plugin settings
// Stored under the "settings" key of the data file.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tablecolor_core::Color;
use tablecolor_engine::rules::lenient_list;
use tablecolor_engine::{AdvancedRule, NumericMode, RuleSet, SimpleRule};

/// How many picked colors are remembered.
pub const RECENT_COLORS_MAX: usize = 10;

/// Display order of the simple rule list. Evaluation always uses stored order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleSort {
    /// Stored order
    #[default]
    LastAdded,
    /// Alphabetical by operator label
    Az,
    RegexFirst,
    NumbersFirst,
    /// Grouped by target: cell, row, column
    Mode,
}

impl RuleSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSort::LastAdded => "lastAdded",
            RuleSort::Az => "az",
            RuleSort::RegexFirst => "regexFirst",
            RuleSort::NumbersFirst => "numbersFirst",
            RuleSort::Mode => "mode",
        }
    }
}

impl std::str::FromStr for RuleSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown sort '{}' (expected lastAdded, az, regexFirst, numbersFirst or mode)", s))
    }
}

/// A named swatch offered in the color picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetColor {
    #[serde(default)]
    pub name: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Simple rules, in evaluation order
    #[serde(deserialize_with = "lenient_list")]
    pub coloring_rules: Vec<SimpleRule>,

    /// Display order of `coloring_rules`
    #[serde(deserialize_with = "or_default")]
    pub coloring_sort: RuleSort,

    /// Advanced rules, evaluated after simple rules
    #[serde(deserialize_with = "lenient_list")]
    pub advanced_rules: Vec<AdvancedRule>,

    /// Numeric operators require the whole cell to be a number
    #[serde(deserialize_with = "or_default_true")]
    pub numeric_strict: bool,

    /// Keep undo/redo stacks across restarts
    #[serde(deserialize_with = "or_default_true")]
    pub persist_undo_history: bool,

    /// Re-color tables while the rule editor is open
    #[serde(deserialize_with = "or_default")]
    pub live_preview_coloring: bool,

    /// Most recently picked colors, newest first
    #[serde(deserialize_with = "lenient_list")]
    pub recent_colors: Vec<Color>,

    #[serde(deserialize_with = "preset_colors")]
    pub preset_colors: Vec<PresetColor>,

    // Menu and toolbar toggles
    #[serde(deserialize_with = "or_default_true")]
    pub enable_context_menu: bool,
    #[serde(deserialize_with = "or_default_true")]
    pub show_color_row_in_menu: bool,
    #[serde(deserialize_with = "or_default_true")]
    pub show_color_column_in_menu: bool,
    #[serde(deserialize_with = "or_default_true")]
    pub show_undo_redo_in_menu: bool,
    #[serde(deserialize_with = "or_default_true")]
    pub show_status_refresh_icon: bool,
    #[serde(deserialize_with = "or_default_true")]
    pub show_ribbon_refresh_icon: bool,

    /// Pre-rules schema (`{match, regex, color, bg}`). Read for migration,
    /// never written back.
    #[serde(rename = "rules", skip_serializing)]
    pub legacy_rules: Option<serde_json::Value>,

    /// Keys this version does not know about, kept as-is
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            coloring_rules: Vec::new(),
            coloring_sort: RuleSort::LastAdded,
            advanced_rules: Vec::new(),
            numeric_strict: true,
            persist_undo_history: true,
            live_preview_coloring: false,
            recent_colors: Vec::new(),
            preset_colors: Vec::new(),
            enable_context_menu: true,
            show_color_row_in_menu: true,
            show_color_column_in_menu: true,
            show_undo_redo_in_menu: true,
            show_status_refresh_icon: true,
            show_ribbon_refresh_icon: true,
            legacy_rules: None,
            extra: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn numeric_mode(&self) -> NumericMode {
        NumericMode::from_strict(self.numeric_strict)
    }

    /// Both rule lists, cloned for a reconcile pass.
    pub fn rule_set(&self) -> RuleSet {
        RuleSet::new(self.coloring_rules.clone(), self.advanced_rules.clone())
    }

    /// Move `color` to the front of the recent list.
    pub fn push_recent_color(&mut self, color: Color) {
        self.recent_colors.retain(|c| *c != color);
        self.recent_colors.insert(0, color);
        self.recent_colors.truncate(RECENT_COLORS_MAX);
    }

    /// Decode from a JSON value, falling back to defaults on anything
    /// that is not a settings object.
    pub fn from_value(value: serde_json::Value) -> Self {
        if value.is_null() {
            return Self::default();
        }
        match serde_json::from_value(value) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("settings are corrupt, using defaults: {}", e);
                Self::default()
            }
        }
    }
}

/// Use the type's default when the stored value does not decode.
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw.clone()).unwrap_or_else(|_| {
        log::warn!("ignoring setting value {}", raw);
        T::default()
    }))
}

fn or_default_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(raw.as_bool().unwrap_or_else(|| {
        log::warn!("ignoring setting value {}", raw);
        true
    }))
}

/// Presets were once plain color strings; those become unnamed presets.
fn preset_colors<'de, D>(deserializer: D) -> Result<Vec<PresetColor>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = raw else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| {
            let decoded = match item {
                serde_json::Value::String(s) => {
                    Color::parse(&s).map(|color| PresetColor { name: String::new(), color }).ok()
                }
                other => serde_json::from_value(other).ok(),
            };
            if decoded.is_none() {
                log::warn!("dropping unreadable preset color");
            }
            decoded
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_from_empty_object() {
        let settings: Settings = serde_json::from_value(json!({})).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.numeric_strict);
        assert!(settings.persist_undo_history);
        assert!(!settings.live_preview_coloring);
    }

    #[test]
    fn test_unknown_keys_preserved() {
        let settings: Settings = serde_json::from_value(json!({
            "numericStrict": false,
            "futureFlag": {"x": 1}
        }))
        .unwrap();
        assert!(!settings.numeric_strict);
        let back = serde_json::to_value(&settings).unwrap();
        assert_eq!(back["futureFlag"], json!({"x": 1}));
        assert_eq!(back["numericStrict"], json!(false));
    }

    #[test]
    fn test_bad_values_fall_back_per_field() {
        let settings: Settings = serde_json::from_value(json!({
            "coloringSort": "sideways",
            "numericStrict": "yes",
            "coloringRules": [{"target": "cell", "match": "is", "value": "a", "bg": "#fff"}, {"bogus": true}],
            "recentColors": ["#ABCDEF", "blurple"]
        }))
        .unwrap();
        assert_eq!(settings.coloring_sort, RuleSort::LastAdded);
        assert!(settings.numeric_strict);
        assert_eq!(settings.coloring_rules.len(), 1);
        assert_eq!(settings.recent_colors, vec![Color::from_hex(0xABCDEF)]);
    }

    #[test]
    fn test_preset_strings_normalized() {
        let settings: Settings = serde_json::from_value(json!({
            "presetColors": ["#ff0000", {"name": "Sky", "color": "#87ceeb"}, 42]
        }))
        .unwrap();
        assert_eq!(
            settings.preset_colors,
            vec![
                PresetColor { name: String::new(), color: Color::from_hex(0xFF0000) },
                PresetColor { name: "Sky".into(), color: Color::from_hex(0x87CEEB) },
            ]
        );
    }

    #[test]
    fn test_recent_colors_dedup_and_cap() {
        let mut settings = Settings::default();
        for i in 0..12u32 {
            settings.push_recent_color(Color::from_hex(i));
        }
        assert_eq!(settings.recent_colors.len(), RECENT_COLORS_MAX);
        assert_eq!(settings.recent_colors[0], Color::from_hex(11));

        settings.push_recent_color(Color::parse("#00000a").unwrap());
        assert_eq!(settings.recent_colors[0], Color::from_hex(10));
        assert_eq!(settings.recent_colors.len(), RECENT_COLORS_MAX);
        assert_eq!(settings.recent_colors.iter().filter(|c| **c == Color::from_hex(10)).count(), 1);
    }

    #[test]
    fn test_legacy_rules_not_written() {
        let settings: Settings = serde_json::from_value(json!({"rules": [{"match": "x"}]})).unwrap();
        assert!(settings.legacy_rules.is_some());
        let back = serde_json::to_value(&settings).unwrap();
        assert!(back.get("rules").is_none());
    }

    #[test]
    fn test_sort_from_str() {
        assert_eq!("numbersFirst".parse::<RuleSort>(), Ok(RuleSort::NumbersFirst));
        assert!("random".parse::<RuleSort>().is_err());
    }
}
