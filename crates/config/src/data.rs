//! The persisted data blob: `{ "settings": {...}, "cellData": {...} }`.
//!
//! Loading never fails. Corrupt JSON gives defaults, bad rules and color
//! entries are dropped one by one, and legacy rule lists are migrated.

use serde::{Deserialize, Deserializer, Serialize};
use tablecolor_core::Color;
use tablecolor_engine::rules::optional_color;
use tablecolor_engine::{ManualColorStore, MatchOp, MatchValue, Scope, SimpleRule, Target};

use crate::error::StoreError;
use crate::settings::Settings;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginData {
    #[serde(deserialize_with = "settings_or_default")]
    pub settings: Settings,

    #[serde(rename = "cellData")]
    pub cell_data: ManualColorStore,

    /// Very old files kept the legacy rule list at the top level.
    #[serde(rename = "rules", skip_serializing)]
    pub legacy_rules: Option<serde_json::Value>,
}

fn settings_or_default<'de, D>(deserializer: D) -> Result<Settings, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Settings::from_value(serde_json::Value::deserialize(deserializer)?))
}

/// One rule in the pre-`coloringRules` schema.
#[derive(Debug, Deserialize)]
struct LegacyRule {
    #[serde(rename = "match")]
    pattern: MatchValue,
    #[serde(default)]
    regex: bool,
    #[serde(default, deserialize_with = "optional_color")]
    color: Option<Color>,
    #[serde(default, deserialize_with = "optional_color")]
    bg: Option<Color>,
}

impl From<LegacyRule> for SimpleRule {
    fn from(old: LegacyRule) -> Self {
        SimpleRule {
            target: Target::Cell,
            when: Scope::TheCell,
            op: if old.regex { MatchOp::IsRegex } else { MatchOp::Contains },
            value: Some(old.pattern),
            color: old.color,
            bg: old.bg,
        }
    }
}

impl PluginData {
    /// Parse a stored blob. Never fails; see module docs.
    pub fn from_json(json: &str) -> Self {
        // Decoded part by part from a Value so one bad part keeps the rest.
        let value = match serde_json::from_str::<serde_json::Value>(json) {
            Ok(value @ serde_json::Value::Object(_)) => value,
            Ok(other) => {
                log::warn!("data file is not an object, starting from defaults: {}", other);
                serde_json::Value::Null
            }
            Err(e) => {
                log::warn!("data file is corrupt, starting from defaults: {}", e);
                serde_json::Value::Null
            }
        };
        let mut data = if value.is_null() {
            PluginData::default()
        } else {
            serde_json::from_value::<PluginData>(value).unwrap_or_else(|e| {
                log::warn!("data file is unreadable, starting from defaults: {}", e);
                PluginData::default()
            })
        };
        data.migrate();
        data
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Convert a legacy rule list into simple rules when there are no simple
    /// rules yet. The legacy list is dropped either way. Returns the number
    /// of rules converted.
    pub fn migrate(&mut self) -> usize {
        let legacy = self.settings.legacy_rules.take().or_else(|| self.legacy_rules.take());
        self.legacy_rules = None;

        let Some(legacy) = legacy else {
            return 0;
        };
        if !self.settings.coloring_rules.is_empty() {
            log::debug!("coloring rules already present; discarding legacy rules");
            return 0;
        }

        let converted: Vec<SimpleRule> = tablecolor_engine::rules::decode_list::<LegacyRule>(legacy, "legacy rule")
            .into_iter()
            .map(SimpleRule::from)
            .collect();
        let count = converted.len();
        self.settings.coloring_rules = converted;
        log::info!("migrated {} legacy rules", count);
        count
    }

    /// Full blob plus an `exportDate` stamp.
    pub fn export_json(&self) -> Result<String, StoreError> {
        let mut value = serde_json::to_value(self)?;
        if let serde_json::Value::Object(map) = &mut value {
            map.insert(
                "exportDate".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        Ok(serde_json::to_string_pretty(&value)?)
    }

    /// Merge an exported blob into this one: settings keys present in the
    /// import replace ours, `cellData` replaces ours when present.
    pub fn import_json(&mut self, json: &str) -> Result<(), StoreError> {
        let imported: serde_json::Value = serde_json::from_str(json)?;

        if let Some(serde_json::Value::Object(incoming)) = imported.get("settings") {
            let mut merged = match serde_json::to_value(&self.settings)? {
                serde_json::Value::Object(map) => map,
                _ => serde_json::Map::new(),
            };
            for (key, value) in incoming {
                merged.insert(key.clone(), value.clone());
            }
            self.settings = Settings::from_value(serde_json::Value::Object(merged));
        }

        if let Some(cells) = imported.get("cellData") {
            self.cell_data = serde_json::from_value(cells.clone()).unwrap_or_else(|e| {
                log::warn!("imported cell colors are unreadable: {}", e);
                ManualColorStore::new()
            });
        }

        self.migrate();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tablecolor_core::ColorField;

    #[test]
    fn test_legacy_settings_rules_migrate() {
        let data = PluginData::from_json(
            &json!({"settings": {"rules": [{"match": "foo", "regex": false, "color": "#111111", "bg": null}]}})
                .to_string(),
        );
        assert_eq!(data.settings.coloring_rules.len(), 1);
        assert_eq!(
            serde_json::to_value(&data.settings.coloring_rules[0]).unwrap(),
            json!({"target": "cell", "when": "theCell", "match": "contains", "value": "foo", "color": "#111111", "bg": null})
        );
        let saved: serde_json::Value = serde_json::from_str(&data.to_json().unwrap()).unwrap();
        assert!(saved["settings"].get("rules").is_none());
    }

    #[test]
    fn test_top_level_legacy_rules_and_regex() {
        let data = PluginData::from_json(r##"{"rules": [{"match": "^a", "regex": true, "bg": "#00f"}]}"##);
        let rule = &data.settings.coloring_rules[0];
        assert_eq!(rule.op, MatchOp::IsRegex);
        assert_eq!(rule.bg, Some(Color::from_hex(0x0000FF)));
        assert_eq!(rule.color, None);
    }

    #[test]
    fn test_legacy_ignored_when_rules_exist() {
        let mut data = PluginData::from_json(
            &json!({"settings": {
                "coloringRules": [{"target": "row", "when": "anyCell", "match": "is", "value": "x", "bg": "#fff"}],
                "rules": [{"match": "foo"}]
            }})
            .to_string(),
        );
        assert_eq!(data.settings.coloring_rules.len(), 1);
        assert_eq!(data.settings.coloring_rules[0].target, Target::Row);
        assert_eq!(data.migrate(), 0);
    }

    #[test]
    fn test_corrupt_blob_gives_defaults() {
        assert_eq!(PluginData::from_json("{{{"), PluginData::default());
        assert_eq!(PluginData::from_json("[]"), PluginData::default());
        let data = PluginData::from_json(r#"{"settings": 5, "cellData": {"a.md": {"table_0": {}}}}"#);
        assert_eq!(data.settings, Settings::default());
    }

    #[test]
    fn test_bad_cell_data_keeps_settings() {
        for cells in ["[1, 2]", "\"oops\"", "42"] {
            let json = format!(
                r##"{{"settings": {{"numericStrict": false, "coloringRules": [{{"target": "cell", "match": "is", "value": "a", "bg": "#ff0000"}}]}}, "cellData": {}}}"##,
                cells
            );
            let data = PluginData::from_json(&json);
            assert_eq!(data.settings.coloring_rules.len(), 1, "cellData = {}", cells);
            assert!(!data.settings.numeric_strict);
            assert!(data.cell_data.is_empty());
        }
    }

    #[test]
    fn test_export_then_import_merges() {
        let mut source = PluginData::default();
        source.settings.numeric_strict = false;
        source.cell_data.set("a.md", 0, 0, 0, ColorField::Background, Some(Color::from_hex(0xFF0000)));
        let exported = source.export_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
        assert!(value["exportDate"].is_string());

        let mut target = PluginData::default();
        target.settings.live_preview_coloring = true;
        target.import_json(&exported).unwrap();
        assert!(!target.settings.numeric_strict);
        // Exported settings carry every key, so ours is overwritten too.
        assert!(!target.settings.live_preview_coloring);
        assert_eq!(target.cell_data, source.cell_data);
    }

    #[test]
    fn test_partial_import_keeps_other_settings() {
        let mut data = PluginData::default();
        data.settings.live_preview_coloring = true;
        data.cell_data.set("a.md", 0, 0, 0, ColorField::Text, Some(Color::from_hex(0x000000)));

        data.import_json(r#"{"settings": {"numericStrict": false}}"#).unwrap();
        assert!(!data.settings.numeric_strict);
        assert!(data.settings.live_preview_coloring);
        assert_eq!(data.cell_data.cell_count(), 1);
    }

    #[test]
    fn test_import_rejects_invalid_json() {
        let mut data = PluginData::default();
        assert!(data.import_json("not json").is_err());
    }
}
