//! Index maps persisted with prefixed string keys (`table_0`, `row_3`,
//! `col_1`). Loading is forgiving: an entry whose key lacks the prefix or
//! whose value does not decode is dropped with a warning.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tablecolor_core::CellColor;

pub trait KeyPrefix {
    const PREFIX: &'static str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableKey;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowKey;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColKey;

impl KeyPrefix for TableKey {
    const PREFIX: &'static str = "table_";
}

impl KeyPrefix for RowKey {
    const PREFIX: &'static str = "row_";
}

impl KeyPrefix for ColKey {
    const PREFIX: &'static str = "col_";
}

/// `col_<n> -> CellColor`
pub type ColumnColorMap = PrefixedMap<ColKey, CellColor>;
/// `row_<n> -> ColumnColorMap`
pub type RowColorMap = PrefixedMap<RowKey, ColumnColorMap>;
/// `table_<n> -> RowColorMap`
pub type TableColorMap = PrefixedMap<TableKey, RowColorMap>;

/// Sparse map from a zero-based index to `V`, ordered by index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixedMap<K, V> {
    entries: BTreeMap<usize, V>,
    _key: PhantomData<K>,
}

impl<K: KeyPrefix, V> PrefixedMap<K, V> {
    pub fn new() -> Self {
        Self { entries: BTreeMap::new(), _key: PhantomData }
    }

    pub fn key(index: usize) -> String {
        format!("{}{}", K::PREFIX, index)
    }

    /// Index encoded in a persisted key, if it carries this map's prefix.
    pub fn parse_key(key: &str) -> Option<usize> {
        key.strip_prefix(K::PREFIX)?.parse().ok()
    }

    pub fn get(&self, index: usize) -> Option<&V> {
        self.entries.get(&index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut V> {
        self.entries.get_mut(&index)
    }

    pub fn insert(&mut self, index: usize, value: V) -> Option<V> {
        self.entries.insert(index, value)
    }

    pub fn remove(&mut self, index: usize) -> Option<V> {
        self.entries.remove(&index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &V)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn retain(&mut self, mut keep: impl FnMut(usize, &mut V) -> bool) {
        self.entries.retain(|k, v| keep(*k, v));
    }
}

impl<K: KeyPrefix, V: Default> PrefixedMap<K, V> {
    pub fn get_or_default(&mut self, index: usize) -> &mut V {
        self.entries.entry(index).or_default()
    }
}

impl<K: KeyPrefix, V> FromIterator<(usize, V)> for PrefixedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (usize, V)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect(), _key: PhantomData }
    }
}

impl<K: KeyPrefix, V: Serialize> Serialize for PrefixedMap<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (index, value) in &self.entries {
            map.serialize_entry(&Self::key(*index), value)?;
        }
        map.end()
    }
}

impl<'de, K: KeyPrefix, V: DeserializeOwned> Deserialize<'de> for PrefixedMap<K, V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: BTreeMap<String, serde_json::Value> = BTreeMap::deserialize(deserializer)?;
        Ok(decode_entries(raw))
    }
}

/// Decode `(key, value)` pairs, dropping anything malformed.
fn decode_entries<K, V>(raw: BTreeMap<String, serde_json::Value>) -> PrefixedMap<K, V>
where
    K: KeyPrefix,
    V: DeserializeOwned,
{
    raw.into_iter()
        .filter_map(|(key, value)| {
            let Some(index) = PrefixedMap::<K, V>::parse_key(&key) else {
                log::warn!("ignoring color entry with key '{}' (expected {}<n>)", key, K::PREFIX);
                return None;
            };
            match serde_json::from_value::<V>(value) {
                Ok(v) => Some((index, v)),
                Err(e) => {
                    log::warn!("ignoring color entry '{}': {}", key, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tablecolor_core::Color;

    #[test]
    fn test_persisted_shape() {
        let mut cols = ColumnColorMap::new();
        cols.insert(2, CellColor::background(Color::from_hex(0xFF0000)));
        let mut rows = RowColorMap::new();
        rows.insert(1, cols);
        let mut tables = TableColorMap::new();
        tables.insert(0, rows);

        let value = serde_json::to_value(&tables).unwrap();
        assert_eq!(value, json!({"table_0": {"row_1": {"col_2": {"bg": "#FF0000"}}}}));

        let back: TableColorMap = serde_json::from_value(value).unwrap();
        assert_eq!(back, tables);
    }

    #[test]
    fn test_bad_entries_dropped() {
        let raw = json!({
            "table_0": {
                "row_0": {"col_0": {"bg": "#ff0000"}, "col_x": {"bg": "#00ff00"}, "col_1": {"bg": "nope"}},
                "r1": {"col_0": {"bg": "#ff0000"}},
                "row_2": "garbage"
            },
            "stray": {}
        });
        let tables: TableColorMap = serde_json::from_value(raw).unwrap();
        assert_eq!(tables.len(), 1);
        let rows = tables.get(0).unwrap();
        assert_eq!(rows.len(), 1);
        let cols = rows.get(0).unwrap();
        assert_eq!(cols.len(), 1);
        assert_eq!(cols.get(0).unwrap().bg, Some(Color::from_hex(0xFF0000)));
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(RowColorMap::parse_key("row_12"), Some(12));
        assert_eq!(RowColorMap::parse_key("col_12"), None);
        assert_eq!(RowColorMap::parse_key("row_-1"), None);
    }
}
