// Configuration loading and persistence

pub mod data;
pub mod error;
pub mod rule_list;
pub mod settings;
pub mod state;
pub mod storage;

pub use data::PluginData;
pub use error::StoreError;
pub use settings::{PresetColor, RuleSort, Settings};
pub use state::AppState;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
