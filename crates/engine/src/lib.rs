pub mod advanced;
pub mod editor;
pub mod extract;
pub mod history;
pub mod keyed;
pub mod matcher;
mod paint;
pub mod reconcile;
pub mod rules;
pub mod simple;
pub mod store;

pub use advanced::AdvancedRuleEngine;
pub use editor::ColorEditor;
pub use extract::{extract, CellContent, ContentNode, NodeKind};
pub use history::{History, Region, RegionColors, UndoSnapshot};
pub use keyed::{ColumnColorMap, RowColorMap, TableColorMap};
pub use matcher::{MatchEvaluator, NumericMode};
pub use reconcile::{reconcile, Reconciler, Reconciliation};
pub use rules::{AdvancedRule, CombineLogic, Condition, MatchOp, MatchValue, RuleSet, Scope, SimpleRule, Target};
pub use simple::SimpleRuleEngine;
pub use store::ManualColorStore;
