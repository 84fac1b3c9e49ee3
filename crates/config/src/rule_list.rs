//! Presentation and editing of the stored rule lists: display sorting,
//! search, and the reorder/duplicate/remove operations the rule editor
//! offers.
//!
//! Display order never changes evaluation order; functions here that only
//! present rules return indices into the stored list.

use std::cmp::Ordering;

use tablecolor_engine::{MatchValue, SimpleRule};

use crate::settings::RuleSort;

/// Lower-cased text a search query is matched against.
pub fn search_blob(rule: &SimpleRule) -> String {
    let value = rule.value.as_ref().map(MatchValue::as_text).unwrap_or_default();
    format!("{} {} {} {}", rule.target.label(), rule.when.label(), rule.op.label(), value).to_lowercase()
}

fn compare(a: &SimpleRule, b: &SimpleRule, sort: RuleSort) -> Ordering {
    match sort {
        RuleSort::LastAdded => Ordering::Equal,
        RuleSort::Az => a.op.label().to_lowercase().cmp(&b.op.label().to_lowercase()),
        // `true` sorts after `false`, so compare b against a.
        RuleSort::RegexFirst => b.op.is_regex().cmp(&a.op.is_regex()),
        RuleSort::NumbersFirst => b.op.is_numeric().cmp(&a.op.is_numeric()),
        RuleSort::Mode => a.target.rank().cmp(&b.target.rank()),
    }
}

/// Indices of the rules to show, in display order. An empty query matches
/// everything. Ties keep stored order.
pub fn display_order(rules: &[SimpleRule], sort: RuleSort, query: &str) -> Vec<usize> {
    let query = query.trim().to_lowercase();
    let mut order: Vec<usize> = (0..rules.len())
        .filter(|&i| query.is_empty() || search_blob(&rules[i]).contains(&query))
        .collect();
    order.sort_by(|&a, &b| compare(&rules[a], &rules[b], sort));
    order
}

/// Move the item at `from` so it ends up at `to`.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// Insert a copy of the item at `index` right after it.
pub fn duplicate_item<T: Clone>(items: &mut Vec<T>, index: usize) -> bool {
    let Some(item) = items.get(index).cloned() else {
        return false;
    };
    items.insert(index + 1, item);
    true
}

pub fn remove_item<T>(items: &mut Vec<T>, index: usize) -> Option<T> {
    (index < items.len()).then(|| items.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablecolor_engine::{MatchOp, Scope, Target};

    fn rules() -> Vec<SimpleRule> {
        vec![
            SimpleRule::new(Target::Column, Scope::AnyCell, MatchOp::Gt, 10),
            SimpleRule::new(Target::Cell, Scope::TheCell, MatchOp::IsRegex, "^err"),
            SimpleRule::new(Target::Row, Scope::AllCells, MatchOp::Contains, "Done"),
            SimpleRule::new(Target::Cell, Scope::TheCell, MatchOp::Is, "x"),
        ]
    }

    #[test]
    fn test_sort_modes() {
        let rules = rules();
        assert_eq!(display_order(&rules, RuleSort::LastAdded, ""), vec![0, 1, 2, 3]);
        assert_eq!(display_order(&rules, RuleSort::RegexFirst, ""), vec![1, 0, 2, 3]);
        assert_eq!(display_order(&rules, RuleSort::NumbersFirst, ""), vec![0, 1, 2, 3]);
        assert_eq!(display_order(&rules, RuleSort::Mode, ""), vec![1, 3, 2, 0]);
        // Contains, Is, Is greater than, Is regex
        assert_eq!(display_order(&rules, RuleSort::Az, ""), vec![2, 3, 0, 1]);
    }

    #[test]
    fn test_search_uses_labels_and_value() {
        let rules = rules();
        assert_eq!(display_order(&rules, RuleSort::LastAdded, "color row"), vec![2]);
        assert_eq!(display_order(&rules, RuleSort::LastAdded, "DONE"), vec![2]);
        assert_eq!(display_order(&rules, RuleSort::LastAdded, "the cell"), vec![1, 3]);
        assert_eq!(display_order(&rules, RuleSort::LastAdded, "greater"), vec![0]);
        assert!(display_order(&rules, RuleSort::LastAdded, "nothing like this").is_empty());
    }

    #[test]
    fn test_list_edits() {
        let mut items = vec!['a', 'b', 'c'];
        assert!(move_item(&mut items, 0, 2));
        assert_eq!(items, vec!['b', 'c', 'a']);
        assert!(!move_item(&mut items, 3, 0));

        assert!(duplicate_item(&mut items, 1));
        assert_eq!(items, vec!['b', 'c', 'c', 'a']);
        assert!(!duplicate_item(&mut items, 9));

        assert_eq!(remove_item(&mut items, 0), Some('b'));
        assert_eq!(remove_item(&mut items, 9), None);
        assert_eq!(items, vec!['c', 'c', 'a']);
    }
}
