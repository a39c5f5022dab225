//! Snapshot of the rule settings.

use std::collections::HashMap;

use crate::rules::{ConfigStore, SourceCategory};

/// Immutable view of the rule settings taken for one evaluation.
///
/// A category missing from `source_enabled` is enabled. The `locked` flag only
/// guards keyword edits and plays no part in matching.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleConfig {
    pub keyword: String,
    pub source_enabled: HashMap<SourceCategory, bool>,
    pub locked: bool,
}

impl RuleConfig {
    /// Reads the current settings out of `store`.
    ///
    /// Fields are read one by one; a concurrent write may land between two
    /// reads, which is acceptable since each field stands on its own.
    pub fn snapshot<C: ConfigStore + ?Sized>(store: &C) -> Self {
        let source_enabled = SourceCategory::all()
            .iter()
            .map(|category| (*category, store.is_source_enabled(category.id())))
            .collect();

        RuleConfig {
            keyword: store.get_keyword(),
            source_enabled,
            locked: store.get_locked(),
        }
    }

    #[cfg(test)]
    pub fn with_keyword(keyword: &str) -> Self {
        RuleConfig {
            keyword: keyword.to_owned(),
            ..RuleConfig::default()
        }
    }

    /// Whether notifications of `category` are watched.
    pub fn is_enabled(&self, category: SourceCategory) -> bool {
        self.source_enabled.get(&category).copied().unwrap_or(true)
    }
}
