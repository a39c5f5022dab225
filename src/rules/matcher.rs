//! Matching decision for incoming notifications.

use std::sync::Arc;

use log::{debug, info};

use crate::{
    notifications::NotificationEvent,
    rules::{ConfigStore, RuleConfig, SourceCategory},
};

/// Decides whether `event` should fire the alarm under `config`.
///
/// The event must come from an enabled [`SourceCategory`] and its title must
/// contain the keyword, both compared case-insensitively. An empty keyword
/// means the rule is not configured and never matches.
///
/// Matching is a plain substring test, not a whole-word one: the keyword
/// `Ann` matches a notification titled `Annual Meeting`.
pub fn matches(event: &NotificationEvent, config: &RuleConfig) -> bool {
    let from_enabled_source = SourceCategory::all()
        .iter()
        .any(|category| config.is_enabled(*category) && category.recognizes(&event.source_id));

    if !from_enabled_source {
        return false;
    }

    !config.keyword.is_empty() && contains_ignore_case(&event.title, &config.keyword)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Evaluates events against the settings currently held by a [`ConfigStore`].
///
/// A fresh [`RuleConfig`] snapshot is taken for every event, so a settings
/// write is seen by the next evaluation.
pub struct RuleMatcher<C: ConfigStore + ?Sized> {
    store: Arc<C>,
}

impl<C: ConfigStore + ?Sized> RuleMatcher<C> {
    pub fn new(store: Arc<C>) -> Self {
        RuleMatcher { store }
    }

    pub fn evaluate(&self, event: &NotificationEvent) -> bool {
        let config = RuleConfig::snapshot(self.store.as_ref());
        let matched = matches(event, &config);

        if matched {
            info!(
                "notification from {} matched keyword {:?}",
                event.source_id, config.keyword
            );
        } else {
            debug!("notification from {} did not match", event.source_id);
        }

        matched
    }
}
