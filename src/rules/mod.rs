//! Keyword rule evaluation and the settings it reads.
//!
//! The rule is deliberately small: a notification fires the alarm when it comes
//! from an enabled source category and its title contains the configured keyword.
//!
//! - [`SourceCategory`]: the applications whose notifications are watched
//! - [`RuleConfig`]: immutable snapshot of the rule settings
//! - [`RuleMatcher`]: the matching decision
//! - [`ConfigStore`] / [`FileConfigStore`]: where the settings live
//! - [`SettingsLoader`]: JSON persistence of the settings

mod matcher;
mod rule_config;
mod settings_loader;
mod source_category;
mod store;

pub use crate::rules::matcher::RuleMatcher;
pub use crate::rules::rule_config::RuleConfig;
pub use crate::rules::settings_loader::{SettingsLoader, StoredSettings};
pub use crate::rules::source_category::SourceCategory;
#[cfg(test)]
pub use crate::rules::store::MockConfigStore;
pub use crate::rules::store::{ConfigStore, FileConfigStore};
