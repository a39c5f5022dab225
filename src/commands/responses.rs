//! Plain-text responses printed by the operator console.

use crate::{
    alarm::AlarmState,
    rules::{RuleConfig, SourceCategory},
};

/// Formats the help message listing the console commands.
pub fn format_help() -> String {
    "Commands:\n\
    - `status`: show the alarm state and the rule\n\
    - `stop`: silence the alarm\n\
    - `keyword <text>`: set the keyword and lock it\n\
    - `lock` / `unlock`: protect the keyword from changes\n\
    - `enable <source>` / `disable <source>`: watch or ignore telegram or whatsapp\n\
    - `help`: show this help message\n\n\
    The alarm rings when a notification of an enabled source has the keyword in its title, \
    ignoring case, until it is stopped."
        .to_owned()
}

pub fn format_unknown_command() -> String {
    "Unknown command. Type `!siren help` for more information.".to_owned()
}

pub fn format_missing_source() -> String {
    "Missing source. Usage: `!siren enable <source>` or `!siren disable <source>`".to_owned()
}

pub fn format_invalid_source(source: &str) -> String {
    let known = SourceCategory::all()
        .iter()
        .map(|category| category.id())
        .collect::<Vec<_>>()
        .join(", ");

    format!("Unknown source '{}'. Known sources: {}.", source, known)
}

/// Formats the alarm state followed by a summary of the rule.
pub fn format_status(alarm: AlarmState, rule: &RuleConfig) -> String {
    let keyword = if rule.keyword.is_empty() {
        "not set".to_owned()
    } else {
        format!("'{}'", rule.keyword)
    };
    let lock = if rule.locked { "locked" } else { "unlocked" };

    let sources = SourceCategory::all()
        .iter()
        .map(|category| {
            let watched = if rule.is_enabled(*category) {
                "on"
            } else {
                "off"
            };
            format!("- {}: {}", category, watched)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Alarm: {}\nKeyword: {} ({})\nSources:\n{}",
        alarm, keyword, lock, sources
    )
}

pub fn format_stopping() -> String {
    "Stopping the alarm.".to_owned()
}

pub fn format_not_ringing() -> String {
    "The alarm is not ringing.".to_owned()
}

pub fn format_keyword_saved(keyword: &str) -> String {
    if keyword.is_empty() {
        "Keyword cleared and locked. The alarm will not ring until a keyword is set.".to_owned()
    } else {
        format!("Keyword set to '{}' and locked.", keyword)
    }
}

pub fn format_keyword_locked() -> String {
    "The keyword is locked. Type `!siren unlock` to change it.".to_owned()
}

pub fn format_lock(locked: bool, changed: bool) -> String {
    match (locked, changed) {
        (true, true) => "Keyword locked.".to_owned(),
        (true, false) => "The keyword is already locked.".to_owned(),
        (false, true) => "Keyword unlocked.".to_owned(),
        (false, false) => "The keyword is already unlocked.".to_owned(),
    }
}

pub fn format_source(category: SourceCategory, enabled: bool) -> String {
    if enabled {
        format!("{} notifications are watched.", category)
    } else {
        format!("{} notifications are ignored.", category)
    }
}
