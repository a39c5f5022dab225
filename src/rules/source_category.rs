//! Source categories recognized by the rule.

use std::fmt;

/// An application family whose notifications can fire the alarm.
///
/// Source identifiers differ between builds and variants of the same
/// application (`org.telegram.messenger`, `org.telegram.messenger.web`, ...),
/// so a category is recognized by a case-insensitive substring of the source
/// identifier rather than by an exact identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceCategory {
    Telegram,
    WhatsApp,
}

impl SourceCategory {
    /// All recognized categories, in display order.
    pub fn all() -> &'static [SourceCategory] {
        &[SourceCategory::Telegram, SourceCategory::WhatsApp]
    }

    /// Identifier used by the settings store and the console.
    pub fn id(&self) -> &'static str {
        match self {
            SourceCategory::Telegram => "telegram",
            SourceCategory::WhatsApp => "whatsapp",
        }
    }

    /// Looks a category up by its identifier, ignoring case.
    pub fn from_id(id: &str) -> Option<SourceCategory> {
        Self::all()
            .iter()
            .copied()
            .find(|category| category.id().eq_ignore_ascii_case(id.trim()))
    }

    /// Whether `source_id` belongs to this category.
    pub fn recognizes(&self, source_id: &str) -> bool {
        source_id.to_lowercase().contains(self.id())
    }
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceCategory::Telegram => write!(f, "Telegram"),
            SourceCategory::WhatsApp => write!(f, "WhatsApp"),
        }
    }
}
