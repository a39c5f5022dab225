//! Enable and disable command handler.

use log::debug;

use crate::{
    commands::{CommandContext, CommandResult, Effect, responses::format_source},
    rules::SourceCategory,
};

/// Watches or ignores the notifications of `category`.
///
/// The keyword lock does not apply to sources.
pub fn handle_source(
    context: &CommandContext,
    category: SourceCategory,
    enabled: bool,
) -> CommandResult {
    debug!(
        "handling source command, {} enabled={} (was {})",
        category,
        enabled,
        context.rule.is_enabled(category)
    );

    CommandResult {
        response: format_source(category, enabled),
        effect: Some(Effect::SetSourceEnabled(category, enabled)),
    }
}
