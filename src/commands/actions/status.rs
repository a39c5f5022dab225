//! Status command handler.

use log::debug;

use crate::commands::{CommandContext, CommandResult, responses::format_status};

/// Describes the alarm state and the rule. Read-only.
pub fn handle_status(context: &CommandContext) -> CommandResult {
    debug!("handling status command");

    CommandResult {
        response: format_status(context.alarm, &context.rule),
        effect: None,
    }
}
