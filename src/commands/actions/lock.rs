//! Lock and unlock command handler.

use log::debug;

use crate::commands::{CommandContext, CommandResult, Effect, responses::format_lock};

/// Sets the keyword lock to `locked`. No effect when it already is.
pub fn handle_lock(context: &CommandContext, locked: bool) -> CommandResult {
    debug!("handling lock command, locked={}", locked);

    let changed = context.rule.locked != locked;

    CommandResult {
        response: format_lock(locked, changed),
        effect: changed.then_some(Effect::SetLocked(locked)),
    }
}
