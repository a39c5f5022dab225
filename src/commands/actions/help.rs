//! Help command handler.

use log::debug;

use crate::commands::{CommandResult, responses::format_help};

/// Returns the help message. Read-only.
pub fn handle_help() -> CommandResult {
    debug!("handling help command");

    CommandResult {
        response: format_help(),
        effect: None,
    }
}
