//! Stop command handler.

use log::debug;

use crate::{
    alarm::AlarmState,
    commands::{
        CommandContext, CommandResult, Effect,
        responses::{format_not_ringing, format_stopping},
    },
};

/// Requests the alarm to stop.
///
/// The stop is requested even when the context shows an idle alarm: the
/// context is a snapshot and stopping an idle alarm does nothing.
pub fn handle_stop(context: &CommandContext) -> CommandResult {
    debug!("handling stop command");

    let response = match context.alarm {
        AlarmState::Playing => format_stopping(),
        AlarmState::Idle => format_not_ringing(),
    };

    CommandResult {
        response,
        effect: Some(Effect::StopAlarm),
    }
}
