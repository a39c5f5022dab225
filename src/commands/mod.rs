//! Operator commands: the stop inlet and the console.
//!
//! # Overview
//!
//! Two front-ends can act on the siren besides notifications:
//! - [`CommandInlet`]: the addressable stop command (`STOP_ALARM`)
//! - [`Commander`]: the operator console, reading `!siren` commands
//!
//! # Console pipeline
//!
//! ```text
//! console line
//!      │
//!      ▼
//! Commander::parse() ──> Command
//!      │
//!      ▼
//! Commander::execute(command, context) ──> CommandResult
//!                                           - response (printed)
//!                                           - effect (applied by the siren)
//! ```
//!
//! | Command | Arguments | Description |
//! |---------|-----------|-------------|
//! | `help` | None | Display help information |
//! | `status` | None | Show the alarm state and the rule |
//! | `stop` | None | Silence the alarm through the [`CommandInlet`] |
//! | `keyword` | `<text...>` | Save the keyword and lock it |
//! | `lock`, `unlock` | None | Protect the keyword from changes |
//! | `enable`, `disable` | `<source>` | Watch or ignore a source category |
//!
//! # Error Handling
//!
//! - [`CommandParseError::NotForSiren`]: the line is not a siren command and
//!   gets no response.
//! - [`CommandParseError::InvalidCommand`]: a malformed siren command, with a
//!   message for the operator.

mod actions;
mod command;
mod commander;
mod inlet;
mod responses;

pub use crate::commands::commander::Commander;
pub use crate::commands::inlet::{CommandInlet, STOP_ALARM};

use crate::{
    alarm::AlarmState,
    rules::{RuleConfig, SourceCategory},
};

/// State a command is executed against.
#[derive(Debug)]
pub struct CommandContext {
    /// Alarm state when the command was read
    pub alarm: AlarmState,
    /// Rule settings when the command was read
    pub rule: RuleConfig,
}

/// State change requested by a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    /// Dispatch `STOP_ALARM` to the inlet
    StopAlarm,
    /// Store the keyword and lock it
    SetKeyword(String),
    SetLocked(bool),
    SetSourceEnabled(SourceCategory, bool),
}

/// Result of command execution.
///
/// Command handlers don't directly modify state. The caller applies
/// `effect`, if any, then prints `response`.
#[derive(Debug)]
pub struct CommandResult {
    /// Message for the operator
    pub response: String,
    /// Change to apply
    pub effect: Option<Effect>,
}

/// Errors that can occur during command parsing.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandParseError {
    /// Not a siren command, ignored silently
    NotForSiren,
    /// Malformed siren command with a message for the operator
    InvalidCommand(String),
}
