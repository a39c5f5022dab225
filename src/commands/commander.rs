//! Command orchestration and execution.
//!
//! The [`Commander`] parses console lines into [`Command`]s and routes them to
//! their handlers.
//!
//! ```text
//! console line → parse() → Command → execute() → CommandResult
//! ```

use command_parser::Parser;

use crate::commands::{
    CommandContext, CommandParseError, CommandResult,
    actions::{
        handle_help, handle_keyword, handle_lock, handle_source, handle_status, handle_stop,
    },
    command::{Command, format_command_error},
};

/// Parses and executes operator console commands.
///
/// All commands start with the `!siren` prefix. Other lines are ignored
/// (returning [`CommandParseError::NotForSiren`]).
pub struct Commander {
    parser: Parser,
}

impl Commander {
    /// Creates a commander recognizing `!` as the command prefix and `-` as
    /// the option prefix.
    pub fn new() -> Self {
        let parser = Parser::new('!', '-');
        Commander { parser }
    }

    /// Parses a console line into a structured command.
    ///
    /// # Errors
    ///
    /// - [`CommandParseError::NotForSiren`] if the line is not a `!siren` command
    /// - [`CommandParseError::InvalidCommand`] with a message for the operator if
    ///   the command is malformed
    pub fn parse(&self, body: &str) -> Result<Command, CommandParseError> {
        Command::parse(&self.parser, body).map_err(|error| match format_command_error(error) {
            Some(message) => CommandParseError::InvalidCommand(message),
            None => CommandParseError::NotForSiren,
        })
    }

    /// Executes a parsed command against `context`.
    pub fn execute(&self, command: &Command, context: &CommandContext) -> CommandResult {
        match command {
            Command::Help => handle_help(),
            Command::Status => handle_status(context),
            Command::Stop => handle_stop(context),
            Command::Keyword(keyword) => handle_keyword(context, keyword),
            Command::Lock => handle_lock(context, true),
            Command::Unlock => handle_lock(context, false),
            Command::Enable(category) => handle_source(context, *category, true),
            Command::Disable(category) => handle_source(context, *category, false),
        }
    }
}

impl Default for Commander {
    fn default() -> Self {
        Self::new()
    }
}
