//! Console command parsing.
//!
//! Converts an operator console line into a structured [`Command`].

use command_parser::{Command as ParserCommand, Parser};
use log::debug;

use crate::{
    commands::responses::{format_invalid_source, format_missing_source, format_unknown_command},
    rules::SourceCategory,
};

/// Name every console command starts with, after the `!` prefix.
pub const COMMAND_NAME: &str = "siren";

/// A parsed console command.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Display help information
    Help,
    /// Show the alarm state and the rule
    Status,
    /// Silence the alarm
    Stop,
    /// Save a keyword, trimmed, possibly empty
    Keyword(String),
    /// Protect the keyword from changes
    Lock,
    /// Allow keyword changes again
    Unlock,
    /// Watch notifications of a source
    Enable(SourceCategory),
    /// Ignore notifications of a source
    Disable(SourceCategory),
}

/// Errors that can occur during command parsing.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandParsingError {
    /// The line could not be parsed as a command
    UnableToParse,
    /// The command is not a siren command
    NotSiren,
    /// The subcommand is not recognized
    Unknown,
    /// `enable` or `disable` without a source
    MissingSource,
    /// `enable` or `disable` with an unknown source
    InvalidSource(String),
}

impl Command {
    /// Parses a console line into a Command.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The line is not a command - [`CommandParsingError::UnableToParse`]
    /// - The command is not `!siren` - [`CommandParsingError::NotSiren`]
    /// - The subcommand is not recognized - [`CommandParsingError::Unknown`]
    /// - A source argument is missing or unknown - [`CommandParsingError::MissingSource`],
    ///   [`CommandParsingError::InvalidSource`]
    pub fn parse(parser: &Parser, body: &str) -> Result<Self, CommandParsingError> {
        let body = body.trim();

        // The parser drops the last word, so a dummy word is appended
        let command = match parser.parse(&format!("{} dummy", body)) {
            Ok(cmd) => cmd,
            Err(_) => return Err(CommandParsingError::UnableToParse),
        };

        if command.name != COMMAND_NAME {
            return Err(CommandParsingError::NotSiren);
        }

        debug!("parsing command: {:?}", command);

        let Some(subcommand) = command.arguments.first() else {
            return Ok(Command::Help);
        };

        match subcommand.to_lowercase().as_str() {
            "help" => Ok(Command::Help),
            "status" => Ok(Command::Status),
            "stop" => Ok(Command::Stop),
            "keyword" => Ok(Command::Keyword(Self::parse_keyword(body))),
            "lock" => Ok(Command::Lock),
            "unlock" => Ok(Command::Unlock),
            "enable" => Ok(Command::Enable(Self::parse_source(&command)?)),
            "disable" => Ok(Command::Disable(Self::parse_source(&command)?)),
            _ => Err(CommandParsingError::Unknown),
        }
    }

    /// The text after `keyword`, as typed.
    ///
    /// Taken from the raw line since the parser drops words starting with the
    /// option prefix and collapses spaces.
    fn parse_keyword(body: &str) -> String {
        skip_word(skip_word(body)).trim().to_owned()
    }

    fn parse_source(command: &ParserCommand) -> Result<SourceCategory, CommandParsingError> {
        let Some(source) = command.arguments.get(1) else {
            return Err(CommandParsingError::MissingSource);
        };

        SourceCategory::from_id(source)
            .ok_or_else(|| CommandParsingError::InvalidSource(source.clone()))
    }
}

/// `text` without its first word.
fn skip_word(text: &str) -> &str {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => &text[end..],
        None => "",
    }
}

/// Formats a parsing error into a one-line message for the operator.
///
/// Lines that are not siren commands produce no message.
pub fn format_command_error(error: CommandParsingError) -> Option<String> {
    match error {
        CommandParsingError::Unknown => Some(format_unknown_command()),
        CommandParsingError::MissingSource => Some(format_missing_source()),
        CommandParsingError::InvalidSource(source) => Some(format_invalid_source(&source)),
        CommandParsingError::UnableToParse | CommandParsingError::NotSiren => None,
    }
}
