//! Keyword command handler.

use log::debug;

use crate::commands::{
    CommandContext, CommandResult, Effect,
    responses::{format_keyword_locked, format_keyword_saved},
};

/// Saves `keyword`, which locks it, unless the keyword is already locked.
pub fn handle_keyword(context: &CommandContext, keyword: &str) -> CommandResult {
    debug!("handling keyword command");

    if context.rule.locked {
        debug!("keyword is locked, refusing {:?}", keyword);
        return CommandResult {
            response: format_keyword_locked(),
            effect: None,
        };
    }

    let keyword = keyword.trim();

    CommandResult {
        response: format_keyword_saved(keyword),
        effect: Some(Effect::SetKeyword(keyword.to_owned())),
    }
}
