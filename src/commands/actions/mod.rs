//! Command action handlers.
//!
//! Each handler receives a [`CommandContext`](crate::commands::CommandContext)
//! and returns a [`CommandResult`](crate::commands::CommandResult).
//!
//! Handlers don't modify state directly. They return the change to apply as an
//! [`Effect`](crate::commands::Effect) and the siren applies it.
//!
//! - [`handle_help`] - Display help information
//! - [`handle_status`] - Show the alarm state and the rule
//! - [`handle_stop`] - Silence the alarm
//! - [`handle_keyword`] - Save the keyword unless it is locked
//! - [`handle_lock`] - Lock or unlock the keyword
//! - [`handle_source`] - Enable or disable a source category

mod help;
mod keyword;
mod lock;
mod source;
mod status;
mod stop;

pub use crate::commands::actions::{
    help::handle_help, keyword::handle_keyword, lock::handle_lock, source::handle_source,
    status::handle_status, stop::handle_stop,
};
