//! Incoming notifications and the source that delivers them.
//!
//! - [`NotificationEvent`]: one notification posted by another application
//! - [`EventSource`]: the subscription interface the siren registers its callback with
//! - [`JsonLinesSource`]: an [`EventSource`] reading newline-delimited JSON events

mod event;
mod source;

pub use crate::notifications::event::NotificationEvent;
pub use crate::notifications::source::{EventSource, JsonLinesSource, STDIN_PATH};
