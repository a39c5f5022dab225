//! Error taxonomy for the siren.
//!
//! None of these errors is fatal to the process: settings read failures fall
//! back to defaults, audio failures leave the alarm idle, and invalid commands
//! are ignored. They exist so the boundary that absorbs them can log them with
//! a precise cause.

use thiserror::Error;

/// The rule settings could not be read back from disk.
///
/// Recovered by starting from [`crate::rules::StoredSettings::default`].
#[derive(Debug, Error)]
pub enum ConfigReadError {
    #[error("settings file {path} is unreachable: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The audio output refused to start a looping playback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioResourceError {
    #[error("audio device is busy: {0}")]
    DeviceBusy(String),

    #[error("alarm sound {0} is unavailable")]
    SoundUnavailable(String),

    #[error("audio device failure: {0}")]
    Device(String),
}

/// Errors surfaced at the boundary of the alarm state machine.
#[derive(Debug, Error)]
pub enum AlarmError {
    #[error(transparent)]
    Audio(#[from] AudioResourceError),

    #[error("invalid command: {0}")]
    InvalidCommand(String),
}
