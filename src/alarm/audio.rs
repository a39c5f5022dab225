//! Audio output device interface.

use std::{fmt, path::PathBuf};

use mockall::automock;

use crate::error::AudioResourceError;

/// Reference to a sound the output can play.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoundRef(pub PathBuf);

impl SoundRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SoundRef(path.into())
    }
}

impl fmt::Display for SoundRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Sounds the alarm rings with: `primary`, or `fallback` when the primary
/// sound is unavailable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlarmSound {
    pub primary: SoundRef,
    pub fallback: Option<SoundRef>,
}

/// Handle of a running looping playback.
///
/// Not `Clone`: a handle is released exactly once, by moving it back into
/// [`AudioOutput::release`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PlaybackHandle(u64);

impl PlaybackHandle {
    pub fn new(id: u64) -> Self {
        PlaybackHandle(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// The device rendering the alarm.
///
/// Calls are expected to complete quickly or fail; there is no timeout.
#[automock]
pub trait AudioOutput: Send + Sync {
    /// Raises the alarm channel to its maximum volume.
    fn set_alarm_volume_max(&self);

    /// Starts playing `sound` in a loop until released.
    ///
    /// # Errors
    ///
    /// - [`AudioResourceError::SoundUnavailable`] if `sound` cannot be opened or decoded
    /// - [`AudioResourceError::DeviceBusy`] if no output device can be opened
    /// - [`AudioResourceError::Device`] for any other device failure
    fn acquire_looping_playback(
        &self,
        sound: &SoundRef,
    ) -> Result<PlaybackHandle, AudioResourceError>;

    /// Stops the playback and frees its resources.
    fn release(&self, handle: PlaybackHandle);
}
