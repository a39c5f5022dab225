//! Alarm state machine and the outputs it drives.
//!
//! The [`AlarmController`] is the only stateful part of the siren. It owns the
//! Idle/Playing state together with the playback handle of the audio output,
//! and announces every committed transition on a [`StatusSink`].
//!
//! # Architecture
//!
//! ```text
//! trigger() ─┐                       ┌─> AudioOutput (volume, acquire, release)
//!            ├─> AlarmController ────┤
//! stop() ────┘   (one async mutex)   └─> StatusSink  (ALARM_STATUS_CHANGED)
//! ```
//!
//! - [`state`]: [`AlarmState`] and [`StatusEvent`]
//! - [`audio`]: the [`AudioOutput`] device interface
//! - [`bell`]: an [`AudioOutput`] ringing the terminal bell
//! - `playback`: an [`AudioOutput`] playing sound files (feature `playback`)
//! - [`status`]: the [`StatusChannel`] broadcast topic

mod alarm_controller;
pub mod audio;
pub mod bell;
#[cfg(feature = "playback")]
pub mod playback;
pub mod state;
pub mod status;

pub use crate::alarm::alarm_controller::AlarmController;
pub use crate::alarm::audio::{AlarmSound, AudioOutput, PlaybackHandle, SoundRef};
pub use crate::alarm::state::{ALARM_STATUS_CHANGED, AlarmState, StatusEvent};
pub use crate::alarm::status::{StatusChannel, StatusSink, StatusSubscription};
