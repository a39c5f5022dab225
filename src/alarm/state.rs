//! Alarm state and the status announcements derived from it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the topic carrying [`StatusEvent`]s.
pub const ALARM_STATUS_CHANGED: &str = "ALARM_STATUS_CHANGED";

/// Lifecycle of the alarm. Starts [`AlarmState::Idle`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlarmState {
    #[default]
    Idle,
    Playing,
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlarmState::Idle => write!(f, "idle"),
            AlarmState::Playing => write!(f, "ringing"),
        }
    }
}

/// Announcement of a committed alarm transition.
///
/// Consumers must treat it as a level (the alarm is ringing or not), not as a
/// log of edges: delivery of every single event is not guaranteed.
///
/// Serializes as `{"IS_PLAYING": true}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    #[serde(rename = "IS_PLAYING")]
    pub is_playing: bool,
}

impl StatusEvent {
    pub fn playing() -> Self {
        StatusEvent { is_playing: true }
    }

    pub fn stopped() -> Self {
        StatusEvent { is_playing: false }
    }

    pub fn state(&self) -> AlarmState {
        if self.is_playing {
            AlarmState::Playing
        } else {
            AlarmState::Idle
        }
    }
}
