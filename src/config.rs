//! Configuration file structures for the siren.
//!
//! The configuration is a YAML file with two sections: the alarm output and the
//! notification event stream. Any value can be overridden by an environment
//! variable prefixed with `NOTIFSIREN_`, nested keys being separated by `__`.
//!
//! # Configuration File Format
//!
//! ```yaml
//! alarm:
//!   # Sound rung by the alarm
//!   sound: "/usr/share/sounds/notifsiren/alarm.ogg"
//!   # Sound rung when the first one is unavailable (optional)
//!   fallback_sound: "/usr/share/sounds/freedesktop/stereo/alarm-clock-elapsed.oga"
//!   # `bell` (terminal bell) or `playback` (sound files, `playback` feature)
//!   output: playback
//!
//! events:
//!   # Newline-delimited JSON notifications, `-` for the standard input
//!   path: "/run/notifsiren/events"
//!   # Keep reading once the end of the stream is reached
//!   follow: true
//!   poll_interval_ms: 250
//! ```
//!
//! ```bash
//! export NOTIFSIREN_EVENTS__PATH="-"
//! export NOTIFSIREN_ALARM__OUTPUT="bell"
//! ```

use std::{path::PathBuf, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

use crate::{
    alarm::{AlarmSound, SoundRef},
    notifications::STDIN_PATH,
};

/// Prefix of the environment variables overriding the configuration file.
pub const ENV_PREFIX: &str = "NOTIFSIREN_";

const DEFAULT_SOUND: &str = "alarm.ogg";
const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Root configuration structure.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub alarm: AlarmConfig,
    pub events: EventsConfig,
}

impl Config {
    /// Loads the configuration from the YAML file at `path`, then applies the
    /// `NOTIFSIREN_` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed, or if `events.path` is
    /// set nowhere.
    pub fn load(path: &str) -> Result<Config, figment::Error> {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }
}

/// Device the alarm rings on.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Terminal bell, always available
    #[default]
    Bell,
    /// Sound files on the default audio device
    Playback,
}

/// Alarm output configuration.
#[derive(Debug, Deserialize)]
pub struct AlarmConfig {
    /// Sound rung by the alarm.
    #[serde(default = "default_sound")]
    pub sound: PathBuf,

    /// Sound rung when `sound` is unavailable.
    #[serde(default)]
    pub fallback_sound: Option<PathBuf>,

    #[serde(default)]
    pub output: OutputKind,
}

impl AlarmConfig {
    pub fn alarm_sound(&self) -> AlarmSound {
        AlarmSound {
            primary: SoundRef::new(&self.sound),
            fallback: self.fallback_sound.as_ref().map(SoundRef::new),
        }
    }
}

impl Default for AlarmConfig {
    fn default() -> Self {
        AlarmConfig {
            sound: default_sound(),
            fallback_sound: None,
            output: OutputKind::default(),
        }
    }
}

/// Notification stream configuration.
#[derive(Debug, Deserialize)]
pub struct EventsConfig {
    /// Path of the newline-delimited JSON stream, [`STDIN_PATH`] for the
    /// standard input.
    pub path: String,

    /// Whether to wait for more events at the end of the stream.
    #[serde(default = "default_follow")]
    pub follow: bool,

    /// Delay between two reads of a followed stream with no new event.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl EventsConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Whether notifications are read from the standard input, which then
    /// cannot serve the operator console.
    pub fn reads_stdin(&self) -> bool {
        self.path == STDIN_PATH
    }
}

fn default_sound() -> PathBuf {
    PathBuf::from(DEFAULT_SOUND)
}

fn default_follow() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}
