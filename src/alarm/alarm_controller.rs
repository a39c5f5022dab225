//! Alarm controller owning the Idle/Playing state machine.
//!
//! This module provides the [`AlarmController`] which serializes every alarm
//! transition behind a single lock, so that notifications arriving on the
//! event source task and stop requests arriving from the operator can never
//! interleave while the audio output is being acquired or released.

use log::{debug, error, info, warn};
use tokio::{
    runtime::{Handle, RuntimeFlavor},
    sync::Mutex,
    task,
};

use crate::{
    alarm::{
        AlarmSound, AlarmState, AudioOutput, PlaybackHandle, StatusEvent, StatusSink,
    },
    error::{AlarmError, AudioResourceError},
};

/// State guarded by the controller lock.
#[derive(Default)]
struct Playback {
    /// Handle of the running playback, `None` while idle
    handle: Option<PlaybackHandle>,
    /// Set by [`AlarmController::shutdown`], refuses any later trigger
    closed: bool,
}

/// Drives an audio output into a persistent alarm until explicitly stopped.
///
/// # State
///
/// The controller holds an `Option<PlaybackHandle>`: the alarm is
/// [`AlarmState::Playing`] exactly when a handle is held, so a handle can
/// neither leak while idle nor be missing while ringing.
///
/// # Thread Safety
///
/// [`AlarmController::trigger`], [`AlarmController::stop`] and
/// [`AlarmController::shutdown`] each run their whole check-then-act sequence
/// (state read, audio call, status publication) while holding the lock. They
/// can be called from any task, any number of times, concurrently.
///
/// Audio calls may block. On a multi-threaded runtime they run through
/// [`task::block_in_place`] so the other tasks of the worker keep running.
///
/// # Examples
///
/// ```no_run
/// let controller = AlarmController::new(BellOutput::new(), StatusChannel::new(16), sound);
///
/// controller.trigger().await?; // Idle -> Playing, publishes {IS_PLAYING: true}
/// controller.trigger().await?; // already playing, nothing happens
/// controller.stop().await;     // Playing -> Idle, publishes {IS_PLAYING: false}
/// ```
pub struct AlarmController<A: AudioOutput, S: StatusSink> {
    playback: Mutex<Playback>,
    /// Device rendering the alarm
    audio: A,
    /// Where transitions are announced
    status: S,
    /// Sounds to ring with
    sound: AlarmSound,
}

impl<A: AudioOutput, S: StatusSink> AlarmController<A, S> {
    /// Creates an idle controller.
    pub fn new(audio: A, status: S, sound: AlarmSound) -> Self {
        AlarmController {
            playback: Mutex::new(Playback::default()),
            audio,
            status,
            sound,
        }
    }

    /// Current state of the alarm.
    pub async fn state(&self) -> AlarmState {
        if self.playback.lock().await.handle.is_some() {
            AlarmState::Playing
        } else {
            AlarmState::Idle
        }
    }

    /// Starts the alarm if it is idle.
    ///
    /// From idle, raises the alarm volume to the maximum, acquires a looping
    /// playback of the primary sound (or of the fallback sound when the primary
    /// is unavailable), then publishes `{IS_PLAYING: true}`. While already
    /// playing, or once shut down, does nothing at all.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The alarm went from idle to playing
    /// * `Ok(false)` - The alarm was already playing or is shut down
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::Audio`] when no playback could be acquired. The
    /// alarm stays idle and nothing is published, so observers cannot tell a
    /// failed trigger from a notification that did not match. The failure is
    /// logged here; callers are free to ignore it.
    pub async fn trigger(&self) -> Result<bool, AlarmError> {
        let mut playback = self.playback.lock().await;

        if playback.closed {
            debug!("alarm shut down, ignoring trigger");
            return Ok(false);
        }

        if playback.handle.is_some() {
            debug!("alarm already ringing, ignoring trigger");
            return Ok(false);
        }

        self.audio.set_alarm_volume_max();

        let handle = match run_blocking(|| self.acquire()) {
            Ok(handle) => handle,
            Err(e) => {
                error!("failed to start alarm: {}", e);
                return Err(e.into());
            }
        };

        playback.handle = Some(handle);
        self.status.publish(StatusEvent::playing());
        info!("alarm ringing");

        Ok(true)
    }

    /// Stops the alarm if it is playing.
    ///
    /// From playing, releases the playback and publishes `{IS_PLAYING: false}`.
    /// While idle, does nothing at all. Always accepted.
    ///
    /// # Returns
    ///
    /// `true` if this call released the playback.
    pub async fn stop(&self) -> bool {
        let mut playback = self.playback.lock().await;
        self.release(&mut playback)
    }

    /// Releases any playback ahead of process teardown.
    ///
    /// Triggers still in flight afterwards are ignored.
    pub async fn shutdown(&self) {
        let mut playback = self.playback.lock().await;
        playback.closed = true;

        if self.release(&mut playback) {
            info!("released alarm playback on shutdown");
        }
    }

    fn release(&self, playback: &mut Playback) -> bool {
        let Some(handle) = playback.handle.take() else {
            debug!("alarm not ringing, ignoring stop");
            return false;
        };

        run_blocking(|| self.audio.release(handle));
        self.status.publish(StatusEvent::stopped());
        info!("alarm stopped");

        true
    }

    fn acquire(&self) -> Result<PlaybackHandle, AudioResourceError> {
        match self.audio.acquire_looping_playback(&self.sound.primary) {
            Err(AudioResourceError::SoundUnavailable(sound)) => match &self.sound.fallback {
                Some(fallback) => {
                    warn!(
                        "alarm sound {} is unavailable, falling back to {}",
                        sound, fallback
                    );
                    self.audio.acquire_looping_playback(fallback)
                }
                None => Err(AudioResourceError::SoundUnavailable(sound)),
            },
            result => result,
        }
    }
}

/// Runs a blocking audio call, moving the other tasks of the worker away when
/// the runtime allows it.
fn run_blocking<R>(f: impl FnOnce() -> R) -> R {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            task::block_in_place(f)
        }
        _ => f(),
    }
}

impl<A: AudioOutput, S: StatusSink> Drop for AlarmController<A, S> {
    fn drop(&mut self) {
        if let Some(handle) = self.playback.get_mut().handle.take() {
            warn!("alarm controller dropped while ringing, releasing playback");
            self.audio.release(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
        thread,
        time::Duration,
    };

    use futures::future::join_all;
    use mockall::predicate::eq;

    use super::*;
    use crate::alarm::{
        SoundRef, StatusChannel, audio::MockAudioOutput, status::MockStatusSink,
    };

    fn sound(fallback: bool) -> AlarmSound {
        AlarmSound {
            primary: SoundRef::new("/sounds/alarm.ogg"),
            fallback: fallback.then(|| SoundRef::new("/sounds/ringtone.ogg")),
        }
    }

    /// Audio output expecting exactly one acquisition and one release.
    fn audio_playing_once() -> MockAudioOutput {
        let mut audio = MockAudioOutput::new();
        audio.expect_set_alarm_volume_max().times(1).return_const(());
        audio
            .expect_acquire_looping_playback()
            .with(eq(SoundRef::new("/sounds/alarm.ogg")))
            .times(1)
            .returning(|_| Ok(PlaybackHandle::new(7)));
        audio
            .expect_release()
            .with(eq(PlaybackHandle::new(7)))
            .times(1)
            .return_const(());
        audio
    }

    fn status_expecting(playing: usize, stopped: usize) -> MockStatusSink {
        let mut status = MockStatusSink::new();
        status
            .expect_publish()
            .with(eq(StatusEvent::playing()))
            .times(playing)
            .return_const(());
        status
            .expect_publish()
            .with(eq(StatusEvent::stopped()))
            .times(stopped)
            .return_const(());
        status
    }

    #[tokio::test]
    async fn test_new_controller_is_idle() {
        let controller =
            AlarmController::new(MockAudioOutput::new(), MockStatusSink::new(), sound(false));

        assert_eq!(controller.state().await, AlarmState::Idle);
    }

    #[tokio::test]
    async fn test_trigger_from_idle_starts_playing() {
        let controller =
            AlarmController::new(audio_playing_once(), status_expecting(1, 1), sound(false));

        assert!(controller.trigger().await.unwrap());
        assert_eq!(controller.state().await, AlarmState::Playing);

        assert!(controller.stop().await);
    }

    #[tokio::test]
    async fn test_trigger_twice_acquires_once() {
        let controller =
            AlarmController::new(audio_playing_once(), status_expecting(1, 1), sound(false));

        assert!(controller.trigger().await.unwrap());
        assert!(!controller.trigger().await.unwrap());
        assert_eq!(controller.state().await, AlarmState::Playing);

        controller.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_triggers_acquire_once() {
        let controller = Arc::new(AlarmController::new(
            audio_playing_once(),
            status_expecting(1, 1),
            sound(false),
        ));

        let triggers = (0..16).map(|_| {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.trigger().await.unwrap() })
        });
        let started = join_all(triggers)
            .await
            .into_iter()
            .filter(|result| *result.as_ref().unwrap())
            .count();

        assert_eq!(started, 1);
        controller.stop().await;
    }

    #[tokio::test]
    async fn test_stop_while_idle_is_noop() {
        let mut audio = MockAudioOutput::new();
        audio.expect_release().never();
        audio.expect_acquire_looping_playback().never();
        let mut status = MockStatusSink::new();
        status.expect_publish().never();

        let controller = AlarmController::new(audio, status, sound(false));

        assert!(!controller.stop().await);
        assert_eq!(controller.state().await, AlarmState::Idle);
    }

    #[tokio::test]
    async fn test_second_stop_is_noop() {
        let controller =
            AlarmController::new(audio_playing_once(), status_expecting(1, 1), sound(false));

        controller.trigger().await.unwrap();

        assert!(controller.stop().await);
        assert!(!controller.stop().await);
        assert_eq!(controller.state().await, AlarmState::Idle);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_stops_release_once() {
        let controller = Arc::new(AlarmController::new(
            audio_playing_once(),
            status_expecting(1, 1),
            sound(false),
        ));
        controller.trigger().await.unwrap();

        let stops = (0..16).map(|_| {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.stop().await })
        });
        let released = join_all(stops)
            .await
            .into_iter()
            .filter(|result| *result.as_ref().unwrap())
            .count();

        assert_eq!(released, 1);
        assert_eq!(controller.state().await, AlarmState::Idle);
    }

    #[tokio::test]
    async fn test_trigger_after_stop_rings_again() {
        let mut audio = MockAudioOutput::new();
        audio.expect_set_alarm_volume_max().times(2).return_const(());
        let mut next_id = 0;
        audio
            .expect_acquire_looping_playback()
            .times(2)
            .returning(move |_| {
                next_id += 1;
                Ok(PlaybackHandle::new(next_id))
            });
        audio.expect_release().times(2).return_const(());

        let controller = AlarmController::new(audio, status_expecting(2, 2), sound(false));

        for _ in 0..2 {
            assert!(controller.trigger().await.unwrap());
            assert!(controller.stop().await);
        }
    }

    #[tokio::test]
    async fn test_failed_acquisition_stays_idle_silently() {
        let mut audio = MockAudioOutput::new();
        audio.expect_set_alarm_volume_max().times(1).return_const(());
        audio
            .expect_acquire_looping_playback()
            .times(1)
            .returning(|_| Err(AudioResourceError::DeviceBusy("in use".to_owned())));
        audio.expect_release().never();
        let mut status = MockStatusSink::new();
        status.expect_publish().never();

        let controller = AlarmController::new(audio, status, sound(true));

        let result = controller.trigger().await;

        assert!(matches!(
            result,
            Err(AlarmError::Audio(AudioResourceError::DeviceBusy(_)))
        ));
        assert_eq!(controller.state().await, AlarmState::Idle);
    }

    #[tokio::test]
    async fn test_unavailable_primary_falls_back() {
        let mut audio = MockAudioOutput::new();
        audio.expect_set_alarm_volume_max().times(1).return_const(());
        audio
            .expect_acquire_looping_playback()
            .with(eq(SoundRef::new("/sounds/alarm.ogg")))
            .times(1)
            .returning(|sound| Err(AudioResourceError::SoundUnavailable(sound.to_string())));
        audio
            .expect_acquire_looping_playback()
            .with(eq(SoundRef::new("/sounds/ringtone.ogg")))
            .times(1)
            .returning(|_| Ok(PlaybackHandle::new(3)));
        audio
            .expect_release()
            .with(eq(PlaybackHandle::new(3)))
            .times(1)
            .return_const(());

        let controller = AlarmController::new(audio, status_expecting(1, 1), sound(true));

        assert!(controller.trigger().await.unwrap());
        controller.stop().await;
    }

    #[tokio::test]
    async fn test_unavailable_primary_without_fallback_fails() {
        let mut audio = MockAudioOutput::new();
        audio.expect_set_alarm_volume_max().times(1).return_const(());
        audio
            .expect_acquire_looping_playback()
            .times(1)
            .returning(|sound| Err(AudioResourceError::SoundUnavailable(sound.to_string())));
        let mut status = MockStatusSink::new();
        status.expect_publish().never();

        let controller = AlarmController::new(audio, status, sound(false));

        assert!(controller.trigger().await.is_err());
        assert_eq!(controller.state().await, AlarmState::Idle);
    }

    #[tokio::test]
    async fn test_shutdown_releases_playback() {
        let controller =
            AlarmController::new(audio_playing_once(), status_expecting(1, 1), sound(false));
        controller.trigger().await.unwrap();

        controller.shutdown().await;

        assert_eq!(controller.state().await, AlarmState::Idle);
    }

    #[tokio::test]
    async fn test_drop_while_playing_releases_playback() {
        let controller =
            AlarmController::new(audio_playing_once(), status_expecting(1, 0), sound(false));
        controller.trigger().await.unwrap();

        // The release expectation is checked when the mock is dropped with the controller
        drop(controller);
    }

    #[tokio::test]
    async fn test_transitions_reach_status_channel() {
        let channel = StatusChannel::new(8);
        let mut subscription = channel.subscribe();
        let controller = AlarmController::new(audio_playing_once(), channel, sound(false));

        controller.trigger().await.unwrap();
        controller.trigger().await.unwrap();
        controller.stop().await;
        controller.stop().await;

        assert_eq!(subscription.next().await, Some(StatusEvent::playing()));
        assert_eq!(subscription.next().await, Some(StatusEvent::stopped()));
    }

    #[tokio::test]
    async fn test_trigger_after_shutdown_is_ignored() {
        let mut audio = MockAudioOutput::new();
        audio.expect_set_alarm_volume_max().never();
        audio.expect_acquire_looping_playback().never();
        let mut status = MockStatusSink::new();
        status.expect_publish().never();

        let controller = AlarmController::new(audio, status, sound(false));
        controller.shutdown().await;

        assert!(!controller.trigger().await.unwrap());
        assert_eq!(controller.state().await, AlarmState::Idle);
    }

    #[tokio::test]
    async fn test_shutdown_while_playing_then_trigger_stays_idle() {
        let controller =
            AlarmController::new(audio_playing_once(), status_expecting(1, 1), sound(false));
        controller.trigger().await.unwrap();

        controller.shutdown().await;

        assert!(!controller.trigger().await.unwrap());
        assert_eq!(controller.state().await, AlarmState::Idle);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_triggers_and_stops_stay_consistent() {
        let acquired = Arc::new(AtomicU64::new(0));
        let released = Arc::new(AtomicU64::new(0));

        let mut audio = MockAudioOutput::new();
        audio.expect_set_alarm_volume_max().return_const(());
        let acquired_clone = Arc::clone(&acquired);
        audio.expect_acquire_looping_playback().returning(move |_| {
            let id = acquired_clone.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(PlaybackHandle::new(id))
        });
        let released_clone = Arc::clone(&released);
        audio.expect_release().returning(move |_| {
            released_clone.fetch_add(1, Ordering::SeqCst);
        });

        let channel = StatusChannel::new(64);
        let mut subscription = channel.subscribe();
        let controller = Arc::new(AlarmController::new(audio, channel, sound(false)));

        let calls = (0..32).map(|i| {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move {
                if i % 2 == 0 {
                    controller.trigger().await.unwrap();
                } else {
                    controller.stop().await;
                }
            })
        });
        for result in join_all(calls).await {
            result.unwrap();
        }

        let acquired = acquired.load(Ordering::SeqCst);
        let released = released.load(Ordering::SeqCst);
        match controller.state().await {
            AlarmState::Playing => assert_eq!(acquired, released + 1),
            AlarmState::Idle => assert_eq!(acquired, released),
        }

        // Every event is a transition: playing and stopped alternate
        for i in 0..acquired + released {
            let expected = if i % 2 == 0 {
                StatusEvent::playing()
            } else {
                StatusEvent::stopped()
            };
            assert_eq!(subscription.next().await, Some(expected));
        }

        controller.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_slow_acquisition_does_not_stall_other_tasks() {
        let mut audio = MockAudioOutput::new();
        audio.expect_set_alarm_volume_max().return_const(());
        audio.expect_acquire_looping_playback().returning(|_| {
            thread::sleep(Duration::from_millis(300));
            Ok(PlaybackHandle::new(7))
        });
        audio.expect_release().times(1).return_const(());
        let controller = Arc::new(AlarmController::new(
            audio,
            status_expecting(1, 1),
            sound(false),
        ));

        let trigger = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.trigger().await.unwrap() })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let other = tokio::spawn(async { 42 });
        let result = tokio::time::timeout(Duration::from_millis(150), other).await;
        assert_eq!(result.unwrap().unwrap(), 42);

        assert!(trigger.await.unwrap());
        controller.stop().await;
    }
}
