//! Process wiring of the siren.
//!
//! The [`Siren`] builds every component from the configuration and runs the
//! concurrent tasks of the process:
//!
//! 1. **Event task**: reads notifications and, for each one, spawns the rule
//!    evaluation and the alarm trigger
//! 2. **Console task**: reads `!siren` commands on the standard input, unless
//!    the standard input carries the notifications
//! 3. **Status task**: prints every alarm status change
//! 4. **Persistence task**: writes the rule settings to disk after each change
//!
//! Every task runs until Ctrl-C, which releases the alarm and flushes the
//! settings.

use std::{
    io::{self, BufRead},
    path::Path,
    sync::Arc,
    thread,
};

use anyhow::Context;
use log::{debug, error, info, warn};
use tokio::{io::AsyncRead, sync::mpsc, task::JoinHandle};

use crate::{
    alarm::{
        ALARM_STATUS_CHANGED, AlarmController, AudioOutput, PlaybackHandle, SoundRef,
        StatusChannel, StatusSubscription, bell::BellOutput,
    },
    commands::{
        CommandContext, CommandInlet, CommandParseError, Commander, Effect, STOP_ALARM,
    },
    config::{Config, EventsConfig, OutputKind},
    error::AudioResourceError,
    notifications::{EventSource, JsonLinesSource, NotificationEvent},
    rules::{ConfigStore, FileConfigStore, RuleConfig, RuleMatcher},
};

/// Name of the rule settings file in the data directory.
const SETTINGS_FILE: &str = "settings.json";

/// Number of status events a slow observer may fall behind.
const STATUS_CAPACITY: usize = 16;

/// Console lines waiting to be executed.
const CONSOLE_CAPACITY: usize = 32;

/// Audio output selected by the configuration.
pub enum OutputDevice {
    Bell(BellOutput),
    #[cfg(feature = "playback")]
    Playback(crate::alarm::playback::PlaybackOutput),
}

impl OutputDevice {
    /// Creates the output of kind `kind`.
    ///
    /// Falls back to the terminal bell when sound files cannot be played.
    pub fn new(kind: OutputKind) -> Self {
        match kind {
            OutputKind::Bell => OutputDevice::Bell(BellOutput::new()),
            #[cfg(feature = "playback")]
            OutputKind::Playback => match crate::alarm::playback::PlaybackOutput::new() {
                Ok(output) => OutputDevice::Playback(output),
                Err(e) => {
                    warn!("{}, ringing the terminal bell instead", e);
                    OutputDevice::Bell(BellOutput::new())
                }
            },
            #[cfg(not(feature = "playback"))]
            OutputKind::Playback => {
                warn!("built without the playback feature, ringing the terminal bell instead");
                OutputDevice::Bell(BellOutput::new())
            }
        }
    }
}

impl AudioOutput for OutputDevice {
    fn set_alarm_volume_max(&self) {
        match self {
            OutputDevice::Bell(output) => output.set_alarm_volume_max(),
            #[cfg(feature = "playback")]
            OutputDevice::Playback(output) => output.set_alarm_volume_max(),
        }
    }

    fn acquire_looping_playback(
        &self,
        sound: &SoundRef,
    ) -> Result<PlaybackHandle, AudioResourceError> {
        match self {
            OutputDevice::Bell(output) => output.acquire_looping_playback(sound),
            #[cfg(feature = "playback")]
            OutputDevice::Playback(output) => output.acquire_looping_playback(sound),
        }
    }

    fn release(&self, handle: PlaybackHandle) {
        match self {
            OutputDevice::Bell(output) => output.release(handle),
            #[cfg(feature = "playback")]
            OutputDevice::Playback(output) => output.release(handle),
        }
    }
}

type Controller = AlarmController<OutputDevice, StatusChannel>;

/// Path of the rule settings file inside `data_dir`.
pub fn settings_path(data_dir: &str) -> String {
    Path::new(data_dir)
        .join(SETTINGS_FILE)
        .to_string_lossy()
        .into_owned()
}

pub struct Siren {
    store: Arc<FileConfigStore>,

    matcher: Arc<RuleMatcher<FileConfigStore>>,

    controller: Arc<Controller>,

    inlet: Arc<CommandInlet<OutputDevice, StatusChannel>>,

    status: StatusChannel,

    commander: Arc<Commander>,

    events: EventsConfig,
}

impl Siren {
    /// Builds the siren from `config`, keeping the rule settings in `data_dir`.
    pub async fn new(config: Config, data_dir: &str) -> Self {
        let store = Arc::new(FileConfigStore::open(settings_path(data_dir)).await);
        let matcher = Arc::new(RuleMatcher::new(Arc::clone(&store)));

        let status = StatusChannel::new(STATUS_CAPACITY);
        let controller = Arc::new(AlarmController::new(
            OutputDevice::new(config.alarm.output),
            status.clone(),
            config.alarm.alarm_sound(),
        ));
        let inlet = Arc::new(CommandInlet::new(Arc::clone(&controller)));

        Siren {
            store,
            matcher,
            controller,
            inlet,
            status,
            commander: Arc::new(Commander::new()),
            events: config.events,
        }
    }

    /// Runs the siren until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the event stream cannot be opened or if Ctrl-C
    /// cannot be listened for.
    pub async fn start(self) -> anyhow::Result<()> {
        let source = JsonLinesSource::open(
            &self.events.path,
            self.events.follow,
            self.events.poll_interval(),
        )
        .await?;

        let persistence_task = self.store.start_persistence_task();
        let status_task = Self::start_status_task(self.status.subscribe());
        let event_task = self.start_event_task(source);

        let console_task = if self.events.reads_stdin() {
            info!("notifications are read from standard input, console disabled");
            None
        } else {
            Some(self.start_console_task())
        };

        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for ctrl-c")?;
        info!("shutting down");

        event_task.abort();
        if let Some(console_task) = console_task {
            console_task.abort();
        }

        self.controller.shutdown().await;
        persistence_task.abort();
        self.store.persist().await;
        status_task.abort();

        Ok(())
    }

    fn start_event_task(
        &self,
        source: JsonLinesSource<Box<dyn AsyncRead + Unpin + Send>>,
    ) -> JoinHandle<()> {
        let matcher = Arc::clone(&self.matcher);
        let controller = Arc::clone(&self.controller);

        tokio::spawn(async move {
            let on_event = move |event: NotificationEvent| {
                let matcher = Arc::clone(&matcher);
                let controller = Arc::clone(&controller);
                tokio::spawn(Self::handle_notification(matcher, controller, event));
            };

            match source.subscribe(on_event).await {
                Ok(()) => info!("no more notifications, the alarm can still be stopped"),
                Err(e) => error!("notification stream failed: {:#}", e),
            }
        })
    }

    async fn handle_notification(
        matcher: Arc<RuleMatcher<FileConfigStore>>,
        controller: Arc<Controller>,
        event: NotificationEvent,
    ) {
        if !matcher.evaluate(&event) {
            return;
        }

        // Failures are logged by the controller
        let _ = controller.trigger().await;
    }

    fn start_status_task(mut subscription: StatusSubscription) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = subscription.next().await {
                debug!("alarm is {}", event.state());
                match serde_json::to_string(&event) {
                    Ok(json) => println!("{} {}", ALARM_STATUS_CHANGED, json),
                    Err(e) => error!("failed to encode {:?}: {}", event, e),
                }
            }
        })
    }

    fn start_console_task(&self) -> JoinHandle<()> {
        let (sender, mut lines) = mpsc::channel(CONSOLE_CAPACITY);

        // Blocking reads keep a dedicated thread, detached so it never
        // holds the process open
        let reader = thread::Builder::new()
            .name("console".to_owned())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    let Ok(line) = line else { break };
                    if sender.blocking_send(line).is_err() {
                        break;
                    }
                }
            });
        if let Err(e) = reader {
            error!("failed to start the console: {}", e);
        }

        let console = Console {
            store: Arc::clone(&self.store),
            controller: Arc::clone(&self.controller),
            inlet: Arc::clone(&self.inlet),
            commander: Arc::clone(&self.commander),
        };

        tokio::spawn(async move {
            info!("console ready, type `!siren help`");
            while let Some(line) = lines.recv().await {
                if let Some(response) = console.handle_line(&line).await {
                    println!("{}", response);
                }
            }
            debug!("console input closed");
        })
    }
}

/// Executes operator console lines against the running siren.
struct Console<C: ConfigStore> {
    store: Arc<C>,
    controller: Arc<Controller>,
    inlet: Arc<CommandInlet<OutputDevice, StatusChannel>>,
    commander: Arc<Commander>,
}

impl<C: ConfigStore> Console<C> {
    /// Runs one console line, returning the text to show the operator.
    async fn handle_line(&self, line: &str) -> Option<String> {
        let command = match self.commander.parse(line) {
            Ok(command) => command,
            Err(CommandParseError::NotForSiren) => return None,
            Err(CommandParseError::InvalidCommand(message)) => return Some(message),
        };

        let context = CommandContext {
            alarm: self.controller.state().await,
            rule: RuleConfig::snapshot(self.store.as_ref()),
        };

        let result = self.commander.execute(&command, &context);
        if let Some(effect) = result.effect {
            self.apply(effect).await;
        }

        Some(result.response)
    }

    async fn apply(&self, effect: Effect) {
        match effect {
            Effect::StopAlarm => self.inlet.receive(Some(STOP_ALARM)).await,
            Effect::SetKeyword(keyword) => {
                self.store.set_keyword(&keyword);
                self.store.set_locked(true);
                info!("keyword set to {:?}", keyword);
            }
            Effect::SetLocked(locked) => self.store.set_locked(locked),
            Effect::SetSourceEnabled(category, enabled) => {
                self.store.set_source_enabled(category.id(), enabled);
                info!("{} notifications enabled={}", category, enabled);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::tempdir;

    use super::*;
    use crate::{
        alarm::{AlarmSound, AlarmState, StatusEvent},
        config::AlarmConfig,
        rules::MockConfigStore,
    };

    fn config(output: OutputKind) -> Config {
        Config {
            alarm: AlarmConfig {
                output,
                ..AlarmConfig::default()
            },
            events: EventsConfig {
                path: "/nonexistent/events".to_owned(),
                follow: false,
                poll_interval_ms: 10,
            },
        }
    }

    fn controller() -> Arc<Controller> {
        Arc::new(AlarmController::new(
            OutputDevice::new(OutputKind::Bell),
            StatusChannel::new(STATUS_CAPACITY),
            AlarmSound {
                primary: SoundRef::new("alarm.ogg"),
                fallback: None,
            },
        ))
    }

    fn console<C: ConfigStore>(store: C, controller: &Arc<Controller>) -> Console<C> {
        Console {
            store: Arc::new(store),
            controller: Arc::clone(controller),
            inlet: Arc::new(CommandInlet::new(Arc::clone(controller))),
            commander: Arc::new(Commander::new()),
        }
    }

    #[test]
    fn test_settings_path() {
        #[cfg(unix)]
        assert_eq!(settings_path("/var/lib/notifsiren"), "/var/lib/notifsiren/settings.json");
    }

    #[test]
    fn test_playback_output_kind_always_builds_an_output() {
        // Should not panic, with or without the playback feature
        let _output = OutputDevice::new(OutputKind::Playback);
    }

    #[tokio::test]
    async fn test_matching_notification_rings_then_console_stops() {
        let dir = tempdir().unwrap();
        let siren = Siren::new(config(OutputKind::Bell), dir.path().to_str().unwrap()).await;
        let mut subscription = siren.status.subscribe();

        siren.store.set_keyword("Boss");

        Siren::handle_notification(
            Arc::clone(&siren.matcher),
            Arc::clone(&siren.controller),
            NotificationEvent::new("org.telegram.messenger", "Message from Boss"),
        )
        .await;
        assert_eq!(siren.controller.state().await, AlarmState::Playing);
        assert_eq!(subscription.next().await, Some(StatusEvent::playing()));

        let console = Console {
            store: Arc::clone(&siren.store),
            controller: Arc::clone(&siren.controller),
            inlet: Arc::clone(&siren.inlet),
            commander: Arc::clone(&siren.commander),
        };
        let response = console.handle_line("!siren stop").await;

        assert_eq!(response.as_deref(), Some("Stopping the alarm."));
        assert_eq!(siren.controller.state().await, AlarmState::Idle);
        assert_eq!(subscription.next().await, Some(StatusEvent::stopped()));
    }

    #[tokio::test]
    async fn test_non_matching_notification_stays_idle() {
        let dir = tempdir().unwrap();
        let siren = Siren::new(config(OutputKind::Bell), dir.path().to_str().unwrap()).await;
        siren.store.set_keyword("Boss");

        Siren::handle_notification(
            Arc::clone(&siren.matcher),
            Arc::clone(&siren.controller),
            NotificationEvent::new("org.telegram.messenger", "Message from Alice"),
        )
        .await;

        assert_eq!(siren.controller.state().await, AlarmState::Idle);
    }

    #[tokio::test]
    async fn test_start_fails_on_missing_event_stream() {
        let dir = tempdir().unwrap();
        let siren = Siren::new(config(OutputKind::Bell), dir.path().to_str().unwrap()).await;

        let result = tokio::time::timeout(Duration::from_secs(5), siren.start()).await;

        assert!(matches!(result, Ok(Err(_))));
    }

    #[tokio::test]
    async fn test_console_keyword_saves_and_locks() {
        let mut store = MockConfigStore::new();
        store.expect_get_keyword().returning(String::new);
        store.expect_get_locked().returning(|| false);
        store.expect_is_source_enabled().returning(|_| true);
        store
            .expect_set_keyword()
            .withf(|keyword| keyword == "Boss")
            .times(1)
            .return_const(());
        store
            .expect_set_locked()
            .withf(|locked| *locked)
            .times(1)
            .return_const(());

        let console = console(store, &controller());

        let response = console.handle_line("!siren keyword Boss").await;

        assert_eq!(response.as_deref(), Some("Keyword set to 'Boss' and locked."));
    }

    #[tokio::test]
    async fn test_console_refuses_keyword_while_locked() {
        let mut store = MockConfigStore::new();
        store.expect_get_keyword().returning(|| "Alice".to_owned());
        store.expect_get_locked().returning(|| true);
        store.expect_is_source_enabled().returning(|_| true);
        store.expect_set_keyword().never();
        store.expect_set_locked().never();

        let console = console(store, &controller());

        let response = console.handle_line("!siren keyword Boss").await;

        assert!(response.unwrap().contains("locked"));
    }

    #[tokio::test]
    async fn test_console_disable_source() {
        let mut store = MockConfigStore::new();
        store.expect_get_keyword().returning(String::new);
        store.expect_get_locked().returning(|| true);
        store.expect_is_source_enabled().returning(|_| true);
        store
            .expect_set_source_enabled()
            .withf(|id, enabled| id == "whatsapp" && !*enabled)
            .times(1)
            .return_const(());

        let console = console(store, &controller());

        let response = console.handle_line("!siren disable WhatsApp").await;

        assert_eq!(
            response.as_deref(),
            Some("WhatsApp notifications are ignored.")
        );
    }

    #[tokio::test]
    async fn test_console_ignores_other_lines() {
        let console = console(MockConfigStore::new(), &controller());

        assert_eq!(console.handle_line("hello").await, None);
        assert!(
            console
                .handle_line("!siren snooze")
                .await
                .unwrap()
                .contains("Unknown command")
        );
    }
}
