//! Event source delivering notifications to the siren.
//!
//! The source owns the reading loop; the siren only hands it a callback. There
//! is no acknowledgement and no backpressure: each decoded event is passed to
//! the callback exactly once and then forgotten.

use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    time,
};

use crate::notifications::NotificationEvent;

/// Path value selecting the process standard input.
pub const STDIN_PATH: &str = "-";

/// Subscription interface of an asynchronous notification stream.
pub trait EventSource {
    /// Delivers every incoming notification to `on_event` until the stream ends.
    ///
    /// The callback runs on the source's own task. It must not block; work that
    /// may wait (such as driving the alarm) should be spawned from it.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying stream fails. Undecodable events are
    /// not errors, they are logged and skipped.
    async fn subscribe<F>(self, on_event: F) -> Result<()>
    where
        F: Fn(NotificationEvent) + Send + Sync + 'static;
}

/// Reads one JSON encoded [`NotificationEvent`] per line.
///
/// In follow mode the source behaves like `tail -f`: reaching the end of the
/// input only means no event arrived yet, and the input is polled again after
/// `poll_interval`. A line is dispatched once its terminating newline has been
/// read, so an event written in several chunks is decoded as a whole.
pub struct JsonLinesSource<R> {
    reader: BufReader<R>,
    follow: bool,
    poll_interval: Duration,
}

impl<R: AsyncRead + Unpin + Send> JsonLinesSource<R> {
    pub fn new(reader: R, follow: bool, poll_interval: Duration) -> Self {
        JsonLinesSource {
            reader: BufReader::new(reader),
            follow,
            poll_interval,
        }
    }

    fn dispatch<F>(line: &[u8], on_event: &F)
    where
        F: Fn(NotificationEvent),
    {
        let line = match std::str::from_utf8(line) {
            Ok(line) => line.trim(),
            Err(e) => {
                warn!("skipping notification that is not UTF-8: {}", e);
                return;
            }
        };
        if line.is_empty() {
            return;
        }

        match serde_json::from_str::<NotificationEvent>(line) {
            Ok(event) => {
                debug!("received notification {:?}", event);
                on_event(event);
            }
            Err(e) => warn!("skipping undecodable notification {}: {}", line, e),
        }
    }
}

impl JsonLinesSource<Box<dyn AsyncRead + Unpin + Send>> {
    /// Opens the event stream at `path`, or the standard input for [`STDIN_PATH`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub async fn open(path: &str, follow: bool, poll_interval: Duration) -> Result<Self> {
        let reader: Box<dyn AsyncRead + Unpin + Send> = if path == STDIN_PATH {
            info!("reading notifications from standard input");
            Box::new(tokio::io::stdin())
        } else {
            info!("reading notifications from {}", path);
            Box::new(
                File::open(path)
                    .await
                    .with_context(|| format!("failed to open event stream {}", path))?,
            )
        };

        Ok(JsonLinesSource::new(reader, follow, poll_interval))
    }
}

impl<R: AsyncRead + Unpin + Send> EventSource for JsonLinesSource<R> {
    async fn subscribe<F>(mut self, on_event: F) -> Result<()>
    where
        F: Fn(NotificationEvent) + Send + Sync + 'static,
    {
        let mut line = Vec::new();

        loop {
            self.reader
                .read_until(b'\n', &mut line)
                .await
                .context("failed to read the event stream")?;

            if line.ends_with(b"\n") {
                Self::dispatch(&line, &on_event);
                line.clear();
                continue;
            }

            // End of input, possibly in the middle of a line
            if self.follow {
                time::sleep(self.poll_interval).await;
                continue;
            }

            Self::dispatch(&line, &on_event);
            info!("event stream ended");
            return Ok(());
        }
    }
}
