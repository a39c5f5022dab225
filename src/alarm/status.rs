//! Publication of alarm status changes to observers.

use log::{debug, warn};
use mockall::automock;
use tokio::sync::broadcast::{self, Receiver, Sender, error::RecvError};

use crate::alarm::{ALARM_STATUS_CHANGED, StatusEvent};

/// Publish point of the [`StatusEvent`]s emitted by the alarm controller.
#[automock]
pub trait StatusSink: Send + Sync {
    fn publish(&self, event: StatusEvent);
}

/// Broadcast topic [`ALARM_STATUS_CHANGED`] fanning status events out to any
/// number of subscribers.
///
/// Publishing never blocks. A subscriber that falls behind by more than the
/// channel capacity loses the oldest events, which is harmless because events
/// are levels.
#[derive(Clone)]
pub struct StatusChannel {
    sender: Sender<StatusEvent>,
}

impl StatusChannel {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        StatusChannel { sender }
    }

    pub fn subscribe(&self) -> StatusSubscription {
        StatusSubscription {
            receiver: self.sender.subscribe(),
        }
    }
}

impl StatusSink for StatusChannel {
    fn publish(&self, event: StatusEvent) {
        if self.sender.send(event).is_err() {
            debug!("no subscriber for {} {:?}", ALARM_STATUS_CHANGED, event);
        }
    }
}

/// Receiving end of a [`StatusChannel`].
pub struct StatusSubscription {
    receiver: Receiver<StatusEvent>,
}

impl StatusSubscription {
    /// Waits for the next status event, skipping over events lost to lag.
    ///
    /// Returns `None` once every publisher is gone.
    pub async fn next(&mut self) -> Option<StatusEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("status subscriber lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
