//! Addressable stop command.

use std::sync::Arc;

use log::{debug, info};

use crate::{
    alarm::{AlarmController, AudioOutput, StatusSink},
    error::AlarmError,
};

/// The only action the inlet supports.
pub const STOP_ALARM: &str = "STOP_ALARM";

/// Entry point through which an operator stops the alarm, independently of
/// the notification flow.
///
/// Any action other than [`STOP_ALARM`], or no action at all, is ignored.
pub struct CommandInlet<A: AudioOutput, S: StatusSink> {
    controller: Arc<AlarmController<A, S>>,
}

impl<A: AudioOutput, S: StatusSink> CommandInlet<A, S> {
    pub fn new(controller: Arc<AlarmController<A, S>>) -> Self {
        CommandInlet { controller }
    }

    /// Routes `action` to the alarm controller.
    ///
    /// Returns whether the alarm was ringing and has been stopped.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::InvalidCommand`] for an unknown or absent action.
    pub async fn dispatch(&self, action: Option<&str>) -> Result<bool, AlarmError> {
        match action {
            Some(STOP_ALARM) => {
                let stopped = self.controller.stop().await;
                if stopped {
                    info!("alarm stopped by operator");
                }
                Ok(stopped)
            }
            Some(other) => Err(AlarmError::InvalidCommand(other.to_owned())),
            None => Err(AlarmError::InvalidCommand("no action".to_owned())),
        }
    }

    /// Same as [`CommandInlet::dispatch`], ignoring invalid commands.
    pub async fn receive(&self, action: Option<&str>) {
        if let Err(e) = self.dispatch(action).await {
            debug!("ignoring command: {}", e);
        }
    }
}
