//! Terminal bell audio output.
//!
//! Works everywhere a terminal does, which makes it the default output: a
//! looping playback is a thread writing the BEL character to standard error
//! at a fixed interval until released. Sound references are ignored.

use std::{
    collections::HashMap,
    io::{self, Write},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, warn};
use parking_lot::Mutex;

use crate::{
    alarm::{AudioOutput, PlaybackHandle, SoundRef},
    error::AudioResourceError,
};

/// Delay between two rings.
const RING_INTERVAL: Duration = Duration::from_secs(1);

type Ring = Arc<dyn Fn() + Send + Sync>;

struct Ringer {
    stopped: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

/// [`AudioOutput`] ringing the terminal bell.
pub struct BellOutput {
    ring: Ring,
    interval: Duration,
    next_id: AtomicU64,
    ringers: Mutex<HashMap<u64, Ringer>>,
}

impl BellOutput {
    pub fn new() -> Self {
        Self::with_ring(RING_INTERVAL, Arc::new(ring_terminal_bell))
    }

    fn with_ring(interval: Duration, ring: Ring) -> Self {
        BellOutput {
            ring,
            interval,
            next_id: AtomicU64::new(1),
            ringers: Mutex::new(HashMap::new()),
        }
    }

    fn stop_ringer(ringer: Ringer) {
        ringer.stopped.store(true, Ordering::SeqCst);
        ringer.thread.thread().unpark();
        if ringer.thread.join().is_err() {
            warn!("bell thread panicked");
        }
    }
}

impl Default for BellOutput {
    fn default() -> Self {
        Self::new()
    }
}

fn ring_terminal_bell() {
    let mut stderr = io::stderr();
    let _ = stderr.write_all(b"\x07");
    let _ = stderr.flush();
}

impl AudioOutput for BellOutput {
    fn set_alarm_volume_max(&self) {
        debug!("terminal bell has a fixed volume");
    }

    fn acquire_looping_playback(
        &self,
        sound: &SoundRef,
    ) -> Result<PlaybackHandle, AudioResourceError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stopped = Arc::new(AtomicBool::new(false));

        let thread = {
            let stopped = Arc::clone(&stopped);
            let ring = Arc::clone(&self.ring);
            let interval = self.interval;

            thread::Builder::new()
                .name(format!("alarm-bell-{}", id))
                .spawn(move || {
                    while !stopped.load(Ordering::SeqCst) {
                        ring();
                        thread::park_timeout(interval);
                    }
                })
                .map_err(|e| AudioResourceError::Device(e.to_string()))?
        };

        debug!("ringing terminal bell in place of {}", sound);
        self.ringers.lock().insert(id, Ringer { stopped, thread });

        Ok(PlaybackHandle::new(id))
    }

    fn release(&self, handle: PlaybackHandle) {
        let Some(ringer) = self.ringers.lock().remove(&handle.id()) else {
            warn!("no bell playback {} to release", handle.id());
            return;
        };

        Self::stop_ringer(ringer);
    }
}

impl Drop for BellOutput {
    fn drop(&mut self) {
        for (_, ringer) in self.ringers.get_mut().drain() {
            Self::stop_ringer(ringer);
        }
    }
}
