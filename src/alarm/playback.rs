//! Sound file audio output backed by rodio.
//!
//! The output stream is not guaranteed to be `Send`, so it lives on a
//! dedicated audio thread. [`PlaybackOutput`] forwards requests to that thread
//! over a channel and waits for the reply of each acquisition.

use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::{
    alarm::{AudioOutput, PlaybackHandle, SoundRef},
    error::AudioResourceError,
};

/// Volume of playbacks started before [`AudioOutput::set_alarm_volume_max`].
const DEFAULT_VOLUME: f32 = 0.8;
const MAX_VOLUME: f32 = 1.0;

enum AudioRequest {
    Play {
        sound: PathBuf,
        volume: f32,
        reply: Sender<Result<u64, AudioResourceError>>,
    },
    Stop {
        id: u64,
    },
}

/// [`AudioOutput`] playing sound files on the default output device.
pub struct PlaybackOutput {
    requests: Sender<AudioRequest>,
    volume: Mutex<f32>,
}

impl PlaybackOutput {
    /// Starts the audio thread. The output device is opened on first playback.
    ///
    /// # Errors
    ///
    /// Returns [`AudioResourceError::Device`] if the audio thread cannot be spawned.
    pub fn new() -> Result<Self, AudioResourceError> {
        let (requests, receiver) = mpsc::channel();

        thread::Builder::new()
            .name("alarm-audio".to_owned())
            .spawn(move || run_audio_thread(receiver))
            .map_err(|e| AudioResourceError::Device(e.to_string()))?;

        Ok(PlaybackOutput {
            requests,
            volume: Mutex::new(DEFAULT_VOLUME),
        })
    }
}

impl AudioOutput for PlaybackOutput {
    fn set_alarm_volume_max(&self) {
        *self.volume.lock() = MAX_VOLUME;
    }

    fn acquire_looping_playback(
        &self,
        sound: &SoundRef,
    ) -> Result<PlaybackHandle, AudioResourceError> {
        let (reply, response) = mpsc::channel();
        let request = AudioRequest::Play {
            sound: sound.0.clone(),
            volume: *self.volume.lock(),
            reply,
        };

        self.requests
            .send(request)
            .map_err(|_| AudioResourceError::Device("audio thread stopped".to_owned()))?;

        let id = response
            .recv()
            .map_err(|_| AudioResourceError::Device("audio thread stopped".to_owned()))??;

        Ok(PlaybackHandle::new(id))
    }

    fn release(&self, handle: PlaybackHandle) {
        if self
            .requests
            .send(AudioRequest::Stop { id: handle.id() })
            .is_err()
        {
            warn!("audio thread stopped before releasing playback {}", handle.id());
        }
    }
}

fn run_audio_thread(requests: Receiver<AudioRequest>) {
    let mut stream: Option<OutputStream> = None;
    let mut sinks: HashMap<u64, Sink> = HashMap::new();
    let mut next_id: u64 = 1;

    while let Ok(request) = requests.recv() {
        match request {
            AudioRequest::Play {
                sound,
                volume,
                reply,
            } => {
                let result = start_looping(&mut stream, &sound, volume).map(|sink| {
                    let id = next_id;
                    next_id += 1;
                    sinks.insert(id, sink);
                    id
                });
                if let Err(e) = &result {
                    error!("failed to play {}: {}", sound.display(), e);
                }
                let _ = reply.send(result);
            }
            AudioRequest::Stop { id } => match sinks.remove(&id) {
                Some(sink) => {
                    sink.stop();
                    debug!("stopped playback {}", id);
                }
                None => warn!("no playback {} to release", id),
            },
        }
    }

    info!("audio thread exiting");
}

fn start_looping(
    stream: &mut Option<OutputStream>,
    sound: &Path,
    volume: f32,
) -> Result<Sink, AudioResourceError> {
    let file = File::open(sound)
        .map_err(|_| AudioResourceError::SoundUnavailable(sound.display().to_string()))?;
    let source = Decoder::new(BufReader::new(file))
        .map_err(|_| AudioResourceError::SoundUnavailable(sound.display().to_string()))?;

    if stream.is_none() {
        let opened = OutputStreamBuilder::open_default_stream()
            .map_err(|e| AudioResourceError::DeviceBusy(e.to_string()))?;
        *stream = Some(opened);
    }
    let Some(stream) = stream.as_ref() else {
        return Err(AudioResourceError::Device("no output stream".to_owned()));
    };

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(source.repeat_infinite());
    sink.play();

    Ok(sink)
}
