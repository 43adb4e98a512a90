//! Alert sound output.
//!
//! Playback runs on a dedicated worker thread owning the output stream, so
//! the controller never blocks on the audio device. If no device is
//! available the worker exits and every play request reports an error.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

const BEEP_FREQUENCY_HZ: f32 = 880.0;
const BEEP_DURATION: Duration = Duration::from_millis(300);
const BEEP_GAIN: f32 = 0.25;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio output unavailable")]
    OutputUnavailable,
}

/// One-shot alert sound playback.
pub trait AudioSink: Send + Sync {
    /// Play the alert sound once. Returns an error when the environment
    /// cannot produce audio.
    fn play_alert(&self) -> Result<(), AudioError>;
}

/// Audio sink backed by a rodio output stream on a worker thread.
pub struct RodioAudio {
    requests: mpsc::Sender<()>,
}

impl RodioAudio {
    /// Start the worker thread. If the thread cannot be spawned or no audio
    /// device exists, the sink stays constructible and play requests fail.
    pub fn spawn() -> Self {
        let (requests, queue) = mpsc::channel();
        let worker = thread::Builder::new().name("fireguard-audio".to_string());
        if let Err(e) = worker.spawn(move || Self::run_worker(queue)) {
            tracing::warn!("could not start audio worker: {e}");
        }
        Self { requests }
    }

    fn run_worker(queue: mpsc::Receiver<()>) {
        use rodio::source::{SineWave, Source};

        let stream = match rodio::OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("audio output unavailable: {e}");
                return;
            }
        };
        let sink = rodio::Sink::connect_new(stream.mixer());

        while queue.recv().is_ok() {
            let beep = SineWave::new(BEEP_FREQUENCY_HZ)
                .take_duration(BEEP_DURATION)
                .amplify(BEEP_GAIN);
            sink.append(beep);
        }
    }
}

impl AudioSink for RodioAudio {
    fn play_alert(&self) -> Result<(), AudioError> {
        self.requests
            .send(())
            .map_err(|_| AudioError::OutputUnavailable)
    }
}
