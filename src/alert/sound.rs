//! Repeating alert-sound ticket.

use crate::audio::AudioSink;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Interval between replays while an alert is active.
pub const REPLAY_PERIOD: Duration = Duration::from_millis(2000);

/// Handle to the periodic replay task. Dropping the ticket stops the
/// replay; the controller holds at most one.
pub(crate) struct SoundTicket {
    task: JoinHandle<()>,
}

impl SoundTicket {
    /// Spawn the replay task. The caller plays the first beep itself, the
    /// task only handles the repeats.
    pub(crate) fn spawn(audio: Arc<dyn AudioSink>) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(REPLAY_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately and would double up the
            // beep the caller just played.
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(e) = audio.play_alert() {
                    tracing::error!("could not replay alert sound: {e}");
                }
            }
        });
        Self { task }
    }
}

impl Drop for SoundTicket {
    fn drop(&mut self) {
        self.task.abort();
    }
}
