//! End-to-end tests: controller wired to the terminal collaborators and a
//! loopback host stub over the channel transport.

use fireguard::alert::AlertController;
use fireguard::audio::{AudioError, AudioSink};
use fireguard::host::{commands, ChannelTransport, HostRequest};
use fireguard::messages::PLUGIN_ID;
use fireguard::notify::TerminalNotifier;
use fireguard::ui::{PresetConfirm, TerminalModal};

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Default)]
struct CountingAudio {
    plays: AtomicUsize,
}

impl CountingAudio {
    fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl AudioSink for CountingAudio {
    fn play_alert(&self) -> Result<(), AudioError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Rig {
    controller: AlertController,
    audio: Arc<CountingAudio>,
    notifier: Arc<TerminalNotifier>,
    modal: Arc<TerminalModal>,
    push_rx: mpsc::Receiver<(String, serde_json::Value)>,
}

/// Wire a controller to terminal collaborators and a host stub that
/// answers the two test commands the way the backend would.
fn rig(confirm_answer: bool) -> Rig {
    let (host_tx, mut host_rx) = mpsc::channel::<HostRequest>(4);
    let (push_tx, push_rx) = mpsc::channel(4);

    tokio::spawn(async move {
        while let Some(request) = host_rx.recv().await {
            match request.command.as_str() {
                commands::TEST_ALERT => {
                    let alert = json!({
                        "type": "temperature_alert",
                        "sensor": "test",
                        "current_temp": 999,
                        "threshold": 250,
                        "message": "This is a test alert"
                    });
                    let _ = push_tx.send((PLUGIN_ID.to_string(), alert)).await;
                    let _ = request.respond_to.send(Ok(json!({ "success": true })));
                }
                commands::TEST_EMERGENCY_ACTIONS => {
                    let _ = request
                        .respond_to
                        .send(Ok(json!({ "mode": "gcode", "message": "simulated" })));
                }
                other => {
                    let _ = request
                        .respond_to
                        .send(Err(format!("unknown command: {other}")));
                }
            }
        }
    });

    let audio = Arc::new(CountingAudio::default());
    let notifier = Arc::new(TerminalNotifier::no_color());
    let modal = Arc::new(TerminalModal::new());

    let controller = AlertController::new(
        Arc::clone(&audio) as Arc<dyn AudioSink>,
        Box::new(Arc::clone(&notifier)),
        Box::new(Arc::clone(&modal)),
        Box::new(PresetConfirm::new(confirm_answer)),
        Some(Box::new(ChannelTransport::new(host_tx))),
    );

    Rig {
        controller,
        audio,
        notifier,
        modal,
        push_rx,
    }
}

#[tokio::test]
async fn simulated_alert_round_trip() {
    let mut rig = rig(true);

    rig.controller.test_alert().await;

    // The stub answers the command by publishing the alert push message.
    let (plugin, payload) = rig.push_rx.recv().await.expect("push message");
    rig.controller.on_backend_message(&plugin, &payload);

    let state = rig.controller.state();
    assert!(state.visible);
    assert_eq!(state.sensor, "test");
    assert_eq!(state.current_temp, 999.0);
    assert_eq!(state.threshold, 250.0);
    assert_eq!(state.message, "This is a test alert");

    assert!(rig.modal.is_visible());
    assert!(rig.controller.sound_ticket_active());
    assert_eq!(rig.audio.plays(), 1);
    assert_eq!(rig.notifier.active_count(), 1);

    rig.controller.close_alert();
    assert!(!rig.controller.state().visible);
    assert!(!rig.modal.is_visible());
    assert!(!rig.controller.sound_ticket_active());
}

#[tokio::test]
async fn timeout_warning_lifecycle() {
    let mut rig = rig(true);

    rig.controller.on_backend_message(
        PLUGIN_ID,
        &json!({
            "type": "data_timeout_warning",
            "sensors": ["hotend", "heatbed"],
            "timeout": 300,
            "message": "No temperature data received"
        }),
    );
    assert!(rig.controller.timeout_warning_active());
    assert_eq!(rig.notifier.active_count(), 1);

    rig.controller
        .on_backend_message(PLUGIN_ID, &json!({ "type": "data_timeout_cleared" }));
    assert!(!rig.controller.timeout_warning_active());
    assert_eq!(rig.notifier.active_count(), 0);

    // A second clear with nothing outstanding changes nothing.
    rig.controller
        .on_backend_message(PLUGIN_ID, &json!({ "type": "data_timeout_cleared" }));
    assert!(!rig.controller.timeout_warning_active());
}

#[tokio::test]
async fn traffic_for_other_plugins_is_ignored() {
    let mut rig = rig(true);

    rig.controller.on_backend_message(
        "psucontrol",
        &json!({
            "type": "temperature_alert",
            "message": "spoofed",
            "sensor": "hotend",
            "current_temp": 500,
            "threshold": 250
        }),
    );

    assert!(!rig.controller.state().visible);
    assert!(!rig.modal.is_visible());
    assert_eq!(rig.audio.plays(), 0);
    assert_eq!(rig.notifier.active_count(), 0);
}

#[tokio::test]
async fn confirmed_emergency_test_round_trip() {
    let rig = rig(true);
    rig.controller.test_emergency_actions().await;

    // Outcome notifications are transient; nothing sticky may linger.
    assert_eq!(rig.notifier.active_count(), 0);
}

#[tokio::test]
async fn declined_emergency_test_leaves_no_trace() {
    let rig = rig(false);
    rig.controller.test_emergency_actions().await;
    assert_eq!(rig.notifier.active_count(), 0);
}
