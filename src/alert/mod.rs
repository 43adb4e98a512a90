//! Alert lifecycle controller.
//!
//! Translates push messages from the host channel into visible and audible
//! state and forwards operator test requests to the backend. The controller
//! is owned by a single task; boundary failures (modal, audio,
//! notifications, transport) are logged and never propagate, so one failed
//! operation leaves the controller usable for the next.

mod sound;

pub use sound::REPLAY_PERIOD;
use sound::SoundTicket;

use crate::audio::AudioSink;
use crate::config::{GuardSettings, SettingsSource};
use crate::host::{commands, CommandTransport, TransportError};
use crate::messages::{DataTimeoutWarning, PluginMessage, TemperatureAlert, PLUGIN_ID};
use crate::notify::{Notification, NotificationHandle, NotificationSink, Severity};
use crate::ui::{AlertView, ConfirmPrompt, ModalSurface};

use std::sync::Arc;
use std::time::Duration;

const EMERGENCY_CONFIRM_PROMPT: &str = "This will execute the configured emergency actions \
     (GCode commands or PSU control). Are you sure you want to proceed?";

/// What the alert modal currently shows. The four payload fields only carry
/// meaning while `visible` is true; they reflect the most recently received
/// temperature alert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertState {
    pub visible: bool,
    pub message: String,
    pub sensor: String,
    pub current_temp: f64,
    pub threshold: f64,
}

pub struct AlertController {
    settings: GuardSettings,
    state: AlertState,
    sound_ticket: Option<SoundTicket>,
    timeout_warning: Option<NotificationHandle>,
    audio: Arc<dyn AudioSink>,
    notifications: Box<dyn NotificationSink>,
    modal: Box<dyn ModalSurface>,
    confirm: Box<dyn ConfirmPrompt>,
    transport: Option<Box<dyn CommandTransport>>,
}

impl AlertController {
    /// Build a controller around its collaborators. Pass `None` for the
    /// transport when the host command API is unreachable; the test
    /// operations then short-circuit with an error log.
    pub fn new(
        audio: Arc<dyn AudioSink>,
        notifications: Box<dyn NotificationSink>,
        modal: Box<dyn ModalSurface>,
        confirm: Box<dyn ConfirmPrompt>,
        transport: Option<Box<dyn CommandTransport>>,
    ) -> Self {
        Self {
            settings: GuardSettings::default(),
            state: AlertState::default(),
            sound_ticket: None,
            timeout_warning: None,
            audio,
            notifications,
            modal,
            confirm,
            transport,
        }
    }

    pub fn settings(&self) -> &GuardSettings {
        &self.settings
    }

    pub fn state(&self) -> &AlertState {
        &self.state
    }

    pub fn sound_ticket_active(&self) -> bool {
        self.sound_ticket.is_some()
    }

    pub fn timeout_warning_active(&self) -> bool {
        self.timeout_warning.is_some()
    }

    /// Copy the settings snapshot from the host's settings store. A missing
    /// or malformed payload is logged and the current values stay in place.
    pub fn load_settings(&mut self, source: &dyn SettingsSource) {
        let raw = match source.plugin_settings(PLUGIN_ID) {
            Some(value) if !value.is_null() => value,
            _ => {
                tracing::warn!("no settings found for plugin {PLUGIN_ID}, keeping current values");
                return;
            }
        };
        if raw.as_object().map_or(true, |fields| fields.is_empty()) {
            tracing::warn!("empty settings payload for plugin {PLUGIN_ID}, keeping current values");
            return;
        }

        match serde_json::from_value::<GuardSettings>(raw) {
            Ok(settings) => {
                tracing::debug!(
                    "settings loaded: hotend {}°C, heatbed {}°C, termination {}",
                    settings.hotend_threshold,
                    settings.heatbed_threshold,
                    settings.termination_mode
                );
                self.settings = settings;
            }
            Err(e) => tracing::error!("could not load plugin settings: {e}"),
        }
    }

    /// Entry point for traffic from the shared plugin channel. Messages
    /// published by other plugins and unrecognized payloads are ignored.
    pub fn on_backend_message(&mut self, plugin: &str, payload: &serde_json::Value) {
        if plugin != PLUGIN_ID {
            return;
        }
        let Some(message) = PluginMessage::from_value(payload) else {
            return;
        };
        match message {
            PluginMessage::TemperatureAlert(alert) => self.show_alert(&alert),
            PluginMessage::DataTimeoutWarning(warning) => self.show_data_timeout_warning(&warning),
            PluginMessage::DataTimeoutCleared => self.dismiss_data_timeout_warning(),
        }
    }

    /// Raise the alert: modal up, sound looping, sticky notification out.
    /// Each step failing is logged and the remaining steps still run; a
    /// sound that already started keeps running.
    pub fn show_alert(&mut self, alert: &TemperatureAlert) {
        self.state.message = alert.message.clone();
        self.state.sensor = alert.sensor.clone();
        self.state.current_temp = alert.current_temp;
        self.state.threshold = alert.threshold;
        self.state.visible = true;

        let view = AlertView {
            message: alert.message.clone(),
            sensor: alert.sensor.clone(),
            current_temp: alert.current_temp,
            threshold: alert.threshold,
            locked: true,
        };
        if let Err(e) = self.modal.present(&view) {
            tracing::error!("could not present alert modal: {e}");
        }

        self.start_alert_sound();

        let notification = Notification::sticky(
            Severity::Error,
            "Temperature Alert!",
            format!(
                "{} - {}: {}°C (Threshold: {}°C)",
                alert.message, alert.sensor, alert.current_temp, alert.threshold
            ),
        );
        if let Err(e) = self.notifications.notify(&notification) {
            tracing::error!("could not raise alert notification: {e}");
        }
    }

    /// Play the alert sound once, then replay every [`REPLAY_PERIOD`] until
    /// stopped. Any existing ticket is cancelled first. If the immediate
    /// play fails no ticket is created.
    pub fn start_alert_sound(&mut self) {
        self.stop_alert_sound();
        if let Err(e) = self.audio.play_alert() {
            tracing::error!("could not start alert sound: {e}");
            return;
        }
        self.sound_ticket = Some(SoundTicket::spawn(Arc::clone(&self.audio)));
    }

    /// Cancel the replay ticket if one is active.
    pub fn stop_alert_sound(&mut self) {
        self.sound_ticket.take();
    }

    /// Take the alert down again. Safe to call when no alert is showing.
    pub fn close_alert(&mut self) {
        self.state.visible = false;
        self.stop_alert_sound();
        if let Err(e) = self.modal.dismiss() {
            tracing::error!("could not dismiss alert modal: {e}");
        }
    }

    /// Surface a backend self-test warning about sensors that stopped
    /// reporting.
    pub fn show_data_timeout_warning(&mut self, warning: &DataTimeoutWarning) {
        let sensors = warning.sensors.join(" and ");
        let minutes = (warning.timeout / 60.0).floor();

        tracing::warn!("temperature data timeout: {}", warning.message);

        let notification = Notification::sticky(
            Severity::Warning,
            "Octo Fire Guard: Self-Test Warning",
            format!(
                "No temperature data received from {sensors} for {minutes} minutes. \
                 The plugin may not be monitoring correctly. \
                 Please check your printer connection."
            ),
        );
        match self.notifications.notify(&notification) {
            // A handle that was already held is overwritten without being
            // dismissed; the old notification stays rendered until a clear
            // arrives. Inherited behavior, kept as-is.
            Ok(handle) => self.timeout_warning = Some(handle),
            Err(e) => tracing::error!("could not raise data timeout warning: {e}"),
        }
    }

    /// Remove the timeout warning if one is showing; no-op otherwise.
    pub fn dismiss_data_timeout_warning(&mut self) {
        let Some(handle) = self.timeout_warning.take() else {
            return;
        };
        match self.notifications.dismiss(&handle) {
            Ok(()) => tracing::info!("temperature data timeout warning dismissed"),
            Err(e) => {
                tracing::error!("could not dismiss data timeout warning: {e}");
                self.timeout_warning = Some(handle);
            }
        }
    }

    /// Ask the backend to run a simulated alert end to end. Local state is
    /// only touched when the resulting push message comes back in.
    pub async fn test_alert(&self) {
        let Some(transport) = &self.transport else {
            tracing::error!("host command API not available");
            return;
        };
        match transport.send_command(commands::TEST_ALERT).await {
            Ok(_) => tracing::info!("test alert sent"),
            Err(e) => tracing::error!("failed to send test alert: {e}"),
        }
    }

    /// Ask the backend to run the configured emergency actions for real.
    /// Gated behind the confirmation prompt; declining aborts with no side
    /// effects.
    pub async fn test_emergency_actions(&self) {
        let Some(transport) = &self.transport else {
            tracing::error!("host command API not available");
            return;
        };
        if !self.confirm.confirm(EMERGENCY_CONFIRM_PROMPT) {
            tracing::info!("emergency actions test cancelled");
            return;
        }

        let in_progress = Notification::transient(
            Severity::Info,
            "Testing Emergency Actions",
            "Executing emergency actions...",
            Duration::from_secs(3),
        );
        if let Err(e) = self.notifications.notify(&in_progress) {
            tracing::error!("could not raise progress notification: {e}");
        }

        match transport.send_command(commands::TEST_EMERGENCY_ACTIONS).await {
            Ok(response) => {
                tracing::info!("emergency actions test completed");
                let mut text = String::from("Emergency actions test completed successfully");
                if let Some(mode) = response.get("mode").and_then(|v| v.as_str()) {
                    text.push_str(&format!(" ({mode} mode)"));
                }
                if let Some(message) = response.get("message").and_then(|v| v.as_str()) {
                    text.push_str(&format!(": {message}"));
                }
                let success = Notification::transient(
                    Severity::Success,
                    "Test Successful",
                    text,
                    Duration::from_secs(5),
                );
                if let Err(e) = self.notifications.notify(&success) {
                    tracing::error!("could not raise success notification: {e}");
                }
            }
            Err(e) => {
                tracing::error!("failed to test emergency actions: {e}");
                let mut text = String::from("Failed to test emergency actions");
                if let TransportError::Rejected { reason } = &e {
                    text.push_str(&format!(": {reason}"));
                }
                let failure = Notification::sticky(Severity::Error, "Test Failed", text);
                if let Err(e) = self.notifications.notify(&failure) {
                    tracing::error!("could not raise failure notification: {e}");
                }
            }
        }
    }
}
