//! User-visible notifications.
//!
//! The controller talks to an abstract sink; the terminal sink here renders
//! to stderr so notifications stay visible between prompt lines.

use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("unknown notification handle")]
    UnknownHandle,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Severity of a notification, used for visual styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub const fn label(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Success => "SUCCESS",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

/// A notification payload handed to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub text: String,
    pub severity: Severity,
    /// Sticky notifications stay up until explicitly dismissed.
    pub sticky: bool,
    /// Auto-hide delay for non-sticky notifications.
    pub timeout: Option<Duration>,
}

impl Notification {
    pub fn sticky(severity: Severity, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            severity,
            sticky: true,
            timeout: None,
        }
    }

    pub fn transient(
        severity: Severity,
        title: impl Into<String>,
        text: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            severity,
            sticky: false,
            timeout: Some(timeout),
        }
    }
}

/// Reference to a rendered notification, needed to dismiss it later.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationHandle(Uuid);

impl NotificationHandle {
    /// Mint a fresh handle. Sinks create one per rendered notification.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

/// Rendering target for notifications.
pub trait NotificationSink: Send + Sync {
    /// Render a notification and return a handle to it.
    fn notify(&self, notification: &Notification) -> Result<NotificationHandle, NotifyError>;

    /// Remove a previously rendered notification.
    fn dismiss(&self, handle: &NotificationHandle) -> Result<(), NotifyError>;
}

impl<T: NotificationSink + ?Sized> NotificationSink for Arc<T> {
    fn notify(&self, notification: &Notification) -> Result<NotificationHandle, NotifyError> {
        (**self).notify(notification)
    }

    fn dismiss(&self, handle: &NotificationHandle) -> Result<(), NotifyError> {
        (**self).dismiss(handle)
    }
}

/// Terminal notification sink writing to stderr with ANSI colors.
pub struct TerminalNotifier {
    use_colors: bool,
    active: Mutex<HashSet<NotificationHandle>>,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self {
            use_colors: Self::supports_color(),
            active: Mutex::new(HashSet::new()),
        }
    }

    pub fn no_color() -> Self {
        Self {
            use_colors: false,
            active: Mutex::new(HashSet::new()),
        }
    }

    fn supports_color() -> bool {
        std::env::var("TERM")
            .map(|term| term != "dumb")
            .unwrap_or(false)
    }

    /// Number of sticky notifications currently on screen.
    pub fn active_count(&self) -> usize {
        self.active.lock().map(|set| set.len()).unwrap_or(0)
    }

    fn format_severity(&self, severity: Severity) -> String {
        if !self.use_colors {
            return severity.label().to_string();
        }
        let color_code = match severity {
            Severity::Info => "\x1b[36m",
            Severity::Success => "\x1b[32m",
            Severity::Warning => "\x1b[33m",
            Severity::Error => "\x1b[31m",
        };
        format!("{}{}\x1b[0m", color_code, severity.label())
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for TerminalNotifier {
    fn notify(&self, notification: &Notification) -> Result<NotificationHandle, NotifyError> {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        let severity = self.format_severity(notification.severity);
        let lifetime = if notification.sticky {
            "stays until dismissed".to_string()
        } else {
            match notification.timeout {
                Some(timeout) => format!("auto-hides after {}s", timeout.as_secs()),
                None => "auto-hides".to_string(),
            }
        };

        let stderr = io::stderr();
        let mut out = stderr.lock();
        writeln!(
            out,
            "[{timestamp}] {severity} {}: {} ({lifetime})",
            notification.title, notification.text
        )?;

        let handle = NotificationHandle::new();
        if notification.sticky {
            if let Ok(mut active) = self.active.lock() {
                active.insert(handle.clone());
            }
        }
        Ok(handle)
    }

    fn dismiss(&self, handle: &NotificationHandle) -> Result<(), NotifyError> {
        let removed = self
            .active
            .lock()
            .map(|mut active| active.remove(handle))
            .unwrap_or(false);
        if !removed {
            return Err(NotifyError::UnknownHandle);
        }

        let stderr = io::stderr();
        let mut out = stderr.lock();
        writeln!(out, "[notification {} dismissed]", handle.id())?;
        Ok(())
    }
}
