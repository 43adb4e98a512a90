//! Operator-facing surfaces: the alert modal and the confirmation prompt.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModalError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Content of the alert modal.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertView {
    pub message: String,
    pub sensor: String,
    pub current_temp: f64,
    pub threshold: f64,
    /// A locked modal offers no casual way out; it stays up until the
    /// alert is closed through the controller.
    pub locked: bool,
}

/// Presentation surface for the alert modal.
pub trait ModalSurface: Send + Sync {
    fn present(&self, view: &AlertView) -> Result<(), ModalError>;
    fn dismiss(&self) -> Result<(), ModalError>;
}

impl<T: ModalSurface + ?Sized> ModalSurface for Arc<T> {
    fn present(&self, view: &AlertView) -> Result<(), ModalError> {
        (**self).present(view)
    }

    fn dismiss(&self) -> Result<(), ModalError> {
        (**self).dismiss()
    }
}

/// Terminal rendition of the modal: a banner on stderr.
pub struct TerminalModal {
    visible: Mutex<bool>,
}

impl TerminalModal {
    pub fn new() -> Self {
        Self {
            visible: Mutex::new(false),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.lock().map(|v| *v).unwrap_or(false)
    }
}

impl Default for TerminalModal {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalSurface for TerminalModal {
    fn present(&self, view: &AlertView) -> Result<(), ModalError> {
        let stderr = io::stderr();
        let mut out = stderr.lock();
        writeln!(out, "{}", "=".repeat(64))?;
        writeln!(out, "  TEMPERATURE ALERT")?;
        writeln!(out, "  {}", view.message)?;
        writeln!(
            out,
            "  sensor: {}   current: {}°C   threshold: {}°C",
            view.sensor, view.current_temp, view.threshold
        )?;
        if view.locked {
            writeln!(out, "  type \"close\" to acknowledge this alert")?;
        }
        writeln!(out, "{}", "=".repeat(64))?;

        if let Ok(mut visible) = self.visible.lock() {
            *visible = true;
        }
        Ok(())
    }

    fn dismiss(&self) -> Result<(), ModalError> {
        let was_visible = self
            .visible
            .lock()
            .map(|mut visible| std::mem::replace(&mut *visible, false))
            .unwrap_or(false);
        if was_visible {
            let stderr = io::stderr();
            let mut out = stderr.lock();
            writeln!(out, "[alert acknowledged]")?;
        }
        Ok(())
    }
}

/// Yes/no gate in front of destructive actions.
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirmation with a fixed answer, decided up front (for example by a
/// `--yes` command-line flag). The prompt text is still shown so the
/// operator sees what was skipped or declined.
pub struct PresetConfirm {
    answer: bool,
}

impl PresetConfirm {
    pub fn new(answer: bool) -> Self {
        Self { answer }
    }
}

impl ConfirmPrompt for PresetConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.answer {
            tracing::info!("{prompt} (confirmed via --yes)");
        } else {
            tracing::warn!("{prompt} (declined, re-run with --yes to confirm)");
        }
        self.answer
    }
}
