//! Fireguard - temperature alert client for a 3D printer host.
//!
//! The host backend watches hotend and heatbed temperatures and publishes
//! push messages on a shared plugin channel when a threshold is breached or
//! sensor data goes quiet. This crate turns those messages into an operator
//! alert: a locked modal, a repeating sound, and persistent notifications.
//! It also forwards the two operator-triggered self-tests back to the host.
//!
//! # Modules
//!
//! - [`alert`]: the alert lifecycle controller
//! - [`audio`]: alert sound seam and rodio-backed sink
//! - [`config`]: settings snapshot and settings provider seam
//! - [`host`]: command transport seam towards the backend
//! - [`messages`]: push messages on the plugin channel
//! - [`notify`]: notification seam and terminal sink
//! - [`ui`]: modal surface and confirmation prompt

pub mod alert;
pub mod audio;
pub mod config;
pub mod host;
pub mod messages;
pub mod notify;
pub mod ui;

pub use alert::{AlertController, AlertState};
pub use config::{GuardSettings, TerminationMode};
pub use messages::{PluginMessage, PLUGIN_ID};
