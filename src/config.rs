//! Settings snapshot mirrored from the host's settings store.
//!
//! The six fields and their defaults match what the backend plugin registers
//! with the host. The snapshot is read-only from this crate's perspective:
//! it is populated once at startup and never written back.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How the backend reacts when a temperature threshold is breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminationMode {
    /// Send the configured emergency G-code to the printer.
    Gcode,
    /// Cut printer power through a PSU control plugin.
    Psu,
}

impl fmt::Display for TerminationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationMode::Gcode => write!(f, "gcode"),
            TerminationMode::Psu => write!(f, "psu"),
        }
    }
}

/// Mirror of the backend-held plugin configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardSettings {
    /// Hotend alert threshold in °C.
    #[serde(default = "default_hotend_threshold")]
    pub hotend_threshold: f64,

    /// Heatbed alert threshold in °C.
    #[serde(default = "default_heatbed_threshold")]
    pub heatbed_threshold: f64,

    #[serde(default = "default_termination_mode")]
    pub termination_mode: TerminationMode,

    /// Emergency G-code, one command per line.
    #[serde(default = "default_termination_gcode")]
    pub termination_gcode: String,

    /// Identifier of the PSU control plugin used in psu mode.
    #[serde(default = "default_psu_plugin_name")]
    pub psu_plugin_name: String,

    #[serde(default = "default_enable_monitoring")]
    pub enable_monitoring: bool,
}

fn default_hotend_threshold() -> f64 {
    250.0
}

fn default_heatbed_threshold() -> f64 {
    100.0
}

fn default_termination_mode() -> TerminationMode {
    TerminationMode::Gcode
}

fn default_termination_gcode() -> String {
    "M112\nM104 S0\nM140 S0".to_string()
}

fn default_psu_plugin_name() -> String {
    "psucontrol".to_string()
}

fn default_enable_monitoring() -> bool {
    true
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            hotend_threshold: default_hotend_threshold(),
            heatbed_threshold: default_heatbed_threshold(),
            termination_mode: default_termination_mode(),
            termination_gcode: default_termination_gcode(),
            psu_plugin_name: default_psu_plugin_name(),
            enable_monitoring: default_enable_monitoring(),
        }
    }
}

/// Load a settings snapshot from a TOML file. Missing fields fall back to
/// the backend defaults.
pub fn load_settings_file(path: &str) -> Result<GuardSettings, ConfigError> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    let settings = toml::from_str(&contents)?;
    Ok(settings)
}

/// Provider of per-plugin settings payloads, keyed by plugin identifier.
///
/// This is the seam towards the host's settings store. Returning `None`
/// means no settings are known for that plugin.
pub trait SettingsSource {
    fn plugin_settings(&self, plugin_id: &str) -> Option<serde_json::Value>;
}

/// In-memory settings provider holding one JSON payload per plugin.
#[derive(Debug, Default)]
pub struct StaticSettings {
    plugins: HashMap<String, serde_json::Value>,
}

impl StaticSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, plugin_id: impl Into<String>, value: serde_json::Value) {
        self.plugins.insert(plugin_id.into(), value);
    }

    pub fn with_plugin(plugin_id: impl Into<String>, value: serde_json::Value) -> Self {
        let mut source = Self::new();
        source.insert(plugin_id, value);
        source
    }
}

impl SettingsSource for StaticSettings {
    fn plugin_settings(&self, plugin_id: &str) -> Option<serde_json::Value> {
        self.plugins.get(plugin_id).cloned()
    }
}
