//! Push messages received from the host's plugin channel.
//!
//! The channel is shared between plugins; every message arrives together
//! with the identifier of the plugin that published it. Only messages
//! published under [`PLUGIN_ID`] concern this crate.

use serde::Deserialize;

/// Identifier under which the backend publishes messages and accepts
/// commands on the shared plugin channel.
pub const PLUGIN_ID: &str = "octo_fire_guard";

/// A temperature reading crossed its configured threshold.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemperatureAlert {
    pub message: String,
    pub sensor: String,
    pub current_temp: f64,
    pub threshold: f64,
}

/// Expected sensor data has stopped arriving at the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataTimeoutWarning {
    /// Sensor names, in the order the backend reports them.
    pub sensors: Vec<String>,
    /// Silence duration in seconds.
    pub timeout: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PluginMessage {
    TemperatureAlert(TemperatureAlert),
    DataTimeoutWarning(DataTimeoutWarning),
    DataTimeoutCleared,
}

impl PluginMessage {
    /// Parse a raw channel payload. Messages with an unknown type tag or a
    /// malformed body are dropped, the channel carries traffic this crate
    /// has no business reacting to.
    pub fn from_value(payload: &serde_json::Value) -> Option<Self> {
        match serde_json::from_value(payload.clone()) {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::debug!("ignoring unrecognized plugin message: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_temperature_alert() {
        let payload = json!({
            "type": "temperature_alert",
            "message": "Temperature too high!",
            "sensor": "hotend",
            "current_temp": 260,
            "threshold": 250
        });
        let message = PluginMessage::from_value(&payload).unwrap();
        assert_eq!(
            message,
            PluginMessage::TemperatureAlert(TemperatureAlert {
                message: "Temperature too high!".to_string(),
                sensor: "hotend".to_string(),
                current_temp: 260.0,
                threshold: 250.0,
            })
        );
    }

    #[test]
    fn parses_data_timeout_warning() {
        let payload = json!({
            "type": "data_timeout_warning",
            "sensors": ["hotend", "heatbed"],
            "timeout": 300,
            "message": "No temperature data"
        });
        match PluginMessage::from_value(&payload).unwrap() {
            PluginMessage::DataTimeoutWarning(warning) => {
                assert_eq!(warning.sensors, vec!["hotend", "heatbed"]);
                assert_eq!(warning.timeout, 300.0);
            }
            other => panic!("expected timeout warning, got {other:?}"),
        }
    }

    #[test]
    fn parses_data_timeout_cleared() {
        let payload = json!({ "type": "data_timeout_cleared" });
        assert_eq!(
            PluginMessage::from_value(&payload),
            Some(PluginMessage::DataTimeoutCleared)
        );
    }

    #[test]
    fn unknown_type_is_dropped() {
        let payload = json!({ "type": "firmware_update", "version": "1.2.3" });
        assert_eq!(PluginMessage::from_value(&payload), None);
    }

    #[test]
    fn malformed_body_is_dropped() {
        let payload = json!({ "type": "temperature_alert", "sensor": "hotend" });
        assert_eq!(PluginMessage::from_value(&payload), None);
    }

    #[test]
    fn non_object_payload_is_dropped() {
        assert_eq!(PluginMessage::from_value(&json!("ping")), None);
        assert_eq!(PluginMessage::from_value(&json!(null)), None);
    }
}
