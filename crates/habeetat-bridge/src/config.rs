//! Bridge configuration.

use std::path::Path;

use habeetat_core::{topics, DeviceDescriptor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transport::MqttConfig;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level bridge configuration.
///
/// The static `devices` list bypasses discovery: the entries are replayed
/// through the same registration path as discovered devices once the bus
/// link is up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// MQTT broker connection
    pub mqtt: MqttConfig,

    /// Base namespace for per-device topics
    #[serde(default = "default_base_topic")]
    pub base_topic: String,

    /// Statically configured devices
    #[serde(default)]
    pub devices: Vec<DeviceDescriptor>,
}

fn default_base_topic() -> String {
    topics::DEFAULT_BASE_TOPIC.to_string()
}

impl BridgeConfig {
    pub fn new(mqtt: MqttConfig) -> Self {
        Self {
            mqtt,
            base_topic: default_base_topic(),
            devices: Vec::new(),
        }
    }

    pub fn with_base_topic(mut self, base_topic: impl Into<String>) -> Self {
        self.base_topic = base_topic.into();
        self
    }

    pub fn with_device(mut self, device: DeviceDescriptor) -> Self {
        self.devices.push(device);
        self
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
