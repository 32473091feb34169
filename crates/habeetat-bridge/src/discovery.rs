//! Device discovery over the bus.
//!
//! The bridge firmware announces devices on the Home Assistant discovery
//! namespace: `homeassistant/<component>/habeetat_<id>/config` with a JSON
//! payload. This module turns one announcement into a canonical
//! [`DeviceDescriptor`], or rejects it.
//!
//! ## Classification
//!
//! The `<component>` topic segment picks the capability family; payload
//! hints refine it. A `light` with hue/saturation or RGB color modes is
//! color-capable, one with a brightness flag is a dimmer, otherwise it is
//! driven as a plain on/off light. A `sensor` is a temperature sensor only
//! when its `device_class` says so.

use habeetat_core::{CapabilityType, DeviceDescriptor};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

/// Parsed discovery topic components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryTopic {
    /// Component family (light, switch, cover, climate, sensor, ...)
    pub component: String,
    /// Object identifier segment (`habeetat_<id>`)
    pub object_id: String,
}

impl DiscoveryTopic {
    /// Parse a `homeassistant/<component>/<object_id>/config` topic.
    pub fn parse(topic: &str) -> Option<Self> {
        let parts: Vec<&str> = topic.split('/').collect();
        if parts.len() != 4 || parts[0] != "homeassistant" || parts[3] != "config" {
            return None;
        }

        Some(Self {
            component: parts[1].to_string(),
            object_id: parts[2].to_string(),
        })
    }
}

/// Discovery announcement payload.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryPayload {
    pub unique_id: Option<String>,
    pub name: Option<String>,

    #[serde(default)]
    pub state_topic: Option<String>,

    #[serde(default)]
    pub command_topic: Option<String>,

    /// Color modes supported by a light component
    #[serde(default)]
    pub supported_color_modes: Option<Vec<String>>,

    /// Brightness capability flag; the firmware publishes `true`
    #[serde(default)]
    pub brightness: Option<JsonValue>,

    #[serde(default)]
    pub device_class: Option<String>,

    #[serde(default)]
    pub device: Option<DiscoveryDeviceInfo>,
}

/// Device block of a discovery announcement.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryDeviceInfo {
    #[serde(default)]
    pub manufacturer: Option<String>,

    #[serde(default)]
    pub model: Option<String>,
}

impl DiscoveryPayload {
    fn supports_color(&self) -> bool {
        self.supported_color_modes
            .as_deref()
            .is_some_and(|modes| modes.iter().any(|m| m == "hs" || m == "rgb"))
    }

    fn declares_brightness(&self) -> bool {
        match &self.brightness {
            None | Some(JsonValue::Null) | Some(JsonValue::Bool(false)) => false,
            Some(_) => true,
        }
    }
}

/// Resolve a discovery announcement into a device descriptor.
///
/// Returns `None` when the payload is unparseable, lacks a stable
/// identity or name, or names an unknown component family. Rejection has
/// no side effect beyond a debug log.
pub fn resolve(topic: &str, payload: &[u8]) -> Option<DeviceDescriptor> {
    let parsed_topic = DiscoveryTopic::parse(topic)?;

    let announcement: DiscoveryPayload = match serde_json::from_slice(payload) {
        Ok(a) => a,
        Err(e) => {
            debug!("Failed to parse discovery message on {}: {}", topic, e);
            return None;
        }
    };

    let unique_id = announcement.unique_id.clone()?;
    let name = announcement.name.clone()?;

    let capability = match parsed_topic.component.as_str() {
        "light" => {
            if announcement.supports_color() {
                CapabilityType::Rgb
            } else if announcement.declares_brightness() {
                CapabilityType::Dimmer
            } else {
                CapabilityType::Light
            }
        }
        "switch" => CapabilityType::Switch,
        "cover" => CapabilityType::Cover,
        "climate" => CapabilityType::Climate,
        "sensor" => {
            if announcement.device_class.as_deref() == Some("temperature") {
                CapabilityType::TemperatureSensor
            } else {
                CapabilityType::LightSensor
            }
        }
        other => {
            debug!("Unknown component type: {}", other);
            return None;
        }
    };

    let device_info = announcement.device.as_ref();

    Some(DeviceDescriptor {
        unique_id,
        name,
        capability,
        state_topic: announcement.state_topic.unwrap_or_default(),
        command_topic: announcement.command_topic.unwrap_or_default(),
        manufacturer: device_info
            .and_then(|d| d.manufacturer.clone())
            .or_else(|| Some(habeetat_core::DEFAULT_MANUFACTURER.to_string())),
        model: device_info
            .and_then(|d| d.model.clone())
            .or_else(|| Some(habeetat_core::DEFAULT_MODEL.to_string())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPIC: &str = "homeassistant/light/habeetat_d1/config";

    #[test]
    fn test_topic_parsing() {
        let parsed = DiscoveryTopic::parse(TOPIC).unwrap();
        assert_eq!(parsed.component, "light");
        assert_eq!(parsed.object_id, "habeetat_d1");

        assert!(DiscoveryTopic::parse("homeassistant/light/habeetat_d1/state").is_none());
        assert!(DiscoveryTopic::parse("other/light/habeetat_d1/config").is_none());
        assert!(DiscoveryTopic::parse("homeassistant/light/config").is_none());
    }

    #[test]
    fn test_color_light_classification() {
        let device = resolve(
            TOPIC,
            br#"{"unique_id":"d1","name":"Lamp","supported_color_modes":["hs"],"brightness":true}"#,
        )
        .unwrap();
        // color modes win over the brightness hint
        assert_eq!(device.capability, CapabilityType::Rgb);
    }

    #[test]
    fn test_dimmer_classification() {
        let device = resolve(TOPIC, br#"{"unique_id":"d1","name":"Lamp","brightness":true}"#)
            .unwrap();
        assert_eq!(device.capability, CapabilityType::Dimmer);
    }

    #[test]
    fn test_plain_light_classification() {
        let device = resolve(TOPIC, br#"{"unique_id":"d1","name":"Lamp"}"#).unwrap();
        assert_eq!(device.capability, CapabilityType::Light);

        let device = resolve(
            TOPIC,
            br#"{"unique_id":"d1","name":"Lamp","brightness":false}"#,
        )
        .unwrap();
        assert_eq!(device.capability, CapabilityType::Light);
    }

    #[test]
    fn test_sensor_classification() {
        let device = resolve(
            "homeassistant/sensor/habeetat_t1/config",
            br#"{"unique_id":"t1","name":"Probe","device_class":"temperature"}"#,
        )
        .unwrap();
        assert_eq!(device.capability, CapabilityType::TemperatureSensor);

        let device = resolve(
            "homeassistant/sensor/habeetat_l1/config",
            br#"{"unique_id":"l1","name":"Lux"}"#,
        )
        .unwrap();
        assert_eq!(device.capability, CapabilityType::LightSensor);
    }

    #[test]
    fn test_rejects_missing_identity() {
        assert!(resolve(TOPIC, br#"{"name":"Lamp"}"#).is_none());
        assert!(resolve(TOPIC, br#"{"unique_id":"d1"}"#).is_none());
    }

    #[test]
    fn test_rejects_malformed_payload() {
        assert!(resolve(TOPIC, b"not json").is_none());
        assert!(resolve(TOPIC, br#"{"unique_id": 12}"#).is_none());
    }

    #[test]
    fn test_rejects_unknown_component() {
        assert!(resolve(
            "homeassistant/vacuum/habeetat_v1/config",
            br#"{"unique_id":"v1","name":"Robot"}"#,
        )
        .is_none());
    }

    #[test]
    fn test_device_info_and_fallbacks() {
        let device = resolve(
            "homeassistant/switch/habeetat_s1/config",
            br#"{
                "unique_id": "s1",
                "name": "Relay",
                "state_topic": "habeetat/s1/state",
                "command_topic": "habeetat/s1/set",
                "device": {"manufacturer": "Acme", "model": "R-100"}
            }"#,
        )
        .unwrap();
        assert_eq!(device.manufacturer.as_deref(), Some("Acme"));
        assert_eq!(device.model.as_deref(), Some("R-100"));
        assert_eq!(device.state_topic, "habeetat/s1/state");

        let device = resolve(
            "homeassistant/switch/habeetat_s2/config",
            br#"{"unique_id":"s2","name":"Relay"}"#,
        )
        .unwrap();
        assert_eq!(device.manufacturer.as_deref(), Some("Solidmation"));
        assert_eq!(device.model.as_deref(), Some("Habeetat"));
        assert_eq!(device.command_topic, "");
    }
}
