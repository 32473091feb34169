//! Device descriptor and accessory-domain value types.

use serde::{Deserialize, Serialize};

/// Manufacturer reported when a discovery announcement omits one.
pub const DEFAULT_MANUFACTURER: &str = "Solidmation";

/// Model reported when a discovery announcement omits one.
pub const DEFAULT_MODEL: &str = "Habeetat";

/// Capability classification for a discovered device.
///
/// The variants are the wire strings used by the Habeetat bridge firmware
/// in discovery announcements and static configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityType {
    /// On/off relay
    Switch,
    /// Non-dimmable light (driven as a plain on/off switch)
    Light,
    /// Brightness-capable light
    Dimmer,
    /// Color-capable light
    Rgb,
    /// Color-capable light (alternate firmware designation)
    RgbLight,
    /// Positional cover
    Cover,
    /// Positional cover (alternate firmware designation)
    Curtain,
    /// HVAC unit
    Climate,
    /// Read-only temperature probe
    TemperatureSensor,
    /// Ambient light probe (announced by the firmware, no accessory mapping)
    LightSensor,
}

impl std::fmt::Display for CapabilityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Switch => write!(f, "switch"),
            Self::Light => write!(f, "light"),
            Self::Dimmer => write!(f, "dimmer"),
            Self::Rgb => write!(f, "rgb"),
            Self::RgbLight => write!(f, "rgb_light"),
            Self::Cover => write!(f, "cover"),
            Self::Curtain => write!(f, "curtain"),
            Self::Climate => write!(f, "climate"),
            Self::TemperatureSensor => write!(f, "temperature_sensor"),
            Self::LightSensor => write!(f, "light_sensor"),
        }
    }
}

impl CapabilityType {
    /// Whether the capability carries color state.
    pub fn is_color(&self) -> bool {
        matches!(self, Self::Rgb | Self::RgbLight)
    }
}

/// Normalized description of one discovered device.
///
/// Immutable once created. `unique_id` is the stable external identity;
/// the bridge derives the persistent accessory identifier from it, so it
/// must never change for a given physical device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Stable external identity, unique within a registry
    pub unique_id: String,

    /// Display name
    pub name: String,

    /// Capability classification
    #[serde(rename = "type")]
    pub capability: CapabilityType,

    /// Topic the device publishes state on
    #[serde(default)]
    pub state_topic: String,

    /// Topic the device accepts commands on
    #[serde(default)]
    pub command_topic: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl DeviceDescriptor {
    /// Manufacturer with the firmware fallback applied.
    pub fn manufacturer(&self) -> &str {
        self.manufacturer.as_deref().unwrap_or(DEFAULT_MANUFACTURER)
    }

    /// Model with the firmware fallback applied.
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Movement state of a positional cover.
///
/// Discriminants are the accessory framework's wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PositionState {
    Decreasing = 0,
    Increasing = 1,
    Stopped = 2,
}

impl PositionState {
    /// Framework wire value.
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Heating/cooling state of a thermostat.
///
/// Discriminants are the accessory framework's wire values. `Auto` only
/// arrives from the framework side; bus state never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum HeatingCoolingState {
    Off = 0,
    Heat = 1,
    Cool = 2,
    Auto = 3,
}

impl HeatingCoolingState {
    /// Framework wire value.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Parse a framework wire value. `Auto` is accepted on input only.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Off),
            1 => Some(Self::Heat),
            2 => Some(Self::Cool),
            3 => Some(Self::Auto),
            _ => None,
        }
    }
}
