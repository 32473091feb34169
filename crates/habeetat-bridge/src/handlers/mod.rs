//! Capability handlers.
//!
//! One handler per supported device class. Each owns the accessory-domain
//! state mirror for its device, translates between that mirror and bus
//! payloads, and is the only component allowed to touch either. Handlers
//! are constructed with the accessory handle, the device descriptor, and
//! the bus publish capability; inbound synchronization enters through
//! [`DeviceHandler::update_state`], outbound user commands through
//! [`DeviceHandler::write`].

mod cover;
mod light;
mod switch;
mod temperature;
mod thermostat;

pub use cover::CoverHandler;
pub use light::LightHandler;
pub use switch::SwitchHandler;
pub use temperature::TemperatureSensorHandler;
pub use thermostat::ThermostatHandler;

use std::sync::Arc;

use habeetat_core::{CapabilityType, DeviceDescriptor, HeatingCoolingState};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::accessory::{AccessoryHandle, Characteristic, CharacteristicValue, ServiceKind};
use crate::transport::CommandSink;

/// Inbound state payload, structured when possible.
///
/// The bridge tolerates both JSON and bare-string payloads on state
/// topics: JSON parse is attempted first and the raw string is passed
/// through unchanged on failure. A JSON-encoded bare string normalizes to
/// the text form, since nothing downstream distinguishes the two.
#[derive(Debug, Clone, PartialEq)]
pub enum StatePayload {
    Json(JsonValue),
    Text(String),
}

impl StatePayload {
    pub fn parse(raw: &[u8]) -> Self {
        match serde_json::from_slice::<JsonValue>(raw) {
            Ok(JsonValue::String(s)) => Self::Text(s),
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(String::from_utf8_lossy(raw).into_owned()),
        }
    }

    /// Structured object view, if any.
    pub fn as_object(&self) -> Option<&serde_json::Map<String, JsonValue>> {
        match self {
            Self::Json(value) => value.as_object(),
            Self::Text(_) => None,
        }
    }
}

/// User-issued set operation routed from the framework.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CharacteristicWrite {
    On(bool),
    Brightness(u8),
    Hue(f64),
    Saturation(f64),
    TargetPosition(u8),
    TargetTemperature(f64),
    TargetHeatingCoolingState(HeatingCoolingState),
}

/// Closed dispatch over the supported device classes.
///
/// Unsupported capability types are a reachable, handled case: construction
/// returns `None` and the synchronizer skips the device.
pub enum DeviceHandler {
    Switch(SwitchHandler),
    Light(LightHandler),
    Cover(CoverHandler),
    Thermostat(ThermostatHandler),
    TemperatureSensor(TemperatureSensorHandler),
}

impl DeviceHandler {
    /// Build the handler for a device's capability class.
    pub fn new(
        accessory: AccessoryHandle,
        device: DeviceDescriptor,
        sink: Arc<dyn CommandSink>,
    ) -> Option<Self> {
        match device.capability {
            // non-dimmable lights are driven as plain switches
            CapabilityType::Switch | CapabilityType::Light => {
                Some(Self::Switch(SwitchHandler::new(accessory, device, sink)))
            }
            CapabilityType::Dimmer | CapabilityType::Rgb | CapabilityType::RgbLight => {
                Some(Self::Light(LightHandler::new(accessory, device, sink)))
            }
            CapabilityType::Cover | CapabilityType::Curtain => {
                Some(Self::Cover(CoverHandler::new(accessory, device, sink)))
            }
            CapabilityType::Climate => Some(Self::Thermostat(ThermostatHandler::new(
                accessory, device, sink,
            ))),
            CapabilityType::TemperatureSensor => Some(Self::TemperatureSensor(
                TemperatureSensorHandler::new(accessory, device),
            )),
            CapabilityType::LightSensor => {
                warn!("Unsupported device type: {}", device.capability);
                None
            }
        }
    }

    /// Primary service this handler exposes.
    pub fn service_kind(&self) -> ServiceKind {
        match self {
            Self::Switch(_) => ServiceKind::Switch,
            Self::Light(_) => ServiceKind::Lightbulb,
            Self::Cover(_) => ServiceKind::WindowCovering,
            Self::Thermostat(_) => ServiceKind::Thermostat,
            Self::TemperatureSensor(_) => ServiceKind::TemperatureSensor,
        }
    }

    /// Apply an inbound state payload to the mirror and the accessory.
    pub fn update_state(&mut self, payload: &StatePayload) {
        match self {
            Self::Switch(h) => h.update_state(payload),
            Self::Light(h) => h.update_state(payload),
            Self::Cover(h) => h.update_state(payload),
            Self::Thermostat(h) => h.update_state(payload),
            Self::TemperatureSensor(h) => h.update_state(payload),
        }
    }

    /// Apply a user-issued set operation.
    ///
    /// Writes a handler class does not support are dropped with a debug
    /// notice; the framework never learns about characteristics that were
    /// not registered for the class, so these only occur on misrouted
    /// traffic.
    pub fn write(&mut self, write: CharacteristicWrite) {
        match (self, write) {
            (Self::Switch(h), CharacteristicWrite::On(v)) => h.set_on(v),

            (Self::Light(h), CharacteristicWrite::On(v)) => h.set_on(v),
            (Self::Light(h), CharacteristicWrite::Brightness(v)) => h.set_brightness(v),
            (Self::Light(h), CharacteristicWrite::Hue(v)) => h.set_hue(v),
            (Self::Light(h), CharacteristicWrite::Saturation(v)) => h.set_saturation(v),

            (Self::Cover(h), CharacteristicWrite::TargetPosition(v)) => h.set_target_position(v),

            (Self::Thermostat(h), CharacteristicWrite::TargetTemperature(v)) => {
                h.set_target_temperature(v)
            }
            (Self::Thermostat(h), CharacteristicWrite::TargetHeatingCoolingState(v)) => {
                h.set_target_heating_cooling_state(v)
            }

            (handler, write) => {
                debug!(
                    "Ignoring unsupported write {:?} for {} handler",
                    write,
                    handler.service_kind()
                );
            }
        }
    }

    /// Read a characteristic from the mirror.
    pub fn read(&self, characteristic: Characteristic) -> Option<CharacteristicValue> {
        match self {
            Self::Switch(h) => h.read(characteristic),
            Self::Light(h) => h.read(characteristic),
            Self::Cover(h) => h.read(characteristic),
            Self::Thermostat(h) => h.read(characteristic),
            Self::TemperatureSensor(h) => h.read(characteristic),
        }
    }
}
