//! Read-only temperature sensor handler.

use habeetat_core::DeviceDescriptor;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::accessory::{AccessoryHandle, Characteristic, CharacteristicValue};

use super::StatePayload;

/// Lowest reportable reading, Celsius.
pub const MIN_TEMPERATURE: f64 = -40.0;

/// Highest reportable reading, Celsius.
pub const MAX_TEMPERATURE: f64 = 100.0;

/// Temperature readings from a probe. No command topic; state only.
pub struct TemperatureSensorHandler {
    accessory: AccessoryHandle,
    device: DeviceDescriptor,
    /// Celsius
    current_temperature: f64,
}

impl TemperatureSensorHandler {
    pub fn new(accessory: AccessoryHandle, device: DeviceDescriptor) -> Self {
        Self {
            accessory,
            device,
            current_temperature: 20.0,
        }
    }

    pub fn current_temperature(&self) -> f64 {
        self.current_temperature
    }

    pub fn read(&self, characteristic: Characteristic) -> Option<CharacteristicValue> {
        match characteristic {
            Characteristic::CurrentTemperature => Some(self.current_temperature.into()),
            _ => None,
        }
    }

    /// Apply an inbound bus reading.
    ///
    /// Accepts a bare number, a parseable numeric string, or a structured
    /// payload with a `state` field of either shape. Anything that does
    /// not parse to a finite number is ignored: no mirror update, no push.
    pub fn update_state(&mut self, payload: &StatePayload) {
        let Some(reading) = extract_reading(payload) else {
            debug!(
                "Ignoring non-numeric reading for {}: {:?}",
                self.device.name, payload
            );
            return;
        };

        self.current_temperature = reading.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
        self.accessory
            .push(Characteristic::CurrentTemperature, self.current_temperature);
        debug!(
            "Updated {} temperature: {}",
            self.device.name, self.current_temperature
        );
    }
}

fn extract_reading(payload: &StatePayload) -> Option<f64> {
    let value = match payload {
        StatePayload::Text(s) => s.trim().parse::<f64>().ok()?,
        StatePayload::Json(value) => match value {
            JsonValue::Number(n) => n.as_f64()?,
            JsonValue::Object(object) => match object.get("state")? {
                JsonValue::Number(n) => n.as_f64()?,
                JsonValue::String(s) => s.trim().parse::<f64>().ok()?,
                _ => return None,
            },
            _ => return None,
        },
    };

    value.is_finite().then_some(value)
}
