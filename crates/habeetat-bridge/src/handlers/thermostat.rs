//! Thermostat handler for climate devices.

use std::sync::Arc;

use habeetat_core::{codec::HvacMode, topics, DeviceDescriptor, HeatingCoolingState};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::accessory::{AccessoryHandle, Characteristic, CharacteristicValue};
use crate::transport::CommandSink;

use super::StatePayload;

/// Lowest settable target temperature, Celsius.
pub const MIN_TARGET_TEMPERATURE: f64 = 16.0;

/// Highest settable target temperature, Celsius.
pub const MAX_TARGET_TEMPERATURE: f64 = 30.0;

/// Target temperature granularity, Celsius.
pub const TARGET_TEMPERATURE_STEP: f64 = 0.5;

#[derive(Debug)]
struct ThermostatState {
    /// Celsius
    current_temperature: f64,
    /// Celsius
    target_temperature: f64,
    current_heating_cooling_state: HeatingCoolingState,
    target_heating_cooling_state: HeatingCoolingState,
}

impl Default for ThermostatState {
    fn default() -> Self {
        Self {
            current_temperature: 20.0,
            target_temperature: 22.0,
            current_heating_cooling_state: HeatingCoolingState::Off,
            target_heating_cooling_state: HeatingCoolingState::Off,
        }
    }
}

/// HVAC control with heating, cooling, and fan modes.
pub struct ThermostatHandler {
    accessory: AccessoryHandle,
    device: DeviceDescriptor,
    sink: Arc<dyn CommandSink>,
    state: ThermostatState,
}

impl ThermostatHandler {
    pub fn new(
        accessory: AccessoryHandle,
        device: DeviceDescriptor,
        sink: Arc<dyn CommandSink>,
    ) -> Self {
        Self {
            accessory,
            device,
            sink,
            state: ThermostatState::default(),
        }
    }

    /// Handle a framework set of the target temperature.
    ///
    /// Values are snapped to the settable grid before they go out.
    pub fn set_target_temperature(&mut self, celsius: f64) {
        let celsius = ((celsius / TARGET_TEMPERATURE_STEP).round() * TARGET_TEMPERATURE_STEP)
            .clamp(MIN_TARGET_TEMPERATURE, MAX_TARGET_TEMPERATURE);
        self.state.target_temperature = celsius;

        let topic = topics::rewrite_command_suffix(
            &self.device.command_topic,
            topics::SET_TEMPERATURE_SUFFIX,
        );
        self.sink.publish(&topic, celsius.to_string());
        debug!("Set {} TargetTemperature -> {}", self.device.name, celsius);
    }

    /// Handle a framework set of the target heating/cooling state.
    pub fn set_target_heating_cooling_state(&mut self, state: HeatingCoolingState) {
        self.state.target_heating_cooling_state = state;

        let mode = state.command_mode();
        let topic =
            topics::rewrite_command_suffix(&self.device.command_topic, topics::SET_MODE_SUFFIX);
        self.sink.publish(&topic, mode.as_str().to_string());
        debug!(
            "Set {} TargetHeatingCoolingState -> {:?} ({})",
            self.device.name, state, mode
        );
    }

    pub fn read(&self, characteristic: Characteristic) -> Option<CharacteristicValue> {
        match characteristic {
            Characteristic::CurrentTemperature => Some(self.state.current_temperature.into()),
            Characteristic::TargetTemperature => Some(self.state.target_temperature.into()),
            Characteristic::CurrentHeatingCoolingState => {
                Some((self.state.current_heating_cooling_state.value() as i64).into())
            }
            Characteristic::TargetHeatingCoolingState => {
                Some((self.state.target_heating_cooling_state.value() as i64).into())
            }
            _ => None,
        }
    }

    /// Apply an inbound bus state update.
    ///
    /// `current_temperature`, `temperature` and `mode` are applied
    /// independently. A recognized mode string updates both the current
    /// and the target mirror; the firmware reports no separate action.
    pub fn update_state(&mut self, payload: &StatePayload) {
        let Some(object) = payload.as_object() else {
            return;
        };

        if let Some(current) = object.get("current_temperature").and_then(JsonValue::as_f64) {
            self.state.current_temperature = current;
            self.accessory
                .push(Characteristic::CurrentTemperature, current);
        }

        if let Some(target) = object.get("temperature").and_then(JsonValue::as_f64) {
            self.state.target_temperature = target;
            self.accessory.push(Characteristic::TargetTemperature, target);
        }

        if let Some(JsonValue::String(mode)) = object.get("mode") {
            match HvacMode::parse(mode) {
                Some(mode) => {
                    let state = mode.heating_cooling_state();
                    self.state.target_heating_cooling_state = state;
                    self.state.current_heating_cooling_state = state;

                    self.accessory.push(
                        Characteristic::TargetHeatingCoolingState,
                        state.value(),
                    );
                    self.accessory.push(
                        Characteristic::CurrentHeatingCoolingState,
                        state.value(),
                    );
                }
                None => {
                    debug!("Unknown mode '{}' for {}", mode, self.device.name);
                }
            }
        }

        debug!(
            "Updated {} state: current={} target={} mode={:?}",
            self.device.name,
            self.state.current_temperature,
            self.state.target_temperature,
            self.state.current_heating_cooling_state
        );
    }
}
