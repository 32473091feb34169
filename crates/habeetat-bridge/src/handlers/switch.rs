//! On/off handler for switches and non-dimmable lights.

use std::sync::Arc;

use habeetat_core::{codec, DeviceDescriptor};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::accessory::{AccessoryHandle, Characteristic, CharacteristicValue};
use crate::transport::CommandSink;

use super::StatePayload;

#[derive(Debug, Default)]
struct SwitchState {
    on: bool,
}

/// Simple on/off control.
pub struct SwitchHandler {
    accessory: AccessoryHandle,
    device: DeviceDescriptor,
    sink: Arc<dyn CommandSink>,
    state: SwitchState,
}

impl SwitchHandler {
    pub fn new(
        accessory: AccessoryHandle,
        device: DeviceDescriptor,
        sink: Arc<dyn CommandSink>,
    ) -> Self {
        Self {
            accessory,
            device,
            sink,
            state: SwitchState::default(),
        }
    }

    /// Handle a framework set of the On characteristic.
    pub fn set_on(&mut self, on: bool) {
        self.state.on = on;
        self.sink.publish(
            &self.device.command_topic,
            codec::encode_on_off(on).to_string(),
        );
        debug!("Set {} On -> {}", self.device.name, on);
    }

    pub fn on(&self) -> bool {
        self.state.on
    }

    pub fn read(&self, characteristic: Characteristic) -> Option<CharacteristicValue> {
        match characteristic {
            Characteristic::On => Some(self.state.on.into()),
            _ => None,
        }
    }

    /// Apply an inbound bus state update.
    ///
    /// Accepts either a bare `"ON"`/`"OFF"` string or a structured payload
    /// with a `state` field.
    pub fn update_state(&mut self, payload: &StatePayload) {
        match payload {
            StatePayload::Text(s) => {
                self.state.on = codec::parse_on_off(s);
            }
            StatePayload::Json(value) => {
                if let Some(JsonValue::String(s)) = value.get("state") {
                    self.state.on = codec::parse_on_off(s);
                }
            }
        }

        self.accessory.push(Characteristic::On, self.state.on);
        debug!("Updated {} state: on={}", self.device.name, self.state.on);
    }
}
