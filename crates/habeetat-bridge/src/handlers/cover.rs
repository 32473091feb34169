//! Positional cover handler (curtains, blinds).

use std::sync::Arc;

use habeetat_core::{codec, topics, DeviceDescriptor, PositionState};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::accessory::{AccessoryHandle, Characteristic, CharacteristicValue};
use crate::transport::CommandSink;

use super::StatePayload;

#[derive(Debug)]
struct CoverState {
    /// Percent open, 0-100
    current_position: u8,
    /// Percent open, 0-100
    target_position: u8,
    position_state: PositionState,
}

impl Default for CoverState {
    fn default() -> Self {
        Self {
            current_position: 0,
            target_position: 0,
            position_state: PositionState::Stopped,
        }
    }
}

/// Position-controlled cover.
pub struct CoverHandler {
    accessory: AccessoryHandle,
    device: DeviceDescriptor,
    sink: Arc<dyn CommandSink>,
    state: CoverState,
}

impl CoverHandler {
    pub fn new(
        accessory: AccessoryHandle,
        device: DeviceDescriptor,
        sink: Arc<dyn CommandSink>,
    ) -> Self {
        Self {
            accessory,
            device,
            sink,
            state: CoverState::default(),
        }
    }

    /// Handle a framework set of the target position.
    ///
    /// The movement direction is derived from the last-known current
    /// position before the command goes out; a target equal to the current
    /// position implies no direction and leaves the state untouched.
    pub fn set_target_position(&mut self, position: u8) {
        let position = position.min(100);
        self.state.target_position = position;

        if position > self.state.current_position {
            self.state.position_state = PositionState::Increasing;
        } else if position < self.state.current_position {
            self.state.position_state = PositionState::Decreasing;
        }

        // the firmware takes position writes on a dedicated suffix
        let topic =
            topics::rewrite_command_suffix(&self.device.command_topic, topics::SET_POSITION_SUFFIX);
        self.sink.publish(&topic, position.to_string());
        debug!("Set {} TargetPosition -> {}", self.device.name, position);
    }

    pub fn position_state(&self) -> PositionState {
        self.state.position_state
    }

    pub fn read(&self, characteristic: Characteristic) -> Option<CharacteristicValue> {
        match characteristic {
            Characteristic::CurrentPosition => Some(self.state.current_position.into()),
            Characteristic::TargetPosition => Some(self.state.target_position.into()),
            Characteristic::PositionState => {
                Some((self.state.position_state.value() as i64).into())
            }
            _ => None,
        }
    }

    /// Apply an inbound bus state update.
    ///
    /// A numeric `position` reports settled movement: current and target
    /// collapse onto it and the motion state is forced to stopped. A
    /// `state` string only adjusts the motion state. Both are applied
    /// independently.
    pub fn update_state(&mut self, payload: &StatePayload) {
        let Some(object) = payload.as_object() else {
            return;
        };

        if let Some(position) = object.get("position").and_then(JsonValue::as_u64) {
            let position = position.min(100) as u8;
            self.state.current_position = position;
            self.state.target_position = position;
            self.state.position_state = PositionState::Stopped;

            self.accessory
                .push(Characteristic::CurrentPosition, position);
            self.accessory.push(Characteristic::TargetPosition, position);
            self.accessory.push(
                Characteristic::PositionState,
                self.state.position_state.value(),
            );
        }

        if let Some(JsonValue::String(motion)) = object.get("state") {
            if let Some(position_state) = codec::parse_cover_motion(motion) {
                self.state.position_state = position_state;
            }
            self.accessory.push(
                Characteristic::PositionState,
                self.state.position_state.value(),
            );
        }

        debug!(
            "Updated {} state: current={} target={} motion={:?}",
            self.device.name,
            self.state.current_position,
            self.state.target_position,
            self.state.position_state
        );
    }
}
