//! Dimmable and color light handler.

use std::sync::Arc;

use habeetat_core::{codec, DeviceDescriptor};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::accessory::{AccessoryHandle, Characteristic, CharacteristicValue};
use crate::transport::CommandSink;

use super::StatePayload;

#[derive(Debug)]
struct LightState {
    on: bool,
    /// Percent scale, 0-100
    brightness: u8,
    /// Degrees, 0-360
    hue: f64,
    /// Percent scale, 0-100
    saturation: f64,
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            on: false,
            brightness: 100,
            hue: 0.0,
            saturation: 0.0,
        }
    }
}

/// Brightness- and optionally color-capable light.
///
/// Every set operation republishes the entire current state as one
/// structured payload; the firmware applies whatever subset it supports.
pub struct LightHandler {
    accessory: AccessoryHandle,
    device: DeviceDescriptor,
    sink: Arc<dyn CommandSink>,
    state: LightState,
    /// Fixed at construction from the capability type
    is_color: bool,
}

impl LightHandler {
    pub fn new(
        accessory: AccessoryHandle,
        device: DeviceDescriptor,
        sink: Arc<dyn CommandSink>,
    ) -> Self {
        let is_color = device.capability.is_color();
        Self {
            accessory,
            device,
            sink,
            state: LightState::default(),
            is_color,
        }
    }

    pub fn is_color(&self) -> bool {
        self.is_color
    }

    pub fn set_on(&mut self, on: bool) {
        self.state.on = on;
        self.publish_state();
        debug!("Set {} On -> {}", self.device.name, on);
    }

    pub fn set_brightness(&mut self, percent: u8) {
        self.state.brightness = percent.min(100);
        self.publish_state();
        debug!("Set {} Brightness -> {}", self.device.name, percent);
    }

    pub fn set_hue(&mut self, hue: f64) {
        if !self.is_color {
            debug!("Ignoring hue write for non-color light {}", self.device.name);
            return;
        }
        self.state.hue = hue;
        self.publish_state();
        debug!("Set {} Hue -> {}", self.device.name, hue);
    }

    pub fn set_saturation(&mut self, saturation: f64) {
        if !self.is_color {
            debug!(
                "Ignoring saturation write for non-color light {}",
                self.device.name
            );
            return;
        }
        self.state.saturation = saturation;
        self.publish_state();
        debug!("Set {} Saturation -> {}", self.device.name, saturation);
    }

    pub fn read(&self, characteristic: Characteristic) -> Option<CharacteristicValue> {
        match characteristic {
            Characteristic::On => Some(self.state.on.into()),
            Characteristic::Brightness => Some(self.state.brightness.into()),
            Characteristic::Hue if self.is_color => Some(self.state.hue.into()),
            Characteristic::Saturation if self.is_color => Some(self.state.saturation.into()),
            _ => None,
        }
    }

    /// Publish the full current state to the command topic.
    fn publish_state(&self) {
        let mut payload = serde_json::json!({
            "state": codec::encode_on_off(self.state.on),
            "brightness": codec::percent_to_raw(self.state.brightness),
        });

        if self.is_color {
            payload["hs_color"] = codec::encode_hs_color(self.state.hue, self.state.saturation);
        }

        self.sink
            .publish(&self.device.command_topic, payload.to_string());
    }

    /// Apply an inbound bus state update.
    ///
    /// `state`, `brightness` and `hs_color` are applied independently; a
    /// payload may carry any subset.
    pub fn update_state(&mut self, payload: &StatePayload) {
        let Some(object) = payload.as_object() else {
            return;
        };

        if let Some(JsonValue::String(s)) = object.get("state") {
            self.state.on = codec::parse_on_off(s);
            self.accessory.push(Characteristic::On, self.state.on);
        }

        if let Some(raw) = object.get("brightness").and_then(JsonValue::as_u64) {
            self.state.brightness = codec::raw_to_percent(raw.min(255) as u8);
            self.accessory
                .push(Characteristic::Brightness, self.state.brightness);
        }

        if self.is_color {
            if let Some((hue, saturation)) = object.get("hs_color").and_then(codec::parse_hs_color)
            {
                self.state.hue = hue;
                self.state.saturation = saturation;
                self.accessory.push(Characteristic::Hue, hue);
                self.accessory.push(Characteristic::Saturation, saturation);
            }
        }

        debug!(
            "Updated {} state: on={} brightness={} hue={} saturation={}",
            self.device.name,
            self.state.on,
            self.state.brightness,
            self.state.hue,
            self.state.saturation
        );
    }
}
