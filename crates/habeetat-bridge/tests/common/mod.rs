//! Shared test doubles for the bridge integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use habeetat_bridge::accessory::{
    AccessoryId, AccessoryInfo, AccessoryServer, Characteristic, CharacteristicValue,
};
use habeetat_bridge::bridge::Bridge;
use habeetat_bridge::config::BridgeConfig;
use habeetat_bridge::transport::{CommandSink, MqttConfig};

/// Accessory server fake that records every interaction.
#[derive(Default)]
pub struct RecordingServer {
    /// Accessory ids pre-seeded as already present in the framework cache
    pub cached: Mutex<HashSet<AccessoryId>>,
    pub registered: Mutex<Vec<AccessoryInfo>>,
    pub refreshed: Mutex<Vec<AccessoryInfo>>,
    pub pushes: Mutex<Vec<(AccessoryId, Characteristic, CharacteristicValue)>>,
}

impl RecordingServer {
    pub fn with_cached(ids: impl IntoIterator<Item = AccessoryId>) -> Self {
        Self {
            cached: Mutex::new(ids.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Most recent push of a characteristic, regardless of accessory.
    pub fn last_push(&self, characteristic: Characteristic) -> Option<CharacteristicValue> {
        self.pushes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(_, c, _)| *c == characteristic)
            .map(|(_, _, v)| *v)
    }

    pub fn push_count(&self) -> usize {
        self.pushes.lock().unwrap().len()
    }

    pub fn registered_count(&self) -> usize {
        self.registered.lock().unwrap().len()
    }
}

impl AccessoryServer for RecordingServer {
    fn has_accessory(&self, id: AccessoryId) -> bool {
        self.cached.lock().unwrap().contains(&id)
    }

    fn register_accessory(&self, info: &AccessoryInfo) {
        self.cached.lock().unwrap().insert(info.id);
        self.registered.lock().unwrap().push(info.clone());
    }

    fn refresh_accessory(&self, info: &AccessoryInfo) {
        self.refreshed.lock().unwrap().push(info.clone());
    }

    fn push_characteristic(
        &self,
        id: AccessoryId,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) {
        self.pushes.lock().unwrap().push((id, characteristic, value));
    }
}

/// Command sink fake that records published messages.
#[derive(Default)]
pub struct RecordingSink {
    pub published: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    pub fn last(&self) -> Option<(String, String)> {
        self.published.lock().unwrap().last().cloned()
    }

    pub fn publish_count(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

impl CommandSink for RecordingSink {
    fn publish(&self, topic: &str, payload: String) {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), payload));
    }
}

/// Bridge wired to recording fakes with the default base topic.
pub fn recording_bridge() -> (Bridge, Arc<RecordingServer>, Arc<RecordingSink>) {
    recording_bridge_with(BridgeConfig::new(MqttConfig::new("localhost")))
}

pub fn recording_bridge_with(
    config: BridgeConfig,
) -> (Bridge, Arc<RecordingServer>, Arc<RecordingSink>) {
    let server = Arc::new(RecordingServer::default());
    let sink = Arc::new(RecordingSink::default());
    let bridge = Bridge::new(&config, server.clone(), sink.clone());
    (bridge, server, sink)
}
