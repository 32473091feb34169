//! Discovery, registration, and routing tests for the synchronizer.

mod common;

use std::sync::Arc;

use common::{recording_bridge, recording_bridge_with, RecordingServer, RecordingSink};
use habeetat_bridge::accessory::{accessory_id, Characteristic, CharacteristicValue, ServiceKind};
use habeetat_bridge::bridge::{Bridge, BridgeEvent, LinkState};
use habeetat_bridge::config::BridgeConfig;
use habeetat_bridge::transport::MqttConfig;
use habeetat_core::{CapabilityType, DeviceDescriptor};

const LAMP_DISCOVERY_TOPIC: &str = "homeassistant/light/habeetat_d1/config";
const LAMP_DISCOVERY: &[u8] = br#"{
    "unique_id": "d1",
    "name": "Lamp",
    "state_topic": "habeetat/d1/state",
    "command_topic": "habeetat/d1/set",
    "supported_color_modes": ["hs"]
}"#;

#[test]
fn discovered_color_light_is_registered_and_synchronized() {
    let (mut bridge, server, _sink) = recording_bridge();

    bridge.handle_message(LAMP_DISCOVERY_TOPIC, LAMP_DISCOVERY);

    assert_eq!(bridge.device_count(), 1);
    let descriptor = bridge.descriptor("d1").unwrap();
    assert_eq!(descriptor.name, "Lamp");
    assert_eq!(descriptor.capability, CapabilityType::Rgb);

    let registered = server.registered.lock().unwrap();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].service, ServiceKind::Lightbulb);
    assert_eq!(registered[0].serial_number, "d1");
    drop(registered);

    // a follow-up state message lands in the mirror in accessory units
    bridge.handle_message(
        "habeetat/d1/state",
        br#"{"state":"ON","brightness":128,"hs_color":[180,50]}"#,
    );

    assert_eq!(
        bridge.read_characteristic("d1", Characteristic::On),
        Some(CharacteristicValue::Bool(true))
    );
    assert_eq!(
        bridge.read_characteristic("d1", Characteristic::Brightness),
        Some(CharacteristicValue::Int(50))
    );
    assert_eq!(
        bridge.read_characteristic("d1", Characteristic::Hue),
        Some(CharacteristicValue::Float(180.0))
    );
    assert_eq!(
        bridge.read_characteristic("d1", Characteristic::Saturation),
        Some(CharacteristicValue::Float(50.0))
    );
}

#[test]
fn duplicate_announcements_register_once() {
    let (mut bridge, server, _sink) = recording_bridge();

    bridge.handle_message(LAMP_DISCOVERY_TOPIC, LAMP_DISCOVERY);
    bridge.handle_message(LAMP_DISCOVERY_TOPIC, LAMP_DISCOVERY);

    assert_eq!(bridge.device_count(), 1);
    assert_eq!(server.registered_count(), 1);
}

#[test]
fn reannouncement_with_different_fields_is_ignored() {
    let (mut bridge, server, _sink) = recording_bridge();

    bridge.handle_message(LAMP_DISCOVERY_TOPIC, LAMP_DISCOVERY);
    bridge.handle_message(
        "homeassistant/switch/habeetat_d1/config",
        br#"{"unique_id":"d1","name":"Renamed","command_topic":"habeetat/other/set"}"#,
    );

    assert_eq!(bridge.device_count(), 1);
    assert_eq!(server.registered_count(), 1);
    let descriptor = bridge.descriptor("d1").unwrap();
    assert_eq!(descriptor.name, "Lamp");
    assert_eq!(descriptor.capability, CapabilityType::Rgb);
}

#[test]
fn cached_accessory_is_restored_not_duplicated() {
    let server = Arc::new(RecordingServer::with_cached([accessory_id("d1")]));
    let sink = Arc::new(RecordingSink::default());
    let config = BridgeConfig::new(MqttConfig::new("localhost"));
    let mut bridge = Bridge::new(&config, server.clone(), sink);

    bridge.handle_message(LAMP_DISCOVERY_TOPIC, LAMP_DISCOVERY);

    assert_eq!(bridge.device_count(), 1);
    assert_eq!(server.registered_count(), 0);
    let refreshed = server.refreshed.lock().unwrap();
    assert_eq!(refreshed.len(), 1);
    assert_eq!(refreshed[0].id, accessory_id("d1"));
    assert_eq!(refreshed[0].name, "Lamp");

    // the restored binding is live
    drop(refreshed);
    bridge.handle_message("habeetat/d1/state", br#"{"state":"ON"}"#);
    assert_eq!(
        bridge.read_characteristic("d1", Characteristic::On),
        Some(CharacteristicValue::Bool(true))
    );
}

#[test]
fn static_devices_replay_through_registration() {
    let config = BridgeConfig::new(MqttConfig::new("localhost")).with_device(DeviceDescriptor {
        unique_id: "relay1".to_string(),
        name: "Garden Pump".to_string(),
        capability: CapabilityType::Switch,
        state_topic: "habeetat/relay1/state".to_string(),
        command_topic: "habeetat/relay1/set".to_string(),
        manufacturer: None,
        model: None,
    });
    let (mut bridge, server, sink) = recording_bridge_with(config);

    bridge.on_connecting();
    bridge.on_subscribed();
    bridge.activate();

    assert_eq!(bridge.link_state(), LinkState::Active);
    assert_eq!(bridge.device_count(), 1);
    assert_eq!(server.registered_count(), 1);

    // the static device behaves exactly like a discovered one
    bridge.handle_write("relay1", habeetat_bridge::CharacteristicWrite::On(true));
    assert_eq!(
        sink.last(),
        Some(("habeetat/relay1/set".to_string(), "ON".to_string()))
    );
}

#[test]
fn unsupported_sensor_class_is_dropped() {
    let (mut bridge, server, _sink) = recording_bridge();

    // a sensor without a temperature device_class has no accessory mapping
    bridge.handle_message(
        "homeassistant/sensor/habeetat_l1/config",
        br#"{"unique_id":"l1","name":"Lux"}"#,
    );

    assert_eq!(bridge.device_count(), 0);
    assert_eq!(server.registered_count(), 0);
}

#[test]
fn malformed_and_unknown_messages_are_dropped() {
    let (mut bridge, server, _sink) = recording_bridge();

    bridge.handle_message(LAMP_DISCOVERY_TOPIC, b"not json");
    bridge.handle_message("homeassistant/vacuum/habeetat_v1/config", br#"{"unique_id":"v1","name":"Robot"}"#);
    bridge.handle_message("somewhere/else/entirely", b"payload");
    bridge.handle_message("habeetat/ghost/state", br#"{"state":"ON"}"#);

    assert_eq!(bridge.device_count(), 0);
    assert_eq!(server.registered_count(), 0);
    assert_eq!(server.push_count(), 0);
}

#[test]
fn custom_base_topic_routes_state() {
    let config = BridgeConfig::new(MqttConfig::new("localhost")).with_base_topic("home");
    let (mut bridge, _server, _sink) = recording_bridge_with(config);

    assert_eq!(bridge.subscriptions()[0], "home/+/state");

    bridge.handle_message(
        "homeassistant/switch/habeetat_s1/config",
        br#"{"unique_id":"s1","name":"Relay","command_topic":"home/s1/set"}"#,
    );
    bridge.handle_message("home/s1/state", b"ON");
    assert_eq!(
        bridge.read_characteristic("s1", Characteristic::On),
        Some(CharacteristicValue::Bool(true))
    );

    // the old namespace no longer routes
    bridge.handle_message("habeetat/s1/state", b"OFF");
    assert_eq!(
        bridge.read_characteristic("s1", Characteristic::On),
        Some(CharacteristicValue::Bool(true))
    );
}

#[test]
fn discovery_and_link_transitions_emit_events() {
    let (mut bridge, _server, _sink) = recording_bridge();
    let mut events = bridge.events();

    bridge.on_connecting();
    bridge.on_subscribed();
    bridge.handle_message(LAMP_DISCOVERY_TOPIC, LAMP_DISCOVERY);
    bridge.activate();

    let mut discovered = Vec::new();
    let mut links = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            BridgeEvent::DeviceDiscovered { unique_id, capability, .. } => {
                discovered.push((unique_id, capability));
            }
            BridgeEvent::LinkChanged { state, .. } => links.push(state),
        }
    }

    assert_eq!(discovered, vec![("d1".to_string(), CapabilityType::Rgb)]);
    assert_eq!(
        links,
        vec![LinkState::Connecting, LinkState::Subscribed, LinkState::Active]
    );
}
