//! The synchronizer: device table, accessory bindings, and message routing.
//!
//! [`Bridge`] is the single owner of all mutable bridge state and knows
//! nothing about the transport: the service layer feeds it inbound
//! messages and lifecycle transitions, and it reaches outward only through
//! the [`AccessoryServer`] and [`CommandSink`] capabilities handed to it
//! at construction. Everything here runs on one logical task; nothing
//! blocks.

use std::sync::Arc;

use habeetat_core::{topics, CapabilityType, DeviceDescriptor};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::accessory::{
    accessory_id, AccessoryHandle, AccessoryInfo, AccessoryServer, Characteristic,
    CharacteristicValue,
};
use crate::config::BridgeConfig;
use crate::discovery;
use crate::handlers::{CharacteristicWrite, DeviceHandler, StatePayload};
use crate::registry::DeviceRegistry;
use crate::transport::CommandSink;

/// Connection lifecycle of the bus link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No broker connection
    Disconnected,
    /// Connection attempt in flight
    Connecting,
    /// Connected, topic subscriptions issued
    Subscribed,
    /// Subscriptions live and static devices replayed
    Active,
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Subscribed => write!(f, "subscribed"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// Event published on the bridge's broadcast channel.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    /// A device passed discovery and was bound to an accessory.
    DeviceDiscovered {
        unique_id: String,
        name: String,
        capability: CapabilityType,
        timestamp: i64,
    },

    /// The bus link changed state.
    LinkChanged { state: LinkState, timestamp: i64 },
}

/// Registry owner and message router.
pub struct Bridge {
    base_topic: String,
    static_devices: Vec<DeviceDescriptor>,
    registry: DeviceRegistry,
    server: Arc<dyn AccessoryServer>,
    sink: Arc<dyn CommandSink>,
    link: LinkState,
    events: broadcast::Sender<BridgeEvent>,
}

impl Bridge {
    pub fn new(
        config: &BridgeConfig,
        server: Arc<dyn AccessoryServer>,
        sink: Arc<dyn CommandSink>,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            base_topic: config.base_topic.clone(),
            static_devices: config.devices.clone(),
            registry: DeviceRegistry::new(),
            server,
            sink,
            link: LinkState::Disconnected,
            events,
        }
    }

    pub fn link_state(&self) -> LinkState {
        self.link
    }

    /// Number of registered devices.
    pub fn device_count(&self) -> usize {
        self.registry.len()
    }

    /// Subscribe to bridge events.
    pub fn events(&self) -> broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }

    /// The two topic patterns the service must subscribe to.
    pub fn subscriptions(&self) -> [String; 2] {
        [
            topics::state_subscription(&self.base_topic),
            topics::discovery_subscription(),
        ]
    }

    /// A connection attempt started.
    pub fn on_connecting(&mut self) {
        self.set_link(LinkState::Connecting);
    }

    /// The broker accepted the connection and subscriptions were issued.
    pub fn on_subscribed(&mut self) {
        self.set_link(LinkState::Subscribed);
    }

    /// Subscriptions are live; replay statically configured devices
    /// through the same registration path discovery uses.
    pub fn activate(&mut self) {
        let static_devices = std::mem::take(&mut self.static_devices);
        for device in &static_devices {
            self.add_device(device.clone());
        }
        self.static_devices = static_devices;

        self.set_link(LinkState::Active);
    }

    /// The broker link dropped.
    pub fn on_disconnected(&mut self) {
        self.set_link(LinkState::Disconnected);
    }

    fn set_link(&mut self, state: LinkState) {
        if self.link == state {
            return;
        }
        self.link = state;
        debug!("Bus link is now {}", state);
        let _ = self.events.send(BridgeEvent::LinkChanged {
            state,
            timestamp: chrono::Utc::now().timestamp(),
        });
    }

    /// Route one inbound bus message by topic shape.
    pub fn handle_message(&mut self, topic: &str, payload: &[u8]) {
        if topics::is_discovery_topic(topic) {
            if let Some(device) = discovery::resolve(topic, payload) {
                self.add_device(device);
            }
            return;
        }

        if let Some(device_id) = topics::device_id_from_state_topic(topic, &self.base_topic) {
            self.handle_state_update(device_id, payload);
            return;
        }

        debug!("Ignoring message on unrecognized topic: {}", topic);
    }

    fn handle_state_update(&mut self, device_id: &str, payload: &[u8]) {
        let Some(handler) = self.registry.handler_mut(device_id) else {
            debug!("State update for unknown device: {}", device_id);
            return;
        };

        let payload = StatePayload::parse(payload);
        handler.update_state(&payload);
    }

    /// Register a device and bind its accessory.
    ///
    /// Idempotent per `unique_id`: re-announcements are ignored outright,
    /// even when they carry different topics or capabilities. A device
    /// whose accessory identifier is already known to the framework (the
    /// post-restart restore case) is rebound in place; otherwise a new
    /// accessory is registered.
    pub fn add_device(&mut self, device: DeviceDescriptor) {
        if self.registry.contains(&device.unique_id) {
            return;
        }

        let id = accessory_id(&device.unique_id);
        let handle = AccessoryHandle::new(self.server.clone(), id);

        let Some(handler) = DeviceHandler::new(handle, device.clone(), self.sink.clone()) else {
            // unsupported capability; already logged by the constructor
            return;
        };

        info!("Discovered device: {} ({})", device.name, device.capability);

        let info = AccessoryInfo::from_descriptor(id, handler.service_kind(), &device);
        if self.server.has_accessory(id) {
            info!("Restoring existing accessory: {}", device.name);
            self.server.refresh_accessory(&info);
        } else {
            info!("Adding new accessory: {}", device.name);
            self.server.register_accessory(&info);
        }

        let _ = self.events.send(BridgeEvent::DeviceDiscovered {
            unique_id: device.unique_id.clone(),
            name: device.name.clone(),
            capability: device.capability,
            timestamp: chrono::Utc::now().timestamp(),
        });

        self.registry.bind_handler(device.unique_id.clone(), handler);
        self.registry.insert(device);
    }

    /// Route a framework set operation to the bound handler.
    pub fn handle_write(&mut self, device_id: &str, write: CharacteristicWrite) {
        let Some(handler) = self.registry.handler_mut(device_id) else {
            debug!("Write for unknown device: {}", device_id);
            return;
        };
        handler.write(write);
    }

    /// Serve a framework get from the device's state mirror.
    pub fn read_characteristic(
        &self,
        device_id: &str,
        characteristic: Characteristic,
    ) -> Option<CharacteristicValue> {
        self.registry.handler(device_id)?.read(characteristic)
    }

    /// Registered device descriptor, if any.
    pub fn descriptor(&self, device_id: &str) -> Option<&DeviceDescriptor> {
        self.registry.descriptor(device_id)
    }
}
