//! Habeetat MQTT bridge.
//!
//! Bridges Habeetat devices exposed over an MQTT broker into a host
//! home-automation framework's accessory model. Devices are discovered
//! from Home Assistant-style announcements published by the bridge
//! firmware (or taken from static configuration), bound to one stateful
//! accessory each, and kept synchronized in both directions: inbound
//! state messages update the accessory's characteristics, and user
//! commands from the framework are translated back into bus messages.
//!
//! ## Architecture
//!
//! - [`discovery`]: parses announcements and classifies device
//!   capabilities
//! - [`handlers`]: one state-owning handler per capability class
//! - [`bridge`]: the synchronizer owning the device table, accessory
//!   bindings, and topic routing
//! - [`service`]: the broker connection and the single event-handling
//!   task
//! - [`accessory`], [`transport`]: the collaborator boundaries toward the
//!   host framework and the bus
//!
//! The host embeds the bridge by implementing [`AccessoryServer`],
//! constructing a [`BridgeService`], and driving its `run` loop.

pub mod accessory;
pub mod bridge;
pub mod config;
pub mod discovery;
pub mod handlers;
pub mod registry;
pub mod service;
pub mod transport;

pub use accessory::{
    accessory_id, AccessoryHandle, AccessoryId, AccessoryInfo, AccessoryServer, Characteristic,
    CharacteristicValue, ServiceKind,
};
pub use bridge::{Bridge, BridgeEvent, LinkState};
pub use config::{BridgeConfig, ConfigError};
pub use discovery::{resolve, DiscoveryPayload, DiscoveryTopic};
pub use handlers::{CharacteristicWrite, DeviceHandler, StatePayload};
pub use registry::DeviceRegistry;
pub use service::{BridgeHandle, BridgeService, ServiceError};
pub use transport::{CommandSink, MqttConfig};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
