//! Bus transport boundary.
//!
//! Outbound traffic goes through the [`CommandSink`] trait: a
//! fire-and-forget publish with no acknowledgment tracking. The MQTT
//! implementation drops publishes while the broker link is down; the
//! device simply misses the command, which is the contract the rest of
//! the bridge is written against.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Configuration for the MQTT broker connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    /// Broker address
    pub broker: String,

    /// Broker port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username for authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Keep-alive interval in seconds
    #[serde(default = "default_keep_alive")]
    pub keep_alive: u64,
}

fn default_port() -> u16 {
    1883
}

fn default_keep_alive() -> u64 {
    60
}

impl MqttConfig {
    pub fn new(broker: impl Into<String>) -> Self {
        Self {
            broker: broker.into(),
            port: default_port(),
            username: None,
            password: None,
            keep_alive: default_keep_alive(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn full_broker_addr(&self) -> String {
        format!("{}:{}", self.broker, self.port)
    }
}

/// Outbound publish capability handed to capability handlers.
///
/// Publishes are fire-and-forget: a command completes as soon as the
/// publish call returns, independent of whether the device ever reacts.
pub trait CommandSink: Send + Sync {
    fn publish(&self, topic: &str, payload: String);
}

/// [`CommandSink`] backed by a live MQTT client.
///
/// The connected flag is owned by the service event loop; while it is
/// clear, publishes are dropped silently per the degradation contract.
pub struct MqttCommandSink {
    client: rumqttc::AsyncClient,
    connected: Arc<AtomicBool>,
}

impl MqttCommandSink {
    pub fn new(client: rumqttc::AsyncClient, connected: Arc<AtomicBool>) -> Self {
        Self { client, connected }
    }
}

impl CommandSink for MqttCommandSink {
    fn publish(&self, topic: &str, payload: String) {
        if !self.connected.load(Ordering::Relaxed) {
            debug!("Dropping publish to {} while disconnected", topic);
            return;
        }

        if let Err(e) = self
            .client
            .try_publish(topic, rumqttc::QoS::AtLeastOnce, false, payload)
        {
            warn!("Failed to publish to {}: {}", topic, e);
        }
    }
}
