//! Run the bridge against a local broker, logging framework interactions.
//!
//! Usage: `cargo run --example run_bridge [config.json]`
//!
//! Without a config file, connects to a broker on localhost:1883 with the
//! default base topic and discovery-only device population.

use std::sync::Arc;

use futures::StreamExt;
use habeetat_bridge::accessory::{
    AccessoryId, AccessoryInfo, AccessoryServer, Characteristic, CharacteristicValue,
};
use habeetat_bridge::{BridgeConfig, BridgeService, MqttConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Stand-in accessory framework that logs every interaction.
#[derive(Default)]
struct LoggingServer;

impl AccessoryServer for LoggingServer {
    fn has_accessory(&self, _id: AccessoryId) -> bool {
        false
    }

    fn register_accessory(&self, info: &AccessoryInfo) {
        info!("register accessory {} ({})", info.name, info.service);
    }

    fn refresh_accessory(&self, info: &AccessoryInfo) {
        info!("refresh accessory {}", info.name);
    }

    fn push_characteristic(
        &self,
        _id: AccessoryId,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) {
        info!("push {:?} = {:?}", characteristic, value);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => BridgeConfig::from_json_file(path)?,
        None => BridgeConfig::new(MqttConfig::new("localhost")),
    };

    let (service, _handle) = BridgeService::new(config, Arc::new(LoggingServer))?;

    let mut events = service.subscribe();
    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            info!("bridge event: {:?}", event);
        }
    });

    service.run().await;
    Ok(())
}
