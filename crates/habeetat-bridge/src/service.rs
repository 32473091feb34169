//! Bridge service: owns the broker connection and drives the synchronizer.
//!
//! All registry mutation, discovery resolution, and handler state happens
//! on the single task running [`BridgeService::run`], in bus-delivery
//! order. Framework callbacks reach that task through [`BridgeHandle`],
//! which funnels set/get operations over a channel instead of sharing the
//! state across tasks.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::accessory::{AccessoryServer, Characteristic, CharacteristicValue};
use crate::bridge::{Bridge, BridgeEvent};
use crate::config::BridgeConfig;
use crate::handlers::CharacteristicWrite;
use crate::transport::MqttCommandSink;

/// Interval between reconnection attempts after a transport failure.
const RECONNECT_INTERVAL: Duration = Duration::from_secs(5);

/// Errors raised by the bridge service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Service error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Operation funneled from a framework callback onto the service task.
enum ServiceCommand {
    Write {
        device_id: String,
        write: CharacteristicWrite,
    },
    Read {
        device_id: String,
        characteristic: Characteristic,
        reply: oneshot::Sender<Option<CharacteristicValue>>,
    },
}

/// Clonable handle for framework-side callbacks.
#[derive(Clone)]
pub struct BridgeHandle {
    commands: mpsc::UnboundedSender<ServiceCommand>,
}

impl BridgeHandle {
    /// Route a set operation to the device's handler. Fire-and-forget.
    pub fn write(&self, device_id: impl Into<String>, write: CharacteristicWrite) {
        let _ = self.commands.send(ServiceCommand::Write {
            device_id: device_id.into(),
            write,
        });
    }

    /// Read a characteristic from the device's state mirror.
    ///
    /// Returns `None` for unknown devices, unsupported characteristics,
    /// or when the service has shut down.
    pub async fn read(
        &self,
        device_id: impl Into<String>,
        characteristic: Characteristic,
    ) -> Option<CharacteristicValue> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(ServiceCommand::Read {
                device_id: device_id.into(),
                characteristic,
                reply,
            })
            .ok()?;
        rx.await.ok().flatten()
    }
}

/// The running half of the bridge.
pub struct BridgeService {
    bridge: Bridge,
    client: AsyncClient,
    eventloop: EventLoop,
    connected: Arc<AtomicBool>,
    commands: mpsc::UnboundedReceiver<ServiceCommand>,
}

impl BridgeService {
    /// Build the service and its framework-facing handle.
    pub fn new(
        config: BridgeConfig,
        server: Arc<dyn AccessoryServer>,
    ) -> Result<(Self, BridgeHandle), ServiceError> {
        if config.mqtt.broker.is_empty() {
            return Err(ServiceError::Configuration(
                "MQTT broker not configured".to_string(),
            ));
        }

        let client_id = format!("habeetat-bridge-{}", Uuid::new_v4());
        let mut options = MqttOptions::new(client_id, config.mqtt.broker.clone(), config.mqtt.port);
        options.set_keep_alive(Duration::from_secs(config.mqtt.keep_alive));

        if let (Some(username), Some(password)) =
            (config.mqtt.username.clone(), config.mqtt.password.clone())
        {
            options.set_credentials(username, password);
        }

        let (client, eventloop) = AsyncClient::new(options, 10);
        let connected = Arc::new(AtomicBool::new(false));
        let sink = Arc::new(MqttCommandSink::new(client.clone(), connected.clone()));

        let bridge = Bridge::new(&config, server, sink);
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        info!(
            "Connecting to MQTT broker: {}",
            config.mqtt.full_broker_addr()
        );

        Ok((
            Self {
                bridge,
                client,
                eventloop,
                connected,
                commands: command_rx,
            },
            BridgeHandle {
                commands: command_tx,
            },
        ))
    }

    /// Subscribe to bridge events as a stream.
    pub fn subscribe(&self) -> Pin<Box<dyn Stream<Item = BridgeEvent> + Send>> {
        let rx = self.bridge.events();
        Box::pin(async_stream::stream! {
            let mut rx = rx;
            while let Ok(event) = rx.recv().await {
                yield event;
            }
        })
    }

    /// Access the synchronizer (primarily for embedding hosts and tests).
    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// Drive the bridge until the command channel closes.
    ///
    /// No transport failure is fatal: connection errors are logged and
    /// retried on a fixed interval, and the broker session is re-entered
    /// automatically.
    pub async fn run(mut self) {
        self.bridge.on_connecting();

        loop {
            tokio::select! {
                event = self.eventloop.poll() => match event {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("Connected to MQTT broker");
                        self.connected.store(true, Ordering::Relaxed);
                        for topic in self.bridge.subscriptions() {
                            match self.client.subscribe(topic.as_str(), QoS::AtLeastOnce).await {
                                Ok(()) => debug!("Subscribed to {}", topic),
                                Err(e) => error!("Failed to subscribe to {}: {}", topic, e),
                            }
                        }
                        self.bridge.on_subscribed();
                        self.bridge.activate();
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        self.bridge.handle_message(&publish.topic, &publish.payload);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        self.connected.store(false, Ordering::Relaxed);
                        self.bridge.on_disconnected();
                        error!("MQTT error: {}", e);
                        tokio::time::sleep(RECONNECT_INTERVAL).await;
                        self.bridge.on_connecting();
                    }
                },

                command = self.commands.recv() => match command {
                    Some(ServiceCommand::Write { device_id, write }) => {
                        self.bridge.handle_write(&device_id, write);
                    }
                    Some(ServiceCommand::Read { device_id, characteristic, reply }) => {
                        let _ = reply.send(
                            self.bridge.read_characteristic(&device_id, characteristic),
                        );
                    }
                    None => {
                        info!("Bridge handle dropped, stopping service");
                        break;
                    }
                },
            }
        }
    }
}
