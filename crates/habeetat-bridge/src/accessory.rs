//! Accessory framework interface.
//!
//! The host home-automation framework (pairing, advertisement, the actual
//! service/characteristic registry) lives outside this crate. The bridge
//! reaches it only through the [`AccessoryServer`] trait: look up or
//! register an accessory by its stable identifier, and push characteristic
//! values to it. Capability handlers never talk to the server directly;
//! they receive an [`AccessoryHandle`] scoped to their own accessory.

use std::sync::Arc;

use habeetat_core::DeviceDescriptor;
use uuid::Uuid;

/// Stable accessory identifier, derived deterministically from a device's
/// `unique_id` so it survives process restarts.
pub type AccessoryId = Uuid;

/// Namespace under which accessory identifiers are derived.
const ACCESSORY_NAMESPACE: Uuid = Uuid::from_bytes([
    0x5b, 0xee, 0x7a, 0x70, 0x2f, 0x41, 0x4d, 0x0a, 0x9c, 0x33, 0x61, 0x58, 0x0b, 0x6e, 0xd2, 0x84,
]);

/// Derive the persistent accessory identifier for a device.
pub fn accessory_id(unique_id: &str) -> AccessoryId {
    Uuid::new_v5(&ACCESSORY_NAMESPACE, unique_id.as_bytes())
}

/// Primary service exposed by an accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Switch,
    Lightbulb,
    WindowCovering,
    Thermostat,
    TemperatureSensor,
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Switch => write!(f, "switch"),
            Self::Lightbulb => write!(f, "lightbulb"),
            Self::WindowCovering => write!(f, "window-covering"),
            Self::Thermostat => write!(f, "thermostat"),
            Self::TemperatureSensor => write!(f, "temperature-sensor"),
        }
    }
}

/// Characteristics the bridge reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    On,
    Brightness,
    Hue,
    Saturation,
    CurrentPosition,
    TargetPosition,
    PositionState,
    CurrentTemperature,
    TargetTemperature,
    CurrentHeatingCoolingState,
    TargetHeatingCoolingState,
}

/// Value carried by a characteristic push or read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CharacteristicValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl From<bool> for CharacteristicValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u8> for CharacteristicValue {
    fn from(v: u8) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for CharacteristicValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for CharacteristicValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// Metadata attached to an accessory at registration or restore time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryInfo {
    pub id: AccessoryId,
    pub name: String,
    pub service: ServiceKind,
    pub manufacturer: String,
    pub model: String,
    /// Serial number reported to the framework; the device `unique_id`.
    pub serial_number: String,
}

impl AccessoryInfo {
    /// Build the accessory metadata for a device descriptor.
    pub fn from_descriptor(
        id: AccessoryId,
        service: ServiceKind,
        device: &DeviceDescriptor,
    ) -> Self {
        Self {
            id,
            name: device.name.clone(),
            service,
            manufacturer: device.manufacturer().to_string(),
            model: device.model().to_string(),
            serial_number: device.unique_id.clone(),
        }
    }
}

/// Host framework boundary.
///
/// Implementations own the accessory cache and the network-facing side of
/// the framework. All operations are fire-and-forget; the bridge never
/// waits for the framework to acknowledge a push.
pub trait AccessoryServer: Send + Sync {
    /// Whether an accessory with this identifier was restored from the
    /// framework's persisted cache.
    fn has_accessory(&self, id: AccessoryId) -> bool;

    /// Register a freshly created accessory.
    fn register_accessory(&self, info: &AccessoryInfo);

    /// Refresh the metadata of a restored accessory in place.
    fn refresh_accessory(&self, info: &AccessoryInfo);

    /// Push a characteristic value. No acknowledgment.
    fn push_characteristic(
        &self,
        id: AccessoryId,
        characteristic: Characteristic,
        value: CharacteristicValue,
    );
}

/// Capability handle lent to one handler for its own accessory.
///
/// Handlers can push values through it but never create or destroy
/// framework objects; the synchronizer owns those operations.
#[derive(Clone)]
pub struct AccessoryHandle {
    server: Arc<dyn AccessoryServer>,
    id: AccessoryId,
}

impl AccessoryHandle {
    pub fn new(server: Arc<dyn AccessoryServer>, id: AccessoryId) -> Self {
        Self { server, id }
    }

    pub fn id(&self) -> AccessoryId {
        self.id
    }

    /// Push a characteristic value for this accessory.
    pub fn push(&self, characteristic: Characteristic, value: impl Into<CharacteristicValue>) {
        self.server
            .push_characteristic(self.id, characteristic, value.into());
    }
}

impl std::fmt::Debug for AccessoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessoryHandle").field("id", &self.id).finish()
    }
}
