//! Core device model for the Habeetat bridge.
//!
//! This crate holds the protocol-independent pieces shared by the bridge:
//! the device descriptor and capability model, the codec set translating
//! between bus wire values and accessory-domain values, and the MQTT topic
//! grammar used by the Habeetat bridge firmware.
//!
//! Everything here is pure and synchronous; the bridge crate owns all I/O.

pub mod codec;
pub mod device;
pub mod topics;

pub use device::{
    CapabilityType, DeviceDescriptor, HeatingCoolingState, PositionState, DEFAULT_MANUFACTURER,
    DEFAULT_MODEL,
};

pub use codec::HvacMode;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
