//! Device registry.
//!
//! Restart-scoped table of discovered devices and their handler bindings.
//! The bridge protocol has no device-removal message, so the registry
//! grows monotonically for the process lifetime and is cleared only by
//! dropping the instance. Tests construct independent registries.

use std::collections::HashMap;

use habeetat_core::DeviceDescriptor;

use crate::handlers::DeviceHandler;

/// Mapping from `unique_id` to descriptor and bound handler.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: HashMap<String, DeviceDescriptor>,
    handlers: HashMap<String, DeviceHandler>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a device with this id has been registered.
    pub fn contains(&self, unique_id: &str) -> bool {
        self.devices.contains_key(unique_id)
    }

    /// Record a device descriptor.
    pub fn insert(&mut self, device: DeviceDescriptor) {
        self.devices.insert(device.unique_id.clone(), device);
    }

    /// Bind the handler for a registered device.
    pub fn bind_handler(&mut self, unique_id: impl Into<String>, handler: DeviceHandler) {
        self.handlers.insert(unique_id.into(), handler);
    }

    pub fn descriptor(&self, unique_id: &str) -> Option<&DeviceDescriptor> {
        self.devices.get(unique_id)
    }

    pub fn handler(&self, unique_id: &str) -> Option<&DeviceHandler> {
        self.handlers.get(unique_id)
    }

    pub fn handler_mut(&mut self, unique_id: &str) -> Option<&mut DeviceHandler> {
        self.handlers.get_mut(unique_id)
    }

    /// Number of registered devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Iterate over registered descriptors.
    pub fn devices(&self) -> impl Iterator<Item = &DeviceDescriptor> {
        self.devices.values()
    }
}
