//! MQTT topic grammar for the Habeetat bridge firmware.
//!
//! Per-device topics live under a configurable base namespace:
//! `<base>/<id>/state` for state, `<base>/<id>/set` for commands. Cover and
//! climate commands rewrite the generic command suffix to an
//! attribute-specific one. Discovery announcements live under the fixed
//! `homeassistant` namespace.

/// Default base namespace for per-device topics.
pub const DEFAULT_BASE_TOPIC: &str = "habeetat";

/// Fixed discovery namespace prefix.
pub const DISCOVERY_PREFIX: &str = "homeassistant";

/// Suffix of per-device state topics.
pub const STATE_SUFFIX: &str = "/state";

/// Generic command topic suffix.
pub const COMMAND_SUFFIX: &str = "/set";

/// Command suffix for cover position writes.
pub const SET_POSITION_SUFFIX: &str = "/set_position";

/// Command suffix for thermostat temperature writes.
pub const SET_TEMPERATURE_SUFFIX: &str = "/set_temperature";

/// Command suffix for thermostat mode writes.
pub const SET_MODE_SUFFIX: &str = "/set_mode";

/// Subscription pattern matching every device state topic under `base`.
pub fn state_subscription(base: &str) -> String {
    format!("{}/+{}", base, STATE_SUFFIX)
}

/// Subscription pattern for bridge discovery announcements.
pub fn discovery_subscription() -> String {
    format!("{}/+/habeetat_+/config", DISCOVERY_PREFIX)
}

/// Whether a topic belongs to the discovery namespace.
pub fn is_discovery_topic(topic: &str) -> bool {
    topic.starts_with("homeassistant/") && topic.ends_with("/config")
}

/// Extract the device id from a `<base>/<id>/state` topic.
///
/// Returns `None` unless the topic has exactly that shape with a single
/// path segment for the id.
pub fn device_id_from_state_topic<'a>(topic: &'a str, base: &str) -> Option<&'a str> {
    let rest = topic.strip_prefix(base)?.strip_prefix('/')?;
    let id = rest.strip_suffix(STATE_SUFFIX)?;
    if id.is_empty() || id.contains('/') {
        return None;
    }
    Some(id)
}

/// Rewrite the generic command suffix to an attribute-specific one.
///
/// Replaces the first occurrence of `/set` so a base like `habeetat/d1/set`
/// becomes `habeetat/d1/set_position`.
pub fn rewrite_command_suffix(command_topic: &str, suffix: &str) -> String {
    command_topic.replacen(COMMAND_SUFFIX, suffix, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_patterns() {
        assert_eq!(state_subscription("habeetat"), "habeetat/+/state");
        assert_eq!(state_subscription("custom"), "custom/+/state");
        assert_eq!(discovery_subscription(), "homeassistant/+/habeetat_+/config");
    }

    #[test]
    fn test_discovery_topic_detection() {
        assert!(is_discovery_topic("homeassistant/light/habeetat_d1/config"));
        assert!(is_discovery_topic("homeassistant/sensor/habeetat_t2/config"));
        assert!(!is_discovery_topic("homeassistant/light/habeetat_d1/state"));
        assert!(!is_discovery_topic("habeetat/d1/state"));
    }

    #[test]
    fn test_device_id_extraction() {
        assert_eq!(
            device_id_from_state_topic("habeetat/d1/state", "habeetat"),
            Some("d1")
        );
        assert_eq!(
            device_id_from_state_topic("habeetat/d1/other", "habeetat"),
            None
        );
        assert_eq!(
            device_id_from_state_topic("habeetat/a/b/state", "habeetat"),
            None
        );
        assert_eq!(device_id_from_state_topic("other/d1/state", "habeetat"), None);
        assert_eq!(device_id_from_state_topic("habeetat//state", "habeetat"), None);
    }

    #[test]
    fn test_command_suffix_rewrite() {
        assert_eq!(
            rewrite_command_suffix("habeetat/d1/set", SET_POSITION_SUFFIX),
            "habeetat/d1/set_position"
        );
        assert_eq!(
            rewrite_command_suffix("habeetat/d1/set", SET_TEMPERATURE_SUFFIX),
            "habeetat/d1/set_temperature"
        );
        assert_eq!(
            rewrite_command_suffix("habeetat/d1/set", SET_MODE_SUFFIX),
            "habeetat/d1/set_mode"
        );
        // only the first occurrence is rewritten
        assert_eq!(
            rewrite_command_suffix("a/set/b/set", SET_MODE_SUFFIX),
            "a/set_mode/b/set"
        );
    }
}
