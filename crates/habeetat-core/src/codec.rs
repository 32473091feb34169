//! Bidirectional converters between bus wire values and accessory-domain
//! values.
//!
//! All conversions are pure and stateless. The lossy ones (brightness
//! rescaling) are rounded so that a decode/encode round trip stays within
//! one raw step of the input.

use serde_json::Value as JsonValue;

use crate::device::{HeatingCoolingState, PositionState};

/// Wire literal for the "on" state.
pub const ON: &str = "ON";

/// Wire literal for the "off" state.
pub const OFF: &str = "OFF";

/// Encode an on/off flag as the bus wire literal.
pub fn encode_on_off(on: bool) -> &'static str {
    if on { ON } else { OFF }
}

/// Decode a bus on/off literal. Anything other than `"ON"` reads as off.
pub fn parse_on_off(value: &str) -> bool {
    value == ON
}

/// Convert a 0-255 wire brightness to a 0-100 percent scale.
pub fn raw_to_percent(raw: u8) -> u8 {
    ((raw as f64 / 255.0) * 100.0).round() as u8
}

/// Convert a 0-100 percent brightness to the 0-255 wire scale.
pub fn percent_to_raw(percent: u8) -> u8 {
    ((percent.min(100) as f64 / 100.0) * 255.0).round() as u8
}

/// Downstream HVAC mode alphabet.
///
/// These are the literal mode strings the bridge firmware publishes and
/// accepts. There is no `auto` downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HvacMode {
    Off,
    Heat,
    Cool,
    FanOnly,
}

impl HvacMode {
    /// Wire string for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Heat => "heat",
            Self::Cool => "cool",
            Self::FanOnly => "fan_only",
        }
    }

    /// Parse a wire mode string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "off" => Some(Self::Off),
            "heat" => Some(Self::Heat),
            "cool" => Some(Self::Cool),
            "fan_only" => Some(Self::FanOnly),
            _ => None,
        }
    }

    /// Accessory-domain state mirrored for this mode.
    ///
    /// Applied to both the current and the target mirror; `fan_only` has
    /// no accessory equivalent and reads as off.
    pub fn heating_cooling_state(&self) -> HeatingCoolingState {
        match self {
            Self::Off | Self::FanOnly => HeatingCoolingState::Off,
            Self::Heat => HeatingCoolingState::Heat,
            Self::Cool => HeatingCoolingState::Cool,
        }
    }
}

impl std::fmt::Display for HvacMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl HeatingCoolingState {
    /// Downstream mode published for a framework-requested state.
    ///
    /// The firmware has no native auto mode; `Auto` is sent as cooling.
    pub fn command_mode(self) -> HvacMode {
        match self {
            Self::Off => HvacMode::Off,
            Self::Heat => HvacMode::Heat,
            Self::Cool | Self::Auto => HvacMode::Cool,
        }
    }
}

/// Map a cover motion string from the bus to a position state.
pub fn parse_cover_motion(value: &str) -> Option<PositionState> {
    match value {
        "opening" => Some(PositionState::Increasing),
        "closing" => Some(PositionState::Decreasing),
        "stopped" | "open" | "closed" => Some(PositionState::Stopped),
        _ => None,
    }
}

/// Encode a hue/saturation pair as the wire `[hue, saturation]` array.
pub fn encode_hs_color(hue: f64, saturation: f64) -> JsonValue {
    serde_json::json!([hue, saturation])
}

/// Decode a wire `[hue, saturation]` array.
pub fn parse_hs_color(value: &JsonValue) -> Option<(f64, f64)> {
    let parts = value.as_array()?;
    if parts.len() != 2 {
        return None;
    }
    Some((parts[0].as_f64()?, parts[1].as_f64()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_off_literals() {
        assert_eq!(encode_on_off(true), "ON");
        assert_eq!(encode_on_off(false), "OFF");
        assert!(parse_on_off("ON"));
        assert!(!parse_on_off("OFF"));
        assert!(!parse_on_off("on"));
    }

    #[test]
    fn test_brightness_round_trip_raw() {
        // decode-then-encode stays within one raw step for every wire value
        for raw in 0..=255u8 {
            let restored = percent_to_raw(raw_to_percent(raw)) as i16;
            assert!(
                (restored - raw as i16).abs() <= 1,
                "raw {} restored as {}",
                raw,
                restored
            );
        }
    }

    #[test]
    fn test_brightness_round_trip_percent() {
        // encode-then-decode is exact on the percent scale
        for percent in 0..=100u8 {
            assert_eq!(raw_to_percent(percent_to_raw(percent)), percent);
        }
    }

    #[test]
    fn test_brightness_anchors() {
        assert_eq!(raw_to_percent(0), 0);
        assert_eq!(raw_to_percent(255), 100);
        assert_eq!(raw_to_percent(128), 50);
        assert_eq!(percent_to_raw(0), 0);
        assert_eq!(percent_to_raw(100), 255);
    }

    #[test]
    fn test_hvac_mode_strings() {
        assert_eq!(HvacMode::parse("fan_only"), Some(HvacMode::FanOnly));
        assert_eq!(HvacMode::parse("auto"), None);
        assert_eq!(HvacMode::Heat.as_str(), "heat");
    }

    #[test]
    fn test_hvac_mode_state_mapping() {
        assert_eq!(
            HvacMode::FanOnly.heating_cooling_state(),
            HeatingCoolingState::Off
        );
        assert_eq!(
            HvacMode::Cool.heating_cooling_state(),
            HeatingCoolingState::Cool
        );
    }

    #[test]
    fn test_command_mode_has_no_auto() {
        assert_eq!(HeatingCoolingState::Auto.command_mode(), HvacMode::Cool);
        assert_eq!(HeatingCoolingState::Off.command_mode(), HvacMode::Off);
        assert_eq!(HeatingCoolingState::Heat.command_mode(), HvacMode::Heat);
    }

    #[test]
    fn test_cover_motion_strings() {
        assert_eq!(parse_cover_motion("opening"), Some(PositionState::Increasing));
        assert_eq!(parse_cover_motion("closing"), Some(PositionState::Decreasing));
        assert_eq!(parse_cover_motion("stopped"), Some(PositionState::Stopped));
        assert_eq!(parse_cover_motion("open"), Some(PositionState::Stopped));
        assert_eq!(parse_cover_motion("closed"), Some(PositionState::Stopped));
        assert_eq!(parse_cover_motion("ajar"), None);
    }

    #[test]
    fn test_hs_color() {
        let encoded = encode_hs_color(180.0, 50.0);
        assert_eq!(parse_hs_color(&encoded), Some((180.0, 50.0)));
        assert_eq!(parse_hs_color(&serde_json::json!([180.0])), None);
        assert_eq!(parse_hs_color(&serde_json::json!("red")), None);
    }
}
