//! Closed enumerations for transport modes, vehicle types and features.
//!
//! These were free-form strings in earlier iterations of the service;
//! modelling them as closed enums removes the typo-driven validation
//! bypass. `parse` is strict: anything outside the set is a
//! `ValidationError`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// How a rider travels between two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportMode {
    #[serde(rename = "bus")]
    Bus,
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "taxi")]
    Taxi,
    #[serde(rename = "e-rickshaw")]
    ERickshaw,
    #[serde(rename = "cycling")]
    Cycling,
    #[serde(rename = "walking")]
    Walking,
}

impl TransportMode {
    /// All modes, in the order the fare/speed tables list them.
    pub const ALL: [TransportMode; 6] = [
        TransportMode::Bus,
        TransportMode::Auto,
        TransportMode::Taxi,
        TransportMode::ERickshaw,
        TransportMode::Cycling,
        TransportMode::Walking,
    ];

    /// Parse the wire name of a mode.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "bus" => Ok(TransportMode::Bus),
            "auto" => Ok(TransportMode::Auto),
            "taxi" => Ok(TransportMode::Taxi),
            "e-rickshaw" => Ok(TransportMode::ERickshaw),
            "cycling" => Ok(TransportMode::Cycling),
            "walking" => Ok(TransportMode::Walking),
            other => Err(ValidationError::TransportMode(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Bus => "bus",
            TransportMode::Auto => "auto",
            TransportMode::Taxi => "taxi",
            TransportMode::ERickshaw => "e-rickshaw",
            TransportMode::Cycling => "cycling",
            TransportMode::Walking => "walking",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of vehicle the fleet registers. Cycling and walking have no
/// registrable vehicle, so this is a strict subset of `TransportMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    #[serde(rename = "bus")]
    Bus,
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "taxi")]
    Taxi,
    #[serde(rename = "e-rickshaw")]
    ERickshaw,
}

impl VehicleType {
    /// Parse the wire name of a vehicle type.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "bus" => Ok(VehicleType::Bus),
            "auto" => Ok(VehicleType::Auto),
            "taxi" => Ok(VehicleType::Taxi),
            "e-rickshaw" => Ok(VehicleType::ERickshaw),
            other => Err(ValidationError::VehicleType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Bus => "bus",
            VehicleType::Auto => "auto",
            VehicleType::Taxi => "taxi",
            VehicleType::ERickshaw => "e-rickshaw",
        }
    }

    /// The transport mode this vehicle type moves riders by.
    pub fn transport_mode(&self) -> TransportMode {
        match self {
            VehicleType::Bus => TransportMode::Bus,
            VehicleType::Auto => TransportMode::Auto,
            VehicleType::Taxi => TransportMode::Taxi,
            VehicleType::ERickshaw => TransportMode::ERickshaw,
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities a vehicle can advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleFeature {
    Ac,
    Gps,
    MusicSystem,
    WheelchairAccessible,
    FirstAid,
    FireExtinguisher,
    Cctv,
    Wifi,
}

impl VehicleFeature {
    /// Parse the wire name of a feature.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "ac" => Ok(VehicleFeature::Ac),
            "gps" => Ok(VehicleFeature::Gps),
            "music_system" => Ok(VehicleFeature::MusicSystem),
            "wheelchair_accessible" => Ok(VehicleFeature::WheelchairAccessible),
            "first_aid" => Ok(VehicleFeature::FirstAid),
            "fire_extinguisher" => Ok(VehicleFeature::FireExtinguisher),
            "cctv" => Ok(VehicleFeature::Cctv),
            "wifi" => Ok(VehicleFeature::Wifi),
            other => Err(ValidationError::VehicleFeature(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleFeature::Ac => "ac",
            VehicleFeature::Gps => "gps",
            VehicleFeature::MusicSystem => "music_system",
            VehicleFeature::WheelchairAccessible => "wheelchair_accessible",
            VehicleFeature::FirstAid => "first_aid",
            VehicleFeature::FireExtinguisher => "fire_extinguisher",
            VehicleFeature::Cctv => "cctv",
            VehicleFeature::Wifi => "wifi",
        }
    }
}

impl fmt::Display for VehicleFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_modes() {
        for mode in TransportMode::ALL {
            assert_eq!(TransportMode::parse(mode.as_str()).unwrap(), mode);
        }
    }

    #[test]
    fn reject_unknown_mode() {
        assert!(TransportMode::parse("jetpack").is_err());
        assert!(TransportMode::parse("Bus").is_err());
        assert!(TransportMode::parse("").is_err());
    }

    #[test]
    fn vehicle_type_is_subset_of_modes() {
        assert!(VehicleType::parse("cycling").is_err());
        assert!(VehicleType::parse("walking").is_err());
        assert_eq!(
            VehicleType::parse("e-rickshaw").unwrap().transport_mode(),
            TransportMode::ERickshaw
        );
    }

    #[test]
    fn parse_features() {
        assert_eq!(
            VehicleFeature::parse("wheelchair_accessible").unwrap(),
            VehicleFeature::WheelchairAccessible
        );
        assert!(VehicleFeature::parse("sunroof").is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&TransportMode::ERickshaw).unwrap();
        assert_eq!(json, "\"e-rickshaw\"");
        let back: TransportMode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TransportMode::ERickshaw);

        let json = serde_json::to_string(&VehicleFeature::MusicSystem).unwrap();
        assert_eq!(json, "\"music_system\"");
    }
}
