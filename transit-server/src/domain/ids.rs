//! Validated identifier newtypes.
//!
//! Registration plates, driver phone numbers and train numbers all carry a
//! fixed wire format. Each type guarantees its format by construction, so
//! downstream code never re-validates.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use super::error::ValidationError;

/// An Indian vehicle registration plate: two state letters, two district
/// digits, one or two series letters, four digits (`CG07AB1234`).
///
/// Whitespace in the input is ignored, matching how plates are written on
/// registration documents (`CG 07 AB 1234`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlateNumber(String);

impl PlateNumber {
    /// Parse a plate, ignoring any whitespace in the input.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = compact.as_bytes();

        let valid = matches!(bytes.len(), 9 | 10)
            && bytes[..2].iter().all(u8::is_ascii_uppercase)
            && bytes[2..4].iter().all(u8::is_ascii_digit)
            && bytes[4..bytes.len() - 4].iter().all(u8::is_ascii_uppercase)
            && bytes[bytes.len() - 4..].iter().all(u8::is_ascii_digit);

        if !valid {
            return Err(ValidationError::PlateNumber(s.to_string()));
        }

        Ok(PlateNumber(compact))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlateNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for PlateNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PlateNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PlateNumber::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A 10-digit Indian mobile number starting with 6-9.
///
/// Formatting characters are stripped and only the trailing 10 digits are
/// considered, so `+91 98765-43210` normalizes to `9876543210`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhoneNumber([u8; 10]);

impl PhoneNumber {
    /// Parse a phone number, stripping non-digits and any country prefix.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let digits: Vec<u8> = s.bytes().filter(u8::is_ascii_digit).collect();
        if digits.len() < 10 {
            return Err(ValidationError::PhoneNumber(s.to_string()));
        }

        let last10 = &digits[digits.len() - 10..];
        if !(b'6'..=b'9').contains(&last10[0]) {
            return Err(ValidationError::PhoneNumber(s.to_string()));
        }

        let mut out = [0u8; 10];
        out.copy_from_slice(last10);
        Ok(PhoneNumber(out))
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII digits are ever stored.
        std::str::from_utf8(&self.0).unwrap()
    }
}

impl fmt::Debug for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhoneNumber({})", self.as_str())
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PhoneNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PhoneNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PhoneNumber::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A 5-digit Indian Railways train number.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrainNumber([u8; 5]);

impl TrainNumber {
    /// Parse a train number: exactly 5 ASCII digits.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let bytes = s.as_bytes();
        if bytes.len() != 5 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(ValidationError::TrainNumber(s.to_string()));
        }

        let mut out = [0u8; 5];
        out.copy_from_slice(bytes);
        Ok(TrainNumber(out))
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII digits are ever stored.
        std::str::from_utf8(&self.0).unwrap()
    }
}

impl fmt::Debug for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrainNumber({})", self.as_str())
    }
}

impl fmt::Display for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TrainNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TrainNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TrainNumber::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_plates() {
        assert!(PlateNumber::parse("CG07AB1234").is_ok());
        assert!(PlateNumber::parse("CG07A1234").is_ok());
        assert!(PlateNumber::parse("MH12DE1433").is_ok());
    }

    #[test]
    fn plate_ignores_whitespace() {
        let plate = PlateNumber::parse("CG 07 AB 1234").unwrap();
        assert_eq!(plate.as_str(), "CG07AB1234");
    }

    #[test]
    fn reject_bad_plates() {
        assert!(PlateNumber::parse("INVALID").is_err());
        assert!(PlateNumber::parse("cg07ab1234").is_err());
        assert!(PlateNumber::parse("C107AB1234").is_err());
        assert!(PlateNumber::parse("CG07AB123").is_err());
        assert!(PlateNumber::parse("CG07ABC1234").is_err());
        assert!(PlateNumber::parse("").is_err());
    }

    #[test]
    fn parse_valid_phones() {
        assert_eq!(
            PhoneNumber::parse("9876543210").unwrap().as_str(),
            "9876543210"
        );
        assert_eq!(
            PhoneNumber::parse("+91 98765-43210").unwrap().as_str(),
            "9876543210"
        );
        assert!(PhoneNumber::parse("6000000000").is_ok());
    }

    #[test]
    fn reject_bad_phones() {
        // Leading digit must be 6-9.
        assert!(PhoneNumber::parse("5876543210").is_err());
        assert!(PhoneNumber::parse("12345").is_err());
        assert!(PhoneNumber::parse("").is_err());
    }

    #[test]
    fn parse_valid_train_numbers() {
        assert_eq!(TrainNumber::parse("12853").unwrap().as_str(), "12853");
    }

    #[test]
    fn reject_bad_train_numbers() {
        assert!(TrainNumber::parse("1285").is_err());
        assert!(TrainNumber::parse("128533").is_err());
        assert!(TrainNumber::parse("12a53").is_err());
        assert!(TrainNumber::parse("").is_err());
    }

    #[test]
    fn serde_round_trip() {
        let plate = PlateNumber::parse("CG07AB1234").unwrap();
        let json = serde_json::to_string(&plate).unwrap();
        assert_eq!(json, "\"CG07AB1234\"");
        let back: PlateNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plate);

        assert!(serde_json::from_str::<PhoneNumber>("\"1234\"").is_err());
    }
}
