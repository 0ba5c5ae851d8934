use std::fmt;

use crate::error::require;
use crate::DecodeError;

/// Where on the body the sensor is worn, as reported by the Body Sensor Location
/// characteristic (0x2A38).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodySensorLocation {
    Other,
    Chest,
    Wrist,
    Finger,
    Hand,
    EarLobe,
    Foot,
    /// Values 7-255 are reserved for future use. The raw value is kept.
    Reserved(u8),
}

impl From<u8> for BodySensorLocation {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Other,
            1 => Self::Chest,
            2 => Self::Wrist,
            3 => Self::Finger,
            4 => Self::Hand,
            5 => Self::EarLobe,
            6 => Self::Foot,
            other => Self::Reserved(other),
        }
    }
}

impl fmt::Display for BodySensorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Other => "Other",
            Self::Chest => "Chest",
            Self::Wrist => "Wrist",
            Self::Finger => "Finger",
            Self::Hand => "Hand",
            Self::EarLobe => "Ear Lobe",
            Self::Foot => "Foot",
            Self::Reserved(_) => "Reserved for future use",
        };
        f.write_str(label)
    }
}

/// Decode a Body Sensor Location value. Only the first byte is inspected.
pub fn decode_body_location(payload: &[u8]) -> Result<BodySensorLocation, DecodeError> {
    let payload = require(payload, 1)?;
    Ok(BodySensorLocation::from(payload[0]))
}

#[test]
fn test_decode_known_locations() {
    let expected = [
        BodySensorLocation::Other,
        BodySensorLocation::Chest,
        BodySensorLocation::Wrist,
        BodySensorLocation::Finger,
        BodySensorLocation::Hand,
        BodySensorLocation::EarLobe,
        BodySensorLocation::Foot,
    ];
    for (value, location) in expected.into_iter().enumerate() {
        assert_eq!(decode_body_location(&[value as u8]), Ok(location));
    }
}

#[test]
fn test_decode_reserved_locations() {
    for value in 7..=u8::MAX {
        assert_eq!(
            decode_body_location(&[value]),
            Ok(BodySensorLocation::Reserved(value))
        );
    }
}

#[test]
fn test_decode_empty() {
    assert_eq!(decode_body_location(&[]), Err(DecodeError::EmptyPayload));
}

#[test]
fn test_decode_ignores_trailing_bytes() {
    let payload = hex::decode("01ff7f").unwrap();
    assert_eq!(decode_body_location(&payload), Ok(BodySensorLocation::Chest));
    assert_eq!(decode_body_location(&payload), decode_body_location(&payload));
}

#[test]
fn test_labels() {
    assert_eq!(BodySensorLocation::EarLobe.to_string(), "Ear Lobe");
    assert_eq!(BodySensorLocation::Reserved(42).to_string(), "Reserved for future use");
}
