use crate::error::require;
use crate::DecodeError;

const FLAG_VALUE_FORMAT_U16: u8 = 1 << 0;
const FLAG_SENSOR_CONTACT_DETECTED: u8 = 1 << 1;
const FLAG_SENSOR_CONTACT_SUPPORTED: u8 = 1 << 2;
const FLAG_ENERGY_EXPENDED_PRESENT: u8 = 1 << 3;
const FLAG_RR_INTERVAL_PRESENT: u8 = 1 << 4;

/// RR intervals are transmitted in units of 1/1024 s
const RR_INTERVAL_UNITS_PER_SECOND: f64 = 1024.0;

/// Decode the heart rate in BPM from a Heart Rate Measurement value (0x2A37).
///
/// Bit 0 of the flags byte selects the value format:
///
/// Flag | Bytes  | Value
/// 0    | 1      | u8
/// 1    | 1..=2  | `(byte[1] << 8) | byte[2]`
pub fn decode_heart_rate(payload: &[u8]) -> Result<u16, DecodeError> {
    let flags = *payload.first().ok_or(DecodeError::EmptyPayload)?;
    if flags & FLAG_VALUE_FORMAT_U16 == 0 {
        let payload = require(payload, 2)?;
        Ok(payload[1].into())
    } else {
        let payload = require(payload, 3)?;
        Ok(u16::from_be_bytes([payload[1], payload[2]]))
    }
}

/// Whether the sensor reports skin contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorContact {
    NotSupported,
    NotDetected,
    Detected,
}

/// A fully decoded Heart Rate Measurement notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartRateMeasurement {
    /// Heart rate in beats per minute
    pub heart_rate_bpm: u16,
    pub sensor_contact: SensorContact,
    /// Cumulative energy expended in kJ, when the sensor sends it
    pub energy_expended_kj: Option<u16>,
    /// Time between beats in units of 1/1024 s, oldest first
    pub rr_intervals: Vec<u16>,
}

impl HeartRateMeasurement {
    pub fn new(data: &[u8]) -> Result<Self, DecodeError> {
        let heart_rate_bpm = decode_heart_rate(data)?;
        let flags = data[0];

        let sensor_contact = if flags & FLAG_SENSOR_CONTACT_SUPPORTED == 0 {
            SensorContact::NotSupported
        } else if flags & FLAG_SENSOR_CONTACT_DETECTED == 0 {
            SensorContact::NotDetected
        } else {
            SensorContact::Detected
        };

        let mut offset = if flags & FLAG_VALUE_FORMAT_U16 == 0 { 2 } else { 3 };

        let energy_expended_kj = if flags & FLAG_ENERGY_EXPENDED_PRESENT != 0 {
            let data = require(data, offset + 2)?;
            let energy = u16::from_le_bytes([data[offset], data[offset + 1]]);
            offset += 2;
            Some(energy)
        } else {
            None
        };

        // A dangling odd byte cannot form an interval and is dropped.
        let rr_intervals = if flags & FLAG_RR_INTERVAL_PRESENT != 0 {
            data[offset..]
                .chunks_exact(2)
                .map(|bytes| u16::from_le_bytes([bytes[0], bytes[1]]))
                .collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            heart_rate_bpm,
            sensor_contact,
            energy_expended_kj,
            rr_intervals,
        })
    }

    /// RR intervals converted to milliseconds
    pub fn rr_intervals_ms(&self) -> Vec<f64> {
        self.rr_intervals.iter().map(|&rr| rr_interval_ms(rr)).collect()
    }
}

/// Convert one RR interval from 1/1024 s units to milliseconds
pub fn rr_interval_ms(rr: u16) -> f64 {
    f64::from(rr) * 1000.0 / RR_INTERVAL_UNITS_PER_SECOND
}

#[test]
fn test_decode_heart_rate_u8() {
    assert_eq!(decode_heart_rate(&[0x00, 42]), Ok(42));
}

#[test]
fn test_decode_heart_rate_u16() {
    assert_eq!(decode_heart_rate(&[0x01, 0x01, 0x2c]), Ok(300));
}

#[test]
fn test_decode_heart_rate_empty() {
    assert_eq!(decode_heart_rate(&[]), Err(DecodeError::EmptyPayload));
}

#[test]
fn test_decode_heart_rate_missing_value() {
    assert_eq!(
        decode_heart_rate(&[0x00]),
        Err(DecodeError::PayloadTooShort { expected: 2, actual: 1 })
    );
}

#[test]
fn test_decode_heart_rate_u16_truncated() {
    assert_eq!(
        decode_heart_rate(&[0x01, 0x01]),
        Err(DecodeError::PayloadTooShort { expected: 3, actual: 2 })
    );
}

#[test]
fn test_decode_heart_rate_is_repeatable() {
    let payload = hex::decode("16480004").unwrap();
    assert_eq!(decode_heart_rate(&payload), decode_heart_rate(&payload));
    assert_eq!(decode_heart_rate(&payload), Ok(72));
}

#[test]
fn test_measurement_sensor_contact() {
    let detected = HeartRateMeasurement::new(&[0x06, 60]).unwrap();
    assert_eq!(detected.sensor_contact, SensorContact::Detected);

    let not_detected = HeartRateMeasurement::new(&[0x04, 60]).unwrap();
    assert_eq!(not_detected.sensor_contact, SensorContact::NotDetected);

    // The status bit means nothing without the support bit
    let unsupported = HeartRateMeasurement::new(&[0x02, 60]).unwrap();
    assert_eq!(unsupported.sensor_contact, SensorContact::NotSupported);
}

#[test]
fn test_measurement_energy_expended() {
    let measurement = HeartRateMeasurement::new(&hex::decode("08481000").unwrap()).unwrap();
    assert_eq!(measurement.heart_rate_bpm, 72);
    assert_eq!(measurement.energy_expended_kj, Some(16));
    assert!(measurement.rr_intervals.is_empty());
}

#[test]
fn test_measurement_energy_expended_truncated() {
    let result = HeartRateMeasurement::new(&hex::decode("084810").unwrap());
    assert_eq!(result, Err(DecodeError::PayloadTooShort { expected: 4, actual: 3 }));
}

#[test]
fn test_measurement_rr_intervals() {
    let measurement = HeartRateMeasurement::new(&hex::decode("103c0004000202").unwrap()).unwrap();
    assert_eq!(measurement.heart_rate_bpm, 60);
    assert_eq!(measurement.energy_expended_kj, None);
    assert_eq!(measurement.rr_intervals, vec![1024, 512]);
    assert_eq!(measurement.rr_intervals_ms(), vec![1000.0, 500.0]);
}

#[test]
fn test_measurement_all_fields_u16() {
    let measurement = HeartRateMeasurement::new(&hex::decode("19012c0a000004").unwrap()).unwrap();
    assert_eq!(
        measurement,
        HeartRateMeasurement {
            heart_rate_bpm: 300,
            sensor_contact: SensorContact::NotSupported,
            energy_expended_kj: Some(10),
            rr_intervals: vec![1024],
        }
    );
}

#[test]
fn test_measurement_empty() {
    assert_eq!(HeartRateMeasurement::new(&[]), Err(DecodeError::EmptyPayload));
}
