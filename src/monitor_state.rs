use std::fmt;

use crate::message::body_sensor_location::{decode_body_location, BodySensorLocation};
use crate::message::heart_rate_measurement::{
    decode_heart_rate, rr_interval_ms, HeartRateMeasurement, SensorContact,
};
use crate::DecodeError;

const PLACEHOLDER: &str = "--";

/// The values currently shown to the user.
///
/// A payload that fails to decode leaves the previous value in place.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MonitorState {
    /// Where the sensor is worn, read once after connecting
    pub body_sensor_location: Option<BodySensorLocation>,
    /// The most recent heart rate in BPM
    pub heart_rate_bpm: Option<u16>,
    /// Skin contact as of the most recent full measurement
    pub sensor_contact: Option<SensorContact>,
    /// RR intervals from the most recent full measurement, in units of 1/1024 s
    pub rr_intervals: Vec<u16>,
}

impl MonitorState {
    pub fn update_body_sensor_location(
        &mut self,
        payload: &[u8],
    ) -> Result<BodySensorLocation, DecodeError> {
        let location = decode_body_location(payload)?;
        self.body_sensor_location = Some(location);
        Ok(location)
    }

    pub fn update_heart_rate(&mut self, payload: &[u8]) -> Result<u16, DecodeError> {
        let bpm = decode_heart_rate(payload)?;
        self.heart_rate_bpm = Some(bpm);
        Ok(bpm)
    }

    /// Decode a whole Heart Rate Measurement notification and take over its heart rate,
    /// sensor contact and RR intervals.
    pub fn update_measurement(
        &mut self,
        payload: &[u8],
    ) -> Result<HeartRateMeasurement, DecodeError> {
        let measurement = HeartRateMeasurement::new(payload)?;
        self.heart_rate_bpm = Some(measurement.heart_rate_bpm);
        self.sensor_contact = Some(measurement.sensor_contact);
        self.rr_intervals = measurement.rr_intervals.clone();
        Ok(measurement)
    }

    pub fn heart_rate_label(&self) -> String {
        self.heart_rate_bpm
            .map(|bpm| bpm.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    pub fn body_sensor_location_label(&self) -> String {
        self.body_sensor_location
            .map(|location| location.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} BPM ({})",
            self.heart_rate_label(),
            self.body_sensor_location_label()
        )?;
        if self.sensor_contact == Some(SensorContact::NotDetected) {
            write!(f, " no skin contact")?;
        }
        if !self.rr_intervals.is_empty() {
            let rr_ms = self
                .rr_intervals
                .iter()
                .map(|&rr| format!("{:.0}", rr_interval_ms(rr)))
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, " RR [{rr_ms}] ms")?;
        }
        Ok(())
    }
}

#[test]
fn test_placeholders() {
    let state = MonitorState::default();
    assert_eq!(state.to_string(), "-- BPM (--)");
}

#[test]
fn test_updates() {
    let mut state = MonitorState::default();
    assert_eq!(state.update_body_sensor_location(&[0x01]), Ok(BodySensorLocation::Chest));
    assert_eq!(state.update_heart_rate(&[0x00, 72]), Ok(72));
    assert_eq!(state.to_string(), "72 BPM (Chest)");
}

#[test]
fn test_decode_error_keeps_previous_reading() {
    let mut state = MonitorState::default();
    state.update_heart_rate(&[0x01, 0x00, 0x50]).unwrap();
    state.update_body_sensor_location(&[0x05]).unwrap();

    assert_eq!(
        state.update_heart_rate(&[0x01, 0x00]),
        Err(DecodeError::PayloadTooShort { expected: 3, actual: 2 })
    );
    assert_eq!(state.update_body_sensor_location(&[]), Err(DecodeError::EmptyPayload));

    assert_eq!(state.heart_rate_bpm, Some(80));
    assert_eq!(state.to_string(), "80 BPM (Ear Lobe)");
}

#[test]
fn test_measurement_shows_rr_intervals() {
    let mut state = MonitorState::default();
    state.update_body_sensor_location(&[0x01]).unwrap();

    let measurement = state
        .update_measurement(&hex::decode("163c00040002").unwrap())
        .unwrap();
    assert_eq!(measurement.heart_rate_bpm, 60);
    assert_eq!(state.to_string(), "60 BPM (Chest) RR [1000, 500] ms");

    // Next notification has no RR intervals and the sensor lost contact
    state.update_measurement(&hex::decode("0441").unwrap()).unwrap();
    assert_eq!(state.to_string(), "65 BPM (Chest) no skin contact");
}

#[test]
fn test_measurement_decode_error_keeps_previous_reading() {
    let mut state = MonitorState::default();
    state.update_measurement(&hex::decode("103c0004").unwrap()).unwrap();

    // Energy expended announced but missing
    assert_eq!(
        state.update_measurement(&hex::decode("0848").unwrap()),
        Err(DecodeError::PayloadTooShort { expected: 4, actual: 2 })
    );
    assert_eq!(state.heart_rate_bpm, Some(60));
    assert_eq!(state.rr_intervals, vec![1024]);
}
