//! Show live readings from a Bluetooth Low Energy heart rate sensor
//!
//! Any sensor implementing the Bluetooth SIG Heart Rate Service (0x180D) should work.
//!
//! Two characteristics are decoded:
//!
//! - Body Sensor Location (0x2A38): where the sensor is worn
//! - Heart Rate Measurement (0x2A37): heart rate in BPM, plus sensor contact, energy expended
//!   and RR intervals when the sensor sends them
//!
//! The decoders are pure functions over the raw characteristic value and return a
//! [`DecodeError`] for empty or truncated payloads instead of reading out of bounds.
//!
//! # Example
//!
//! ```no_run
//! # #[tokio::main]
//! # pub async fn main(){
//!     let config = heartread::ClientConfig::default();
//!     let mut client = heartread::HeartRateClient::new(config).await.unwrap();
//!     let mut state = heartread::MonitorState::default();
//!     let mut notifications = client.heart_rate_notifications().await.unwrap();
//!     while let Some(Ok(payload)) = futures_util::StreamExt::next(&mut notifications).await {
//!         if state.update_heart_rate(&payload).is_ok() {
//!             println!("{state}");
//!         }
//!     }
//! # }
//! ```

mod config;
mod connection_phase;
mod error;
mod heart_rate_client;
pub mod message;
mod monitor_state;

pub use config::ClientConfig;
pub use connection_phase::ConnectionPhase;
pub use error::DecodeError;
pub use heart_rate_client::HeartRateClient;
pub use message::body_sensor_location::{decode_body_location, BodySensorLocation};
pub use message::heart_rate_measurement::{decode_heart_rate, HeartRateMeasurement, SensorContact};
pub use monitor_state::MonitorState;
