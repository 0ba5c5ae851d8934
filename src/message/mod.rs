pub mod body_sensor_location;
pub mod heart_rate_measurement;
