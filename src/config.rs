use std::time::Duration;

/// How a [`crate::HeartRateClient`] finds and keeps hold of its sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Only connect to a sensor advertising this local name. `None` takes the first
    /// sensor advertising the Heart Rate service.
    pub device_name: Option<String>,
    /// How long to scan before giving up
    pub scan_timeout: Duration,
    /// How many extra connection attempts to make when the sensor has dropped
    pub connect_retries: u32,
}

impl ClientConfig {
    const DEFAULT_SCAN_TIMEOUT_S: u64 = 30;
    const DEFAULT_CONNECT_RETRIES: u32 = 2;

    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    pub fn with_scan_timeout(mut self, scan_timeout: Duration) -> Self {
        self.scan_timeout = scan_timeout;
        self
    }

    pub fn with_connect_retries(mut self, connect_retries: u32) -> Self {
        self.connect_retries = connect_retries;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            device_name: None,
            scan_timeout: Duration::from_secs(Self::DEFAULT_SCAN_TIMEOUT_S),
            connect_retries: Self::DEFAULT_CONNECT_RETRIES,
        }
    }
}

#[test]
fn test_defaults() {
    let config = ClientConfig::default();
    assert_eq!(config.device_name, None);
    assert_eq!(config.scan_timeout, Duration::from_secs(30));
    assert_eq!(config.connect_retries, 2);
}

#[test]
fn test_builder() {
    let config = ClientConfig::default()
        .with_device_name("Polar H10 1A2B3C4D")
        .with_scan_timeout(Duration::from_secs(5))
        .with_connect_retries(0);
    assert_eq!(config.device_name.as_deref(), Some("Polar H10 1A2B3C4D"));
    assert_eq!(config.scan_timeout, Duration::from_secs(5));
    assert_eq!(config.connect_retries, 0);
}
