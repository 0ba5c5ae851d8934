//! Connect to a heart rate sensor over Bluetooth Low Energy.
//!
//! The sensor is found by scanning for the Heart Rate service (0x180D). Once connected the
//! client exposes two characteristics of that service:
//!
//! - Heart Rate Measurement (0x2A37): notified every time the sensor has a new reading
//! - Body Sensor Location (0x2A38): read once, optional
//!
//! The client only moves bytes. Decoding lives in [`crate::message`].

use anyhow::anyhow;
use bluest::btuuid::bluetooth_uuid_from_u16;
use bluest::Adapter;
use bluest::AdvertisingDevice;
use bluest::Characteristic;
use bluest::Device;
use bluest::Uuid;
use futures_util::Stream;
use futures_util::StreamExt;
use log::{debug, info, warn};
use tokio::time::timeout;

use crate::config::ClientConfig;
use crate::connection_phase::ConnectionPhase;

pub struct HeartRateClient {
    adapter: Adapter,
    device: Device,
    config: ClientConfig,
    phase: ConnectionPhase,
    measurement: Characteristic,
    body_sensor_location: Option<Characteristic>,
}

impl HeartRateClient {
    const HEART_RATE_SERVICE_ID: Uuid = bluetooth_uuid_from_u16(0x180D);
    const HEART_RATE_MEASUREMENT_CHARACTERISTIC_ID: Uuid = bluetooth_uuid_from_u16(0x2A37);
    const BODY_SENSOR_LOCATION_CHARACTERISTIC_ID: Uuid = bluetooth_uuid_from_u16(0x2A38);

    /// Create a new `HeartRateClient` on the default adapter, which includes discovering
    /// and connecting to the sensor.
    pub async fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let adapter = Adapter::default()
            .await
            .ok_or(anyhow!("Default adapter not found"))?;
        Self::with_adapter(adapter, config).await
    }

    /// Create a new `HeartRateClient` on the given adapter.
    pub async fn with_adapter(adapter: Adapter, config: ClientConfig) -> anyhow::Result<Self> {
        adapter.wait_available().await?;

        let mut phase = ConnectionPhase::Idle;
        phase.advance(ConnectionPhase::Scanning);
        let device = timeout(
            config.scan_timeout,
            Self::discover_device(&adapter, config.device_name.as_deref()),
        )
        .await
        .map_err(|_| anyhow!("No heart rate sensor found within {:?}", config.scan_timeout))??;

        phase.advance(ConnectionPhase::Connecting);
        adapter.connect_device(&device.device).await?;
        info!("HEART RATE: Connected to {}", device.device);

        let (measurement, body_sensor_location) =
            Self::discover_characteristics(&device.device, &mut phase).await?;

        Ok(Self {
            adapter,
            device: device.device,
            config,
            phase,
            measurement,
            body_sensor_location,
        })
    }

    /// Disconnect from the sensor
    pub async fn stop(self) -> anyhow::Result<()> {
        self.adapter.disconnect_device(&self.device).await?;
        info!("HEART RATE: Disconnected from {}", self.device);
        Ok(())
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    /// Read the raw Body Sensor Location value.
    ///
    /// Returns `None` when the sensor does not expose the characteristic.
    pub async fn read_body_sensor_location(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
        self.try_connect().await?;

        let Some(characteristic) = &self.body_sensor_location else {
            return Ok(None);
        };
        let data = characteristic.read().await?;
        debug!("HEART RATE: RX body sensor location: 0x{}", hex::encode(&data));
        Ok(Some(data))
    }

    /// Subscribe to the Heart Rate Measurement characteristic.
    ///
    /// Every item is the raw value of one notification.
    pub async fn heart_rate_notifications(
        &mut self,
    ) -> anyhow::Result<impl Stream<Item = anyhow::Result<Vec<u8>>> + Send + Unpin + '_> {
        self.try_connect().await?;

        let reader = self.measurement.notify().await?;
        Ok(reader.map(|notification| -> anyhow::Result<Vec<u8>> {
            let data = notification?;
            debug!("HEART RATE: RX notification: 0x{}", hex::encode(&data));
            Ok(data)
        }))
    }

    async fn discover_device(adapter: &Adapter, name: Option<&str>) -> anyhow::Result<AdvertisingDevice> {
        let required_services = [Self::HEART_RATE_SERVICE_ID];
        let mut adapter_events = adapter.scan(&required_services).await?;
        while let Some(device) = adapter_events.next().await {
            let device_name = device.device.name_async().await.unwrap_or_default();
            info!("HEART RATE: Found peripheral {device_name:?} rssi {:?}", device.rssi);
            match name {
                Some(name) if name != device_name => debug!("HEART RATE: Skipping {device_name:?}"),
                _ => return Ok(device),
            }
        }

        Err(anyhow!("Scan ended before a heart rate sensor was found"))
    }

    /// Find the Heart Rate service and its characteristics on a connected device.
    async fn discover_characteristics(
        device: &Device,
        phase: &mut ConnectionPhase,
    ) -> anyhow::Result<(Characteristic, Option<Characteristic>)> {
        phase.advance(ConnectionPhase::DiscoveringServices);
        let heart_rate_service = device
            .discover_services_with_uuid(Self::HEART_RATE_SERVICE_ID)
            .await?
            .first()
            .ok_or(anyhow!("The specified device does not support the Heart Rate service."))?
            .clone();

        phase.advance(ConnectionPhase::DiscoveringCharacteristics);
        let measurement = heart_rate_service
            .discover_characteristics_with_uuid(Self::HEART_RATE_MEASUREMENT_CHARACTERISTIC_ID)
            .await?
            .first()
            .ok_or(anyhow!("The specified device does not support the Heart Rate Measurement characteristic."))?
            .clone();
        let properties = measurement.properties().await?;
        if !properties.notify {
            return Err(anyhow!("The Heart Rate Measurement characteristic does not support notify."));
        }

        let body_sensor_location = heart_rate_service
            .discover_characteristics_with_uuid(Self::BODY_SENSOR_LOCATION_CHARACTERISTIC_ID)
            .await?
            .first()
            .cloned();
        if body_sensor_location.is_none() {
            warn!("HEART RATE: Sensor does not report its body location");
        }

        phase.advance(ConnectionPhase::Ready);
        Ok((measurement, body_sensor_location))
    }

    async fn try_connect(&mut self) -> anyhow::Result<()> {
        if self.device.is_connected().await {
            return Ok(());
        }

        let attempt = self.reconnect().await;
        self.phase.settle(attempt)
    }

    async fn reconnect(&mut self) -> anyhow::Result<()> {
        self.phase.advance(ConnectionPhase::Connecting);
        let mut retries = self.config.connect_retries;
        loop {
            match self.adapter.connect_device(&self.device).await {
                Ok(()) => break,
                Err(err) if retries > 0 => {
                    warn!("HEART RATE: Failed to connect: {err}");
                    retries -= 1;
                }
                Err(err) => return Err(err.into()),
            }
        }

        // Handles from the previous connection are stale
        let (measurement, body_sensor_location) =
            Self::discover_characteristics(&self.device, &mut self.phase).await?;
        self.measurement = measurement;
        self.body_sensor_location = body_sensor_location;
        Ok(())
    }
}

#[test]
fn test_assigned_numbers() {
    assert_eq!(
        HeartRateClient::HEART_RATE_SERVICE_ID.to_string(),
        "0000180d-0000-1000-8000-00805f9b34fb"
    );
    assert_eq!(
        HeartRateClient::HEART_RATE_MEASUREMENT_CHARACTERISTIC_ID.to_string(),
        "00002a37-0000-1000-8000-00805f9b34fb"
    );
    assert_eq!(
        HeartRateClient::BODY_SENSOR_LOCATION_CHARACTERISTIC_ID.to_string(),
        "00002a38-0000-1000-8000-00805f9b34fb"
    );
}
