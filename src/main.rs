use std::future::Future;
use std::process::exit;
use std::time::Duration;

use clap::Parser;
use futures_util::StreamExt;
use heartread::{ClientConfig, HeartRateClient, MonitorState};
use log::{debug, error, info, warn};

const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "heartread", about = "Show live readings from a Bluetooth LE heart rate sensor")]
struct Args {
    /// Only connect to a sensor advertising this local name
    #[arg(short, long)]
    name: Option<String>,
    /// Seconds to scan for a sensor before giving up
    #[arg(long, default_value_t = 30)]
    scan_timeout: u64,
    /// Extra connection attempts when the sensor drops
    #[arg(long, default_value_t = 2)]
    retries: u32,
}

impl Args {
    fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::default()
            .with_scan_timeout(Duration::from_secs(self.scan_timeout))
            .with_connect_retries(self.retries);
        match &self.name {
            Some(name) => config.with_device_name(name),
            None => config,
        }
    }
}

/// What to do with one item from the notification stream
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Show(Vec<u8>),
    /// The subscription is gone. Subscribing again reconnects if the sensor dropped.
    Resubscribe,
}

impl Step {
    fn from_notification(notification: Option<anyhow::Result<Vec<u8>>>) -> Self {
        match notification {
            Some(Ok(payload)) => Step::Show(payload),
            Some(Err(err)) => {
                warn!("Notification error: {err:#}");
                Step::Resubscribe
            }
            None => {
                warn!("End of notification stream");
                Step::Resubscribe
            }
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()).await {
        error!("{e:#}");
        exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    info!("Scanning for a heart rate sensor");
    let mut client = HeartRateClient::new(args.client_config()).await?;

    let monitored = monitor(&mut client, tokio::signal::ctrl_c()).await;
    let stopped = client.stop().await;
    monitored?;
    stopped
}

/// Show readings until `interrupt` completes or the sensor cannot be reconnected.
async fn monitor<I>(client: &mut HeartRateClient, interrupt: I) -> anyhow::Result<()>
where
    I: Future,
{
    let mut state = MonitorState::default();

    match client.read_body_sensor_location().await? {
        Some(payload) => {
            if let Err(err) = state.update_body_sensor_location(&payload) {
                warn!("Could not decode body sensor location: {err}");
            }
        }
        None => info!("Sensor does not report a body sensor location"),
    }
    println!("Body sensor location: {}", state.body_sensor_location_label());

    tokio::pin!(interrupt);
    loop {
        // Reconnects with retries when the sensor has dropped
        let mut notifications = client.heart_rate_notifications().await?;
        loop {
            let notification = tokio::select! {
                notification = notifications.next() => notification,
                _ = &mut interrupt => {
                    info!("Interrupted");
                    return Ok(());
                }
            };
            match Step::from_notification(notification) {
                Step::Show(payload) => match state.update_measurement(&payload) {
                    Ok(measurement) => {
                        debug!("{measurement:?}");
                        println!("{state}");
                    }
                    Err(err) => warn!(
                        "No heart rate reading this cycle: {err}: 0x{}",
                        hex::encode(&payload)
                    ),
                },
                Step::Resubscribe => break,
            }
        }
        info!("Subscribing to heart rate notifications again");
        tokio::time::sleep(RESUBSCRIBE_DELAY).await;
    }
}

#[test]
fn test_args_to_config() {
    let args = Args::parse_from(["heartread", "--name", "HRM-Pro", "--scan-timeout", "10"]);
    let config = args.client_config();
    assert_eq!(config.device_name.as_deref(), Some("HRM-Pro"));
    assert_eq!(config.scan_timeout, Duration::from_secs(10));
    assert_eq!(config.connect_retries, 2);
}

#[test]
fn test_retries_arg() {
    let args = Args::parse_from(["heartread", "--retries", "5"]);
    assert_eq!(args.client_config().connect_retries, 5);
}

#[test]
fn test_dropped_sensor_resubscribes() {
    assert_eq!(Step::from_notification(None), Step::Resubscribe);
}

#[test]
fn test_notification_error_resubscribes() {
    let notification = Some(Err(anyhow::anyhow!("link lost")));
    assert_eq!(Step::from_notification(notification), Step::Resubscribe);
}

#[test]
fn test_notification_payload_is_shown() {
    let payload = hex::decode("002a").unwrap();
    assert_eq!(
        Step::from_notification(Some(Ok(payload.clone()))),
        Step::Show(payload)
    );
}
