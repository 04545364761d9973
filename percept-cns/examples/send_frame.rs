//! Publish a single JPEG file to the raw frame topic, for smoke-testing the
//! detector node end to end.
//!
//! Usage: send_frame <path/to/image.jpg> [topic]

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use percept_cns::{BrokerConfig, MqttTransport, Publisher};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let mut args = std::env::args().skip(1);
    let path = args.next().expect("usage: send_frame <image.jpg> [topic]");
    let topic = args.next().unwrap_or_else(|| "assist/cam/raw".to_string());

    let bytes = std::fs::read(&path)?;
    let envelope = serde_json::json!({
        "ts": chrono::Utc::now().timestamp_millis(),
        "frame_id": "send-frame",
        "encoding": "jpg",
        "data": BASE64.encode(&bytes),
    });

    let mut broker = BrokerConfig::default();
    if let Ok(host) = std::env::var("MQTT_BROKER") {
        broker.host = host;
    }
    let (transport, mut eventloop) = MqttTransport::connect(&broker)?;
    // drive the event loop in the background so the publish goes out
    let driver = tokio::spawn(async move {
        loop {
            if eventloop.poll().await.is_err() {
                break;
            }
        }
    });

    transport
        .publish(&topic, 1, false, serde_json::to_vec(&envelope)?)
        .await?;
    println!("Published {} bytes from {path} to {topic}", bytes.len());

    // give the client a moment to flush before exiting
    tokio::time::sleep(Duration::from_millis(500)).await;
    driver.abort();
    Ok(())
}
