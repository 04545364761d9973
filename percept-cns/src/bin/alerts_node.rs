//! Alerts node binary
//!
//! Subscribes to the detections topic, applies the alert rules, and publishes
//! rate-limited alerts.

use anyhow::Context;
use clap::Parser;
use percept_alerts::{AlertConfig, AlertEngine};
use percept_cns::{AlertsNode, AlertsNodeConfig, BrokerConfig, ChannelConfig, MqttTransport};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "percept-alerts-node")]
#[command(about = "Alert node: detection batches in, rate-limited alerts out")]
#[command(version)]
struct Args {
    #[arg(long, env = "MQTT_BROKER", default_value = "localhost")]
    broker: String,

    #[arg(long, env = "MQTT_PORT", default_value_t = 1883)]
    port: u16,

    #[arg(long, env = "MQTT_USER")]
    username: Option<String>,

    #[arg(long, env = "MQTT_PASS")]
    password: Option<String>,

    #[arg(long, env = "MQTT_TLS", default_value_t = false)]
    tls: bool,

    #[arg(long, env = "TOPIC_DET", default_value = "assist/detections")]
    topic_detections: String,

    #[arg(long, env = "TOPIC_ALERT", default_value = "assist/alerts")]
    topic_alerts: String,

    /// Maximum distance (meters) at which a candidate may alert
    #[arg(long, env = "ALERT_DIST_M", default_value_t = 2.5)]
    alert_distance_m: f64,

    /// Minimum interval between alerts, in milliseconds
    #[arg(long, env = "SUPPRESS_MS", default_value_t = 800)]
    suppress_ms: u64,

    /// Comma-separated labels eligible to alert
    #[arg(
        long,
        env = "IMPORTANT_CLASSES",
        default_value = "person,car,bus,truck,bicycle,motorbike"
    )]
    important_classes: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let alert_config = AlertConfig {
        admission_distance_m: args.alert_distance_m,
        suppression_window_ms: args.suppress_ms,
        ..AlertConfig::default()
    }
    .with_labels_csv(&args.important_classes);
    let engine = AlertEngine::new(alert_config)
        .map_err(anyhow::Error::msg)
        .context("building alert engine")?;

    let config = AlertsNodeConfig {
        broker: BrokerConfig {
            host: args.broker.clone(),
            port: args.port,
            username: args.username.clone(),
            password: args.password.clone(),
            use_tls: args.tls,
            ..BrokerConfig::default()
        },
        detections_topic: args.topic_detections.clone(),
        detections_qos: 1,
        alerts: ChannelConfig::new(&args.topic_alerts),
    };

    let (transport, eventloop) =
        MqttTransport::connect(&config.broker).context("connecting to broker")?;
    let node = AlertsNode::new(engine, Arc::new(transport.clone()), config)
        .context("building alerts node")?;
    node.run(&transport, eventloop).await?;
    Ok(())
}
