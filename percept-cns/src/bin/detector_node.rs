//! Detector node binary
//!
//! Subscribes to raw frame topics, runs the frame pipeline, and fans results
//! out to the detection/text/speech/image channels. The detection model is an
//! external capability; until a model adapter is plugged in, the node runs
//! with the null detector and publishes empty batches.

use anyhow::Context;
use clap::Parser;
use percept_cns::{
    BrokerConfig, ChannelConfig, DetectorNodeConfig, FanoutChannels, MqttTransport, SourceConfig,
};
use percept_core::Calibration;
use percept_eye::{DetectorProfile, FramePipeline, NullDetector};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "percept-detector")]
#[command(about = "Frame detection node: raw frames in, detections and text out")]
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

    /// Primary raw frame topic
    #[arg(long, env = "TOPIC_RAW", default_value = "assist/cam/raw")]
    topic_raw: String,

    /// Optional alternate raw topic (e.g. a wide-FOV camera)
    #[arg(long, env = "TOPIC_RAW_ALT")]
    topic_raw_alt: Option<String>,

    /// Distance correction for the alternate source
    #[arg(long, env = "DIST_MULTIPLIER_ALT", default_value_t = 1.0)]
    alt_distance_scale: f64,

    /// Relay alternate-source frames onto the primary raw topic
    #[arg(long, env = "RELAY_ALT", default_value_t = false)]
    relay_alt: bool,

    #[arg(long, env = "TOPIC_DET", default_value = "assist/detections")]
    topic_detections: String,

    #[arg(long, env = "TOPIC_INFO", default_value = "ntut/ProcessInfo")]
    topic_info: String,

    #[arg(long, env = "TOPIC_INFO_ZH", default_value = "ntut/ProcessInfoZh")]
    topic_info_zh: String,

    #[arg(long, env = "TOPIC_INFO_EN", default_value = "ntut/ProcessInfoEn")]
    topic_info_en: String,

    #[arg(long, env = "TOPIC_SPEECH_ZH", default_value = "ntut/ProcessSpeechZh")]
    topic_speech_zh: String,

    #[arg(long, env = "TOPIC_SPEECH_EN", default_value = "ntut/ProcessSpeechEn")]
    topic_speech_en: String,

    #[arg(long, env = "TOPIC_ANN", default_value = "assist/cam/annotated")]
    topic_annotated: String,

    #[arg(long, env = "TOPIC_ANN_ALT", default_value = "ntut/ProcessImage")]
    topic_annotated_data_url: String,

    /// Publish annotated JPEG envelopes
    #[arg(long, env = "PUBLISH_ANN", default_value_t = false)]
    publish_annotated: bool,

    #[arg(long, env = "CONF_THRESH", default_value_t = 0.25)]
    confidence_threshold: f32,

    #[arg(long, env = "FOCAL_PX", default_value_t = 900.0)]
    focal_px: f64,

    #[arg(long, env = "OBJ_HEIGHT_M", default_value_t = 1.6)]
    reference_height_m: f64,

    /// Use the fruit detector profile (allow-set + small-object calibration)
    #[arg(long, env = "FRUIT_MODE", default_value_t = false)]
    fruit: bool,

    /// Minimum confidence for the speech channels
    #[arg(long, env = "SPEECH_CONF_MIN")]
    speech_conf_min: Option<f32>,
}

impl Args {
    fn node_config(&self) -> DetectorNodeConfig {
        let mut sources = vec![SourceConfig::new(&self.topic_raw)];
        if let Some(alt) = &self.topic_raw_alt {
            let mut source = SourceConfig::new(alt);
            source.distance_scale = self.alt_distance_scale;
            source.relay = self.relay_alt;
            sources.push(source);
        }

        let mut channels = FanoutChannels {
            detections: ChannelConfig::new(&self.topic_detections),
            info: ChannelConfig::new(&self.topic_info),
            info_zh: ChannelConfig::new(&self.topic_info_zh),
            info_en: ChannelConfig::new(&self.topic_info_en),
            speech_zh: ChannelConfig::new(&self.topic_speech_zh),
            speech_en: ChannelConfig::new(&self.topic_speech_en),
            annotated: ChannelConfig::new(&self.topic_annotated),
            annotated_data_url: ChannelConfig::new(&self.topic_annotated_data_url),
        };
        channels.annotated.enabled = self.publish_annotated;

        DetectorNodeConfig {
            broker: BrokerConfig {
                host: self.broker.clone(),
                port: self.port,
                username: self.username.clone(),
                password: self.password.clone(),
                use_tls: self.tls,
                ..BrokerConfig::default()
            },
            sources,
            relay_topic: self.relay_alt.then(|| self.topic_raw.clone()),
            channels,
            speech_confidence_min: self.speech_conf_min,
        }
    }

    fn detector_profile(&self) -> DetectorProfile {
        if self.fruit {
            return DetectorProfile::fruit();
        }
        DetectorProfile {
            confidence_threshold: self.confidence_threshold,
            calibration: Calibration {
                reference_height_m: self.reference_height_m,
                focal_length_px: self.focal_px,
                distance_scale: 1.0,
            },
            ..DetectorProfile::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = args.node_config();
    let profile = args.detector_profile();

    warn!("No detection model adapter configured; running with the null detector");
    let pipeline = FramePipeline::new(
        Arc::new(NullDetector),
        profile,
        config.channels.wants_annotation(),
    )
    .context("building frame pipeline")?;

    let (transport, eventloop) =
        MqttTransport::connect(&config.broker).context("connecting to broker")?;
    let node = percept_cns::DetectorNode::new(pipeline, Arc::new(transport.clone()), config)
        .context("building detector node")?;
    node.run(&transport, eventloop).await?;
    Ok(())
}
