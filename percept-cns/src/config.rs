//! Configuration for transport, channels and node runtimes
//!
//! Channel topics and enable flags are deployment configuration, not core
//! logic; defaults mirror the reference deployment's topic layout.

use serde::{Deserialize, Serialize};

/// MQTT broker connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_tls: bool,
    pub keep_alive_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: format!("percept-{}", uuid::Uuid::new_v4().simple()),
            username: None,
            password: None,
            use_tls: false,
            keep_alive_secs: 30,
        }
    }
}

impl BrokerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("Broker host must not be empty".to_string());
        }
        if self.port == 0 {
            return Err("Broker port must be non-zero".to_string());
        }
        if self.client_id.is_empty() {
            return Err("Client id must not be empty".to_string());
        }
        if self.keep_alive_secs == 0 {
            return Err("Keep-alive must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// One named publish channel with its own enable flag and delivery quality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub topic: String,
    pub enabled: bool,
    /// MQTT QoS level (0, 1 or 2).
    pub qos: u8,
}

impl ChannelConfig {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            enabled: true,
            qos: 1,
        }
    }

    pub fn disabled(topic: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::new(topic)
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled && self.topic.is_empty() {
            return Err("Enabled channel must have a topic".to_string());
        }
        if self.qos > 2 {
            return Err("QoS must be 0, 1 or 2".to_string());
        }
        Ok(())
    }
}

/// One subscribed frame source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub topic: String,
    pub qos: u8,
    /// Per-source wide-FOV distance correction (1.0 = none).
    pub distance_scale: f64,
    /// Relay frames from this source onto the primary raw topic.
    pub relay: bool,
}

impl SourceConfig {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            qos: 1,
            distance_scale: 1.0,
            relay: false,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.topic.is_empty() {
            return Err("Source topic must not be empty".to_string());
        }
        if self.qos > 2 {
            return Err("QoS must be 0, 1 or 2".to_string());
        }
        if self.distance_scale <= 0.0 {
            return Err("Distance scale must be positive".to_string());
        }
        Ok(())
    }
}

/// All fan-out channels of the detector node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanoutChannels {
    /// Machine-readable detections JSON.
    pub detections: ChannelConfig,
    /// Detections JSON passthrough for the display pipeline.
    pub info: ChannelConfig,
    pub info_zh: ChannelConfig,
    pub info_en: ChannelConfig,
    pub speech_zh: ChannelConfig,
    pub speech_en: ChannelConfig,
    /// Annotated JPEG inside a JSON envelope.
    pub annotated: ChannelConfig,
    /// Annotated JPEG as a bare data-URL string.
    pub annotated_data_url: ChannelConfig,
}

impl Default for FanoutChannels {
    fn default() -> Self {
        Self {
            detections: ChannelConfig::new("assist/detections"),
            info: ChannelConfig::new("ntut/ProcessInfo"),
            info_zh: ChannelConfig::new("ntut/ProcessInfoZh"),
            info_en: ChannelConfig::new("ntut/ProcessInfoEn"),
            speech_zh: ChannelConfig::new("ntut/ProcessSpeechZh"),
            speech_en: ChannelConfig::new("ntut/ProcessSpeechEn"),
            annotated: ChannelConfig::disabled("assist/cam/annotated"),
            annotated_data_url: ChannelConfig::new("ntut/ProcessImage"),
        }
    }
}

impl FanoutChannels {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        for channel in [
            &self.detections,
            &self.info,
            &self.info_zh,
            &self.info_en,
            &self.speech_zh,
            &self.speech_en,
            &self.annotated,
            &self.annotated_data_url,
        ] {
            channel.validate()?;
        }
        Ok(())
    }

    /// Whether any annotated-image channel is enabled (drives whether the
    /// pipeline renders annotations at all).
    pub fn wants_annotation(&self) -> bool {
        self.annotated.enabled || self.annotated_data_url.enabled
    }
}

/// Detector node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorNodeConfig {
    pub broker: BrokerConfig,
    pub sources: Vec<SourceConfig>,
    /// Primary raw topic that relay-enabled sources republish into.
    pub relay_topic: Option<String>,
    pub channels: FanoutChannels,
    /// Optional confidence floor for the speech channels.
    pub speech_confidence_min: Option<f32>,
}

impl Default for DetectorNodeConfig {
    fn default() -> Self {
        Self {
            broker: BrokerConfig::default(),
            sources: vec![SourceConfig::new("assist/cam/raw")],
            relay_topic: None,
            channels: FanoutChannels::default(),
            speech_confidence_min: None,
        }
    }
}

impl DetectorNodeConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.broker.validate()?;
        if self.sources.is_empty() {
            return Err("At least one frame source is required".to_string());
        }
        for source in &self.sources {
            source.validate()?;
        }
        if let Some(floor) = self.speech_confidence_min {
            if !(0.0..=1.0).contains(&floor) {
                return Err("Speech confidence floor must be within [0, 1]".to_string());
            }
        }
        self.channels.validate()
    }
}

/// Alerts node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsNodeConfig {
    pub broker: BrokerConfig,
    pub detections_topic: String,
    pub detections_qos: u8,
    pub alerts: ChannelConfig,
}

impl Default for AlertsNodeConfig {
    fn default() -> Self {
        Self {
            broker: BrokerConfig::default(),
            detections_topic: "assist/detections".to_string(),
            detections_qos: 1,
            alerts: ChannelConfig::new("assist/alerts"),
        }
    }
}

impl AlertsNodeConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.broker.validate()?;
        if self.detections_topic.is_empty() {
            return Err("Detections topic must not be empty".to_string());
        }
        if self.detections_qos > 2 {
            return Err("QoS must be 0, 1 or 2".to_string());
        }
        self.alerts.validate()
    }
}
