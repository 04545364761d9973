//! Fan-out publishing of pipeline artifacts
//!
//! Each artifact goes to its own channel; a failure on one channel is logged
//! and the remaining channels are still attempted. Failures never cross the
//! pipeline boundary.

use crate::config::{ChannelConfig, FanoutChannels};
use crate::error::CnsError;
use crate::transport::Publisher;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use percept_core::DetectionBatch;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Everything one frame pass produced for publishing.
#[derive(Debug)]
pub struct FrameArtifacts<'a> {
    pub batch: &'a DetectionBatch,
    pub summary_zh: String,
    pub summary_en: String,
    /// `None` means the formatter had nothing to say; the channel is skipped.
    pub speech_zh: Option<String>,
    pub speech_en: Option<String>,
    pub annotated_jpeg: Option<Vec<u8>>,
}

/// Publish one JSON value to a channel, honoring its enable flag.
pub async fn publish_json<T: Serialize>(
    publisher: &dyn Publisher,
    channel: &ChannelConfig,
    value: &T,
) -> Result<(), CnsError> {
    if !channel.enabled {
        return Ok(());
    }
    let payload = serde_json::to_vec(value)?;
    publisher
        .publish(&channel.topic, channel.qos, false, payload)
        .await
}

/// Fans pipeline output out to the configured channels.
pub struct FanoutPublisher {
    publisher: Arc<dyn Publisher>,
    channels: FanoutChannels,
}

impl FanoutPublisher {
    pub fn new(publisher: Arc<dyn Publisher>, channels: FanoutChannels) -> Result<Self, CnsError> {
        channels.validate().map_err(CnsError::Config)?;
        Ok(Self {
            publisher,
            channels,
        })
    }

    pub fn channels(&self) -> &FanoutChannels {
        &self.channels
    }

    /// Publish all enabled artifacts of one frame. Returns the number of
    /// channels that failed; the caller only logs it.
    pub async fn publish_frame(&self, artifacts: &FrameArtifacts<'_>) -> usize {
        let mut failures = 0;

        self.send_json(&self.channels.detections, artifacts.batch, &mut failures)
            .await;
        self.send_json(&self.channels.info, artifacts.batch, &mut failures)
            .await;
        self.send_text(&self.channels.info_zh, &artifacts.summary_zh, &mut failures)
            .await;
        self.send_text(&self.channels.info_en, &artifacts.summary_en, &mut failures)
            .await;
        if let Some(speech) = &artifacts.speech_zh {
            self.send_text(&self.channels.speech_zh, speech, &mut failures)
                .await;
        }
        if let Some(speech) = &artifacts.speech_en {
            self.send_text(&self.channels.speech_en, speech, &mut failures)
                .await;
        }

        if let Some(jpeg) = &artifacts.annotated_jpeg {
            let b64 = BASE64.encode(jpeg);
            let envelope = serde_json::json!({
                "ts": artifacts.batch.ts,
                "frame_id": artifacts.batch.frame_id,
                "encoding": "jpg",
                "data": b64,
            });
            self.send_json(&self.channels.annotated, &envelope, &mut failures)
                .await;
            let data_url = format!("data:image/jpeg;base64,{b64}");
            self.send_text(&self.channels.annotated_data_url, &data_url, &mut failures)
                .await;
        }

        failures
    }

    async fn send_json<T: Serialize>(
        &self,
        channel: &ChannelConfig,
        value: &T,
        failures: &mut usize,
    ) {
        if let Err(e) = publish_json(self.publisher.as_ref(), channel, value).await {
            warn!(topic = %channel.topic, error = %e, "Channel publish failed");
            *failures += 1;
        }
    }

    async fn send_text(&self, channel: &ChannelConfig, text: &str, failures: &mut usize) {
        if !channel.enabled {
            return;
        }
        if let Err(e) = self
            .publisher
            .publish(&channel.topic, channel.qos, false, text.as_bytes().to_vec())
            .await
        {
            warn!(topic = %channel.topic, error = %e, "Channel publish failed");
            *failures += 1;
        }
    }
}
