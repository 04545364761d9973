//! Node runtimes: detector node and alerts node
//!
//! One inbound message, one synchronous pipeline pass; every failure is
//! local to its message. If frames arrive faster than they can be processed
//! they queue at the transport layer — there is no internal backpressure.

use crate::config::{AlertsNodeConfig, DetectorNodeConfig};
use crate::error::CnsError;
use crate::fanout::{publish_json, FanoutPublisher, FrameArtifacts};
use crate::transport::{MqttTransport, Publisher};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use percept_alerts::AlertEngine;
use percept_core::DetectionBatch;
use percept_eye::{FramePipeline, InboundPayload};
use percept_spk::{nearest, summary, Locale};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// The detector node: raw frames in, detections/text/annotated frames out.
pub struct DetectorNode {
    pipeline: FramePipeline,
    fanout: FanoutPublisher,
    publisher: Arc<dyn Publisher>,
    config: DetectorNodeConfig,
}

impl DetectorNode {
    pub fn new(
        pipeline: FramePipeline,
        publisher: Arc<dyn Publisher>,
        config: DetectorNodeConfig,
    ) -> Result<Self, CnsError> {
        config.validate().map_err(CnsError::Config)?;
        let fanout = FanoutPublisher::new(publisher.clone(), config.channels.clone())?;
        Ok(Self {
            pipeline,
            fanout,
            publisher,
            config,
        })
    }

    /// Subscribe to all frame sources and process messages until shutdown.
    pub async fn run(
        self,
        transport: &MqttTransport,
        mut eventloop: rumqttc::EventLoop,
    ) -> Result<(), CnsError> {
        for source in &self.config.sources {
            transport.subscribe(&source.topic, source.qos).await?;
        }
        info!(
            sources = self.config.sources.len(),
            detections_topic = %self.config.channels.detections.topic,
            "Detector node running"
        );
        loop {
            match eventloop.poll().await {
                Ok(rumqttc::Event::Incoming(rumqttc::Packet::Publish(publish))) => {
                    self.handle_message(&publish.topic, &publish.payload).await;
                }
                Ok(_) => {}
                Err(e) => {
                    // broker hiccups and reconnects are not fatal
                    error!(error = %e, "MQTT event loop error, retrying");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    /// Process one inbound frame message to completion.
    ///
    /// Duplicate delivery is tolerated: reprocessing is idempotent apart from
    /// re-publishing, which downstream consumers already absorb.
    pub async fn handle_message(&self, topic: &str, payload: &[u8]) {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let source = self.config.sources.iter().find(|s| s.topic == topic);
        let distance_scale = source.map_or(1.0, |s| s.distance_scale);

        let output = match self.pipeline.process(payload, now_ms, distance_scale) {
            Ok(Some(output)) => output,
            Ok(None) => return,
            Err(e) => {
                warn!(topic, error = %e, "Dropping frame");
                return;
            }
        };

        let objects = &output.batch.objects;
        let floor = self.config.speech_confidence_min;
        let artifacts = FrameArtifacts {
            batch: &output.batch,
            summary_zh: summary(objects, Locale::Zh),
            summary_en: summary(objects, Locale::En),
            speech_zh: nearest(objects, Locale::Zh, floor),
            speech_en: nearest(objects, Locale::En, floor),
            annotated_jpeg: output.annotated,
        };
        let failures = self.fanout.publish_frame(&artifacts).await;
        if failures > 0 {
            warn!(failures, "Some channels failed for this frame");
        }

        if source.map_or(false, |s| s.relay) {
            self.relay_frame(topic, payload).await;
        }
    }

    /// Republish a frame from an alternate source onto the primary raw topic,
    /// with the loop guard set so we skip it when it comes back around.
    async fn relay_frame(&self, from_topic: &str, payload: &[u8]) {
        let Some(relay_topic) = &self.config.relay_topic else {
            return;
        };
        if relay_topic == from_topic {
            return;
        }
        let data = match InboundPayload::classify(payload) {
            InboundPayload::Envelope(env) => env.data,
            InboundPayload::Base64String(s) | InboundPayload::DataUrl(s) => Some(s),
            InboundPayload::RawBytes(bytes) => Some(BASE64.encode(bytes)),
        };
        let Some(data) = data else { return };
        let envelope = serde_json::json!({ "data": data, "_relay_skip": true });
        match serde_json::to_vec(&envelope) {
            Ok(bytes) => {
                if let Err(e) = self.publisher.publish(relay_topic, 1, false, bytes).await {
                    warn!(topic = %relay_topic, error = %e, "Relay publish failed");
                }
            }
            Err(e) => warn!(error = %e, "Relay envelope serialization failed"),
        }
    }
}

/// The alerts node: detection batches in, rate-limited alerts out.
pub struct AlertsNode {
    engine: AlertEngine,
    publisher: Arc<dyn Publisher>,
    config: AlertsNodeConfig,
}

impl AlertsNode {
    pub fn new(
        engine: AlertEngine,
        publisher: Arc<dyn Publisher>,
        config: AlertsNodeConfig,
    ) -> Result<Self, CnsError> {
        config.validate().map_err(CnsError::Config)?;
        Ok(Self {
            engine,
            publisher,
            config,
        })
    }

    pub async fn run(
        self,
        transport: &MqttTransport,
        mut eventloop: rumqttc::EventLoop,
    ) -> Result<(), CnsError> {
        transport
            .subscribe(&self.config.detections_topic, self.config.detections_qos)
            .await?;
        info!(
            detections_topic = %self.config.detections_topic,
            alerts_topic = %self.config.alerts.topic,
            "Alerts node running"
        );
        loop {
            match eventloop.poll().await {
                Ok(rumqttc::Event::Incoming(rumqttc::Packet::Publish(publish))) => {
                    self.handle_detections(&publish.topic, &publish.payload).await;
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "MQTT event loop error, retrying");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    /// Evaluate one detections message; the topic is already filtered by the
    /// subscription.
    pub async fn handle_detections(&self, _topic: &str, payload: &[u8]) {
        let batch: DetectionBatch = match serde_json::from_slice(payload) {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, "Dropping malformed detections payload");
                return;
            }
        };
        if let Some(alert) = self.engine.evaluate(&batch) {
            if let Err(e) =
                publish_json(self.publisher.as_ref(), &self.config.alerts, &alert).await
            {
                warn!(error = %e, "Alert publish failed");
            }
        }
    }
}
