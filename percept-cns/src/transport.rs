//! MQTT transport wrapper
//!
//! Thin layer over rumqttc: connect from a [`BrokerConfig`], subscribe, and
//! publish through the [`Publisher`] trait so everything above the transport
//! can run against a test double instead of a live broker.

use crate::config::BrokerConfig;
use crate::error::CnsError;
use async_trait::async_trait;
use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use std::time::Duration;
use tracing::info;

/// Topic-addressed publish capability.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(
        &self,
        topic: &str,
        qos: u8,
        retain: bool,
        payload: Vec<u8>,
    ) -> Result<(), CnsError>;
}

/// Map a numeric QoS level onto the rumqttc enum. Unknown values degrade to
/// at-least-once, the bus's assumed delivery level.
pub fn to_qos(level: u8) -> QoS {
    match level {
        0 => QoS::AtMostOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtLeastOnce,
    }
}

/// MQTT client handle. Cloneable; all clones share one connection.
#[derive(Clone)]
pub struct MqttTransport {
    client: AsyncClient,
}

impl MqttTransport {
    /// Build the client and its event loop from broker settings.
    ///
    /// The event loop must be polled by the caller; connection errors show up
    /// there, not here.
    pub fn connect(config: &BrokerConfig) -> Result<(Self, EventLoop), CnsError> {
        config.validate().map_err(CnsError::Config)?;

        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
        if let Some(username) = &config.username {
            options.set_credentials(username, config.password.clone().unwrap_or_default());
        }
        if config.use_tls {
            options.set_transport(rumqttc::Transport::tls_with_default_config());
        }

        info!(
            host = %config.host,
            port = config.port,
            tls = config.use_tls,
            client_id = %config.client_id,
            "Connecting to MQTT broker"
        );
        let (client, eventloop) = AsyncClient::new(options, 64);
        Ok((Self { client }, eventloop))
    }

    pub async fn subscribe(&self, topic: &str, qos: u8) -> Result<(), CnsError> {
        self.client.subscribe(topic, to_qos(qos)).await?;
        info!(topic, "Subscribed");
        Ok(())
    }
}

#[async_trait]
impl Publisher for MqttTransport {
    async fn publish(
        &self,
        topic: &str,
        qos: u8,
        retain: bool,
        payload: Vec<u8>,
    ) -> Result<(), CnsError> {
        self.client
            .publish(topic, to_qos(qos), retain, payload)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qos_mapping() {
        assert_eq!(to_qos(0), QoS::AtMostOnce);
        assert_eq!(to_qos(1), QoS::AtLeastOnce);
        assert_eq!(to_qos(2), QoS::ExactlyOnce);
        assert_eq!(to_qos(7), QoS::AtLeastOnce);
    }

    #[test]
    fn test_connect_rejects_invalid_config() {
        let mut config = BrokerConfig::default();
        config.host.clear();
        assert!(matches!(
            MqttTransport::connect(&config),
            Err(CnsError::Config(_))
        ));
    }
}
