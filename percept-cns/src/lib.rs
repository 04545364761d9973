//! percept-cns: transport and fan-out for the percept pipeline
//!
//! Provides:
//! - MQTT transport wrapper (connect, subscribe, publish) over rumqttc
//! - Pluggable [`Publisher`] trait so fan-out is testable without a broker
//! - Fan-out publisher with independently configurable channels
//! - Node runtimes: the detector node and the alerts node

pub mod config;
pub mod error;
pub mod fanout;
pub mod node;
pub mod transport;

pub use config::{
    AlertsNodeConfig, BrokerConfig, ChannelConfig, DetectorNodeConfig, FanoutChannels,
    SourceConfig,
};
pub use error::CnsError;
pub use fanout::{FanoutPublisher, FrameArtifacts};
pub use node::{AlertsNode, DetectorNode};
pub use transport::{MqttTransport, Publisher};
