//! percept-alerts: stateful, rate-limited alerting over detection batches
//!
//! Selects at most one "nearest important object" per batch, gates it on a
//! distance admission threshold, and enforces a minimum inter-alert interval
//! (the suppression window). The suppression timestamp is the only state the
//! pipeline keeps between messages.

pub mod config;
pub mod engine;

pub use config::AlertConfig;
pub use engine::{AlertEngine, AlertState, Clock, SystemClock};
