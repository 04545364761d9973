//! Alert rule engine
//!
//! Two logical states per engine: armed (may emit) and suppressed (waiting
//! out the window). Emitting transitions to suppressed; the window elapsing
//! re-arms. The window is shared across all labels, not per-object: a close
//! car suppresses a subsequent close pedestrian within the window. That is a
//! deliberate simplicity/latency tradeoff.

use crate::config::AlertConfig;
use parking_lot::Mutex;
use percept_core::{Alert, AlertAction, AlertLevel, Detection, DetectionBatch};
use std::sync::Arc;
use tracing::{debug, info};

/// Time source, injectable for deterministic tests.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// Wall-clock time via chrono.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// The single piece of cross-message state: when the last alert fired.
///
/// `None` means never, so the first qualifying candidate after startup always
/// passes regardless of clock origin. Guarded by one mutex so the suppression
/// invariant holds under concurrent delivery.
#[derive(Debug, Default)]
pub struct AlertState {
    last_alert_ms: Mutex<Option<i64>>,
}

impl AlertState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamp of the last emitted alert, if any.
    pub fn last_alert_ms(&self) -> Option<i64> {
        *self.last_alert_ms.lock()
    }
}

/// Applies the alert rules to detection batches.
pub struct AlertEngine {
    config: AlertConfig,
    state: Arc<AlertState>,
    clock: Arc<dyn Clock>,
}

impl AlertEngine {
    pub fn new(config: AlertConfig) -> Result<Self, String> {
        Self::with_parts(config, Arc::new(AlertState::new()), Arc::new(SystemClock))
    }

    /// Construct with explicit state and clock (shared state across engines,
    /// injected clocks in tests).
    pub fn with_parts(
        config: AlertConfig,
        state: Arc<AlertState>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, String> {
        config.validate()?;
        Ok(Self {
            config,
            state,
            clock,
        })
    }

    pub fn state(&self) -> &Arc<AlertState> {
        &self.state
    }

    /// Evaluate one batch; at most one alert per batch.
    ///
    /// No candidate, a too-distant candidate, or an active suppression window
    /// all yield `None` with the state unchanged.
    pub fn evaluate(&self, batch: &DetectionBatch) -> Option<Alert> {
        let candidate = self.choose_candidate(&batch.objects)?;
        if candidate.distance_m > self.config.admission_distance_m {
            debug!(
                label = %candidate.label,
                distance_m = candidate.distance_m,
                "Candidate beyond admission threshold"
            );
            return None;
        }

        let now = self.clock.now_ms();
        let mut last = self.state.last_alert_ms.lock();
        if let Some(last_ms) = *last {
            if now - last_ms <= self.config.suppression_window_ms as i64 {
                debug!(label = %candidate.label, "Alert suppressed within window");
                return None;
            }
        }

        let alert = Alert {
            level: if candidate.distance_m < self.config.admission_distance_m / 2.0 {
                AlertLevel::Danger
            } else {
                AlertLevel::Warn
            },
            reason: candidate.label.clone(),
            side: candidate.side,
            dist_m: candidate.distance_m,
            action: if candidate.distance_m < 1.0 {
                AlertAction::Stop
            } else {
                AlertAction::Slow
            },
            ttl_ms: self.config.suppression_window_ms,
            ts: now,
        };
        *last = Some(now);
        info!(
            level = ?alert.level,
            reason = %alert.reason,
            dist_m = alert.dist_m,
            "Alert emitted"
        );
        Some(alert)
    }

    /// Nearest important detection. Ties keep the first one in batch order;
    /// that order comes from the detector and is not guaranteed stable.
    fn choose_candidate<'a>(&self, objects: &'a [Detection]) -> Option<&'a Detection> {
        objects
            .iter()
            .filter(|det| self.config.important_labels.contains(&det.label))
            .min_by(|a, b| {
                a.distance_m
                    .partial_cmp(&b.distance_m)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}
