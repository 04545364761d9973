//! Alert rule configuration

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Alert rule configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Labels eligible to trigger alerts.
    pub important_labels: HashSet<String>,
    /// Maximum distance at which a candidate may alert, in meters.
    pub admission_distance_m: f64,
    /// Minimum interval between consecutive alerts, in milliseconds.
    pub suppression_window_ms: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            important_labels: ["person", "car", "bus", "truck", "bicycle", "motorbike"]
                .into_iter()
                .map(String::from)
                .collect(),
            admission_distance_m: 2.5,
            suppression_window_ms: 800,
        }
    }
}

impl AlertConfig {
    /// Parse the important-label set from a comma-separated list.
    pub fn with_labels_csv(mut self, csv: &str) -> Self {
        self.important_labels = csv
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.important_labels.is_empty() {
            return Err("Important label set must not be empty".to_string());
        }
        if self.admission_distance_m <= 0.0 {
            return Err("Admission distance must be positive".to_string());
        }
        if self.suppression_window_ms == 0 {
            return Err("Suppression window must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = AlertConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.important_labels.contains("person"));
        assert!((config.admission_distance_m - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.suppression_window_ms, 800);
    }

    #[test]
    fn test_labels_csv_parsing() {
        let config = AlertConfig::default().with_labels_csv("person, dog ,cat");
        assert_eq!(config.important_labels.len(), 3);
        assert!(config.important_labels.contains("dog"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AlertConfig::default();
        config.important_labels.clear();
        assert!(config.validate().is_err());

        let mut config = AlertConfig::default();
        config.admission_distance_m = 0.0;
        assert!(config.validate().is_err());

        let mut config = AlertConfig::default();
        config.suppression_window_ms = 0;
        assert!(config.validate().is_err());
    }
}
