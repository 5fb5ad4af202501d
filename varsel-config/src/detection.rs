//! Event significance configuration.
//!
//! Thresholds and keyword set for the classifier. The defaults match
//! the operational policy the engine ships with; they are configuration,
//! not hardcoded constants.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Significance thresholds and classifier keyword set.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct DetectionConfig {
    /// A metric with `cpu_percent` strictly above this is significant.
    #[serde(default = "default_cpu_percent")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub cpu_percent: f64,

    /// A metric with `memory_percent` strictly above this is significant.
    #[serde(default = "default_memory_percent")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub memory_percent: f64,

    /// A log whose message contains any of these (case-insensitive)
    /// is significant.
    #[serde(default = "default_error_keywords")]
    #[validate(length(min = 1))]
    pub error_keywords: Vec<String>,

    /// Stop the producer when a significant record is observed, so the
    /// incident window stays inspectable.
    #[serde(default = "default_true")]
    pub stop_on_event: bool,
}

fn default_cpu_percent() -> f64 {
    85.0
}

fn default_memory_percent() -> f64 {
    90.0
}

fn default_error_keywords() -> Vec<String> {
    ["error", "failed", "exception", "critical"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            cpu_percent: default_cpu_percent(),
            memory_percent: default_memory_percent(),
            error_keywords: default_error_keywords(),
            stop_on_event: default_true(),
        }
    }
}
