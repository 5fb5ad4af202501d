//! Telemetry producer configuration.
//!
//! The delay bounds gate the generation loop's inter-iteration sleep.
//! Both must be strictly positive and `min_delay_secs <= max_delay_secs`;
//! violations fail validation instead of being clamped or reordered.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Telemetry producer parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[validate(schema(function = validation::validate_delay_bounds))]
pub struct GeneratorConfig {
    /// Lower bound of the inter-iteration delay (seconds).
    #[serde(default = "default_min_delay")]
    pub min_delay_secs: f64,

    /// Upper bound of the inter-iteration delay (seconds).
    #[serde(default = "default_max_delay")]
    pub max_delay_secs: f64,

    /// Number of synthetic users in the workload profile.
    #[serde(default = "default_user_pool_size")]
    #[validate(range(min = 1, max = 10000))]
    pub user_pool_size: usize,
}

fn default_min_delay() -> f64 {
    0.2
}

fn default_max_delay() -> f64 {
    0.8
}

fn default_user_pool_size() -> usize {
    20
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: default_min_delay(),
            max_delay_secs: default_max_delay(),
            user_pool_size: default_user_pool_size(),
        }
    }
}
