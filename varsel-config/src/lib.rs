//! # Varsel Configuration System
//!
//! Hierarchical configuration management for the Varsel telemetry engine.
//!
//! ## Features
//! - **Unified Configuration**: Single source of truth across all components
//! - **Validation**: Construction-time validation of critical parameters;
//!   invalid delay bounds are a hard error, never silently reordered
//! - **Environment Awareness**: `VARSEL_*` variables override file values

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod detection;
mod error;
mod generator;
mod telemetry;
mod transport;
mod validation;

pub use detection::DetectionConfig;
pub use error::ConfigError;
pub use generator::GeneratorConfig;
pub use telemetry::TelemetryConfig;
pub use transport::TransportConfig;

/// Top-level configuration container for all Varsel components.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct VarselConfig {
    /// Telemetry producer parameters (delay bounds, workload sizing).
    #[validate(nested)]
    pub generator: GeneratorConfig,

    /// HTTP/SSE serving parameters.
    #[validate(nested)]
    pub transport: TransportConfig,

    /// Significance thresholds and keyword set.
    #[validate(nested)]
    pub detection: DetectionConfig,

    /// Logging and metrics configuration.
    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

impl VarselConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/varsel.yaml` - base settings. If missing, defaults are used.
    /// 3. `VARSEL_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(VarselConfig::default()));

        if Path::new("config/varsel.yaml").exists() {
            figment = figment.merge(Yaml::file("config/varsel.yaml"));
        }

        figment
            .merge(Env::prefixed("VARSEL_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Load configuration from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(
                path.to_string_lossy().to_string(),
            )));
        }

        Figment::from(Serialized::defaults(VarselConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("VARSEL_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
