//! # Varsel Detection Engine
//!
//! Crate for rule-based significance classification of telemetry records.

pub mod significance;

pub use significance::{DetectionError, EventDetector};
