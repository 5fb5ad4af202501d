//! # varsel-engine
//!
//! The serving process around the telemetry producer: wires the
//! generator, classifier and metrics together, drains the record queues,
//! and exposes the stream over HTTP/SSE.

pub mod engine;

pub use engine::{EngineError, TelemetryRuntime};
