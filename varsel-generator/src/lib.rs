//! # Varsel Generator
//!
//! The event stream producer: manufactures plausible HTTP access logs and
//! resource-usage metrics with a designed correlation policy, and makes
//! every record available three ways at once:
//!
//! - two independently drained FIFO pull queues (logs, metrics),
//! - an optional synchronous observer callback,
//! - a broadcast feed for live transports.
//!
//! ## Correlation policy
//! A 5xx status marks the log with a CPU-spike flag; the metric generated
//! in the same iteration is then drawn from an elevated CPU range. Log
//! level is derived from status, never set directly.

pub mod generator;
pub mod profile;

pub use generator::{GeneratorError, RecordObserver, TelemetryGenerator};
pub use profile::WorkloadProfile;
