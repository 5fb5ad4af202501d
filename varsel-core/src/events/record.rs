//! Synthetic telemetry record types.
//!
//! Two record families flow through the system: HTTP-access-style log
//! records and resource-usage metric snapshots. `TelemetryRecord` is the
//! tagged envelope used on every external boundary
//! (`{"type": "log"|"metric", "data": {...}}`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a generated log record.
///
/// Never set directly by callers: the producer derives it from the
/// status code (>=500 -> `Error`, >=400 -> `Warning`, otherwise a
/// weighted draw between `Info` and `Debug`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// One synthetic HTTP access-log event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub user: String,
    #[serde(rename = "ip")]
    pub source_ip: String,
    pub method: String,
    pub endpoint: String,
    pub status_code: u16,
    pub request_id: Uuid,
    pub latency_ms: u64,
    /// True iff `status_code >= 500`; drives metric correlation.
    pub cpu_spike: bool,
    pub message: String,
}

/// One synthetic resource-usage snapshot.
///
/// `cpu_percent` and `memory_percent` are clamped to [0, 100] at
/// generation time regardless of the underlying draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub memory_used_mb: u32,
    pub memory_total_mb: u32,
}

/// Wire envelope for a single telemetry record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum TelemetryRecord {
    Log(LogRecord),
    Metric(MetricRecord),
}

impl TelemetryRecord {
    /// Wire tag of this record (`"log"` or `"metric"`).
    pub fn kind(&self) -> &'static str {
        match self {
            TelemetryRecord::Log(_) => "log",
            TelemetryRecord::Metric(_) => "metric",
        }
    }
}
