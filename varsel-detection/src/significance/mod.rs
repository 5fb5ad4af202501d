//! ## varsel-detection::significance
//! **Threshold and keyword rules over single telemetry records**
//!
//! The classifier is stateless on the query path: both checks are pure,
//! total functions over their input record. The keyword matcher is an
//! Aho-Corasick automaton so the scan stays linear in message length no
//! matter how many keywords are registered; the automaton is rebuilt
//! behind a lock only when the keyword set changes.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use parking_lot::RwLock;
use thiserror::Error;

use varsel_core::events::{LogRecord, MetricRecord, TelemetryRecord};

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Keyword compilation failed: {0}")]
    KeywordError(String),
}

/// Significance classifier for generated telemetry.
///
/// A metric record is significant when CPU or memory usage breaches its
/// threshold; a log record is significant when its message contains any
/// registered keyword, case-insensitively.
pub struct EventDetector {
    cpu_threshold: f64,
    memory_threshold: f64,
    keywords: RwLock<Vec<String>>,
    matcher: RwLock<AhoCorasick>,
}

impl EventDetector {
    /// Builds a detector with explicit thresholds and keyword set.
    pub fn new(
        cpu_threshold: f64,
        memory_threshold: f64,
        keywords: &[String],
    ) -> Result<Self, DetectionError> {
        let matcher = build_matcher(keywords)?;
        Ok(Self {
            cpu_threshold,
            memory_threshold,
            keywords: RwLock::new(keywords.to_vec()),
            matcher: RwLock::new(matcher),
        })
    }

    pub fn cpu_threshold(&self) -> f64 {
        self.cpu_threshold
    }

    pub fn memory_threshold(&self) -> f64 {
        self.memory_threshold
    }

    /// Registers an additional keyword and rebuilds the matcher.
    pub fn keyword_add(&self, keyword: &str) -> Result<(), DetectionError> {
        {
            let mut keywords = self.keywords.write();
            keywords.push(keyword.to_string());
        }
        self.rebuild_matcher()
    }

    fn rebuild_matcher(&self) -> Result<(), DetectionError> {
        let keywords = self.keywords.read();
        *self.matcher.write() = build_matcher(&keywords)?;
        Ok(())
    }

    /// True iff the metric breaches the CPU or memory threshold.
    #[inline]
    pub fn is_significant_metric(&self, metric: &MetricRecord) -> bool {
        metric.cpu_percent > self.cpu_threshold || metric.memory_percent > self.memory_threshold
    }

    /// True iff the log message contains any registered keyword.
    #[inline]
    pub fn is_significant_log(&self, log: &LogRecord) -> bool {
        self.matcher.read().is_match(log.message.as_bytes())
    }

    /// Dispatches on record kind.
    pub fn is_significant(&self, record: &TelemetryRecord) -> bool {
        match record {
            TelemetryRecord::Log(log) => self.is_significant_log(log),
            TelemetryRecord::Metric(metric) => self.is_significant_metric(metric),
        }
    }
}

impl Default for EventDetector {
    fn default() -> Self {
        let keywords: Vec<String> = ["error", "failed", "exception", "critical"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self::new(85.0, 90.0, &keywords).expect("default keyword set compiles")
    }
}

fn build_matcher(keywords: &[String]) -> Result<AhoCorasick, DetectionError> {
    AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .build(keywords)
        .map_err(|e| DetectionError::KeywordError(e.to_string()))
}
