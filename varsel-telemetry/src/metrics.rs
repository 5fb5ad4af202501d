//! Prometheus metrics for the telemetry pipeline.

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: prometheus::Registry,
    pub logs_generated: prometheus::Counter,
    pub metrics_generated: prometheus::Counter,
    pub significant_events: prometheus::Counter,
    pub detection_latency: prometheus::Histogram,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();
        let logs_generated = Counter::new(
            "varsel_logs_generated_total",
            "Total synthetic log records generated",
        )
        .unwrap();
        let metrics_generated = Counter::new(
            "varsel_metrics_generated_total",
            "Total synthetic metric records generated",
        )
        .unwrap();
        let significant_events = Counter::new(
            "varsel_significant_events_total",
            "Records the classifier flagged as significant",
        )
        .unwrap();

        let detection_latency = Histogram::with_opts(
            HistogramOpts::new(
                "varsel_detection_latency_seconds",
                "Classifier processing time per record",
            )
            .buckets(vec![0.000_001, 0.000_01, 0.000_1, 0.001]),
        )
        .unwrap();

        registry.register(Box::new(logs_generated.clone())).unwrap();
        registry
            .register(Box::new(metrics_generated.clone()))
            .unwrap();
        registry
            .register(Box::new(significant_events.clone()))
            .unwrap();
        registry
            .register(Box::new(detection_latency.clone()))
            .unwrap();

        Self {
            registry,
            logs_generated,
            metrics_generated,
            significant_events,
            detection_latency,
        }
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap())
    }

    pub fn inc_logs_generated(&self) {
        self.logs_generated.inc();
    }

    pub fn inc_metrics_generated(&self) {
        self.metrics_generated.inc();
    }

    pub fn inc_significant_events(&self) {
        self.significant_events.inc();
    }
}
