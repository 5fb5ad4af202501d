//! Serving runtime - coordinates the producer, classifier, and metrics,
//! and owns the background tasks of the serving process.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use varsel_config::VarselConfig;
use varsel_core::events::TelemetryRecord;
use varsel_detection::EventDetector;
use varsel_generator::{RecordObserver, TelemetryGenerator};
use varsel_telemetry::MetricsRecorder;

use crate::engine::error::EngineError;
use crate::engine::server;

/// Coordinates the serving process: generation loop, queue drain
/// workers, classification policy, and the HTTP listener.
pub struct TelemetryRuntime {
    config: Arc<VarselConfig>,
    /// The telemetry producer. Shared with the API layer.
    pub generator: Arc<TelemetryGenerator>,
    /// Significance classifier.
    pub detector: Arc<EventDetector>,
    /// Metrics collection subsystem.
    pub metrics: Arc<MetricsRecorder>,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
    drain_handles: Mutex<Vec<JoinHandle<()>>>,
}

/// Observer installed on the producer: counts every record, classifies
/// it, and applies the stop-on-event policy.
struct ClassifyingObserver {
    // Weak: the generator owns this observer.
    generator: Weak<TelemetryGenerator>,
    detector: Arc<EventDetector>,
    metrics: Arc<MetricsRecorder>,
    stop_on_event: bool,
}

impl RecordObserver for ClassifyingObserver {
    fn observe(
        &self,
        record: &TelemetryRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match record {
            TelemetryRecord::Log(_) => self.metrics.inc_logs_generated(),
            TelemetryRecord::Metric(_) => self.metrics.inc_metrics_generated(),
        }

        let timer = self.metrics.detection_latency.start_timer();
        let significant = self.detector.is_significant(record);
        timer.observe_duration();

        if significant {
            self.metrics.inc_significant_events();
            warn!(kind = record.kind(), "significant event detected");
            if self.stop_on_event {
                if let Some(generator) = self.generator.upgrade() {
                    generator.stop();
                }
            }
        }
        Ok(())
    }
}

impl TelemetryRuntime {
    /// Builds the runtime from loaded configuration and wires the
    /// observer into the producer.
    pub fn new(config: VarselConfig) -> Result<Arc<Self>, EngineError> {
        info!("Initializing telemetry runtime");
        debug!(?config, "runtime configuration");

        let generator = Arc::new(TelemetryGenerator::new(config.generator.clone())?);
        let detector = Arc::new(EventDetector::new(
            config.detection.cpu_percent,
            config.detection.memory_percent,
            &config.detection.error_keywords,
        )?);
        let metrics = Arc::new(MetricsRecorder::new());

        generator.set_observer(Arc::new(ClassifyingObserver {
            generator: Arc::downgrade(&generator),
            detector: Arc::clone(&detector),
            metrics: Arc::clone(&metrics),
            stop_on_event: config.detection.stop_on_event,
        }));

        Ok(Arc::new(Self {
            config: Arc::new(config),
            generator,
            detector,
            metrics,
            loop_handle: Mutex::new(None),
            drain_handles: Mutex::new(Vec::new()),
        }))
    }

    pub fn config(&self) -> &VarselConfig {
        &self.config
    }

    /// Enables generation and spawns the loop task if none is alive.
    /// Returns whether a new loop task was spawned; a second call while
    /// one is running is a no-op on the task.
    pub fn start_generation(self: &Arc<Self>) -> bool {
        self.generator.start();

        let mut handle = self.loop_handle.lock();
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return false;
        }

        let generator = Arc::clone(&self.generator);
        *handle = Some(tokio::spawn(async move {
            generator.run_loop().await;
        }));
        true
    }

    /// Disables generation at the next loop-iteration boundary. Queued
    /// records remain drainable.
    pub fn stop_generation(&self) {
        self.generator.stop();
    }

    /// Spawns the drain workers: one per queue, each forwarding drained
    /// records as structured tracing events. This is the storage
    /// collaborator boundary; persistence itself lives outside this
    /// process.
    pub fn spawn_drain_workers(self: &Arc<Self>) {
        let mut handles = self.drain_handles.lock();
        if !handles.is_empty() {
            return;
        }

        let log_generator = Arc::clone(&self.generator);
        handles.push(tokio::spawn(async move {
            loop {
                let log = log_generator.dequeue_log().await;
                info!(
                    target: "varsel::stream",
                    level = ?log.level,
                    status = log.status_code,
                    method = %log.method,
                    endpoint = %log.endpoint,
                    latency_ms = log.latency_ms,
                    message = %log.message,
                    "log record"
                );
            }
        }));

        let metric_generator = Arc::clone(&self.generator);
        handles.push(tokio::spawn(async move {
            loop {
                let metric = metric_generator.dequeue_metric().await;
                info!(
                    target: "varsel::stream",
                    cpu_percent = metric.cpu_percent,
                    memory_percent = metric.memory_percent,
                    memory_used_mb = metric.memory_used_mb,
                    "metric record"
                );
            }
        }));
    }

    /// Runs the serving process until a shutdown signal arrives.
    pub async fn run(self: Arc<Self>) -> Result<(), EngineError> {
        self.spawn_drain_workers();
        self.start_generation();

        if self.config.transport.enabled {
            let (shutdown_tx, shutdown_rx) = oneshot::channel();
            let server = tokio::spawn(server::serve(Arc::clone(&self), shutdown_rx));

            tokio::signal::ctrl_c().await?;
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(());
            server.await??;
        } else {
            tokio::signal::ctrl_c().await?;
            info!("Shutdown signal received");
        }

        self.shutdown();
        Ok(())
    }

    /// Stops generation and tears down background tasks.
    pub fn shutdown(&self) {
        self.generator.stop();
        if let Some(handle) = self.loop_handle.lock().take() {
            handle.abort();
        }
        for handle in self.drain_handles.lock().drain(..) {
            handle.abort();
        }
        info!("Telemetry runtime shutdown complete");
    }
}
