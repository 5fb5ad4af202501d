//! The telemetry producer and its generation loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use rand::seq::IndexedRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use varsel_config::GeneratorConfig;
use varsel_core::events::{LogLevel, LogRecord, MetricRecord, RecordQueue, TelemetryRecord};

use crate::profile::{WorkloadProfile, ENDPOINTS, ERROR_KEYWORDS, WEIGHTED_STATUS_CODES};

const LATENCY_MEAN_MS: f64 = 120.0;
const LATENCY_STD_MS: f64 = 40.0;
const SPIKE_LATENCY_PENALTY_MS: f64 = 50.0;
const CPU_MEAN: f64 = 30.0;
const CPU_STD: f64 = 10.0;
const MEMORY_MEAN: f64 = 50.0;
const MEMORY_STD: f64 = 15.0;
const MEMORY_TOTAL_MB: u32 = 8192;
const ERROR_KEYWORD_PROBABILITY: f64 = 0.2;
const INFO_PROBABILITY: f64 = 0.8;
const LIVE_FEED_CAPACITY: usize = 1024;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Invalid delay bounds: min {min}s exceeds max {max}s")]
    InvalidDelayBounds { min: f64, max: f64 },

    #[error("Delay bounds must be strictly positive, got {0}s")]
    NonPositiveDelay(f64),
}

/// Push seam for the serving process: invoked synchronously once per
/// generated record, immediately after the record is enqueued.
///
/// A failing observer must never halt generation; errors are logged at
/// the loop boundary and the iteration proceeds.
pub trait RecordObserver: Send + Sync {
    fn observe(
        &self,
        record: &TelemetryRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Synthetic telemetry producer.
///
/// One logical generation loop cooperates with any number of consumers
/// through two unbounded FIFO queues; the `running` flag is the only
/// other shared state and is read once per iteration, so stopping is
/// cooperative and never interrupts a record mid-construction.
pub struct TelemetryGenerator {
    min_delay_secs: f64,
    max_delay_secs: f64,
    profile: WorkloadProfile,
    latency_ms: Normal<f64>,
    cpu_percent: Normal<f64>,
    memory_percent: Normal<f64>,
    running: AtomicBool,
    log_queue: RecordQueue<LogRecord>,
    metric_queue: RecordQueue<MetricRecord>,
    observer: RwLock<Option<Arc<dyn RecordObserver>>>,
    live_tx: broadcast::Sender<TelemetryRecord>,
}

impl TelemetryGenerator {
    /// Builds a producer from validated configuration.
    ///
    /// Delay bounds are re-checked here so a caller that bypassed
    /// `varsel-config` validation still fails fast instead of getting
    /// nonsensical timing.
    pub fn new(config: GeneratorConfig) -> Result<Self, GeneratorError> {
        if config.min_delay_secs <= 0.0 || !config.min_delay_secs.is_finite() {
            return Err(GeneratorError::NonPositiveDelay(config.min_delay_secs));
        }
        if config.max_delay_secs <= 0.0 || !config.max_delay_secs.is_finite() {
            return Err(GeneratorError::NonPositiveDelay(config.max_delay_secs));
        }
        if config.min_delay_secs > config.max_delay_secs {
            return Err(GeneratorError::InvalidDelayBounds {
                min: config.min_delay_secs,
                max: config.max_delay_secs,
            });
        }

        let (live_tx, _) = broadcast::channel(LIVE_FEED_CAPACITY);

        Ok(Self {
            min_delay_secs: config.min_delay_secs,
            max_delay_secs: config.max_delay_secs,
            profile: WorkloadProfile::synthesize(config.user_pool_size),
            latency_ms: Normal::new(LATENCY_MEAN_MS, LATENCY_STD_MS)
                .expect("static distribution parameters"),
            cpu_percent: Normal::new(CPU_MEAN, CPU_STD).expect("static distribution parameters"),
            memory_percent: Normal::new(MEMORY_MEAN, MEMORY_STD)
                .expect("static distribution parameters"),
            running: AtomicBool::new(false),
            log_queue: RecordQueue::new(),
            metric_queue: RecordQueue::new(),
            observer: RwLock::new(None),
            live_tx,
        })
    }

    /// Enables generation. Idempotent.
    pub fn start(&self) {
        if !self.running.swap(true, Ordering::AcqRel) {
            info!("Telemetry generation started");
        }
    }

    /// Disables generation, observed at the next loop-iteration boundary.
    /// Idempotent; records already enqueued remain drainable.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            info!("Telemetry generation stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Registers the push callback invoked once per generated record.
    pub fn set_observer(&self, observer: Arc<dyn RecordObserver>) {
        *self.observer.write() = Some(observer);
    }

    /// New handle on the live feed. Absence of subscribers never affects
    /// queue or callback behavior.
    pub fn subscribe(&self) -> broadcast::Receiver<TelemetryRecord> {
        self.live_tx.subscribe()
    }

    /// Manufactures one log record. Pure draw, no side effects.
    pub fn generate_log(&self) -> LogRecord {
        let mut rng = rand::rng();

        let user = self
            .profile
            .users()
            .choose(&mut rng)
            .expect("non-empty user pool");
        let (endpoint, methods) = ENDPOINTS.choose(&mut rng).expect("non-empty endpoint table");
        let method = methods.choose(&mut rng).expect("non-empty method set");
        let status_code = *WEIGHTED_STATUS_CODES
            .choose(&mut rng)
            .expect("non-empty status table");

        let cpu_spike = status_code >= 500;
        let level = choose_level(&mut rng, status_code);
        let message = compose_message(&mut rng, endpoint, method, &user.username, &user.ip);

        let raw_latency = self.latency_ms.sample(&mut rng)
            + if cpu_spike { SPIKE_LATENCY_PENALTY_MS } else { 0.0 };

        LogRecord {
            timestamp: Utc::now(),
            level,
            user: user.username.clone(),
            source_ip: user.ip.clone(),
            method: method.to_string(),
            endpoint: endpoint.to_string(),
            status_code,
            request_id: Uuid::new_v4(),
            latency_ms: raw_latency.max(1.0) as u64,
            cpu_spike,
            message,
        }
    }

    /// Manufactures one metric record. When `correlate_cpu` is set the
    /// CPU base is biased upward by 20-30 points before clamping.
    pub fn generate_metric(&self, correlate_cpu: bool) -> MetricRecord {
        let mut rng = rand::rng();

        let mut cpu = self.cpu_percent.sample(&mut rng);
        if correlate_cpu {
            cpu += rng.random_range(20..=30) as f64;
        }

        MetricRecord {
            timestamp: Utc::now(),
            cpu_percent: cpu.clamp(0.0, 100.0),
            memory_percent: self.memory_percent.sample(&mut rng).clamp(0.0, 100.0),
            memory_used_mb: rng.random_range(2000..=8000),
            memory_total_mb: MEMORY_TOTAL_MB,
        }
    }

    /// One full generation step: a log record, then the metric correlated
    /// with it. Synchronous; never suspends mid-record.
    pub fn run_iteration(&self) {
        let log = self.generate_log();
        let cpu_spike = log.cpu_spike;
        debug!(
            status = log.status_code,
            endpoint = %log.endpoint,
            cpu_spike,
            "generated log record"
        );

        self.log_queue.push(log.clone());
        self.publish(TelemetryRecord::Log(log));

        let metric = self.generate_metric(cpu_spike);
        self.metric_queue.push(metric.clone());
        self.publish(TelemetryRecord::Metric(metric));
    }

    /// The long-running generation cycle. Returns only once `stop()` has
    /// been observed at an iteration boundary.
    pub async fn run_loop(&self) {
        while self.is_running() {
            self.run_iteration();
            sleep(self.draw_delay()).await;
        }
        debug!("generation loop terminated");
    }

    /// Suspends until a log record is available. FIFO.
    pub async fn dequeue_log(&self) -> LogRecord {
        self.log_queue.pop().await
    }

    /// Suspends until a metric record is available. FIFO.
    pub async fn dequeue_metric(&self) -> MetricRecord {
        self.metric_queue.pop().await
    }

    pub fn try_dequeue_log(&self) -> Option<LogRecord> {
        self.log_queue.try_pop()
    }

    pub fn try_dequeue_metric(&self) -> Option<MetricRecord> {
        self.metric_queue.try_pop()
    }

    /// Pending (log, metric) queue depths.
    pub fn queue_depths(&self) -> (usize, usize) {
        (self.log_queue.len(), self.metric_queue.len())
    }

    fn publish(&self, record: TelemetryRecord) {
        if let Some(observer) = self.observer.read().as_ref() {
            if let Err(e) = observer.observe(&record) {
                warn!(error = %e, kind = record.kind(), "record observer failed");
            }
        }
        // A send error only means there is no live subscriber right now.
        let _ = self.live_tx.send(record);
    }

    fn draw_delay(&self) -> Duration {
        let secs = rand::rng().random_range(self.min_delay_secs..=self.max_delay_secs);
        Duration::from_secs_f64(secs)
    }
}

fn choose_level<R: Rng>(rng: &mut R, status_code: u16) -> LogLevel {
    if status_code >= 500 {
        LogLevel::Error
    } else if status_code >= 400 {
        LogLevel::Warning
    } else if rng.random_bool(INFO_PROBABILITY) {
        LogLevel::Info
    } else {
        LogLevel::Debug
    }
}

fn compose_message<R: Rng>(
    rng: &mut R,
    endpoint: &str,
    method: &str,
    username: &str,
    ip: &str,
) -> String {
    let base_messages = [
        format!("Request to {endpoint} completed"),
        format!("Processing {method} request"),
        format!("User {username} accessed {endpoint}"),
        format!("API call from {ip}"),
        format!("Handling {method} {endpoint}"),
        "Request processed successfully".to_string(),
        "API response sent".to_string(),
        "Service request completed".to_string(),
    ];
    let base = base_messages.choose(rng).expect("non-empty template set");

    if rng.random_bool(ERROR_KEYWORD_PROBABILITY) {
        let keyword = ERROR_KEYWORDS.choose(rng).expect("non-empty keyword set");
        format!("{base} - {keyword} occurred")
    } else {
        base.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use proptest::prelude::*;

    fn fast_config() -> GeneratorConfig {
        GeneratorConfig {
            min_delay_secs: 0.01,
            max_delay_secs: 0.01,
            ..Default::default()
        }
    }

    fn generator() -> TelemetryGenerator {
        TelemetryGenerator::new(fast_config()).unwrap()
    }

    #[test]
    fn rejects_reversed_delay_bounds() {
        let result = TelemetryGenerator::new(GeneratorConfig {
            min_delay_secs: 2.0,
            max_delay_secs: 1.0,
            ..Default::default()
        });
        assert!(matches!(
            result,
            Err(GeneratorError::InvalidDelayBounds { .. })
        ));
    }

    #[test]
    fn rejects_non_positive_delay() {
        let result = TelemetryGenerator::new(GeneratorConfig {
            min_delay_secs: 0.0,
            max_delay_secs: 1.0,
            ..Default::default()
        });
        assert!(matches!(result, Err(GeneratorError::NonPositiveDelay(_))));
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let generator = generator();
        assert!(!generator.is_running());
        generator.start();
        generator.start();
        assert!(generator.is_running());
        generator.stop();
        generator.stop();
        assert!(!generator.is_running());
    }

    #[test]
    fn level_and_spike_derive_from_status() {
        let generator = generator();
        for _ in 0..500 {
            let log = generator.generate_log();
            assert_eq!(log.cpu_spike, log.status_code >= 500);
            match log.status_code {
                s if s >= 500 => assert_eq!(log.level, LogLevel::Error),
                s if s >= 400 => assert_eq!(log.level, LogLevel::Warning),
                _ => assert!(matches!(log.level, LogLevel::Info | LogLevel::Debug)),
            }
            assert!(log.latency_ms >= 1);
        }
    }

    #[test]
    fn method_is_valid_for_endpoint() {
        let generator = generator();
        for _ in 0..200 {
            let log = generator.generate_log();
            let (_, methods) = ENDPOINTS
                .iter()
                .find(|(endpoint, _)| *endpoint == log.endpoint)
                .expect("endpoint comes from the table");
            assert!(methods.contains(&log.method.as_str()));
        }
    }

    #[test]
    fn keyword_injection_rate_is_roughly_one_in_five() {
        let generator = generator();
        let injected = (0..500)
            .filter(|_| generator.generate_log().message.ends_with("occurred"))
            .count();
        // Mean 100 of 500; bounds are ~11 sigma out.
        assert!((50..=160).contains(&injected), "injected {injected}/500");
    }

    #[test]
    fn correlated_metrics_come_from_elevated_range() {
        let generator = generator();
        let mean = |correlate: bool| {
            (0..200)
                .map(|_| generator.generate_metric(correlate).cpu_percent)
                .sum::<f64>()
                / 200.0
        };
        assert!(mean(true) - mean(false) > 10.0);
    }

    #[tokio::test]
    async fn bounded_run_produces_paired_records() {
        let generator = generator();
        generator.start();
        for _ in 0..5 {
            generator.run_iteration();
        }
        generator.stop();

        assert_eq!(generator.queue_depths(), (5, 5));
        for _ in 0..5 {
            let log = generator.dequeue_log().await;
            let metric = generator.dequeue_metric().await;
            assert_eq!(log.cpu_spike, log.status_code >= 500);
            assert!((0.0..=100.0).contains(&metric.cpu_percent));
        }
        assert_eq!(generator.queue_depths(), (0, 0));
    }

    #[tokio::test]
    async fn run_loop_terminates_on_stop() {
        let generator = Arc::new(generator());
        generator.start();

        let handle = {
            let generator = Arc::clone(&generator);
            tokio::spawn(async move { generator.run_loop().await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        generator.stop();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("loop should observe stop at its next boundary")
            .unwrap();

        let (logs, metrics) = generator.queue_depths();
        assert!(logs > 0, "loop produced nothing");
        assert_eq!(logs, metrics, "log/metric pairing broke");
    }

    #[tokio::test]
    async fn stopped_loop_produces_nothing() {
        let generator = generator();
        generator.run_loop().await;
        assert_eq!(generator.queue_depths(), (0, 0));
    }

    #[tokio::test]
    async fn failing_observer_does_not_halt_generation() {
        struct FailingObserver;
        impl RecordObserver for FailingObserver {
            fn observe(
                &self,
                _record: &TelemetryRecord,
            ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
                Err("observer is broken".into())
            }
        }

        let generator = generator();
        generator.set_observer(Arc::new(FailingObserver));
        generator.run_iteration();
        generator.run_iteration();
        assert_eq!(generator.queue_depths(), (2, 2));
    }

    #[tokio::test]
    async fn observer_sees_every_record_in_order() {
        struct Recording(Mutex<Vec<&'static str>>);
        impl RecordObserver for Recording {
            fn observe(
                &self,
                record: &TelemetryRecord,
            ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
                self.0.lock().push(record.kind());
                Ok(())
            }
        }

        let generator = generator();
        let observer = Arc::new(Recording(Mutex::new(Vec::new())));
        generator.set_observer(observer.clone());
        generator.run_iteration();
        assert_eq!(*observer.0.lock(), vec!["log", "metric"]);
    }

    #[tokio::test]
    async fn live_feed_carries_the_envelope_pair() {
        let generator = generator();
        let mut feed = generator.subscribe();
        generator.run_iteration();

        assert_eq!(feed.recv().await.unwrap().kind(), "log");
        assert_eq!(feed.recv().await.unwrap().kind(), "metric");
    }

    proptest! {
        #[test]
        fn metric_draws_stay_clamped(correlate in proptest::bool::ANY) {
            let generator = TelemetryGenerator::new(fast_config()).unwrap();
            let metric = generator.generate_metric(correlate);
            prop_assert!((0.0..=100.0).contains(&metric.cpu_percent));
            prop_assert!((0.0..=100.0).contains(&metric.memory_percent));
            prop_assert!((2000..=8000).contains(&metric.memory_used_mb));
        }
    }
}
