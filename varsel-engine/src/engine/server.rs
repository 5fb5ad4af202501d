//! HTTP surface of the serving process.
//!
//! Control endpoints (`/start`, `/stop`, `/status`), live record streams
//! as server-sent events (`/stream/logs`, `/stream/metrics`), and
//! prometheus exposition (`/metrics`). `/status` reports the true
//! producer state; there is no status masking.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use hyper::body::Bytes;
use hyper::{Body, Method, Request, Response, StatusCode};
use tokio::sync::{broadcast, oneshot};
use tokio::time::timeout;
use tracing::{debug, error, info};

use varsel_core::events::TelemetryRecord;

use crate::engine::error::EngineError;
use crate::engine::runtime::TelemetryRuntime;

/// Runs the API listener until the shutdown signal fires.
pub async fn serve(
    runtime: Arc<TelemetryRuntime>,
    shutdown: oneshot::Receiver<()>,
) -> Result<(), EngineError> {
    let transport = &runtime.config().transport;
    let ip: IpAddr = transport
        .host
        .parse()
        .map_err(|_| EngineError::Validation(format!("invalid bind host: {}", transport.host)))?;
    let addr = SocketAddr::new(ip, transport.port);

    let make_svc = hyper::service::make_service_fn(move |_conn| {
        let runtime = Arc::clone(&runtime);
        async move {
            Ok::<_, Infallible>(hyper::service::service_fn(move |req| {
                handle_request(Arc::clone(&runtime), req)
            }))
        }
    });

    let server = hyper::Server::bind(&addr)
        .serve(make_svc)
        .with_graceful_shutdown(async {
            let _ = shutdown.await;
        });

    info!(%addr, "API server started");

    server
        .await
        .map_err(|e| EngineError::Processing(e.to_string()))?;

    info!("API server stopped");
    Ok(())
}

async fn handle_request(
    runtime: Arc<TelemetryRuntime>,
    req: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    let response = match (req.method(), req.uri().path()) {
        (&Method::GET, "/") => json_response(StatusCode::OK, serde_json::json!({"status": "ok"})),

        (&Method::GET, "/status") => {
            let (queued_logs, queued_metrics) = runtime.generator.queue_depths();
            let running = runtime.generator.is_running();
            json_response(
                StatusCode::OK,
                serde_json::json!({
                    "status": if running { "running" } else { "stopped" },
                    "is_generating": running,
                    "queued_logs": queued_logs,
                    "queued_metrics": queued_metrics,
                }),
            )
        }

        (&Method::POST, "/start") => {
            runtime.start_generation();
            json_response(
                StatusCode::OK,
                serde_json::json!({
                    "status": "started",
                    "message": "Telemetry generation started",
                }),
            )
        }

        (&Method::POST, "/stop") => {
            runtime.stop_generation();
            json_response(
                StatusCode::OK,
                serde_json::json!({
                    "status": "stopped",
                    "message": "Telemetry generation stopped",
                }),
            )
        }

        (&Method::GET, "/metrics") => match runtime.metrics.gather_metrics() {
            Ok(exposition) => Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", "text/plain; version=0.0.4")
                .body(Body::from(exposition))
                .unwrap(),
            Err(e) => {
                error!(error = %e, "metrics encoding failed");
                json_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({"error": "metrics encoding failed"}),
                )
            }
        },

        (&Method::GET, "/stream/logs") => record_stream(&runtime, "log"),
        (&Method::GET, "/stream/metrics") => record_stream(&runtime, "metric"),

        _ => json_response(
            StatusCode::NOT_FOUND,
            serde_json::json!({"error": "not found"}),
        ),
    };

    Ok(response)
}

fn json_response(status: StatusCode, body: serde_json::Value) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Server-sent-event stream of one record kind, fed from the producer's
/// live broadcast feed. Emits a keep-alive comment whenever the producer
/// goes idle so a stopped generator never deadlocks a client.
fn record_stream(runtime: &Arc<TelemetryRuntime>, want_kind: &'static str) -> Response<Body> {
    let mut feed = runtime.generator.subscribe();
    let keepalive = Duration::from_secs(runtime.config().transport.keepalive_secs);
    let (mut tx, body) = Body::channel();

    tokio::spawn(async move {
        loop {
            let frame = match timeout(keepalive, feed.recv()).await {
                Ok(Ok(record)) => {
                    if record.kind() != want_kind {
                        continue;
                    }
                    match record_json(&record) {
                        Ok(json) => format!("data: {json}\n\n"),
                        Err(e) => {
                            error!(error = %e, "record serialization failed");
                            continue;
                        }
                    }
                }
                Ok(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                    debug!(skipped, "stream subscriber lagged");
                    continue;
                }
                Ok(Err(broadcast::error::RecvError::Closed)) => break,
                Err(_idle) => ": keep-alive\n\n".to_string(),
            };

            if tx.send_data(Bytes::from(frame)).await.is_err() {
                // Client hung up.
                break;
            }
        }
    });

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/event-stream")
        .header("Cache-Control", "no-cache")
        .body(body)
        .unwrap()
}

fn record_json(record: &TelemetryRecord) -> Result<String, serde_json::Error> {
    match record {
        TelemetryRecord::Log(log) => serde_json::to_string(log),
        TelemetryRecord::Metric(metric) => serde_json::to_string(metric),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::body::HttpBody;
    use varsel_config::VarselConfig;

    fn runtime() -> Arc<TelemetryRuntime> {
        TelemetryRuntime::new(VarselConfig::default()).unwrap()
    }

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_responds_ok() {
        let response = handle_request(runtime(), Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn status_reports_true_producer_state() {
        let runtime = runtime();
        let response = handle_request(
            Arc::clone(&runtime),
            Request::get("/status").body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["status"], "stopped");
        assert_eq!(json["is_generating"], false);

        runtime.generator.start();
        let response = handle_request(
            Arc::clone(&runtime),
            Request::get("/status").body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(body_json(response).await["status"], "running");
    }

    #[tokio::test]
    async fn start_and_stop_toggle_the_producer() {
        let runtime = runtime();

        let response = handle_request(
            Arc::clone(&runtime),
            Request::post("/start").body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(body_json(response).await["status"], "started");
        assert!(runtime.generator.is_running());

        let response = handle_request(
            Arc::clone(&runtime),
            Request::post("/stop").body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(body_json(response).await["status"], "stopped");
        assert!(!runtime.generator.is_running());

        runtime.shutdown();
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let response = handle_request(
            runtime(),
            Request::get("/nope").body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn metrics_endpoint_serves_prometheus_text() {
        let runtime = runtime();
        runtime.generator.run_iteration();

        let response = handle_request(
            runtime,
            Request::get("/metrics").body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("varsel_logs_generated_total"));
    }

    #[tokio::test]
    async fn idle_stream_emits_keepalive() {
        let mut config = VarselConfig::default();
        config.transport.keepalive_secs = 1;
        let runtime = TelemetryRuntime::new(config).unwrap();

        let response = handle_request(
            Arc::clone(&runtime),
            Request::get("/stream/logs").body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();

        let mut body = response.into_body();
        let chunk = timeout(Duration::from_secs(3), body.data())
            .await
            .expect("idle stream should emit a keep-alive")
            .unwrap()
            .unwrap();
        assert_eq!(chunk, Bytes::from(": keep-alive\n\n"));
    }

    #[tokio::test]
    async fn log_stream_frames_records_as_sse() {
        let runtime = runtime();
        let response = handle_request(
            Arc::clone(&runtime),
            Request::get("/stream/logs").body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(
            response.headers()["Content-Type"],
            "text/event-stream"
        );

        runtime.generator.run_iteration();

        let mut body = response.into_body();
        let chunk = timeout(Duration::from_secs(2), body.data())
            .await
            .expect("stream should deliver a frame")
            .unwrap()
            .unwrap();
        let frame = String::from_utf8(chunk.to_vec()).unwrap();
        assert!(frame.starts_with("data: "));
        assert!(frame.ends_with("\n\n"));

        let json: serde_json::Value =
            serde_json::from_str(frame.trim_start_matches("data: ").trim()).unwrap();
        assert!(json["status_code"].is_u64());
    }
}
