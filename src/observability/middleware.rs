use axum::{
    body::{Body, Bytes},
    extract::{MatchedPath, Request},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use opentelemetry::trace::TraceContextExt;
use serde_json::{json, Value};
use std::{sync::Arc, time::Instant};
use tracing::{error, info, instrument, Instrument};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use super::Metrics;

/// Endpoint label for requests that matched no route
const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Middleware for request logging, body size enforcement and metrics collection
pub async fn observability_middleware(
    metrics: Arc<Metrics>,
    max_body_bytes: usize,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let timestamp = chrono::Utc::now().to_rfc3339();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched_path| matched_path.as_str().to_string());
    let routed = matched_path.is_some();
    let endpoint = matched_path.unwrap_or_else(|| UNMATCHED_ENDPOINT.to_string());

    let span_name = format!("{} {}", method, endpoint);
    let span = tracing::info_span!(
        target: "menu_rs::http",
        "{}", span_name,
        otel.name = %span_name,
        otel.kind = "server",
        http.method = %method,
        http.route = %endpoint,
        http.target = %path,
        http.status_code = tracing::field::Empty,
        http.response_time_ms = tracing::field::Empty,
    );

    async move {
        metrics.increment_in_flight(&method, &endpoint);

        let trace_id = tracing::Span::current()
            .context()
            .span()
            .span_context()
            .trace_id()
            .to_string();

        info!(
            trace_id = %trace_id,
            timestamp = %timestamp,
            method = %method,
            path = %path,
            "Processing request"
        );

        // Unmatched routes go straight to the 404 fallback whatever their body
        let response = if !routed {
            next.run(request).await
        } else {
            match buffer_request_body(request, max_body_bytes).await {
                Ok(request) => next.run(request).await,
                Err(rejection) => rejection,
            }
        };

        let duration = start_time.elapsed();
        let duration_ms = duration.as_millis();
        let status_code = response.status().as_u16();

        let current_span = tracing::Span::current();
        current_span.record("http.status_code", status_code);
        current_span.record("http.response_time_ms", duration_ms);

        let span_context = current_span.context();
        let otel_span = span_context.span();
        if status_code >= 400 {
            otel_span.set_status(opentelemetry::trace::Status::error("HTTP error"));
        } else {
            otel_span.set_status(opentelemetry::trace::Status::Ok);
        }

        metrics.record_http_request(&method, &endpoint, status_code, duration.as_secs_f64());
        metrics.decrement_in_flight(&method, &endpoint);

        if status_code >= 400 {
            error!(
                trace_id = %trace_id,
                method = %method,
                path = %path,
                status_code = status_code,
                duration_ms = duration_ms,
                "Request completed with error"
            );
        } else {
            info!(
                trace_id = %trace_id,
                method = %method,
                path = %path,
                status_code = status_code,
                duration_ms = duration_ms,
                "Request completed successfully"
            );
        }

        response
    }
    .instrument(span)
    .await
}

/// Enforce the declared body size and, for POST and PUT, buffer the body so it can be
/// logged before the handler sees it. A body that cannot be read within the limit is
/// replaced by an empty one, so the handler reports it like any other unusable payload.
async fn buffer_request_body(request: Request, max_body_bytes: usize) -> Result<Request, Response> {
    let declared_length = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());

    if declared_length.is_some_and(|length| length > max_body_bytes) {
        crate::warn_with_trace!(
            content_length = declared_length,
            max_body_bytes,
            "Request body too large"
        );
        return Err(reject(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large"));
    }

    if !matches!(*request.method(), Method::POST | Method::PUT) {
        return Ok(request);
    }

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            crate::warn_with_trace!(error = %e, "Failed to read request body");
            Bytes::new()
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(body) => info!(body = %body, "Request body"),
        Err(_) => info!(bytes = bytes.len(), "Request body is not valid JSON"),
    }

    Ok(Request::from_parts(parts, Body::from(bytes)))
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Wraps menu operations with outcome metrics and a tracing span
#[derive(Clone)]
pub struct MenuOperationTracer {
    metrics: Arc<Metrics>,
}

impl MenuOperationTracer {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }

    /// Trace a menu operation
    #[instrument(skip_all, fields(operation = %operation))]
    pub async fn trace_menu_operation<F, T, E>(&self, operation: &str, future: F) -> Result<T, E>
    where
        F: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let start_time = Instant::now();

        match future.await {
            Ok(result) => {
                self.metrics.record_menu_operation(operation, true);

                info!(
                    duration_ms = start_time.elapsed().as_millis(),
                    "Menu operation completed successfully"
                );

                Ok(result)
            }
            Err(error) => {
                self.metrics.record_menu_operation(operation, false);

                info!(
                    error = %error,
                    duration_ms = start_time.elapsed().as_millis(),
                    "Menu operation failed"
                );

                Err(error)
            }
        }
    }

    /// Publish the current menu size
    pub fn record_menu_size(&self, count: usize) {
        self.metrics.set_menu_items(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{Method, Request, StatusCode},
        middleware,
        routing::{get, post},
        Router,
    };
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "test response"
    }

    async fn echo_handler(body: String) -> String {
        body
    }

    async fn error_handler() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn test_app(metrics: Arc<Metrics>, max_body_bytes: usize) -> Router {
        Router::new()
            .route("/test", get(test_handler))
            .route("/echo", post(echo_handler).put(echo_handler))
            .route("/error", get(error_handler))
            .layer(middleware::from_fn(move |req, next| {
                observability_middleware(metrics.clone(), max_body_bytes, req, next)
            }))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_observability_middleware_success() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let app = test_app(metrics.clone(), 1024);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(
            metrics
                .http_requests_total
                .with_label_values(&["GET", "/test", "200"])
                .get(),
            1.0
        );
        assert_eq!(
            metrics
                .http_requests_in_flight
                .with_label_values(&["GET", "/test"])
                .get(),
            0.0
        );
    }

    #[tokio::test]
    async fn test_observability_middleware_error() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let app = test_app(metrics.clone(), 1024);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/error")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(
            metrics
                .http_requests_total
                .with_label_values(&["GET", "/error", "500"])
                .get(),
            1.0
        );
    }

    #[tokio::test]
    async fn test_buffered_body_reaches_handler() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let app = test_app(metrics, 1024);
        let payload = r#"{"name":"Garlic Bread"}"#;

        for method in [Method::POST, Method::PUT] {
            let request = Request::builder()
                .method(method)
                .uri("/echo")
                .header("content-type", "application/json")
                .body(Body::from(payload))
                .unwrap();

            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_text(response).await, payload);
        }
    }

    #[tokio::test]
    async fn test_declared_length_over_limit_is_rejected() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let app = test_app(metrics, 16);
        let payload = "x".repeat(64);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/echo")
            .header("content-length", payload.len().to_string())
            .body(Body::from(payload))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body, json!({ "error": "Request body too large" }));
    }

    #[tokio::test]
    async fn test_undeclared_oversized_body_reaches_handler_empty() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let app = test_app(metrics, 16);

        let request = Request::builder()
            .method(Method::PUT)
            .uri("/echo")
            .body(Body::from("y".repeat(64)))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "");
    }

    #[tokio::test]
    async fn test_unmatched_route_skips_size_check() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let app = test_app(metrics.clone(), 16);
        let payload = "z".repeat(64);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/missing")
            .header("content-length", payload.len().to_string())
            .body(Body::from(payload))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            metrics
                .http_requests_total
                .with_label_values(&["POST", UNMATCHED_ENDPOINT, "404"])
                .get(),
            1.0
        );
    }

    #[tokio::test]
    async fn test_menu_operation_tracer() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let tracer = MenuOperationTracer::new(metrics.clone());

        let result = tracer
            .trace_menu_operation("get_item", async { Ok::<_, String>("found") })
            .await;
        assert_eq!(result, Ok("found"));

        let result = tracer
            .trace_menu_operation("get_item", async { Err::<(), _>("missing".to_string()) })
            .await;
        assert!(result.is_err());

        tracer.record_menu_size(4);

        let counter = |status: &str| {
            metrics
                .menu_operations_total
                .with_label_values(&["get_item", status])
                .get()
        };
        assert_eq!(counter("success"), 1.0);
        assert_eq!(counter("error"), 1.0);
        assert_eq!(metrics.menu_items.get(), 4.0);
    }
}
