use crate::api::AppState;
use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, field, info, info_span};
use uuid::Uuid;

const SECURITY_HEADERS: [(&str, &str); 4] = [
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("x-frame-options", "DENY"),
    (
        "content-security-policy",
        "default-src 'self'; frame-src https://www.google.com; form-action 'self'; frame-ancestors 'none'",
    ),
];

/// GET /metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}

/// Record id of a `/.../{id}` route, taken from the last path segment.
fn record_id(route: Option<&str>, path: &str) -> Option<i32> {
    route.filter(|r| r.ends_with("/{id}"))?;
    path.rsplit('/').next()?.parse().ok()
}

/// Redirects are how every form post succeeds, so they count as `ok`.
const fn outcome(status: StatusCode) -> &'static str {
    match status.as_u16() {
        500.. => "error",
        404 => "not_found",
        400..=499 => "rejected",
        _ => "ok",
    }
}

/// Wraps each request in a span and emits one summary event with the record id,
/// the weather lookup result and the response outcome.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string());
    let record_id = record_id(route.as_deref(), req.uri().path());

    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %method,
        path = %req.uri().path(),
        record_id,
        // Filled in by the weather client when the request triggers a lookup.
        weather_fetch = field::Empty,
    );

    async move {
        let response = next.run(req).await;
        let status = response.status();
        let outcome = outcome(status);
        let route = route.as_deref().unwrap_or("unmatched");

        metrics::counter!(
            "http_requests_total",
            "method" => method.to_string(),
            "route" => route.to_string(),
            "outcome" => outcome,
        )
        .increment(1);
        metrics::histogram!("http_request_duration_seconds", "route" => route.to_string())
            .record(start.elapsed().as_secs_f64());

        info!(
            status = status.as_u16(),
            outcome,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "{} {}",
            method,
            route
        );

        response
    }
    .instrument(span)
    .await
}

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http, middleware, routing::get};
    use tower::ServiceExt;

    #[test]
    fn test_record_id_only_for_id_routes() {
        assert_eq!(record_id(Some("/results/{id}"), "/results/42"), Some(42));
        assert_eq!(record_id(Some("/delete/{id}"), "/delete/7"), Some(7));
        assert_eq!(record_id(Some("/results/{id}"), "/results/abc"), None);
        assert_eq!(record_id(Some("/records"), "/records"), None);
        assert_eq!(record_id(None, "/edit/3"), None);
    }

    #[test]
    fn test_outcome_classes() {
        assert_eq!(outcome(StatusCode::OK), "ok");
        assert_eq!(outcome(StatusCode::SEE_OTHER), "ok");
        assert_eq!(outcome(StatusCode::NOT_FOUND), "not_found");
        assert_eq!(outcome(StatusCode::UNPROCESSABLE_ENTITY), "rejected");
        assert_eq!(outcome(StatusCode::SERVICE_UNAVAILABLE), "error");
    }

    #[tokio::test]
    async fn test_security_headers_allow_map_frames_only() {
        let app = Router::new()
            .route("/", get(|| async { "page" }))
            .layer(middleware::from_fn(security_headers_middleware));

        let response = app
            .oneshot(http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let csp = response.headers()["content-security-policy"].to_str().unwrap();
        assert!(csp.contains("frame-src https://www.google.com"));
        assert!(csp.contains("frame-ancestors 'none'"));
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    }
}
