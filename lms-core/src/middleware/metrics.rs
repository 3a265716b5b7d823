//! Request id propagation and HTTP metrics
//!
//! Implemented as a tower `Layer`/`Service` pair and installed once on the
//! whole router.

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    response::Response,
};
use metrics::{counter, gauge, histogram};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct ObservabilityLayer;

impl<S> Layer<S> for ObservabilityLayer {
    type Service = Observability<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Observability { inner }
    }
}

#[derive(Clone)]
pub struct Observability<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for Observability<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let request_id = ensure_request_id(&mut request);
        let labels = RequestLabels {
            method: request.method().to_string(),
            path: normalize_path(request.uri().path()),
        };

        let span = tracing::info_span!("request", request_id = %request_id);
        let mut inner = self.inner.clone();

        Box::pin(
            async move {
                gauge!("lms_http_requests_in_flight").increment(1.0);
                let started = Instant::now();
                let result = inner.call(request).await;
                gauge!("lms_http_requests_in_flight").decrement(1.0);

                let mut response = result?;
                labels.record(response.status().as_u16(), started);
                if let Ok(value) = HeaderValue::from_str(&request_id) {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }
                Ok(response)
            }
            .instrument(span),
        )
    }
}

/// Reuse the caller's request id or stamp a fresh one onto the request
fn ensure_request_id(request: &mut Request<Body>) -> String {
    if let Some(id) = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        return id.to_string();
    }

    let id = Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&id) {
        request.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    id
}

struct RequestLabels {
    method: String,
    path: String,
}

impl RequestLabels {
    fn record(self, status: u16, started: Instant) {
        counter!(
            "lms_http_requests_total",
            "method" => self.method.clone(),
            "path" => self.path.clone(),
            "status" => status.to_string()
        )
        .increment(1);
        histogram!(
            "lms_http_request_duration_seconds",
            "method" => self.method,
            "path" => self.path
        )
        .record(started.elapsed().as_secs_f64());
    }
}

/// Collapse numeric and UUID-like path segments to `{id}` to keep label cardinality bounded.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|seg| {
            if looks_like_id(seg) {
                "{id}"
            } else {
                seg
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn looks_like_id(s: &str) -> bool {
    let numeric = !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    let uuid = s.len() == 36 && s.chars().all(|c| c.is_ascii_hexdigit() || c == '-');
    numeric || uuid
}
