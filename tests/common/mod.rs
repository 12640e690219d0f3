//! Shared utilities for integration tests.

use std::sync::Arc;

use api_router::{from_fn, ApiRequest, Middleware, Next};
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::{IntoResponse, Response};

/// Labels recorded by chain steps, carried in request extensions.
#[derive(Debug, Clone, Default)]
pub struct Trace(pub Vec<&'static str>);

/// Middleware appending `label` to the request's trace.
pub fn tag(label: &'static str) -> Arc<dyn Middleware> {
    from_fn(move |mut req: ApiRequest, next: Next| async move {
        let mut trace = req.extensions().get::<Trace>().cloned().unwrap_or_default();
        trace.0.push(label);
        req.extensions_mut().insert(trace);
        next.run(req).await
    })
}

/// Render the trace collected so far as `a,b,c`.
#[allow(dead_code)]
pub fn trace_response(req: &ApiRequest) -> Response {
    let trace = req.extensions().get::<Trace>().cloned().unwrap_or_default();
    trace.0.join(",").into_response()
}

pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[allow(dead_code)]
pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
