//! Middleware chain execution.
//!
//! # Data Flow
//! ```text
//! dispatcher
//!     → Next::run(req)            position 0: controller middleware
//!     → next.run(req)             position 1..: route middleware
//!     → next.run(req)             last: terminal handler
//!     → next.run(req)             past the end: sentinel (empty 200 OK)
//! ```
//!
//! # Design Decisions
//! - Continuation passing: a step that never calls `next.run` short-circuits
//!   the chain and its own response is the result
//! - `Next` is consumed by `run`, so each step can continue at most once
//! - The end of the chain is an explicit sentinel step, not a replay of the
//!   terminal handler

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;

use crate::http::error::ApiError;
use crate::http::request::ApiRequest;

/// Outcome of a chain step.
pub type HandlerResult = Result<Response, ApiError>;

/// An ordered, immutable handler chain.
pub type Chain = Arc<[Arc<dyn Middleware>]>;

/// A step in a route's handler chain.
///
/// Implemented for any `Fn(ApiRequest, Next) -> impl Future<Output = HandlerResult>`.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: ApiRequest, next: Next) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> Middleware for F
where
    F: Fn(ApiRequest, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, req: ApiRequest, next: Next) -> BoxFuture<'static, HandlerResult> {
        Box::pin(self(req, next))
    }
}

/// Wrap an async closure as a shareable middleware.
pub fn from_fn<F, Fut>(f: F) -> Arc<dyn Middleware>
where
    F: Fn(ApiRequest, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(f)
}

/// Continuation handed to each chain step.
pub struct Next {
    chain: Chain,
    position: usize,
}

impl Next {
    /// Continuation positioned at the start of `chain`.
    pub fn new(chain: Chain) -> Self {
        Self { chain, position: 0 }
    }

    /// Whether continuing would reach the end-of-chain sentinel.
    pub fn is_end(&self) -> bool {
        self.position >= self.chain.len()
    }

    /// Run the remainder of the chain.
    pub async fn run(self, req: ApiRequest) -> HandlerResult {
        let Some(step) = self.chain.get(self.position).cloned() else {
            tracing::debug!(path = %req.path(), "Continuation called past the terminal handler");
            return Ok(StatusCode::OK.into_response());
        };

        let next = Next {
            chain: self.chain,
            position: self.position + 1,
        };
        step.call(req, next).await
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("position", &self.position)
            .field("len", &self.chain.len())
            .finish()
    }
}
