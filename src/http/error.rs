//! Handler failures and error handlers.
//!
//! A failing chain step returns `Err(ApiError)` (or panics, which the
//! dispatcher converts into `ApiError::Panic`). The dispatcher then asks an
//! `ErrorHandler` to turn the failure into a response.

use std::any::Any;
use std::future::Future;

use axum::http::StatusCode;
use axum::response::Response;
use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::http::request::ApiRequest;

/// Boxed error type accepted from handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by middleware and handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failure carrying an explicit HTTP status.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// A chain step panicked.
    #[error("handler panicked: {0}")]
    Panic(String),

    /// Any other error raised by handler code.
    #[error(transparent)]
    Handler(#[from] BoxError),
}

/// Failure to buffer an incoming request body.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// The body stream failed, e.g. the client disconnected mid-upload.
    #[error("failed to read request body: {0}")]
    Stream(#[from] axum::Error),
}

impl BodyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Stream(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Wrap an arbitrary error raised by handler code.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        Self::Handler(err.into())
    }

    /// Build from a panic payload caught while running the chain.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Panic(message)
    }

    /// Status an error handler would typically answer with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Status { status, .. } => *status,
            Self::Panic(_) | Self::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self::Handler(Box::new(err))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Handler(Box::new(err))
    }
}

/// Turns a chain failure into a response.
///
/// Receives the error and the in-flight request (with its path parameters).
/// Implemented for any `Fn(ApiError, ApiRequest) -> impl Future<Output = Response>`.
pub trait ErrorHandler: Send + Sync + 'static {
    fn handle_error(&self, error: ApiError, req: ApiRequest) -> BoxFuture<'static, Response>;
}

impl<F, Fut> ErrorHandler for F
where
    F: Fn(ApiError, ApiRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn handle_error(&self, error: ApiError, req: ApiRequest) -> BoxFuture<'static, Response> {
        Box::pin(self(error, req))
    }
}
