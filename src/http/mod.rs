//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! axum request
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → request.rs (buffer into ApiRequest)
//!     → [routing decides the chain]
//!     → middleware/ (run chain via Next)
//!     → error.rs (ApiError → error handler) / response.rs (JSON bodies)
//!     → Send to client
//! ```

pub mod error;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use error::{ApiError, BodyError, BoxError, ErrorHandler};
pub use middleware::{from_fn, Chain, HandlerResult, Middleware, Next};
pub use request::{ApiRequest, MakeRequestUuidV4, PathParams, X_REQUEST_ID};
pub use server::HttpServer;
