//! Route bindings for the host framework.
//!
//! # Data Flow
//! ```text
//! create_route(controller, base_path)
//!     → ApiRouter::new (compile now)
//!     → RouteHandlers { get, post, put, patch, delete, options, head }
//!
//! create_route_lazy(factory, base_path)
//!     → runtime guard
//!     → RouteHandlers over a OnceCell<ApiRouter> (compile on first request)
//!
//! RouteHandlers::into_router()
//!     → axum::Router mounting every binding on `/` and `/{*path}`
//! ```

pub mod handlers;
pub mod lazy;

pub use handlers::{create_route, create_route_with_options, from_router, RouteHandler, RouteHandlers};
pub use lazy::{create_route_lazy, create_route_lazy_with_options};
