//! Controller-based routing for Axum API handlers.
//!
//! A controller type declares its routes, per-route middleware and
//! controller-wide middleware through [`Controller::register`]. An
//! [`ApiRouter`] compiles those declarations against an instance and
//! dispatches requests through the declared chain.

pub mod bindings;
pub mod config;
pub mod http;
pub mod observability;
pub mod registry;
pub mod routing;

pub use bindings::{create_route, create_route_lazy, RouteHandlers};
pub use config::RouterConfig;
pub use http::{from_fn, ApiError, ApiRequest, HandlerResult, HttpServer, Middleware, Next, PathParams};
pub use registry::{Controller, Registry, RouteDefinition};
pub use routing::{ApiRouter, RouterError, RoutingOptions};
