//! Per-verb route bindings.
//!
//! # Responsibilities
//! - Wrap one dispatcher in a handler per HTTP verb
//! - Mount those handlers on an `axum::Router`
//!
//! # Design Decisions
//! - Every verb routes through the same dispatch function; method matching
//!   happens inside the dispatcher, not in the binding

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures_util::future::BoxFuture;

use crate::registry::Controller;
use crate::routing::{ApiRouter, RouterError, RoutingOptions};

/// A cloneable async request handler.
pub type RouteHandler = Arc<dyn Fn(Request<Body>) -> BoxFuture<'static, Response> + Send + Sync>;

/// One handler per supported HTTP verb.
#[derive(Clone)]
pub struct RouteHandlers {
    pub get: RouteHandler,
    pub post: RouteHandler,
    pub put: RouteHandler,
    pub patch: RouteHandler,
    pub delete: RouteHandler,
    pub options: RouteHandler,
    pub head: RouteHandler,
}

impl RouteHandlers {
    /// Bind every verb to `handle`.
    pub fn from_handler(handle: RouteHandler) -> Self {
        Self {
            get: Arc::clone(&handle),
            post: Arc::clone(&handle),
            put: Arc::clone(&handle),
            patch: Arc::clone(&handle),
            delete: Arc::clone(&handle),
            options: Arc::clone(&handle),
            head: handle,
        }
    }

    /// Binding for `method`, if it is one of the supported verbs.
    pub fn for_method(&self, method: &Method) -> Option<&RouteHandler> {
        match *method {
            Method::GET => Some(&self.get),
            Method::POST => Some(&self.post),
            Method::PUT => Some(&self.put),
            Method::PATCH => Some(&self.patch),
            Method::DELETE => Some(&self.delete),
            Method::OPTIONS => Some(&self.options),
            Method::HEAD => Some(&self.head),
            _ => None,
        }
    }

    /// Mount every binding on `/` and `/{*path}`.
    pub fn into_router(self) -> Router {
        let methods = get(endpoint(self.get))
            .post(endpoint(self.post))
            .put(endpoint(self.put))
            .patch(endpoint(self.patch))
            .delete(endpoint(self.delete))
            .options(endpoint(self.options))
            .head(endpoint(self.head));

        Router::new()
            .route("/", methods.clone())
            .route("/{*path}", methods)
    }
}

fn endpoint(
    handler: RouteHandler,
) -> impl Fn(Request<Body>) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    move |request: Request<Body>| handler(request)
}

/// Wrap `controller` into per-verb bindings with default routing options.
pub fn create_route<C: Controller>(
    controller: Arc<C>,
    base_path: &str,
) -> Result<RouteHandlers, RouterError> {
    create_route_with_options(controller, base_path, RoutingOptions::default())
}

/// Wrap `controller` into per-verb bindings.
pub fn create_route_with_options<C: Controller>(
    controller: Arc<C>,
    base_path: &str,
    options: RoutingOptions,
) -> Result<RouteHandlers, RouterError> {
    let router = ApiRouter::with_options(base_path, controller, options)?;
    Ok(from_router(router))
}

/// Per-verb bindings over an existing router (keeps its error handler).
pub fn from_router(router: ApiRouter) -> RouteHandlers {
    let handle: RouteHandler = Arc::new(move |request: Request<Body>| -> BoxFuture<'static, Response> {
        let router = router.clone();
        Box::pin(async move { router.handle(request).await })
    });
    RouteHandlers::from_handler(handle)
}
