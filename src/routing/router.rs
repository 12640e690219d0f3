//! Route compilation and dispatch.
//!
//! # Responsibilities
//! - Compile a controller's declared routes against an instance
//! - Look up the first route matching `{method, path}` in declaration order
//! - Run the matched chain and recover from failures with a single response
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in declaration order; first match wins, no specificity ranking
//! - Error handlers are tried route first, then router, then the built-in 500;
//!   a panicking error handler also ends in the built-in 500
//! - HEAD requests fall back to GET routes when no HEAD route matches
//! - Prefix stripping and trailing-slash trimming are options, defaulting to
//!   `/api` and `true`

use std::any::type_name;
use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tower::Service;

use crate::http::error::{ApiError, ErrorHandler};
use crate::http::middleware::{Chain, Next};
use crate::http::request::{ApiRequest, PathParams};
use crate::http::response;
use crate::observability::metrics;
use crate::registry::{Controller, Registry};
use crate::routing::error::RouterError;
use crate::routing::matcher::PathMatcher;

/// Request path normalisation and buffering limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingOptions {
    /// Leading segment removed from request paths before matching.
    pub strip_prefix: Option<String>,

    /// Strip trailing slashes from compiled patterns and request paths.
    pub trim_trailing_slash: bool,

    /// Maximum buffered request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for RoutingOptions {
    fn default() -> Self {
        Self {
            strip_prefix: Some("/api".to_string()),
            trim_trailing_slash: true,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// A route ready for dispatch.
pub struct CompiledRoute {
    method: Method,
    path: String,
    handler_name: String,
    matcher: PathMatcher,
    chain: Chain,
    on_error: Option<Arc<dyn ErrorHandler>>,
}

impl CompiledRoute {
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Base path plus declared path, trailing slashes stripped.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }

    /// Number of steps in the chain, terminal handler included.
    pub fn chain_len(&self) -> usize {
        self.chain.len()
    }
}

impl fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("handler_name", &self.handler_name)
            .field("chain_len", &self.chain.len())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Dispatcher for one controller instance.
#[derive(Clone)]
pub struct ApiRouter {
    routes: Arc<[CompiledRoute]>,
    options: Arc<RoutingOptions>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
}

impl ApiRouter {
    /// Compile `controller`'s routes under `base_path` with default options.
    pub fn new<C: Controller>(base_path: &str, controller: Arc<C>) -> Result<Self, RouterError> {
        Self::with_options(base_path, controller, RoutingOptions::default())
    }

    /// Compile `controller`'s routes under `base_path`.
    pub fn with_options<C: Controller>(
        base_path: &str,
        controller: Arc<C>,
        options: RoutingOptions,
    ) -> Result<Self, RouterError> {
        let registry = Registry::<C>::describe();
        let mut routes = Vec::with_capacity(registry.routes().len());

        for def in registry.routes() {
            let full_path = format!("{}{}", base_path, def.path);
            let path = if options.trim_trailing_slash {
                full_path.trim_end_matches('/').to_string()
            } else {
                full_path
            };

            let matcher = PathMatcher::compile(&path)?;
            let handler = registry
                .bind(&def.handler_name, &controller)
                .ok_or_else(|| RouterError::UnknownHandler {
                    controller: type_name::<C>(),
                    handler: def.handler_name.clone(),
                })?;

            let chain: Chain = registry
                .controller_middlewares()
                .iter()
                .chain(registry.route_middlewares_for(&def.handler_name))
                .cloned()
                .chain(std::iter::once(handler))
                .collect();

            tracing::debug!(
                method = %def.method,
                path = %path,
                handler = %def.handler_name,
                chain_len = chain.len(),
                "Compiled route"
            );

            routes.push(CompiledRoute {
                method: def.method.clone(),
                path,
                handler_name: def.handler_name.clone(),
                matcher,
                chain,
                on_error: registry.route_error_handler(&def.handler_name),
            });
        }

        tracing::info!(
            controller = type_name::<C>(),
            base_path = %base_path,
            routes = routes.len(),
            "Router compiled"
        );

        Ok(Self {
            routes: routes.into(),
            options: Arc::new(options),
            error_handler: None,
        })
    }

    /// Replace the router-wide error handler.
    pub fn on_error<F, Fut>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(ApiError, ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Compiled routes in declaration order.
    pub fn routes(&self) -> &[CompiledRoute] {
        &self.routes
    }

    pub fn options(&self) -> &RoutingOptions {
        &self.options
    }

    /// Buffer `request` and dispatch it.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let path = request.uri().path().to_string();
        match ApiRequest::from_request(request, self.options.max_body_bytes).await {
            Ok(req) => self.dispatch(req).await,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Failed to buffer request body");
                response::error_response(e.status(), &path)
            }
        }
    }

    /// Route an already-buffered request.
    pub async fn dispatch(&self, mut req: ApiRequest) -> Response {
        let start_time = Instant::now();
        let method = normalize_method(req.method());
        let path = self.lookup_path(req.path());

        // HEAD falls back to GET routes when no HEAD route matches.
        let matched = self.find_route(&method, &path).or_else(|| {
            (method == Method::HEAD)
                .then(|| self.find_route(&Method::GET, &path))
                .flatten()
        });

        let Some((route, params)) = matched else {
            tracing::debug!(method = %method, path = %path, "No route matched");
            metrics::record_dispatch(&method, StatusCode::NOT_FOUND.as_u16(), "none", start_time);
            return response::not_found();
        };

        tracing::debug!(
            request_id = req.request_id().unwrap_or("unknown"),
            method = %method,
            path = %path,
            route = %route.path,
            handler = %route.handler_name,
            "Dispatching request"
        );

        req.set_params(params);
        let response = self.run_route(route, req).await;
        metrics::record_dispatch(&method, response.status().as_u16(), &route.path, start_time);
        response
    }

    /// First route declared for `method` whose pattern matches `path`.
    fn find_route(&self, method: &Method, path: &str) -> Option<(&CompiledRoute, PathParams)> {
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| route.matcher.match_path(path).map(|params| (route, params)))
    }

    async fn run_route(&self, route: &CompiledRoute, req: ApiRequest) -> Response {
        let in_flight = req.clone();
        let outcome = AssertUnwindSafe(Next::new(Arc::clone(&route.chain)).run(req))
            .catch_unwind()
            .await;

        let error = match outcome {
            Ok(Ok(response)) => return response,
            Ok(Err(e)) => e,
            Err(payload) => ApiError::from_panic(payload),
        };

        tracing::warn!(
            request_id = in_flight.request_id().unwrap_or("unknown"),
            route = %route.path,
            handler = %route.handler_name,
            error = %error,
            "Route handler failed"
        );

        let Some(handler) = route.on_error.as_ref().or(self.error_handler.as_ref()) else {
            return response::internal_error(in_flight.path());
        };

        let path = in_flight.path().to_string();
        let handled = AssertUnwindSafe(async move { handler.handle_error(error, in_flight).await })
            .catch_unwind()
            .await;
        match handled {
            Ok(response) => response,
            Err(payload) => {
                tracing::error!(
                    route = %route.path,
                    error = %ApiError::from_panic(payload),
                    "Error handler panicked"
                );
                response::internal_error(&path)
            }
        }
    }

    /// Request path as seen by the matchers.
    fn lookup_path(&self, raw: &str) -> String {
        let mut path = raw;
        if let Some(prefix) = self.options.strip_prefix.as_deref() {
            if let Some(rest) = path.strip_prefix(prefix) {
                if rest.is_empty() || rest.starts_with('/') {
                    path = rest;
                }
            }
        }
        if self.options.trim_trailing_slash {
            path = path.trim_end_matches('/');
        }
        if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        }
    }
}

impl fmt::Debug for ApiRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRouter")
            .field("routes", &self.routes)
            .field("options", &self.options)
            .field("error_handler", &self.error_handler.is_some())
            .finish()
    }
}

impl Service<Request<Body>> for ApiRouter {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let router = self.clone();
        Box::pin(async move { Ok(router.handle(request).await) })
    }
}

/// Upper-case the request method; `http` keeps lower-case methods as extensions.
fn normalize_method(method: &Method) -> Method {
    let upper = method.as_str().to_ascii_uppercase();
    Method::from_bytes(upper.as_bytes()).unwrap_or_else(|_| method.clone())
}
