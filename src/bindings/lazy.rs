//! Lazily constructed route bindings.
//!
//! The controller factory runs on the first request, not when the bindings
//! are created. A failed construction is answered with the generic 500 body
//! and retried on the next request.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::OnceCell;

use crate::bindings::handlers::{RouteHandler, RouteHandlers};
use crate::http::response;
use crate::registry::Controller;
use crate::routing::{ApiRouter, RouterError, RoutingOptions};

struct LazyRouter<F> {
    factory: F,
    base_path: String,
    options: RoutingOptions,
    router: OnceCell<ApiRouter>,
}

impl<F, Fut, C> LazyRouter<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = C> + Send,
    C: Controller,
{
    async fn router(&self) -> Result<&ApiRouter, RouterError> {
        self.router
            .get_or_try_init(|| async {
                let controller = Arc::new((self.factory)().await);
                ApiRouter::with_options(&self.base_path, controller, self.options.clone())
            })
            .await
    }

    async fn handle(&self, request: Request<Body>) -> Response {
        match self.router().await {
            Ok(router) => router.handle(request).await,
            Err(e) => {
                tracing::error!(
                    base_path = %self.base_path,
                    error = %e,
                    "Failed to construct router"
                );
                response::internal_error(request.uri().path())
            }
        }
    }
}

/// Per-verb bindings that build the controller on first use.
pub fn create_route_lazy<F, Fut, C>(factory: F, base_path: &str) -> Result<RouteHandlers, RouterError>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = C> + Send + 'static,
    C: Controller,
{
    create_route_lazy_with_options(factory, base_path, RoutingOptions::default())
}

/// [`create_route_lazy`] with explicit routing options.
///
/// Fails with [`RouterError::NoRuntime`] when called outside a Tokio runtime.
pub fn create_route_lazy_with_options<F, Fut, C>(
    factory: F,
    base_path: &str,
    options: RoutingOptions,
) -> Result<RouteHandlers, RouterError>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = C> + Send + 'static,
    C: Controller,
{
    Handle::try_current().map_err(|_| RouterError::NoRuntime)?;

    let lazy = Arc::new(LazyRouter {
        factory,
        base_path: base_path.to_string(),
        options,
        router: OnceCell::new(),
    });

    let handle: RouteHandler = Arc::new(move |request: Request<Body>| -> BoxFuture<'static, Response> {
        let lazy = Arc::clone(&lazy);
        Box::pin(async move { lazy.handle(request).await })
    });
    Ok(RouteHandlers::from_handler(handle))
}
