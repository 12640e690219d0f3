//! Route registry.
//!
//! # Data Flow
//! ```text
//! Controller::register(&mut Registry<Self>)     (once per router build)
//!     → handler(name, fn)                       bind names to methods
//!     → register_route(path, method, name)      RouteDefinition[]
//!     → register_*_middleware(...)              MiddlewareList per scope
//!     → Registry::describe()                    read back by the dispatcher
//! ```
//!
//! # Design Decisions
//! - Metadata lives in a descriptor built by the controller type itself; the
//!   generic parameter is the type identity, so there is no global table
//! - Registration is append-only; duplicate routes accumulate and the first
//!   one wins at dispatch time
//! - Read accessors never fail: missing entries read as empty

pub mod definition;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::http::Method;
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::http::error::{ApiError, ErrorHandler};
use crate::http::middleware::{HandlerResult, Middleware, Next};
use crate::http::request::ApiRequest;

pub use definition::RouteDefinition;

/// A controller method bound by name: `(controller, request, next) -> response`.
pub type BoxedHandler<C> =
    Arc<dyn Fn(Arc<C>, ApiRequest, Next) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// A type whose methods serve routes.
///
/// ```ignore
/// impl Controller for UsersController {
///     fn register(registry: &mut Registry<Self>) {
///         registry
///             .register_controller_middleware([log_requests()])
///             .request_mapping("/users/:id", Method::GET, "get_user", Self::get_user);
///     }
/// }
/// ```
pub trait Controller: Send + Sync + Sized + 'static {
    /// Declare this type's routes and middleware.
    fn register(registry: &mut Registry<Self>);
}

/// Routing metadata for one controller type.
pub struct Registry<C> {
    routes: Vec<RouteDefinition>,
    handlers: HashMap<String, BoxedHandler<C>>,
    controller_middlewares: Vec<Arc<dyn Middleware>>,
    route_middlewares: HashMap<String, Vec<Arc<dyn Middleware>>>,
    route_error_handlers: HashMap<String, Arc<dyn ErrorHandler>>,
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            handlers: HashMap::new(),
            controller_middlewares: Vec::new(),
            route_middlewares: HashMap::new(),
            route_error_handlers: HashMap::new(),
        }
    }
}

impl<C: Controller> Registry<C> {
    /// Collect the metadata `C` declares.
    pub fn describe() -> Self {
        let mut registry = Self::default();
        C::register(&mut registry);
        registry
    }
}

impl<C: Send + Sync + 'static> Registry<C> {
    /// Bind `name` to a controller method.
    pub fn handler<F, Fut>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(Arc<C>, ApiRequest, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let boxed: BoxedHandler<C> = Arc::new(
            move |controller: Arc<C>, req: ApiRequest, next: Next| -> BoxFuture<'static, HandlerResult> {
                Box::pin(handler(controller, req, next))
            },
        );
        self.handlers.insert(name.into(), boxed);
        self
    }

    /// Append a route. Duplicates are kept.
    pub fn register_route(
        &mut self,
        path: impl Into<String>,
        method: Method,
        handler_name: impl Into<String>,
    ) -> &mut Self {
        self.routes.push(RouteDefinition::new(path, method, handler_name));
        self
    }

    /// Bind a handler and declare its route in one step.
    pub fn request_mapping<F, Fut>(
        &mut self,
        path: impl Into<String>,
        method: Method,
        handler_name: impl Into<String>,
        handler: F,
    ) -> &mut Self
    where
        F: Fn(Arc<C>, ApiRequest, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let handler_name = handler_name.into();
        self.handler(handler_name.clone(), handler);
        self.register_route(path, method, handler_name)
    }

    /// Append middleware that runs only for `handler_name`.
    pub fn register_route_middleware<I>(
        &mut self,
        handler_name: impl Into<String>,
        middlewares: I,
    ) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        self.route_middlewares
            .entry(handler_name.into())
            .or_default()
            .extend(middlewares);
        self
    }

    /// Append middleware that runs for every route of this controller.
    pub fn register_controller_middleware<I>(&mut self, middlewares: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        self.controller_middlewares.extend(middlewares);
        self
    }

    /// Set the error handler consulted first when `handler_name`'s chain fails.
    pub fn register_route_error_handler<F, Fut>(
        &mut self,
        handler_name: impl Into<String>,
        handler: F,
    ) -> &mut Self
    where
        F: Fn(ApiError, ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route_error_handlers
            .insert(handler_name.into(), Arc::new(handler));
        self
    }

    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    pub fn controller_middlewares(&self) -> &[Arc<dyn Middleware>] {
        &self.controller_middlewares
    }

    pub fn route_middlewares(&self) -> &HashMap<String, Vec<Arc<dyn Middleware>>> {
        &self.route_middlewares
    }

    pub fn route_middlewares_for(&self, handler_name: &str) -> &[Arc<dyn Middleware>] {
        self.route_middlewares
            .get(handler_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn route_error_handler(&self, handler_name: &str) -> Option<Arc<dyn ErrorHandler>> {
        self.route_error_handlers.get(handler_name).cloned()
    }

    /// Bind the named handler to `controller`, producing a terminal chain step.
    pub(crate) fn bind(&self, handler_name: &str, controller: &Arc<C>) -> Option<Arc<dyn Middleware>> {
        let handler = self.handlers.get(handler_name)?;
        Some(Arc::new(BoundHandler {
            controller: Arc::clone(controller),
            handler: Arc::clone(handler),
        }))
    }
}

impl<C> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("routes", &self.routes)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("controller_middlewares", &self.controller_middlewares.len())
            .field("route_middlewares", &self.route_middlewares.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A controller method bound to a specific instance.
struct BoundHandler<C> {
    controller: Arc<C>,
    handler: BoxedHandler<C>,
}

impl<C: Send + Sync + 'static> Middleware for BoundHandler<C> {
    fn call(&self, req: ApiRequest, next: Next) -> BoxFuture<'static, HandlerResult> {
        (self.handler)(Arc::clone(&self.controller), req, next)
    }
}
