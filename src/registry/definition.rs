//! Route declarations.

use axum::http::Method;

/// A single route declared on a controller type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    /// Declared path pattern, relative to the router's base path.
    pub path: String,

    /// HTTP method the route answers.
    pub method: Method,

    /// Name of the bound handler on the controller.
    pub handler_name: String,
}

impl RouteDefinition {
    pub fn new(path: impl Into<String>, method: Method, handler_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            handler_name: handler_name.into(),
        }
    }
}
