//! Router construction errors.

use thiserror::Error;

/// Errors raised while compiling a controller into a router.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Route pattern could not be translated into a matcher.
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },

    /// The path matcher rejected the compiled pattern.
    #[error("route pattern rejected by matcher: {0}")]
    Matcher(#[from] matchit::InsertError),

    /// A route references a handler name the controller never bound.
    #[error("controller `{controller}` has no handler named `{handler}`")]
    UnknownHandler {
        controller: &'static str,
        handler: String,
    },

    /// Lazy bindings were requested outside a Tokio runtime.
    #[error("no Tokio runtime is active; lazy route bindings need one")]
    NoRuntime,
}
