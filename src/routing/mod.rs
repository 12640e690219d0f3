//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (ApiRouter::new):
//!     Registry<C>::describe()
//!     → base path + declared path, trailing slashes stripped
//!     → matcher.rs (compile pattern)
//!     → chain = controller mws ++ route mws ++ bound handler
//!     → Freeze as immutable ApiRouter
//!
//! Incoming Request (method, path):
//!     → router.rs (strip /api prefix, scan routes in order)
//!     → matcher.rs (evaluate path, capture params)
//!     → Run chain, or 404
//! ```
//!
//! # Design Decisions
//! - Routes compiled once per controller instance, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)

pub mod error;
pub mod matcher;
pub mod router;

pub use error::RouterError;
pub use matcher::PathMatcher;
pub use router::{ApiRouter, CompiledRoute, RoutingOptions};
