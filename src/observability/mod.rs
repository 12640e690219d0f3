//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router and server produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (dispatch counters and latency histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows into every dispatch log event
//! - Metrics are cheap when no recorder is installed

pub mod logging;
pub mod metrics;
