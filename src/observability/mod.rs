//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! policy store, decoration layer, admin API:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
