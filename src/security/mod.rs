//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response:
//!     → headers.rs (X-Frame-Options from the active policy)
//!     → Send to client
//! ```

pub mod headers;

pub use headers::{decorate, XFrameLayer, XFrameService};
