//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup)
//!     → application / admin handler
//!     → security::headers (X-Frame-Options)
//!     → Send to client
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
