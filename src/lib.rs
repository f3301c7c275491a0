//! X-Frame-Options response header injector.
//!
//! Every response served through [`HttpServer`] carries the
//! `X-Frame-Options` header described by the active [`HeaderPolicy`]
//! (or none, when sending is disabled). The policy is persisted, can be
//! changed through the admin API, and is hot-reloaded without a restart.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod policy;
pub mod security;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use policy::{HeaderPolicy, PolicyStore};
