//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! service config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!
//! policy file edited out of band:
//!     watcher.rs detects change
//!     → PolicyStore::reload
//!     → atomic swap of Arc<HeaderPolicy>
//! ```
//!
//! # Design Decisions
//! - Service config is immutable once loaded; changes require a restart
//! - The header policy is the only hot-reloadable state
//! - All fields have defaults to allow minimal configs

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::ServiceConfig;
pub use schema::{AdminConfig, ListenerConfig, LogFormat, ObservabilityConfig, PolicyConfig, TimeoutConfig};
