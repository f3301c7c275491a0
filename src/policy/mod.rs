//! Header policy subsystem.
//!
//! # Data Flow
//! ```text
//! startup:
//!     backend.rs (read persisted record)
//!     → header.rs (fill defaults, validate)
//!     → store.rs (ArcSwap<HeaderPolicy>)
//!
//! every response:
//!     store.current() → header_for() → X-Frame-Options
//!
//! admin submission:
//!     candidate → validate → backend.write → atomic swap
//! ```

pub mod backend;
pub mod error;
pub mod header;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, PersistedPolicy, PolicyBackend};
pub use error::PolicyError;
pub use header::{Directive, HeaderPolicy, DEFAULT_OPTIONS, X_FRAME_OPTIONS};
pub use store::{load_policy, PolicyStore};
