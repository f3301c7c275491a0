//! Process-wide active policy.
//!
//! # Responsibilities
//! - Load the persisted policy at startup, falling back to the default
//! - Serve the active snapshot to every request without locking
//! - Validate, persist, then swap on administrative updates
//! - Re-read the backend when the persisted record changes out of band
//!
//! # Design Decisions
//! - Readers do a single `ArcSwap::load`; writers never block them
//! - Writers are serialized by a mutex readers never touch
//! - The swap happens only after persistence succeeds, so the running
//!   behavior always matches the last durable record

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;

use crate::observability::metrics;
use crate::policy::backend::{PersistedPolicy, PolicyBackend};
use crate::policy::error::PolicyError;
use crate::policy::header::HeaderPolicy;

/// Read the persisted policy, never failing.
///
/// A missing record yields the default. Unreadable or invalid records are
/// logged and also yield the default, so a bad file cannot stop startup.
pub fn load_policy(backend: &dyn PolicyBackend) -> HeaderPolicy {
    match backend.read() {
        Ok(Some(record)) => {
            let policy = record.into_policy();
            match policy.validate() {
                Ok(()) => policy,
                Err(e) => {
                    tracing::warn!(
                        backend = %backend.describe(),
                        error = %e,
                        "Persisted policy is invalid, using default"
                    );
                    HeaderPolicy::default()
                }
            }
        }
        Ok(None) => {
            tracing::info!(backend = %backend.describe(), "No persisted policy, using default");
            HeaderPolicy::default()
        }
        Err(e) => {
            tracing::warn!(
                backend = %backend.describe(),
                error = %e,
                "Failed to read persisted policy, using default"
            );
            HeaderPolicy::default()
        }
    }
}

/// Holder of the active [`HeaderPolicy`].
pub struct PolicyStore {
    active: ArcSwap<HeaderPolicy>,
    backend: Arc<dyn PolicyBackend>,
    writer: Mutex<()>,
}

impl PolicyStore {
    /// Build a store from whatever the backend holds.
    pub fn load(backend: Arc<dyn PolicyBackend>) -> Self {
        let policy = load_policy(backend.as_ref());
        tracing::info!(
            backend = %backend.describe(),
            enabled = policy.enabled(),
            value = %policy.value(),
            "Header policy loaded"
        );
        Self {
            active: ArcSwap::from_pointee(policy),
            backend,
            writer: Mutex::new(()),
        }
    }

    /// The active snapshot.
    pub fn current(&self) -> Arc<HeaderPolicy> {
        self.active.load_full()
    }

    /// Validate, persist and activate `candidate`.
    ///
    /// On any error the active snapshot is left untouched.
    pub fn update(&self, candidate: HeaderPolicy) -> Result<(), PolicyError> {
        if let Err(e) = candidate.validate() {
            metrics::record_policy_update("rejected");
            return Err(e);
        }

        let _guard = self.writer.lock().expect("policy writer mutex poisoned");

        if let Err(e) = self.backend.write(&PersistedPolicy::from(&candidate)) {
            tracing::error!(
                backend = %self.backend.describe(),
                error = %e,
                "Failed to persist header policy, keeping current"
            );
            metrics::record_policy_update("failed");
            return Err(e);
        }

        tracing::info!(
            enabled = candidate.enabled(),
            value = %candidate.value(),
            directive = candidate.directive().label(),
            "Header policy updated"
        );
        self.active.store(Arc::new(candidate));
        metrics::record_policy_update("ok");
        Ok(())
    }

    /// Re-read the backend and activate its policy if it changed.
    ///
    /// Returns `Ok(true)` when the active snapshot was replaced. A missing
    /// record keeps the current policy.
    pub fn reload(&self) -> Result<bool, PolicyError> {
        let _guard = self.writer.lock().expect("policy writer mutex poisoned");

        let result = self.backend.read().and_then(|record| match record {
            Some(record) => {
                let policy = record.into_policy();
                policy.validate()?;
                Ok(Some(policy))
            }
            None => Ok(None),
        });

        let policy = match result {
            Ok(Some(policy)) => policy,
            Ok(None) => {
                tracing::debug!(backend = %self.backend.describe(), "No persisted policy to reload");
                return Ok(false);
            }
            Err(e) => {
                metrics::record_policy_reload("failed");
                return Err(e);
            }
        };

        if **self.active.load() == policy {
            return Ok(false);
        }

        tracing::info!(
            enabled = policy.enabled(),
            value = %policy.value(),
            "Header policy reloaded"
        );
        self.active.store(Arc::new(policy));
        metrics::record_policy_reload("ok");
        Ok(true)
    }

    pub fn backend(&self) -> &Arc<dyn PolicyBackend> {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::backend::MemoryBackend;
    use std::thread;

    struct FailingBackend;

    impl PolicyBackend for FailingBackend {
        fn read(&self) -> Result<Option<PersistedPolicy>, PolicyError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into())
        }

        fn write(&self, _record: &PersistedPolicy) -> Result<(), PolicyError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into())
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    fn memory_store() -> PolicyStore {
        PolicyStore::load(Arc::new(MemoryBackend::new()))
    }

    #[test]
    fn test_load_empty_backend_gives_default() {
        let store = memory_store();
        assert_eq!(*store.current(), HeaderPolicy::default());
    }

    #[test]
    fn test_load_read_failure_gives_default() {
        let store = PolicyStore::load(Arc::new(FailingBackend));
        assert_eq!(*store.current(), HeaderPolicy::default());
    }

    #[test]
    fn test_load_existing_record() {
        let backend = MemoryBackend::with_record(PersistedPolicy {
            send_header: true,
            options: Some("ALLOW-FROM http://nowhere.net/".to_string()),
        });
        let store = PolicyStore::load(Arc::new(backend));
        assert_eq!(store.current().value(), "ALLOW-FROM http://nowhere.net/");
    }

    #[test]
    fn test_load_illegal_record_gives_default() {
        let backend = MemoryBackend::with_record(PersistedPolicy {
            send_header: true,
            options: Some("DENY\nX-Evil: 1".to_string()),
        });
        let store = PolicyStore::load(Arc::new(backend));
        assert_eq!(*store.current(), HeaderPolicy::default());
    }

    #[test]
    fn test_update_then_current() {
        let store = memory_store();
        let candidate = HeaderPolicy::new(true, "ALLOW-FROM http://my.com/");

        store.update(candidate.clone()).unwrap();

        assert_eq!(*store.current(), candidate);
        assert_eq!(
            store.backend().read().unwrap(),
            Some(PersistedPolicy::from(&candidate))
        );
    }

    #[test]
    fn test_update_disabled_skips_value_checks() {
        let store = memory_store();
        store.update(HeaderPolicy::new(false, "")).unwrap();
        assert!(store.current().header_for().is_none());
    }

    #[test]
    fn test_rejected_update_keeps_current() {
        let store = memory_store();
        let before = store.current();

        let err = store.update(HeaderPolicy::new(true, "")).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(store.current(), before);
        assert!(store.backend().read().unwrap().is_none());
    }

    #[test]
    fn test_failed_persistence_keeps_current() {
        let store = PolicyStore::load(Arc::new(FailingBackend));
        let before = store.current();

        let err = store.update(HeaderPolicy::new(true, "DENY")).unwrap_err();

        assert!(!err.is_validation());
        assert!(Arc::ptr_eq(&store.current(), &before));
    }

    #[test]
    fn test_reload_picks_up_backend_change() {
        let backend = Arc::new(MemoryBackend::new());
        let store = PolicyStore::load(backend.clone());

        assert!(!store.reload().unwrap());

        backend
            .write(&PersistedPolicy {
                send_header: true,
                options: Some("DENY".to_string()),
            })
            .unwrap();

        assert!(store.reload().unwrap());
        assert_eq!(store.current().value(), "DENY");
        assert!(!store.reload().unwrap());
    }

    #[test]
    fn test_reload_failure_keeps_current() {
        let store = PolicyStore::load(Arc::new(FailingBackend));
        assert!(store.reload().is_err());
        assert_eq!(*store.current(), HeaderPolicy::default());
    }

    #[test]
    fn test_concurrent_readers_see_whole_snapshots() {
        let store = Arc::new(memory_store());
        let values = ["DENY", "SAMEORIGIN", "ALLOW-FROM http://my.com/"];

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        let policy = store.current();
                        assert!(policy.enabled());
                        assert!(values.contains(&policy.value()));
                    }
                })
            })
            .collect();

        for i in 0..100 {
            store.update(HeaderPolicy::new(true, values[i % values.len()])).unwrap();
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[test]
    fn test_blank_enabled_value_rejected() {
        let store = memory_store();

        let err = store.update(HeaderPolicy::new(true, "   ")).unwrap_err();

        assert!(matches!(err, PolicyError::EmptyValue));
        assert_eq!(*store.current(), HeaderPolicy::default());
        assert!(store.backend().read().unwrap().is_none());
    }

    #[test]
    fn test_disabled_blank_value_survives_reload() {
        let store = memory_store();
        let candidate = HeaderPolicy::new(false, "");

        store.update(candidate.clone()).unwrap();

        assert!(!store.reload().unwrap());
        assert_eq!(*store.current(), candidate);
        assert_eq!(*PolicyStore::load(store.backend().clone()).current(), candidate);
    }
}
