//! Startup orchestration.
//!
//! # Design Decisions
//! - Service config errors are fatal; policy errors are not
//! - The policy store is ready before the listener binds

use std::sync::Arc;

use notify::RecommendedWatcher;

use crate::config::watcher::PolicyWatcher;
use crate::config::PolicyConfig;
use crate::policy::{FileBackend, MemoryBackend, PolicyBackend, PolicyStore};

/// Pick the backend named by the config and load the store from it.
pub fn open_store(config: &PolicyConfig) -> Arc<PolicyStore> {
    let backend: Arc<dyn PolicyBackend> = match &config.path {
        Some(path) => Arc::new(FileBackend::new(path)),
        None => {
            tracing::warn!("No policy.path configured, policy changes will not survive a restart");
            Arc::new(MemoryBackend::new())
        }
    };
    Arc::new(PolicyStore::load(backend))
}

/// Start the policy file watcher when configured.
///
/// Failure to watch is logged and startup continues; updates through the
/// admin API and SIGHUP reloads still work.
pub fn start_watcher(config: &PolicyConfig, store: Arc<PolicyStore>) -> Option<RecommendedWatcher> {
    let path = config.path.as_ref().filter(|_| config.watch)?;
    match PolicyWatcher::new(path, store).run() {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!(path = ?path, error = %e, "Policy watcher not started");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::HeaderPolicy;

    #[test]
    fn test_open_store_without_path_is_in_memory() {
        let store = open_store(&PolicyConfig::default());
        assert_eq!(store.backend().describe(), "memory");
        assert_eq!(*store.current(), HeaderPolicy::default());
    }

    #[test]
    fn test_open_store_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xframe.toml");
        std::fs::write(&path, "sendHeader = true\noptions = \"DENY\"\n").unwrap();

        let store = open_store(&PolicyConfig {
            path: Some(path),
            watch: false,
        });
        assert_eq!(*store.current(), HeaderPolicy::new(true, "DENY"));
    }

    #[test]
    fn test_watcher_skipped_when_disabled() {
        let store = open_store(&PolicyConfig::default());
        let config = PolicyConfig {
            path: Some("xframe.toml".into()),
            watch: false,
        };
        assert!(start_watcher(&config, store).is_none());
    }
}
