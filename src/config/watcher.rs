//! Policy file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself: policy
//! writes replace the file by rename, which would orphan a watch on the
//! old inode.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::policy::PolicyStore;

/// A watcher that reloads the policy store when its file changes.
pub struct PolicyWatcher {
    path: PathBuf,
    store: Arc<PolicyStore>,
}

impl PolicyWatcher {
    pub fn new(path: &Path, store: Arc<PolicyStore>) -> Self {
        Self {
            path: path.to_path_buf(),
            store,
        }
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = watch_dir(&self.path);
        let path = self.path.clone();
        let store = self.store;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    if !event.paths.iter().any(|p| is_policy_file(p, &path)) {
                        return;
                    }
                    tracing::debug!(path = ?path, "Policy file change detected, reloading...");
                    match store.reload() {
                        Ok(true) => {}
                        Ok(false) => tracing::debug!("Policy file unchanged"),
                        Err(e) => tracing::error!(
                            "Failed to reload policy: {}. Keeping current policy.",
                            e
                        ),
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Policy watcher started");
        Ok(watcher)
    }
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn is_policy_file(candidate: &Path, policy: &Path) -> bool {
    candidate.file_name().is_some() && candidate.file_name() == policy.file_name()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_dir() {
        assert_eq!(watch_dir(Path::new("/etc/xframe/xframe.toml")), PathBuf::from("/etc/xframe"));
        assert_eq!(watch_dir(Path::new("xframe.toml")), PathBuf::from("."));
    }

    #[test]
    fn test_is_policy_file_ignores_temp_sibling() {
        let policy = Path::new("state/xframe.toml");
        assert!(is_policy_file(Path::new("/abs/state/xframe.toml"), policy));
        assert!(!is_policy_file(Path::new("/abs/state/xframe.toml.tmp"), policy));
    }
}
