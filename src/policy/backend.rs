//! Policy persistence.
//!
//! # Design Decisions
//! - The stored record has exactly two fields, `sendHeader` and `options`,
//!   and is always overwritten wholesale
//! - File writes go to a temp sibling and are renamed into place, so a
//!   reader never observes a half-written record
//! - A missing record is not an error: `read` returns `Ok(None)`

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::policy::error::PolicyError;
use crate::policy::header::{HeaderPolicy, DEFAULT_SEND_HEADER};

/// The persisted form of a [`HeaderPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedPolicy {
    #[serde(default = "default_send_header")]
    pub send_header: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}

fn default_send_header() -> bool {
    DEFAULT_SEND_HEADER
}

impl PersistedPolicy {
    /// Convert to a policy.
    ///
    /// A missing `options` is filled with the default. A blank one is filled
    /// only when the header is enabled: a disabled record keeps its value
    /// verbatim, so it reads back exactly as it was written.
    pub fn into_policy(self) -> HeaderPolicy {
        match self.options {
            Some(options) if !self.send_header => HeaderPolicy::new(false, options),
            options => HeaderPolicy::with_default_value(self.send_header, options.as_deref()),
        }
    }
}

impl From<&HeaderPolicy> for PersistedPolicy {
    fn from(policy: &HeaderPolicy) -> Self {
        Self {
            send_header: policy.enabled(),
            options: Some(policy.value().to_string()),
        }
    }
}

/// Storage for the persisted policy record.
pub trait PolicyBackend: Send + Sync {
    /// Read the stored record, `None` if nothing has been saved yet.
    fn read(&self) -> Result<Option<PersistedPolicy>, PolicyError>;

    /// Replace the stored record.
    fn write(&self, record: &PersistedPolicy) -> Result<(), PolicyError>;

    /// Human-readable location, for logs and status output.
    fn describe(&self) -> String;
}

/// TOML file backend.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PolicyBackend for FileBackend {
    fn read(&self) -> Result<Option<PersistedPolicy>, PolicyError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: PersistedPolicy = toml::from_str(&content)?;
        Ok(Some(record))
    }

    fn write(&self, record: &PersistedPolicy) -> Result<(), PolicyError> {
        let encoded = toml::to_string(record)?;
        let tmp = self.temp_path();

        let result = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(encoded.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)?;
            fsync_parent_dir(&self.path)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result.map_err(PolicyError::from)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fsync the directory holding `path` so the rename itself is durable.
fn fsync_parent_dir(path: &Path) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::File::open(parent)?.sync_all()
}

/// In-process backend. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slot: Mutex<Option<PersistedPolicy>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a record already saved.
    pub fn with_record(record: PersistedPolicy) -> Self {
        Self {
            slot: Mutex::new(Some(record)),
        }
    }
}

impl PolicyBackend for MemoryBackend {
    fn read(&self) -> Result<Option<PersistedPolicy>, PolicyError> {
        let slot = self.slot.lock().expect("memory backend mutex poisoned");
        Ok(slot.clone())
    }

    fn write(&self, record: &PersistedPolicy) -> Result<(), PolicyError> {
        let mut slot = self.slot.lock().expect("memory backend mutex poisoned");
        *slot = Some(record.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
