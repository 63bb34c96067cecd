//! Snapshot store subsystem.
//!
//! # Data Flow
//! ```text
//! offline pipeline (out of process)
//!     → writes snapshots into a backend (directory, manifest, KV...)
//!
//! live request:
//!     cache key
//!     → lookup.rs (deadline, freshness policy, error → absent)
//!     → SnapshotStore::get (memory.rs | directory.rs)
//!     → Option<CachedDocument>
//! ```
//!
//! # Design Decisions
//! - Read-only from the proxy; there is no write path in request handling
//! - Backends report errors; only the lookup layer decides they mean "absent"
//! - Safe for unbounded concurrent reads (no locks held across awaits)

pub mod directory;
pub mod lookup;
pub mod memory;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{StoreConfig, StoreKind};

pub use directory::DirectoryStore;
pub use lookup::{LookupOutcome, SnapshotLookup};
pub use memory::MemoryStore;

/// A previously captured page (or robots/sitemap document).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedDocument {
    /// Document text, served as-is.
    pub body: String,
    /// When the offline pipeline produced it, if the backend knows.
    pub generated_at: Option<SystemTime>,
}

impl CachedDocument {
    /// A document with no known generation time.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            generated_at: None,
        }
    }

    /// A document generated at `at`.
    pub fn generated_at(body: impl Into<String>, at: SystemTime) -> Self {
        Self {
            body: body.into(),
            generated_at: Some(at),
        }
    }

    /// Age relative to `now`. Unknown or future timestamps have no age.
    pub fn age(&self, now: SystemTime) -> Option<Duration> {
        self.generated_at.and_then(|at| now.duration_since(at).ok())
    }
}

/// Errors reported by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Read access to snapshots keyed by normalized path.
#[async_trait]
pub trait SnapshotStore: Send + Sync + std::fmt::Debug {
    /// Fetch the document stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<CachedDocument>, StoreError>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Open the backend selected in configuration.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn SnapshotStore>, StoreError> {
    let path = config.path.as_deref().filter(|p| !p.is_empty());
    match (config.kind, path) {
        (StoreKind::Memory, Some(path)) => Ok(Arc::new(MemoryStore::load_manifest(Path::new(path))?)),
        (StoreKind::Memory, None) => {
            tracing::warn!("Memory store has no manifest; every crawler request will be proxied");
            Ok(Arc::new(MemoryStore::new()))
        }
        (StoreKind::Directory, Some(path)) => Ok(Arc::new(DirectoryStore::new(path))),
        (StoreKind::Directory, None) => Err(StoreError::Backend(
            "directory store requires store.path".to_string(),
        )),
    }
}
