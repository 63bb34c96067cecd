//! Snapshot store over the offline pipeline's output directory.
//!
//! # Layout
//! ```text
//! /index            → <root>/index.html
//! /pricing          → <root>/pricing/index.html
//! /docs/setup       → <root>/docs/setup/index.html
//! /robots.txt       → <root>/robots.txt
//! /sitemap.xml      → <root>/sitemap.xml
//! ```
//!
//! The file's modification time is the document's generation time.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::routing::cache_key::ROOT_KEY;
use crate::store::{CachedDocument, SnapshotStore, StoreError};

/// Reads snapshots from disk on every lookup.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        if !root.is_dir() {
            tracing::warn!(root = %root.display(), "Snapshot directory does not exist yet");
        }
        Self { root }
    }

    /// Map a key to a file below the root. `None` for keys that could escape it.
    pub fn file_for_key(&self, key: &str) -> Option<PathBuf> {
        if key == ROOT_KEY {
            return Some(self.root.join("index.html"));
        }

        let relative = key.strip_prefix('/')?;
        let segments: Vec<&str> = relative.split('/').collect();
        let unsafe_segment = |s: &&str| {
            s.is_empty() || *s == "." || *s == ".." || s.contains('\\') || s.contains('\0')
        };
        if segments.iter().any(unsafe_segment) {
            return None;
        }

        let mut path = self.root.clone();
        path.extend(&segments);

        let has_extension = segments.last().is_some_and(|last| last.contains('.'));
        if !has_extension {
            path.push("index.html");
        }
        Some(path)
    }
}

#[async_trait]
impl SnapshotStore for DirectoryStore {
    async fn get(&self, key: &str) -> Result<Option<CachedDocument>, StoreError> {
        let Some(path) = self.file_for_key(key) else {
            tracing::debug!(key = %key, "Key cannot map to a snapshot file");
            return Ok(None);
        };

        let body = match tokio::fs::read_to_string(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let generated_at = tokio::fs::metadata(&path)
            .await
            .and_then(|m| m.modified())
            .ok();

        Ok(Some(CachedDocument { body, generated_at }))
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}
