//! In-process snapshot store.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::store::{CachedDocument, SnapshotStore, StoreError};

/// A concurrent map of snapshots.
///
/// Seeded once at startup (from a manifest, or by tests); clones share the
/// same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, CachedDocument>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON manifest of the form `{ "/index": "<html>...", "/robots.txt": "..." }`.
    pub fn load_manifest(path: &Path) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        let map: HashMap<String, String> = serde_json::from_reader(BufReader::new(file))?;

        let store = Self::new();
        for (key, body) in map {
            store.insert(key, CachedDocument::new(body));
        }
        tracing::info!(path = %path.display(), documents = store.len(), "Loaded snapshot manifest");
        Ok(store)
    }

    /// Insert or replace a document.
    pub fn insert(&self, key: impl Into<String>, document: CachedDocument) {
        self.inner.insert(key.into(), document);
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<CachedDocument>, StoreError> {
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryStore::new();
        assert!(store.get("/index").await.unwrap().is_none());

        store.insert("/index", CachedDocument::new("<h1>home</h1>"));
        let doc = store.get("/index").await.unwrap().unwrap();
        assert_eq!(doc.body, "<h1>home</h1>");

        // Keys are exact
        assert!(store.get("/index/").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.insert("/pricing", CachedDocument::new("plans"));
        assert_eq!(other.len(), 1);
        assert!(other.get("/pricing").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_load_manifest() {
        let path = std::env::temp_dir().join(format!("snapshots-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"{ "/index": "<html>home</html>", "/robots.txt": "User-agent: *\nAllow: /" }"#,
        )
        .unwrap();

        let store = MemoryStore::load_manifest(&path).unwrap();
        assert_eq!(store.len(), 2);
        let robots = store.get("/robots.txt").await.unwrap().unwrap();
        assert!(robots.body.starts_with("User-agent"));

        std::fs::remove_file(path).unwrap_or_default();
    }

    #[test]
    fn test_load_manifest_errors() {
        let missing = MemoryStore::load_manifest(Path::new("/nonexistent/snapshots.json"));
        assert!(matches!(missing, Err(StoreError::Io(_))));

        let path = std::env::temp_dir().join(format!("snapshots-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(MemoryStore::load_manifest(&path), Err(StoreError::Manifest(_))));
        std::fs::remove_file(path).unwrap_or_default();
    }
}
