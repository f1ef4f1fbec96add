//! Conversion context and the blob store seam.
//!
//! Storage is an external collaborator of the interchange layer: transformers
//! that offload data (stream handles, the opaque fallback) only ever touch it
//! through the narrow [`BlobStore`] trait carried by [`ConversionContext`].
//! Uploads are not rolled back on failure; callers retry with idempotent
//! inputs.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by blob store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No object exists at the given URI.
    #[error("object {uri} not found in store")]
    NotFound {
        /// The missing URI.
        uri: String,
    },

    /// Underlying I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Synchronous byte storage used by blob-backed transformers.
pub trait BlobStore: Send + Sync {
    /// Stores the data under a fresh URI and returns it.
    fn put(&self, data: &[u8]) -> Result<String, StoreError>;

    /// Fetches the data stored at the given URI.
    fn get(&self, uri: &str) -> Result<Bytes, StoreError>;
}

/// In-memory blob store keyed by generated `mem://` URIs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Returns true if the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

impl BlobStore for MemoryStore {
    fn put(&self, data: &[u8]) -> Result<String, StoreError> {
        let uri = format!("mem://{}", Uuid::new_v4());
        self.objects
            .write()
            .insert(uri.clone(), Bytes::copy_from_slice(data));
        Ok(uri)
    }

    fn get(&self, uri: &str) -> Result<Bytes, StoreError> {
        self.objects
            .read()
            .get(uri)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { uri: uri.into() })
    }
}

/// Filesystem-backed blob store rooted at a local directory.
#[derive(Debug)]
pub struct LocalDirStore {
    root: PathBuf,
}

impl LocalDirStore {
    /// Creates a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BlobStore for LocalDirStore {
    fn put(&self, data: &[u8]) -> Result<String, StoreError> {
        let path = self.root.join(Uuid::new_v4().to_string());
        std::fs::write(&path, data)?;
        Ok(format!("file://{}", path.display()))
    }

    fn get(&self, uri: &str) -> Result<Bytes, StoreError> {
        let path = uri
            .strip_prefix("file://")
            .ok_or_else(|| StoreError::NotFound { uri: uri.into() })?;
        let data = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound { uri: uri.into() },
            _ => StoreError::Io(e),
        })?;
        Ok(Bytes::from(data))
    }
}

/// Context threaded through every conversion call.
#[derive(Clone)]
pub struct ConversionContext {
    store: Arc<dyn BlobStore>,
}

impl ConversionContext {
    /// Creates a context over the given blob store.
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Creates a context backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Returns the blob store.
    pub fn store(&self) -> &dyn BlobStore {
        self.store.as_ref()
    }
}

impl Default for ConversionContext {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for ConversionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionContext").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let uri = store.put(b"payload").unwrap();
        assert!(uri.starts_with("mem://"));
        assert_eq!(store.get(&uri).unwrap(), Bytes::from_static(b"payload"));
        assert!(matches!(
            store.get("mem://missing"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_local_dir_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDirStore::new(dir.path());
        let uri = store.put(b"on disk").unwrap();
        assert!(uri.starts_with("file://"));
        assert_eq!(store.get(&uri).unwrap(), Bytes::from_static(b"on disk"));
    }
}
