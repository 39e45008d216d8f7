//! Storage collaborators: the blob store for uploaded artwork and the note
//! store for the master's private notes.
//!
//! DESIGN
//! ======
//! Both are async traits so a host can back them with anything. The session
//! ships in-memory implementations. Scene snapshots never carry image bytes:
//! an uploaded blob is referenced as `blob:<name>` and each view resolves the
//! reference through [`load_image`] on its own schedule.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::HashMap;

use canvas::images::{ImageError, LoadedImage};
use tokio::sync::RwLock;

const BLOB_SCHEME: &str = "blob:";

/// Error returned by storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("blob not found: {0}")]
    NotFound(String),
    #[error("blob name must not be empty")]
    EmptyName,
    #[error("not a blob reference: {0}")]
    BadReference(String),
}

/// A stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Uploaded files (maps, token art and the file shelf).
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `name`, replacing any previous blob, and return its reference.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::EmptyName`] for a blank name.
    async fn put(&self, name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<String, StorageError>;

    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no blob has this name.
    async fn get(&self, name: &str) -> Result<Blob, StorageError>;

    /// All blobs, ordered by name.
    ///
    /// # Errors
    ///
    /// Implementations may fail on backend errors; the in-memory store never does.
    async fn list(&self) -> Result<Vec<Blob>, StorageError>;
}

/// Private key/value notes. Never shared with players.
#[async_trait::async_trait]
pub trait NoteStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str);
}

/// Reference used in scene snapshots for a stored blob.
#[must_use]
pub fn blob_reference(name: &str) -> String {
    format!("{BLOB_SCHEME}{name}")
}

/// Blob name behind a `blob:` reference.
///
/// # Errors
///
/// Returns [`StorageError::BadReference`] for any other scheme.
pub fn blob_name(reference: &str) -> Result<&str, StorageError> {
    match reference.strip_prefix(BLOB_SCHEME) {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(StorageError::BadReference(reference.to_string())),
    }
}

/// Materialize an image reference from the blob store.
///
/// # Errors
///
/// Returns [`ImageError::NotFound`] when the reference does not resolve and
/// [`ImageError::Decode`] when the bytes are not an image.
pub async fn load_image(store: &dyn BlobStore, reference: &str) -> Result<LoadedImage, ImageError> {
    let name = blob_name(reference).map_err(|e| ImageError::NotFound(e.to_string()))?;
    let blob = store.get(name).await.map_err(|e| ImageError::NotFound(e.to_string()))?;
    LoadedImage::decode(reference, &blob.bytes)
}

// =============================================================================
// IN-MEMORY IMPLEMENTATIONS
// =============================================================================

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Blob>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StorageError::EmptyName);
        }
        let blob = Blob { name: name.to_string(), mime_type: mime_type.to_string(), bytes };
        self.blobs.write().await.insert(name.to_string(), blob);
        Ok(blob_reference(name))
    }

    async fn get(&self, name: &str) -> Result<Blob, StorageError> {
        self.blobs
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    async fn list(&self) -> Result<Vec<Blob>, StorageError> {
        let mut blobs: Vec<Blob> = self.blobs.read().await.values().cloned().collect();
        blobs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(blobs)
    }
}

#[derive(Default)]
pub struct MemoryNoteStore {
    notes: RwLock<HashMap<String, String>>,
}

impl MemoryNoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl NoteStore for MemoryNoteStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.notes.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) {
        self.notes.write().await.insert(key.to_string(), value.to_string());
    }
}
