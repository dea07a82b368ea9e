//! In-memory implementation of the `BlobStore` trait.
//!
//! Stands in for the real media host in tests and local development. Files
//! are still read from disk so callers exercise their staging path, then
//! tracked in a map keyed by the synthetic URL they were assigned.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::BlobStoreError;
use crate::models::StoredMedia;
use crate::BlobStore;

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, StoredMedia>>,
    next_id: AtomicU64,
    fail_uploads: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upload fail, for exercising error paths.
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Number of objects accepted so far.
    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.lock().await.is_empty()
    }

    /// Whether a URL refers to an object this store accepted.
    pub async fn contains(&self, url: &str) -> bool {
        self.objects.lock().await.contains_key(url)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &Path) -> Result<StoredMedia, BlobStoreError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(BlobStoreError::UploadFailed(
                "simulated host failure".to_string(),
            ));
        }

        let contents = tokio::fs::read(path).await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload");

        let media = StoredMedia {
            url: format!("memory://media/{}/{}", id, file_name),
            public_id: format!("memory-{}", id),
            resource_type: "auto".to_string(),
            bytes: contents.len() as u64,
        };

        self.objects.lock().await.insert(media.url.clone(), media.clone());
        Ok(media)
    }
}
