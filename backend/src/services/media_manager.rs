//! Staging and upload orchestration for client-submitted media.
//!
//! Multipart uploads are first written to a local staging directory, then
//! pushed to the configured media host. The staged copy is removed once the
//! host has answered, in either direction; a crashed request leaks at most
//! one temp file.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;
use vidtube_adapters::errors::BlobStoreError;
use vidtube_adapters::models::StoredMedia;
use vidtube_adapters::BlobStore;

/// A multipart file parked on local disk, waiting for upload.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub path: PathBuf,
    pub original_name: String,
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("could not stage uploaded file: {0}")]
    Staging(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] BlobStoreError),
}

pub struct MediaManager {
    store: Arc<dyn BlobStore>,
    temp_dir: PathBuf,
}

impl MediaManager {
    pub fn new(store: Arc<dyn BlobStore>, temp_dir: PathBuf) -> Self {
        Self { store, temp_dir }
    }

    /// Write multipart bytes into the staging directory under a
    /// collision-free name.
    pub async fn stash(&self, original_name: &str, bytes: &[u8]) -> Result<StagedFile, MediaError> {
        tokio::fs::create_dir_all(&self.temp_dir).await?;
        let file_name = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(original_name));
        let path = self.temp_dir.join(file_name);
        tokio::fs::write(&path, bytes).await?;
        Ok(StagedFile {
            path,
            original_name: original_name.to_string(),
        })
    }

    /// Upload a staged file, removing the staged copy afterwards.
    pub async fn upload_staged(&self, staged: &StagedFile) -> Result<StoredMedia, MediaError> {
        let result = self.store.upload(&staged.path).await;
        if let Err(err) = tokio::fs::remove_file(&staged.path).await {
            tracing::debug!(
                path = %staged.path.display(),
                "could not remove staged file: {}", err
            );
        }
        Ok(result?)
    }
}

/// Keep alphanumerics, dots, dashes and underscores; everything else
/// becomes an underscore so the staged name stays a single path segment.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
