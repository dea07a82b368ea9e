//! Core `adapters` crate for abstracting media-host interactions.
//!
//! This crate defines the `BlobStore` trait, which outlines generic
//! functionalities for persisting uploaded media on an external host, and
//! provides a central point for accessing concrete implementations
//! (Cloudinary, in-memory).

pub mod cloudinary;
pub mod errors;
pub mod memory;
pub mod models;

use std::path::Path;

use async_trait::async_trait;

use crate::errors::BlobStoreError;
use crate::models::StoredMedia;

pub use cloudinary::{CloudinaryConfig, CloudinaryStore};
pub use memory::MemoryBlobStore;

/// Generic interface to an external media host.
///
/// Implementations accept a local file and return a durable, publicly
/// retrievable URL. No retries happen at this layer; a failed upload
/// surfaces as a [`BlobStoreError`] and the caller decides what to abort.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload the file at `path` and return its stored representation.
    async fn upload(&self, path: &Path) -> Result<StoredMedia, BlobStoreError>;
}
