//! Data structures shared by the media-host adapters.

use serde::{Deserialize, Serialize};

/// A successfully persisted media object.
///
/// `url` is the durable address handed back to API clients; the remaining
/// fields describe the object as the host sees it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StoredMedia {
    /// Durable, publicly retrievable URL.
    pub url: String,
    /// Host-side identifier, usable for later management calls.
    pub public_id: String,
    /// Host-side resource classification (image, video, raw).
    pub resource_type: String,
    /// Object size in bytes as reported by the host.
    pub bytes: u64,
}
