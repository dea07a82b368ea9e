//! Cloudinary-backed implementation of the `BlobStore` trait.
//!
//! Uploads go through the signed upload endpoint: request parameters are
//! sorted, concatenated with the account's API secret, and hashed with
//! SHA-256. The host answers with the durable `secure_url` that callers
//! hand back to API clients.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::BlobStoreError;
use crate::models::StoredMedia;
use crate::BlobStore;

/// Credentials and addressing for one Cloudinary account.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Optional folder the account groups uploads under.
    pub folder: Option<String>,
}

pub struct CloudinaryStore {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

/// Fields of the upload response we care about.
#[derive(Deserialize, Debug)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
    resource_type: String,
    bytes: u64,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/auto/upload",
            self.config.cloud_name
        )
    }
}

/// Derive the request signature over the signed parameter set.
///
/// Parameters are sorted by name, joined as `key=value` pairs with `&`, and
/// the API secret is appended before hashing.
fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl BlobStore for CloudinaryStore {
    async fn upload(&self, path: &Path) -> Result<StoredMedia, BlobStoreError> {
        let contents = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let mut signed: Vec<(&str, String)> = vec![("timestamp", timestamp.clone())];
        if let Some(folder) = &self.config.folder {
            signed.push(("folder", folder.clone()));
        }
        let signature = sign_params(&signed, &self.config.api_secret);

        let mut form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(contents).file_name(file_name),
            )
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256".to_string())
            .text("signature", signature);
        if let Some(folder) = &self.config.folder {
            form = form.text("folder", folder.clone());
        }

        let response = self
            .http
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|err| BlobStoreError::UploadFailed(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BlobStoreError::UploadFailed(format!("{}: {}", status, body)));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|err| BlobStoreError::InvalidResponse(err.to_string()))?;

        tracing::debug!(public_id = %uploaded.public_id, "media upload accepted");

        Ok(StoredMedia {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
            resource_type: uploaded.resource_type,
            bytes: uploaded.bytes,
        })
    }
}
