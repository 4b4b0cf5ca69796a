//! Media ingestion backends.
//!
//! Uploaded complaint photos go either to the local upload directory (served
//! back under `/uploads`) or to Cloudinary when credentials are configured.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::config::CloudinaryConfig;

const CLOUDINARY_FOLDER: &str = "villagers_uploads";

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Stores the image bytes under the given filename and returns the
    /// reference URL to record on the complaint.
    async fn store(&self, filename: &str, bytes: Bytes) -> Result<String>;
}

pub struct LocalDiskStore {
    dir: PathBuf,
}

impl LocalDiskStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl MediaStore for LocalDiskStore {
    async fn store(&self, filename: &str, bytes: Bytes) -> Result<String> {
        let path = self.dir.join(filename);

        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("writing upload to {}", path.display()))?;

        info!(filename, size = bytes.len(), "Stored upload on disk");

        Ok(format!("/uploads/{filename}"))
    }
}

pub struct CloudinaryStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Signature over the sorted request parameters plus the API secret,
    /// hex-encoded. Cloudinary accepts SHA-256 when `signature_algorithm`
    /// says so.
    fn sign(&self, timestamp: i64) -> String {
        let to_sign = format!(
            "folder={CLOUDINARY_FOLDER}&timestamp={timestamp}{}",
            self.config.api_secret
        );

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());

        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn store(&self, filename: &str, bytes: Bytes) -> Result<String> {
        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.config.cloud_name
        );

        let timestamp = Utc::now().timestamp();
        let signature = self.sign(timestamp);

        let file_part = reqwest::multipart::Part::bytes(bytes.to_vec())
            .file_name(filename.to_string());

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("folder", CLOUDINARY_FOLDER)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("Cloudinary upload request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Cloudinary upload failed: {status} - {body}"));
        }

        let uploaded: CloudinaryUploadResponse = response
            .json()
            .await
            .context("decoding Cloudinary response")?;

        info!(filename, "Stored upload on Cloudinary");

        Ok(uploaded.secure_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_store_writes_file_and_returns_reference() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path().to_path_buf());

        let url = store
            .store("123-photo.jpg", Bytes::from_static(b"jpegdata"))
            .await
            .unwrap();

        assert_eq!(url, "/uploads/123-photo.jpg");
        let written = std::fs::read(dir.path().join("123-photo.jpg")).unwrap();
        assert_eq!(written, b"jpegdata");
    }

    #[tokio::test]
    async fn traversal_upload_names_stay_inside_upload_dir() {
        let outer = tempfile::tempdir().unwrap();
        let uploads = outer.path().join("uploads");
        std::fs::create_dir_all(&uploads).unwrap();
        let store = LocalDiskStore::new(uploads.clone());

        let filename = crate::utils::unique_filename("../escape.txt");
        store
            .store(&filename, Bytes::from_static(b"jpegdata"))
            .await
            .unwrap();

        assert!(!outer.path().join("escape.txt").exists());
        assert!(uploads.join(&filename).exists());
    }

    #[test]
    fn cloudinary_signature_is_hex_sha256() {
        let store = CloudinaryStore::new(CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
        });

        let sig = store.sign(1_700_000_000);
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
