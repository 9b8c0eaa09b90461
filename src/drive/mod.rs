//! Attachment storage.
//!
//! Ticket attachments are written once and never read back by the service;
//! clients fetch them from the public URL recorded on the attachment row.

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, info};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[cfg(feature = "drive")]
pub mod s3;

#[cfg(feature = "drive")]
pub use s3::{create_s3_client, S3ObjectStore};

#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("Upload failed for {key}: {message}")]
    Upload { key: String, message: String },
    #[error("Drive is not configured: {0}")]
    NotConfigured(String),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), DriveError>;

    /// Location clients use to download `key`.
    fn public_url(&self, key: &str) -> String;
}

pub fn public_object_url(public_base_url: &str, bucket: &str, key: &str) -> String {
    format!(
        "{}/{}/{}",
        public_base_url.trim_end_matches('/'),
        bucket,
        key.trim_start_matches('/')
    )
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: String,
    pub data: Bytes,
}

/// Keeps uploads in process memory. Used by tests and when no drive server
/// is configured.
#[derive(Debug)]
pub struct MemoryObjectStore {
    bucket: String,
    public_base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new(public_base_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            public_base_url: public_base_url.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new("http://localhost:9000", "ticket-attachments")
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), DriveError> {
        debug!("Storing {} bytes in memory at {}", data.len(), key);
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                data,
            },
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url(&self.public_base_url, &self.bucket, key)
    }
}

/// Picks the S3 store when a drive server is configured, memory otherwise.
pub async fn build_object_store(
    config: &crate::config::DriveConfig,
) -> Result<std::sync::Arc<dyn ObjectStore>, DriveError> {
    #[cfg(feature = "drive")]
    if config.is_configured() {
        let client = create_s3_client(config).await;
        info!("Attachments stored in bucket {} at {}", config.bucket, config.server);
        return Ok(std::sync::Arc::new(S3ObjectStore::new(
            client,
            config.bucket.clone(),
            config.public_base_url.clone(),
        )));
    }

    #[cfg(not(feature = "drive"))]
    if config.is_configured() {
        return Err(DriveError::NotConfigured(
            "built without the drive feature".to_string(),
        ));
    }

    info!("No drive server configured, attachments kept in memory");
    Ok(std::sync::Arc::new(MemoryObjectStore::new(
        config.public_base_url.clone(),
        config.bucket.clone(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_object_url() {
        assert_eq!(
            public_object_url("https://cdn.example.com/", "ticket-attachments", "/abc/file.png"),
            "https://cdn.example.com/ticket-attachments/abc/file.png"
        );
    }

    #[tokio::test]
    async fn test_memory_store_put_and_get() {
        let store = MemoryObjectStore::default();
        assert!(store.is_empty().await);

        store
            .put("t1/a.txt", Bytes::from_static(b"hello"), "text/plain")
            .await
            .expect("put");

        let object = store.get("t1/a.txt").await.expect("stored object");
        assert_eq!(object.content_type, "text/plain");
        assert_eq!(object.data.as_ref(), b"hello");
        assert_eq!(store.len().await, 1);
        assert_eq!(
            store.public_url("t1/a.txt"),
            "http://localhost:9000/ticket-attachments/t1/a.txt"
        );
    }
}
