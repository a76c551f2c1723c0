//! S3-backed blob storage for avatars, cover images, videos, and thumbnails
//!
//! Uploads are `put_object` calls into a single bucket; the returned URL is
//! what gets persisted on the entity. A successful upload followed by a
//! failed store write leaves the blob orphaned; there is no compensating
//! deletion.

use anyhow::Result;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use std::env;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;

/// Result of a completed upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub url: String,
    /// Media duration in seconds, when the backend can determine it
    pub duration: Option<f64>,
}

/// Blob storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket_name: String,
    pub public_base_url: String,
}

impl StorageConfig {
    /// Create a new StorageConfig from environment variables
    pub fn from_env() -> Self {
        let bucket_name =
            env::var("MEDIA_BUCKET_NAME").unwrap_or_else(|_| "media-bucket".to_string());
        let public_base_url = env::var("MEDIA_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("https://{}.s3.amazonaws.com", bucket_name));

        Self {
            bucket_name,
            public_base_url,
        }
    }
}

/// Blob upload service
#[derive(Clone)]
pub struct StorageService {
    s3_client: Client,
    config: StorageConfig,
}

impl StorageService {
    /// Initialize the storage service against the ambient AWS configuration
    pub async fn new(config: StorageConfig) -> Self {
        let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let s3_client = Client::new(&aws_config);

        Self { s3_client, config }
    }

    /// Upload a blob under a keyspace prefix ("avatars", "videos", ...)
    pub async fn upload(
        &self,
        prefix: &str,
        filename: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<UploadedFile, ApiError> {
        let key = format!("{}/{}-{}", prefix, Uuid::new_v4(), sanitize(filename));

        let mut request = self
            .s3_client
            .put_object()
            .bucket(&self.config.bucket_name)
            .key(&key)
            .body(ByteStream::from(bytes));

        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        request
            .send()
            .await
            .map_err(|e| {
                tracing::error!("S3 upload failed for {}: {}", key, e);
                ApiError::Upload("File upload failed. Please try again.".to_string())
            })?;

        info!("Uploaded {} to bucket {}", key, self.config.bucket_name);

        Ok(UploadedFile {
            url: format!("{}/{}", self.config.public_base_url.trim_end_matches('/'), key),
            duration: None,
        })
    }
}

/// Keep object keys to a predictable character set
fn sanitize(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_characters() {
        assert_eq!(sanitize("cat video.mp4"), "cat_video.mp4");
        assert_eq!(sanitize("simple-name_1.png"), "simple-name_1.png");
        assert_eq!(sanitize("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize(""), "file");
    }
}
