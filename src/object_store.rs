//! Object store access: metadata lookup and presigned GET URL minting.

use crate::config::S3Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client as S3Client;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;

/// A time-limited read URL for one stored object
#[derive(Debug, Clone)]
pub struct PresignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Read-side view of the object store used by the bridge
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read back the user metadata attached to an object at write time
    async fn object_metadata(&self, bucket: &str, key: &str) -> Result<HashMap<String, String>>;

    /// Mint a time-limited GET URL for an object
    async fn presign_get(&self, bucket: &str, key: &str, validity: Duration)
        -> Result<PresignedUrl>;
}

/// S3-backed object store
pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    /// Create an S3 object store from the shared AWS configuration
    pub fn new(aws_config: &SdkConfig, config: &S3Config) -> Self {
        let mut builder = S3ConfigBuilder::from(aws_config);

        // Configure custom endpoint for MinIO/LocalStack
        if let Some(ref endpoint_url) = config.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }

        // Force path-style access for MinIO compatibility
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        let client = S3Client::from_conf(builder.build());

        info!(region = %config.region, "S3 object store initialized");

        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn object_metadata(&self, bucket: &str, key: &str) -> Result<HashMap<String, String>> {
        let head = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .context("Failed to read object metadata")?;

        Ok(head.metadata().cloned().unwrap_or_default())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        validity: Duration,
    ) -> Result<PresignedUrl> {
        let presigning_config =
            PresigningConfig::expires_in(validity).context("Failed to create presigning config")?;

        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .context("Failed to generate presigned URL")?;

        let expires_at = Utc::now()
            + chrono::Duration::from_std(validity).context("Presigned validity out of range")?;

        Ok(PresignedUrl {
            url: presigned.uri().to_string(),
            expires_at,
        })
    }
}
