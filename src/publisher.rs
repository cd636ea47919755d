//! Work-queue publishing: hands finished work items to the queue the
//! recognition pipeline polls.

use crate::config::QueueConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sqs::config::Builder as SqsConfigBuilder;
use aws_sdk_sqs::Client as SqsClient;
use tracing::debug;

/// Destination queue for work items
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Publish one serialized work item; returns the queue's message id.
    ///
    /// No deduplication key is attached; deduplication, if required, belongs
    /// to the queue or an upstream producer.
    async fn publish(&self, queue_url: &str, body: &str) -> Result<String>;
}

/// SQS-backed work queue
pub struct SqsWorkQueue {
    client: SqsClient,
}

impl SqsWorkQueue {
    /// Create an SQS work queue from the shared AWS configuration
    pub fn new(aws_config: &SdkConfig, config: &QueueConfig) -> Self {
        let mut builder = SqsConfigBuilder::from(aws_config);

        // Configure custom endpoint for LocalStack/ElasticMQ
        if let Some(ref endpoint_url) = config.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }

        Self {
            client: SqsClient::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl WorkQueue for SqsWorkQueue {
    async fn publish(&self, queue_url: &str, body: &str) -> Result<String> {
        debug!(size_bytes = body.len(), "Sending message to queue");

        let response = self
            .client
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .send()
            .await
            .context("Failed to send message to queue")?;

        Ok(response.message_id().unwrap_or_default().to_string())
    }
}
