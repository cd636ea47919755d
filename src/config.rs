use serde::Deserialize;
use std::time::Duration;

/// Main configuration for the event bridge
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,
    /// S3 configuration
    #[serde(default)]
    pub s3: S3Config,
    /// Destination queue configuration
    #[serde(default)]
    pub queue: QueueConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Service name for logging
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// S3 configuration for metadata lookups and presigned URL minting
#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint URL (for MinIO, LocalStack, etc.)
    pub endpoint_url: Option<String>,
    /// Force path-style access (required for MinIO)
    #[serde(default)]
    pub force_path_style: bool,
    /// Presigned URL expiration in seconds
    #[serde(default = "default_presigned_url_expiry_secs")]
    pub presigned_url_expiry_secs: u64,
}

/// Destination work-queue configuration
///
/// The queue URL is optional here on purpose: a missing URL is reported as a
/// batch-level configuration error by the bridge rather than a startup panic,
/// so the invoking runtime sees a structured failure it can act on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueueConfig {
    /// URL of the SQS queue the recognition pipeline polls
    pub url: Option<String>,
    /// Custom endpoint URL (for LocalStack, ElasticMQ, etc.)
    pub endpoint_url: Option<String>,
}

// Default value functions
fn default_service_name() -> String {
    "gradi-event-bridge".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_region() -> String {
    "ap-northeast-2".to_string()
}

fn default_presigned_url_expiry_secs() -> u64 {
    3600
}

impl Config {
    /// Load configuration from environment and config files
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Start with default values
            .set_default("service.name", "gradi-event-bridge")?
            .set_default("service.log_level", "info")?
            // Add config file if present
            .add_source(config::File::with_name("config/bridge").required(false))
            .add_source(config::File::with_name("/etc/gradi/bridge").required(false))
            // Override with environment variables
            // BRIDGE__QUEUE__URL -> queue.url
            .add_source(
                config::Environment::with_prefix("BRIDGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Self = config.try_deserialize()?;

        // Legacy environment variable used by earlier deployments
        if config.queue.url.is_none() {
            if let Ok(url) = std::env::var("AI_INPUT_QUEUE_URL") {
                if !url.is_empty() {
                    config.queue.url = Some(url);
                }
            }
        }

        Ok(config)
    }

    /// Get presigned URL expiry as Duration
    pub fn presigned_url_expiry(&self) -> Duration {
        Duration::from_secs(self.s3.presigned_url_expiry_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint_url: None,
            force_path_style: false,
            presigned_url_expiry_secs: default_presigned_url_expiry_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(default_presigned_url_expiry_secs(), 3600);
        assert_eq!(default_region(), "ap-northeast-2");

        let config = S3Config::default();
        assert!(config.endpoint_url.is_none());
        assert!(!config.force_path_style);
    }

    #[test]
    fn test_queue_url_unset_by_default() {
        let config = QueueConfig::default();
        assert!(config.url.is_none());
    }
}
