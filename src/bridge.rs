//! The event bridge core: turns a batch of object-created notifications into
//! published work items, with per-record failure isolation.
//!
//! Policy per record: metadata-recovery and submission-identifier misses
//! degrade gracefully (defaults, "unknown"); presign and publish failures are
//! fatal for that record only. A work item the consumer cannot fetch is
//! useless, while one with default sequencing is still actionable.

use crate::event::{decode_object_key, NotificationBatch, NotificationRecord};
use crate::object_store::ObjectStore;
use crate::publisher::WorkQueue;
use crate::work_item::{Sequencing, WorkItem};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

/// Errors that end a record's (or the whole batch's) processing
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("destination queue URL is not configured")]
    MissingQueueUrl,

    #[error("failed to mint download URL for s3://{bucket}/{key}: {source}")]
    Presign {
        bucket: String,
        key: String,
        source: anyhow::Error,
    },

    #[error("failed to publish work item for {key}: {source}")]
    Publish { key: String, source: anyhow::Error },
}

/// Outcome of processing one notification record
#[derive(Debug)]
pub enum RecordOutcome {
    /// Work item published with the metadata recovered from the object
    Published {
        event_id: String,
        message_id: String,
    },
    /// Work item published, but sequencing fell back to defaults
    PublishedWithDefaults {
        event_id: String,
        message_id: String,
    },
    /// No work item published; the error is attributed to this record
    Failed {
        event_id: String,
        error: BridgeError,
    },
}

impl RecordOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, RecordOutcome::Failed { .. })
    }

    pub fn event_id(&self) -> &str {
        match self {
            RecordOutcome::Published { event_id, .. }
            | RecordOutcome::PublishedWithDefaults { event_id, .. }
            | RecordOutcome::Failed { event_id, .. } => event_id,
        }
    }
}

/// Overall batch status reported to the invoking runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    /// All records were attempted; per-record outcomes carry the detail
    Completed,
    /// Nothing was attempted; the bridge itself is misconfigured
    ConfigError(String),
}

impl BatchStatus {
    pub fn code(&self) -> u16 {
        match self {
            BatchStatus::Completed => 200,
            BatchStatus::ConfigError(_) => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            BatchStatus::Completed => "Successfully processed storage event batch",
            BatchStatus::ConfigError(message) => message,
        }
    }
}

/// Report for one processed batch.
///
/// The invoking runtime decides redelivery from this report; the bridge never
/// raises across the component boundary and never retries internally.
#[derive(Debug)]
pub struct BatchReport {
    pub status: BatchStatus,
    pub outcomes: Vec<RecordOutcome>,
}

impl BatchReport {
    fn config_error(error: BridgeError) -> Self {
        Self {
            status: BatchStatus::ConfigError(error.to_string()),
            outcomes: Vec::new(),
        }
    }

    /// Number of records whose work item reached the queue
    pub fn published(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_failed()).count()
    }

    /// Records that failed, for redelivery decisions and failure attribution
    pub fn failures(&self) -> impl Iterator<Item = &RecordOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }

    pub fn is_clean(&self) -> bool {
        self.status == BatchStatus::Completed && self.failures().next().is_none()
    }
}

/// The storage event bridge.
///
/// Holds the client bundle constructed once at startup; each `process` call
/// is stateless and touches only its own batch plus this read-only
/// configuration.
pub struct EventBridge {
    store: Arc<dyn ObjectStore>,
    queue: Arc<dyn WorkQueue>,
    queue_url: Option<String>,
    url_validity: Duration,
}

impl EventBridge {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        queue: Arc<dyn WorkQueue>,
        queue_url: Option<String>,
        url_validity: Duration,
    ) -> Self {
        Self {
            store,
            queue,
            queue_url,
            url_validity,
        }
    }

    /// Process one notification batch, one outcome per record
    #[instrument(skip(self, batch), fields(records = batch.records.len()))]
    pub async fn process(&self, batch: &NotificationBatch) -> BatchReport {
        let Some(queue_url) = self.queue_url.as_deref() else {
            error!("Destination queue URL is not configured; no records attempted");
            return BatchReport::config_error(BridgeError::MissingQueueUrl);
        };

        let mut outcomes = Vec::with_capacity(batch.records.len());
        for record in &batch.records {
            let outcome = self.process_record(record, queue_url).await;
            if let RecordOutcome::Failed { event_id, error } = &outcome {
                error!(event_id = %event_id, error = %error, "Record processing failed");
            }
            outcomes.push(outcome);
        }

        BatchReport {
            status: BatchStatus::Completed,
            outcomes,
        }
    }

    async fn process_record(&self, record: &NotificationRecord, queue_url: &str) -> RecordOutcome {
        let bucket = &record.s3.bucket.name;
        let key = decode_object_key(&record.s3.object.key);
        let event_id = record.event_id.clone();

        info!(bucket = %bucket, key = %key, "Processing object-created notification");

        // Sequencing is advisory; its absence must never block delivery
        let (sequencing, defaults_applied) = match self.store.object_metadata(bucket, &key).await {
            Ok(metadata) => match Sequencing::from_metadata(&metadata) {
                Some(sequencing) => (sequencing, false),
                None => {
                    warn!(key = %key, "Malformed sequencing metadata; applying defaults");
                    (Sequencing::fallback(), true)
                }
            },
            Err(e) => {
                warn!(key = %key, error = %e, "Metadata lookup failed; applying defaults");
                (Sequencing::fallback(), true)
            }
        };

        // A work item without a fetchable URL is useless downstream
        let presigned = match self.store.presign_get(bucket, &key, self.url_validity).await {
            Ok(presigned) => presigned,
            Err(source) => {
                return RecordOutcome::Failed {
                    event_id,
                    error: BridgeError::Presign {
                        bucket: bucket.clone(),
                        key,
                        source,
                    },
                };
            }
        };
        debug!(key = %key, expires_at = %presigned.expires_at, "Download URL minted");

        let item = WorkItem::new(&key, presigned.url, sequencing);
        let body = match serde_json::to_string(&item) {
            Ok(body) => body,
            Err(e) => {
                return RecordOutcome::Failed {
                    event_id,
                    error: BridgeError::Publish {
                        key,
                        source: e.into(),
                    },
                };
            }
        };

        match self.queue.publish(queue_url, &body).await {
            Ok(message_id) => {
                info!(
                    event_id = %event_id,
                    message_id = %message_id,
                    exam_code = %item.exam_code,
                    idx = item.idx,
                    total = item.total,
                    "Work item published"
                );
                if defaults_applied {
                    RecordOutcome::PublishedWithDefaults {
                        event_id,
                        message_id,
                    }
                } else {
                    RecordOutcome::Published {
                        event_id,
                        message_id,
                    }
                }
            }
            Err(source) => RecordOutcome::Failed {
                event_id,
                error: BridgeError::Publish { key, source },
            },
        }
    }
}
