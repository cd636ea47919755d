//! Gradi Event Bridge
//!
//! Bridges S3 "object created" notifications into durable SQS work items for
//! the Gradi student-ID recognition pipeline. Per notification record the
//! bridge recovers sequencing metadata from the object (defaulting when the
//! lookup fails), resolves the exam submission code from the key, mints a
//! time-limited presigned GET URL, and publishes one work item to the queue,
//! isolating failures per record.
//!
//! ## Architecture
//!
//! ```text
//! S3 Notification Batch          Event Bridge                 SQS
//! ┌──────────────────┐      ┌──────────────────┐      ┌──────────────┐
//! │ Records[]        │      │ per record:      │      │ work items   │
//! │   bucket, key,   │─────▶│  decode key      │─────▶│ exam_code,   │
//! │   eventID        │      │  head metadata   │      │ download_url,│
//! └──────────────────┘      │  resolve exam    │      │ idx/total    │
//!                           │  presign GET     │      └──────────────┘
//!                           │  publish         │
//!                           └──────────────────┘
//!                                    │
//!                                    ▼
//!                             BatchReport
//!                      (per-record outcomes for the
//!                       hosting runtime's redelivery)
//! ```

pub mod bridge;
pub mod config;
pub mod event;
pub mod object_store;
pub mod publisher;
pub mod work_item;

// Re-export main types
pub use bridge::{BatchReport, BatchStatus, BridgeError, EventBridge, RecordOutcome};
pub use config::{Config, QueueConfig, S3Config, ServiceConfig};
pub use event::{decode_object_key, NotificationBatch, NotificationRecord};
pub use object_store::{ObjectStore, PresignedUrl, S3ObjectStore};
pub use publisher::{SqsWorkQueue, WorkQueue};
pub use work_item::{Sequencing, WorkItem, EVENT_TYPE_STUDENT_ID_RECOGNITION, INGEST_PREFIX};
