//! Outbound message model: the work item published to the recognition queue,
//! sequencing metadata recovery, and submission-identifier resolution.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Event type tag carried by every work item
pub const EVENT_TYPE_STUDENT_ID_RECOGNITION: &str = "STUDENT_ID_RECOGNITION";

/// Leading key segment that marks an exam submission upload.
///
/// Keys are expected to follow `uploads/{examCode}/{filename...}`. Keys with
/// any other shape resolve to [`UNKNOWN_EXAM_CODE`] rather than erroring;
/// sequencing without a submission grouping is still actionable downstream.
pub const INGEST_PREFIX: &str = "uploads";

/// Sentinel submission identifier for keys outside the ingest convention
pub const UNKNOWN_EXAM_CODE: &str = "unknown";

/// Fallback expected item count when sequencing metadata is unavailable
pub const DEFAULT_TOTAL: u32 = 40;

/// Fallback position when sequencing metadata is unavailable
pub const DEFAULT_IDX: u32 = 0;

/// Per-object sequencing metadata attached at upload time.
///
/// Advisory progress information for the consumer: `idx` is this object's
/// position within the submission, `total` the expected item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sequencing {
    pub idx: u32,
    pub total: u32,
}

impl Sequencing {
    /// Defaults applied when metadata cannot be recovered
    pub fn fallback() -> Self {
        Self {
            idx: DEFAULT_IDX,
            total: DEFAULT_TOTAL,
        }
    }

    /// Recover sequencing from object metadata.
    ///
    /// S3 lower-cases user metadata keys, so lookups are against `total` and
    /// `idx` verbatim. Absent fields take their individual defaults; a value
    /// that is present but unparseable (or a zero `total`, which would break
    /// downstream progress arithmetic) returns `None` and the caller falls
    /// back to [`Sequencing::fallback`] wholesale.
    pub fn from_metadata(metadata: &HashMap<String, String>) -> Option<Self> {
        let total = match metadata.get("total") {
            Some(raw) => raw.trim().parse::<u32>().ok().filter(|t| *t >= 1)?,
            None => DEFAULT_TOTAL,
        };
        let idx = match metadata.get("idx") {
            Some(raw) => raw.trim().parse::<u32>().ok()?,
            None => DEFAULT_IDX,
        };
        Some(Self { idx, total })
    }
}

/// Resolve the submission identifier from a decoded object key.
///
/// Matches the `uploads/{examCode}/...` ingest convention; anything else,
/// including keys with fewer than two segments or an empty code segment,
/// resolves to [`UNKNOWN_EXAM_CODE`].
pub fn resolve_exam_code(key: &str) -> &str {
    let mut parts = key.split('/');
    match (parts.next(), parts.next()) {
        (Some(prefix), Some(code)) if prefix == INGEST_PREFIX && !code.is_empty() => code,
        _ => UNKNOWN_EXAM_CODE,
    }
}

/// Extract the filename: the final `/`-delimited segment of the key
pub fn extract_filename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// One unit of downstream recognition work, published per processed object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Submission identifier, or "unknown"
    pub exam_code: String,
    /// Full decoded object key
    pub s3_key: String,
    /// Last path segment of the key
    pub filename: String,
    /// Time-limited read URL for the object
    pub download_url: String,
    /// Fixed event-type tag
    pub event_type: String,
    /// Position of this item within the submission
    pub idx: u32,
    /// Expected item count in the submission
    pub total: u32,
}

impl WorkItem {
    /// Assemble a work item from a decoded key, its download URL, and
    /// recovered sequencing
    pub fn new(key: &str, download_url: String, sequencing: Sequencing) -> Self {
        Self {
            exam_code: resolve_exam_code(key).to_string(),
            s3_key: key.to_string(),
            filename: extract_filename(key).to_string(),
            download_url,
            event_type: EVENT_TYPE_STUDENT_ID_RECOGNITION.to_string(),
            idx: sequencing.idx,
            total: sequencing.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_sequencing_complete_metadata() {
        let seq = Sequencing::from_metadata(&metadata(&[("total", "10"), ("idx", "3")])).unwrap();
        assert_eq!(seq, Sequencing { idx: 3, total: 10 });
    }

    #[test]
    fn test_sequencing_absent_fields_take_defaults() {
        let seq = Sequencing::from_metadata(&HashMap::new()).unwrap();
        assert_eq!(seq, Sequencing::fallback());

        let seq = Sequencing::from_metadata(&metadata(&[("idx", "7")])).unwrap();
        assert_eq!(seq, Sequencing { idx: 7, total: 40 });
    }

    #[test]
    fn test_sequencing_malformed_values_reject_wholesale() {
        assert!(Sequencing::from_metadata(&metadata(&[("total", "ten"), ("idx", "3")])).is_none());
        assert!(Sequencing::from_metadata(&metadata(&[("total", "10"), ("idx", "-1")])).is_none());
    }

    #[test]
    fn test_sequencing_zero_total_rejected() {
        assert!(Sequencing::from_metadata(&metadata(&[("total", "0"), ("idx", "0")])).is_none());
    }

    #[test]
    fn test_fallback_values() {
        let seq = Sequencing::fallback();
        assert_eq!(seq.total, 40);
        assert_eq!(seq.idx, 0);
    }

    #[test]
    fn test_exam_code_ingest_prefix_is_pinned() {
        // The ingest convention is exactly "uploads/{examCode}/..."
        assert_eq!(INGEST_PREFIX, "uploads");
        assert_eq!(resolve_exam_code("uploads/EXAM42/page_003.jpg"), "EXAM42");
        assert_eq!(resolve_exam_code("uploads/EXAM42/a/b/c.jpg"), "EXAM42");
    }

    #[test]
    fn test_exam_code_unmatched_shapes_degrade_to_unknown() {
        assert_eq!(resolve_exam_code("misc/file.jpg"), "unknown");
        assert_eq!(resolve_exam_code("file.jpg"), "unknown");
        assert_eq!(resolve_exam_code("uploads"), "unknown");
        assert_eq!(resolve_exam_code("uploads//file.jpg"), "unknown");
        assert_eq!(resolve_exam_code(""), "unknown");
    }

    #[test]
    fn test_extract_filename() {
        assert_eq!(extract_filename("uploads/EXAM42/page_003.jpg"), "page_003.jpg");
        assert_eq!(extract_filename("file.jpg"), "file.jpg");
        assert_eq!(extract_filename("uploads/EXAM42/"), "");
    }

    #[test]
    fn test_work_item_wire_format() {
        let item = WorkItem::new(
            "uploads/EXAM42/page_003.jpg",
            "https://example.com/signed".to_string(),
            Sequencing { idx: 3, total: 10 },
        );

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "exam_code": "EXAM42",
                "s3_key": "uploads/EXAM42/page_003.jpg",
                "filename": "page_003.jpg",
                "download_url": "https://example.com/signed",
                "event_type": "STUDENT_ID_RECOGNITION",
                "idx": 3,
                "total": 10
            })
        );
    }
}
