//! Inbound notification model: the S3 "object created" event batch as it is
//! delivered to the bridge, plus transport decoding of object keys.

use percent_encoding::percent_decode_str;
use serde::Deserialize;

/// A batch of object-created notifications delivered in one invocation
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationBatch {
    #[serde(rename = "Records", default)]
    pub records: Vec<NotificationRecord>,
}

/// One object-created notification
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRecord {
    /// Diagnostic identifier for failure attribution
    #[serde(rename = "eventID", default)]
    pub event_id: String,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectRef {
    /// Object key, percent-encoded by the notification transport
    pub key: String,
}

/// Decode an object key from its notification transport encoding.
///
/// S3 encodes keys the way HTML forms do: spaces arrive as `+` and reserved
/// characters are percent-encoded. Decoding is lossy on invalid UTF-8 so a
/// mangled key degrades instead of failing the record.
pub fn decode_object_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_key() {
        assert_eq!(
            decode_object_key("uploads/EXAM42/page_003.jpg"),
            "uploads/EXAM42/page_003.jpg"
        );
    }

    #[test]
    fn test_decode_plus_and_percent_escapes() {
        assert_eq!(
            decode_object_key("uploads/EXAM+42/page%20003.jpg"),
            "uploads/EXAM 42/page 003.jpg"
        );
        // An encoded plus survives as a literal plus
        assert_eq!(decode_object_key("misc/a%2Bb.jpg"), "misc/a+b.jpg");
    }

    #[test]
    fn test_decode_multibyte_utf8() {
        assert_eq!(
            decode_object_key("uploads/EXAM42/%EC%8B%9C%ED%97%98.jpg"),
            "uploads/EXAM42/시험.jpg"
        );
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        let decoded = decode_object_key("misc/%FF.jpg");
        assert!(decoded.starts_with("misc/"));
        assert!(decoded.ends_with(".jpg"));
    }

    #[test]
    fn test_deserialize_notification_batch() {
        let payload = serde_json::json!({
            "Records": [
                {
                    "eventID": "ev-1",
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "bucket": { "name": "exam-bucket" },
                        "object": { "key": "uploads/EXAM42/page_003.jpg", "size": 123 }
                    }
                }
            ]
        });

        let batch: NotificationBatch = serde_json::from_value(payload).unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].event_id, "ev-1");
        assert_eq!(batch.records[0].s3.bucket.name, "exam-bucket");
        assert_eq!(batch.records[0].s3.object.key, "uploads/EXAM42/page_003.jpg");
    }

    #[test]
    fn test_deserialize_empty_batch() {
        let batch: NotificationBatch = serde_json::from_str("{}").unwrap();
        assert!(batch.records.is_empty());
    }
}
