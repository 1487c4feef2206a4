//! Triggering notification parsing
//!
//! The job is triggered by an SNS notification whose `Message` field holds a
//! JSON-encoded S3 event. Only the first record of each list is consumed.
//! A bare S3 event (no SNS envelope) is accepted as well.

use crate::domain::errors::GridloadError;
use crate::domain::result::Result;
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serde_json::Value;

/// Location of the object that triggered the job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceObject {
    /// Bucket name
    pub bucket: String,

    /// Object key, URL-decoded
    pub key: String,
}

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(rename = "Records", default)]
    records: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct SnsRecord {
    #[serde(rename = "Sns")]
    sns: SnsPayload,
}

#[derive(Debug, Deserialize)]
struct SnsPayload {
    #[serde(rename = "Message")]
    message: String,
}

#[derive(Debug, Deserialize)]
struct S3Record {
    s3: S3Entity,
}

#[derive(Debug, Deserialize)]
struct S3Entity {
    bucket: S3Bucket,
    object: S3Object,
}

#[derive(Debug, Deserialize)]
struct S3Bucket {
    name: String,
}

#[derive(Debug, Deserialize)]
struct S3Object {
    key: String,
}

impl SourceObject {
    /// Parse a triggering notification from its raw JSON text
    pub fn from_notification_str(payload: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| GridloadError::Trigger(format!("Event is not valid JSON: {e}")))?;
        Self::from_notification(&value)
    }

    /// Parse a triggering notification
    ///
    /// # Errors
    ///
    /// Returns `GridloadError::Trigger` if the envelope, the embedded
    /// message, or the S3 record is missing or malformed.
    pub fn from_notification(event: &Value) -> Result<Self> {
        let record = first_record(event, "event")?;

        if record.get("Sns").is_some() {
            let sns: SnsRecord = serde_json::from_value(record)
                .map_err(|e| GridloadError::Trigger(format!("Malformed SNS record: {e}")))?;
            let message: Value = serde_json::from_str(&sns.sns.message).map_err(|e| {
                GridloadError::Trigger(format!("SNS message is not valid JSON: {e}"))
            })?;
            let inner = first_record(&message, "SNS message")?;
            return Self::from_s3_record(inner);
        }

        Self::from_s3_record(record)
    }

    fn from_s3_record(record: Value) -> Result<Self> {
        let record: S3Record = serde_json::from_value(record)
            .map_err(|e| GridloadError::Trigger(format!("Malformed S3 record: {e}")))?;

        let bucket = record.s3.bucket.name;
        if bucket.is_empty() {
            return Err(GridloadError::Trigger("S3 bucket name is empty".to_string()));
        }

        let key = decode_object_key(&record.s3.object.key);
        if key.is_empty() {
            return Err(GridloadError::Trigger("S3 object key is empty".to_string()));
        }

        Ok(Self { bucket, key })
    }

    /// Last path segment of the key, used to name the scratch copy
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

fn first_record(value: &Value, what: &str) -> Result<Value> {
    let envelope: EventEnvelope = serde_json::from_value(value.clone())
        .map_err(|e| GridloadError::Trigger(format!("Malformed {what}: {e}")))?;
    envelope
        .records
        .into_iter()
        .next()
        .ok_or_else(|| GridloadError::Trigger(format!("{what} has no Records")))
}

/// Decode an S3 event object key (`+` is a space, `%XX` escapes)
pub fn decode_object_key(raw: &str) -> String {
    // `+` first, so an escaped `%2B` stays a literal plus
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
