//! Input resolution: turn a trigger event into a `(bucket, key)` pair.
//!
//! Two event shapes reach the handler:
//!
//! * a direct invocation `{"s3Bucket": "...", "s3Key": "..."}` used by
//!   internal callers and tests, taken verbatim;
//! * a storage notification whose first record nests `s3.bucket.name` and
//!   `s3.object.key`. Notification keys arrive form-encoded (`+` for space,
//!   `%XX` escapes), so both fields are decoded before use.

use crate::error::ReceiptError;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use std::fmt;
use tracing::info;

/// The storage location of the object that triggered the invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub bucket: String,
    pub key: String,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Resolve the triggering event into a [`SourceLocation`].
///
/// The direct form wins whenever both of its fields are present.
pub fn resolve_event(event: &Value) -> Result<SourceLocation, ReceiptError> {
    if let (Some(bucket), Some(key)) = (event.get("s3Bucket"), event.get("s3Key")) {
        info!("Received event: {}", event);
        return Ok(SourceLocation {
            bucket: expect_str(bucket, "s3Bucket")?.to_string(),
            key: expect_str(key, "s3Key")?.to_string(),
        });
    }

    info!(
        "Received event: {}",
        serde_json::to_string_pretty(event).unwrap_or_else(|_| event.to_string())
    );

    let s3 = event
        .get("Records")
        .and_then(|records| records.get(0))
        .and_then(|record| record.get("s3"))
        .ok_or(ReceiptError::MissingEventFields)?;

    let bucket = s3
        .pointer("/bucket/name")
        .ok_or(ReceiptError::MissingEventFields)?;
    let key = s3
        .pointer("/object/key")
        .ok_or(ReceiptError::MissingEventFields)?;

    Ok(SourceLocation {
        bucket: unquote_plus(expect_str(bucket, "s3.bucket.name")?),
        key: unquote_plus(expect_str(key, "s3.object.key")?),
    })
}

/// Decode a form-encoded component: `+` becomes a space, then `%XX` escapes
/// are decoded as UTF-8. Invalid sequences become U+FFFD.
pub fn unquote_plus(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

fn expect_str<'a>(value: &'a Value, field: &str) -> Result<&'a str, ReceiptError> {
    value
        .as_str()
        .ok_or_else(|| ReceiptError::InvalidEvent(format!("{field} must be a string, got {value}")))
}
