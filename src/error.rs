//! Error types for the receipt-lens library.
//!
//! Every variant of [`ReceiptError`] is fatal for the invocation that raised
//! it: the orchestrator never catches, retries or substitutes a placeholder.
//! Redelivery, if any, is the business of whatever runtime triggered us.
//!
//! The one failure mode that is *not* represented here is a badly shaped
//! model answer. The result codec absorbs that locally by wrapping the text as
//! a JSON string, so it can never surface as an error.

use thiserror::Error;

/// All fatal errors returned by the receipt-lens library.
#[derive(Debug, Error)]
pub enum ReceiptError {
    // ── Input resolution ──────────────────────────────────────────────────
    /// The event carries neither `s3Bucket`/`s3Key` nor a storage
    /// notification record.
    #[error("Event has neither s3Bucket/s3Key nor Records[0].s3.bucket.name/object.key")]
    MissingEventFields,

    /// A notification record was present but a field had the wrong type.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    // ── Decode errors ─────────────────────────────────────────────────────
    /// The source bytes could not be decoded as the format their key implies.
    #[error("Failed to decode {kind} payload: {detail}")]
    DecodeFailed { kind: &'static str, detail: String },

    /// The renderer produced an image with a zero dimension.
    #[error("Page 0 rendered to an empty {width}x{height} image")]
    EmptyRender { width: u32, height: u32 },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium on the library path."
    )]
    PdfiumBindingFailed(String),

    // ── Transport errors ──────────────────────────────────────────────────
    /// Fetching the source object failed.
    #[error("Failed to read s3://{bucket}/{key}: {detail}")]
    StorageReadFailed {
        bucket: String,
        key: String,
        detail: String,
    },

    /// Writing the result artifact failed.
    #[error("Failed to write s3://{bucket}/{key}: {detail}")]
    StorageWriteFailed {
        bucket: String,
        key: String,
        detail: String,
    },

    /// The model invocation itself failed (network, throttling, auth, …).
    #[error("Model invocation failed for '{model_id}': {detail}")]
    InferenceFailed { model_id: String, detail: String },

    /// The model answered, but not with the expected `content[0].text` shape.
    #[error("Malformed inference response: {0}")]
    MalformedResponse(String),

    // ── Plumbing ──────────────────────────────────────────────────────────
    /// JPEG or JSON encoding of an intermediate value failed.
    #[error("Encoding failed: {0}")]
    EncodeFailed(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error (e.g. a blocking task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReceiptError {
    /// Shorthand for a [`ReceiptError::DecodeFailed`].
    pub fn decode(kind: &'static str, detail: impl Into<String>) -> Self {
        Self::DecodeFailed {
            kind,
            detail: detail.into(),
        }
    }
}
