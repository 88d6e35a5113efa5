//! Object storage seam.
//!
//! The pipeline reads one object and writes one object per invocation. Both
//! calls go through [`ObjectStore`] so the orchestrator can run against the
//! real bucket (see `aws::S3ObjectStore`) or an in-memory fake in tests.
//! Writes are plain overwrites: the last writer for a key wins.

use crate::error::ReceiptError;
use async_trait::async_trait;

/// Content type of every result artifact.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Get/put access to a bucket-addressed object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the full body of `bucket/key`.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ReceiptError>;

    /// Create or overwrite `bucket/key`.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ReceiptError>;
}
