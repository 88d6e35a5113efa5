//! AWS-backed implementations of the storage and inference seams.
//!
//! Clients are built once from the ambient AWS configuration (region and
//! credentials from the environment, as the function runtime provides them)
//! and injected into the pipeline. The SDKs' own retry policies apply; the
//! pipeline adds none on top.

use crate::error::ReceiptError;
use crate::pipeline::llm::ModelInvoker;
use crate::storage::ObjectStore;
use async_trait::async_trait;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tracing::debug;

/// Load the shared AWS configuration from the environment.
pub async fn load_sdk_config() -> aws_config::SdkConfig {
    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await
}

/// [`ObjectStore`] over Amazon S3.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ReceiptError> {
        let read_failed = |detail: String| ReceiptError::StorageReadFailed {
            bucket: bucket.to_string(),
            key: key.to_string(),
            detail,
        };

        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| read_failed(DisplayErrorContext(&e).to_string()))?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| read_failed(e.to_string()))?
            .into_bytes();

        debug!("GetObject s3://{}/{} → {} bytes", bucket, key, bytes.len());
        Ok(bytes.to_vec())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ReceiptError> {
        let len = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| ReceiptError::StorageWriteFailed {
                bucket: bucket.to_string(),
                key: key.to_string(),
                detail: DisplayErrorContext(&e).to_string(),
            })?;

        debug!("PutObject s3://{}/{} ← {} bytes", bucket, key, len);
        Ok(())
    }
}

/// [`ModelInvoker`] over the Bedrock runtime `InvokeModel` API.
#[derive(Debug, Clone)]
pub struct BedrockInvoker {
    client: aws_sdk_bedrockruntime::Client,
}

impl BedrockInvoker {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_bedrockruntime::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ModelInvoker for BedrockInvoker {
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, ReceiptError> {
        let output = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| ReceiptError::InferenceFailed {
                model_id: model_id.to_string(),
                detail: aws_sdk_bedrockruntime::error::DisplayErrorContext(&e).to_string(),
            })?;

        Ok(output.body.into_inner())
    }
}
