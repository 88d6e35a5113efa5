//! Pipeline orchestrator: one event in, one artifact out.
//!
//! ```text
//! event ─▶ resolve ─▶ get_object ─▶ normalize ─▶ base64 ─▶ analyze ─▶ encode ─▶ put_object
//! ```
//!
//! Every step runs to completion before the next starts and any failure
//! returns immediately. Nothing is written unless every earlier step
//! succeeded, so a failed invocation leaves storage exactly as it found it.
//!
//! Collaborators are injected: the same [`Pipeline`] runs against S3 and
//! Bedrock in production and against in-memory fakes in tests.

use crate::config::PipelineConfig;
use crate::error::ReceiptError;
use crate::pipeline::llm::{ModelInvoker, ReceiptAnalyzer};
use crate::pipeline::normalize::FormatNormalizer;
use crate::pipeline::{codec, encode, input};
use crate::storage::{ObjectStore, JSON_CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Value returned to the invoking runtime on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: String,
}

/// The receipt extraction pipeline with its collaborators.
#[derive(Clone)]
pub struct Pipeline {
    store: Arc<dyn ObjectStore>,
    analyzer: ReceiptAnalyzer,
    normalizer: FormatNormalizer,
    config: PipelineConfig,
}

impl Pipeline {
    /// Assemble a pipeline from explicit collaborators.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        invoker: Arc<dyn ModelInvoker>,
        normalizer: FormatNormalizer,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            analyzer: ReceiptAnalyzer::new(invoker, config.clone()),
            normalizer,
            config,
        }
    }

    /// Assemble a pipeline with the stock HEIC/HEIF and PDF decoders.
    pub fn with_default_decoders(
        store: Arc<dyn ObjectStore>,
        invoker: Arc<dyn ModelInvoker>,
        config: PipelineConfig,
    ) -> Self {
        let normalizer =
            FormatNormalizer::with_default_decoders(config.pdfium_lib_path.clone(), config.jpeg_quality);
        Self::new(store, invoker, normalizer, config)
    }

    /// Process one trigger event end-to-end.
    pub async fn run(&self, event: &Value) -> Result<HandlerResponse, ReceiptError> {
        let start = Instant::now();

        // ── Step 1: Resolve event ────────────────────────────────────────
        let source = input::resolve_event(event)?;
        info!("Processing {}", source);

        // ── Step 2: Fetch source object ──────────────────────────────────
        info!("Fetching source object: start");
        let raw = self.store.get_object(&source.bucket, &source.key).await?;
        info!("Fetching source object: done ({} bytes)", raw.len());

        // ── Step 3: Normalise to a single raster ─────────────────────────
        info!("Normalising source image: start");
        let normalizer = self.normalizer.clone();
        let key = source.key.clone();
        let image = tokio::task::spawn_blocking(move || normalizer.normalize(raw, &key))
            .await
            .map_err(|e| ReceiptError::Internal(format!("Normalise task panicked: {e}")))??;
        info!("Normalising source image: done ({} bytes)", image.len());

        // ── Step 4: Analyse ──────────────────────────────────────────────
        let image_base64 = encode::encode_base64(&image);
        drop(image);

        info!("Invoking model: start");
        let result = self.analyzer.analyze(&image_base64).await?;
        info!("Invoking model: done");

        // ── Step 5: Persist ──────────────────────────────────────────────
        let artifact = codec::to_persistable(&result)?;
        info!("Analysis result: {}", artifact);
        let result_key = self.config.result_key(&source.key);
        let body = codec::to_response_body(&result)?;

        info!("Writing result to s3://{}/{}: start", source.bucket, result_key);
        self.store
            .put_object(
                &source.bucket,
                &result_key,
                artifact.into_bytes(),
                JSON_CONTENT_TYPE,
            )
            .await?;
        info!("Writing result to s3://{}/{}: done", source.bucket, result_key);

        info!(
            "Processed {} in {}ms",
            source,
            start.elapsed().as_millis()
        );

        Ok(HandlerResponse {
            status_code: 200,
            body,
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("store", &"<dyn ObjectStore>")
            .field("analyzer", &self.analyzer)
            .field("normalizer", &self.normalizer)
            .field("config", &self.config)
            .finish()
    }
}
