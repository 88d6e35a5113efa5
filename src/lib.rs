//! # receipt-lens
//!
//! Extract receipt fields from uploaded images with a hosted vision model.
//!
//! A storage upload triggers one invocation. The uploaded receipt (JPEG,
//! PNG, HEIC/HEIF or PDF) is normalised to a single raster, sent to the
//! model together with a fixed Japanese extraction prompt, and the answer is
//! written back next to the source as `<key>.json`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! event
//!  │
//!  ├─ 1. Resolve    bucket + key from a direct or notification event
//!  ├─ 2. Fetch      read the source object
//!  ├─ 3. Normalise  HEIC/HEIF decode or PDF page-0 render → JPEG (spawn_blocking)
//!  ├─ 4. Analyse    base64 + extraction prompt → hosted model
//!  ├─ 5. Persist    write `<key>.json` as application/json
//!  └─ 6. Respond    { statusCode: 200, body }
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # #[cfg(feature = "aws")]
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use receipt_lens::aws::{load_sdk_config, BedrockInvoker, S3ObjectStore};
//! use receipt_lens::{Pipeline, PipelineConfig};
//! use std::sync::Arc;
//!
//! let sdk = load_sdk_config().await;
//! let pipeline = Pipeline::with_default_decoders(
//!     Arc::new(S3ObjectStore::new(&sdk)),
//!     Arc::new(BedrockInvoker::new(&sdk)),
//!     PipelineConfig::default(),
//! );
//! let event = serde_json::json!({"s3Bucket": "receipts", "s3Key": "2024/07/taxi.heic"});
//! let response = pipeline.run(&event).await?;
//! println!("{}", response.body);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `aws`    | on      | S3 and Bedrock implementations of the storage and model seams |
//! | `lambda` | on      | The `receipt-lambda` function binary (lambda_runtime + clap + tracing-subscriber); implies `heif` |
//! | `heif`   | on (via `lambda`) | HEIC/HEIF decoding through the system libheif |
//!
//! Building with `--no-default-features` drops libheif; HEIC/HEIF uploads
//! then fail with a decode error instead of being analysed.

// ── Modules ──────────────────────────────────────────────────────────────

#[cfg(feature = "aws")]
pub mod aws;
pub mod config;
pub mod error;
pub mod handler;
pub mod pipeline;
pub mod prompts;
pub mod storage;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::ReceiptError;
pub use handler::{HandlerResponse, Pipeline};
pub use pipeline::format::DocumentKind;
pub use pipeline::heif::{HeifDecoder, PixelMode, RawFrame};
pub use pipeline::input::SourceLocation;
pub use pipeline::llm::{InferenceResult, ModelInvoker, ReceiptAnalyzer};
pub use pipeline::normalize::FormatNormalizer;
pub use pipeline::render::{PdfRenderer, PdfiumRenderer};
pub use storage::ObjectStore;
