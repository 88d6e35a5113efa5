//! Model interaction: build the extraction request and read the answer.
//!
//! This module owns the envelope on both sides of the call and nothing else.
//! Moving bytes to and from the hosted model is the job of a
//! [`ModelInvoker`], so the envelope logic can be exercised against a fake
//! transport and the transport can be swapped without touching the prompt.
//!
//! ## Request layout
//!
//! ```json
//! {
//!   "anthropic_version": "bedrock-2023-05-31",
//!   "max_tokens": 1000,
//!   "messages": [{
//!     "role": "user",
//!     "content": [
//!       {"type": "image", "source": {"type": "base64", "media_type": "image/jpeg", "data": "..."}},
//!       {"type": "text", "text": "<extraction prompt>"}
//!     ]
//!   }]
//! }
//! ```
//!
//! There is no retry, timeout override or streaming here: one blocking round
//! trip, and any failure goes straight back to the orchestrator.

use crate::config::PipelineConfig;
use crate::error::ReceiptError;
use crate::prompts::RECEIPT_EXTRACTION_PROMPT;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Media type declared for every image block. Normalisation guarantees it
/// for decoded sources; raster uploads are trusted to match.
pub const IMAGE_MEDIA_TYPE: &str = "image/jpeg";

// ── Request envelope ─────────────────────────────────────────────────────

/// Request body for a single-turn vision extraction.
#[derive(Debug, Serialize)]
pub struct InferenceRequest<'a> {
    pub anthropic_version: &'a str,
    pub max_tokens: u32,
    pub messages: Vec<MessagePayload<'a>>,
}

/// One conversation turn.
#[derive(Debug, Serialize)]
pub struct MessagePayload<'a> {
    pub role: &'static str,
    pub content: Vec<ContentBlock<'a>>,
}

/// Content blocks, serialised with a `type` tag.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock<'a> {
    Image { source: ImageSource<'a> },
    Text { text: &'a str },
}

/// Inline image payload.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource<'a> {
    Base64 {
        media_type: &'static str,
        data: &'a str,
    },
}

impl<'a> InferenceRequest<'a> {
    /// Build the request for one base64-encoded image and the fixed prompt.
    pub fn for_image(config: &'a PipelineConfig, image_base64: &'a str) -> Self {
        Self {
            anthropic_version: &config.anthropic_version,
            max_tokens: config.max_tokens,
            messages: vec![MessagePayload {
                role: "user",
                content: vec![
                    ContentBlock::Image {
                        source: ImageSource::Base64 {
                            media_type: IMAGE_MEDIA_TYPE,
                            data: image_base64,
                        },
                    },
                    ContentBlock::Text {
                        text: RECEIPT_EXTRACTION_PROMPT,
                    },
                ],
            }],
        }
    }
}

// ── Response envelope ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct InferenceResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: Option<Value>,
}

/// What the model returned, classified once at the adapter boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceResult {
    /// The answer was already a key-value object.
    Structured(Map<String, Value>),
    /// The answer was text: JSON, almost-JSON, or prose.
    Text(String),
}

impl InferenceResult {
    /// Classify the `text` field of the first content block.
    fn from_value(value: Value) -> Result<Self, ReceiptError> {
        match value {
            Value::String(s) => Ok(InferenceResult::Text(s)),
            Value::Object(map) => Ok(InferenceResult::Structured(map)),
            other => Err(ReceiptError::MalformedResponse(format!(
                "content[0].text is neither text nor an object: {other}"
            ))),
        }
    }
}

/// Parse a raw response body into an [`InferenceResult`].
pub fn parse_response(body: &[u8]) -> Result<InferenceResult, ReceiptError> {
    let response: InferenceResponse = serde_json::from_slice(body)
        .map_err(|e| ReceiptError::MalformedResponse(format!("invalid envelope: {e}")))?;

    let first = response
        .content
        .into_iter()
        .next()
        .ok_or_else(|| ReceiptError::MalformedResponse("content is empty".into()))?;

    let text = first
        .text
        .ok_or_else(|| ReceiptError::MalformedResponse("content[0] has no text".into()))?;

    InferenceResult::from_value(text)
}

// ── Transport ────────────────────────────────────────────────────────────

/// Capability: send a JSON body to a hosted model and return its JSON body.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, ReceiptError>;
}

// ── Adapter ──────────────────────────────────────────────────────────────

/// Builds extraction requests and interprets the answers.
#[derive(Clone)]
pub struct ReceiptAnalyzer {
    invoker: Arc<dyn ModelInvoker>,
    config: PipelineConfig,
}

impl ReceiptAnalyzer {
    pub fn new(invoker: Arc<dyn ModelInvoker>, config: PipelineConfig) -> Self {
        Self { invoker, config }
    }

    /// Run one extraction over a base64-encoded JPEG.
    pub async fn analyze(&self, image_base64: &str) -> Result<InferenceResult, ReceiptError> {
        let request = InferenceRequest::for_image(&self.config, image_base64);
        let body = serde_json::to_vec(&request)
            .map_err(|e| ReceiptError::EncodeFailed(format!("request body: {e}")))?;
        debug!("Inference request body: {} bytes", body.len());

        info!("Invoking model {}", self.config.model_id);
        let response = self.invoker.invoke(&self.config.model_id, body).await?;
        info!("Model {} answered with {} bytes", self.config.model_id, response.len());

        parse_response(&response)
    }
}

impl std::fmt::Debug for ReceiptAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiptAnalyzer")
            .field("invoker", &"<dyn ModelInvoker>")
            .field("model_id", &self.config.model_id)
            .finish()
    }
}
