//! Configuration for the receipt extraction pipeline.
//!
//! All tunable behaviour lives in [`PipelineConfig`], built via
//! [`PipelineConfigBuilder`]. The defaults reproduce the wire contract the
//! downstream consumers of the `.json` artifacts were written against, so a
//! default-built config is what production runs.

use crate::error::ReceiptError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hosted model the extraction prompt was tuned for.
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";

/// API version string expected inside the request envelope.
pub const DEFAULT_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Configuration for one pipeline instance.
///
/// # Example
/// ```rust
/// use receipt_lens::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .max_tokens(1500)
///     .jpeg_quality(90)
///     .build()
///     .unwrap();
/// assert_eq!(config.result_suffix, ".json");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Model identifier passed to the inference service.
    pub model_id: String,

    /// Value of the `anthropic_version` field of the request envelope.
    pub anthropic_version: String,

    /// Token ceiling for the model's answer. Default: 1000.
    ///
    /// A filled-in receipt answer is a few hundred tokens; the ceiling only
    /// guards against runaway explanations.
    pub max_tokens: u32,

    /// Quality used when re-encoding HEIC/HEIF frames and PDF pages to JPEG.
    /// Range: 1–100. Default: 75.
    pub jpeg_quality: u8,

    /// Suffix appended to the source key to form the artifact key.
    pub result_suffix: String,

    /// Explicit path to the pdfium shared library. `None` binds the system
    /// library.
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            anthropic_version: DEFAULT_ANTHROPIC_VERSION.to_string(),
            max_tokens: 1000,
            jpeg_quality: 75,
            result_suffix: ".json".to_string(),
            pdfium_lib_path: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Key under which the result for `source_key` is stored.
    pub fn result_key(&self, source_key: &str) -> String {
        format!("{source_key}{}", self.result_suffix)
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn model_id(mut self, id: impl Into<String>) -> Self {
        self.config.model_id = id.into();
        self
    }

    pub fn anthropic_version(mut self, version: impl Into<String>) -> Self {
        self.config.anthropic_version = version.into();
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q;
        self
    }

    pub fn result_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.result_suffix = suffix.into();
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, ReceiptError> {
        let c = &self.config;
        if c.model_id.trim().is_empty() {
            return Err(ReceiptError::InvalidConfig("model id must not be empty".into()));
        }
        if c.max_tokens == 0 {
            return Err(ReceiptError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if !(1..=100).contains(&c.jpeg_quality) {
            return Err(ReceiptError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        // An empty suffix would overwrite the source object with its own result.
        if c.result_suffix.is_empty() {
            return Err(ReceiptError::InvalidConfig(
                "result suffix must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_wire_contract() {
        let c = PipelineConfig::default();
        assert_eq!(c.model_id, "anthropic.claude-3-5-sonnet-20240620-v1:0");
        assert_eq!(c.anthropic_version, "bedrock-2023-05-31");
        assert_eq!(c.max_tokens, 1000);
        assert_eq!(c.result_suffix, ".json");
    }

    #[test]
    fn result_key_appends_suffix() {
        let c = PipelineConfig::default();
        assert_eq!(c.result_key("scans/r.jpg"), "scans/r.jpg.json");
    }

    #[test]
    fn build_rejects_empty_suffix() {
        let err = PipelineConfig::builder().result_suffix("").build().unwrap_err();
        assert!(matches!(err, ReceiptError::InvalidConfig(_)));
    }

    #[test]
    fn build_rejects_out_of_range_quality() {
        assert!(PipelineConfig::builder().jpeg_quality(0).build().is_err());
        assert!(PipelineConfig::builder().jpeg_quality(101).build().is_err());
        assert!(PipelineConfig::builder().jpeg_quality(100).build().is_ok());
    }

    #[test]
    fn build_rejects_zero_tokens() {
        assert!(PipelineConfig::builder().max_tokens(0).build().is_err());
    }
}
