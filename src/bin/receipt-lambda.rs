//! Function-runtime binary for receipt-lens.
//!
//! A thin shim over the library crate: settings come from the environment
//! (or flags when run by hand), AWS clients are built once per cold start,
//! and every invocation is handed to [`Pipeline::run`].

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use lambda_runtime::{service_fn, LambdaEvent};
use receipt_lens::aws::{load_sdk_config, BedrockInvoker, S3ObjectStore};
use receipt_lens::config::{DEFAULT_ANTHROPIC_VERSION, DEFAULT_MODEL_ID};
use receipt_lens::{HandlerResponse, Pipeline, PipelineConfig};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "receipt-lambda",
    version,
    about = "Extract receipt fields from uploaded images with a hosted vision model"
)]
struct Cli {
    /// Hosted model identifier
    #[arg(long, env = "RECEIPT_MODEL_ID", default_value = DEFAULT_MODEL_ID)]
    model_id: String,

    /// Value of the `anthropic_version` request field
    #[arg(long, env = "RECEIPT_ANTHROPIC_VERSION", default_value = DEFAULT_ANTHROPIC_VERSION)]
    anthropic_version: String,

    /// Maximum tokens the model may generate
    #[arg(long, env = "RECEIPT_MAX_TOKENS", default_value_t = 1000)]
    max_tokens: u32,

    /// JPEG quality for normalised HEIC/HEIF and PDF sources (1-100)
    #[arg(long, env = "RECEIPT_JPEG_QUALITY", default_value_t = 75)]
    jpeg_quality: u8,

    /// Suffix appended to the source key to name the result object
    #[arg(long, env = "RECEIPT_RESULT_SUFFIX", default_value = ".json")]
    result_suffix: String,

    /// Path to the pdfium shared library (system library when unset)
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn to_config(&self) -> Result<PipelineConfig> {
        let mut builder = PipelineConfig::builder()
            .model_id(&self.model_id)
            .anthropic_version(&self.anthropic_version)
            .max_tokens(self.max_tokens)
            .jpeg_quality(self.jpeg_quality)
            .result_suffix(&self.result_suffix);
        if let Some(path) = &self.pdfium_lib_path {
            builder = builder.pdfium_lib_path(path);
        }
        builder.build().context("Invalid pipeline configuration")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The function log sink adds its own timestamps and does not render ANSI.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .init();

    let config = cli.to_config()?;
    info!(
        "Starting receipt-lambda (model {}, suffix {})",
        config.model_id, config.result_suffix
    );

    let sdk = load_sdk_config().await;
    let pipeline = Pipeline::with_default_decoders(
        Arc::new(S3ObjectStore::new(&sdk)),
        Arc::new(BedrockInvoker::new(&sdk)),
        config,
    );

    let pipeline = &pipeline;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        let response: HandlerResponse = pipeline.run(&event.payload).await?;
        Ok::<_, lambda_runtime::Error>(response)
    }))
    .await
    .map_err(|e| anyhow!(e))
    .context("Function runtime exited")
}
