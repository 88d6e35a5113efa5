//! Pipeline stages for receipt extraction.
//!
//! Each submodule implements one transformation step; the orchestrator in
//! [`crate::handler`] wires them together.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ format ──▶ normalize ──▶ encode ──▶ llm ──▶ codec
//! (event)   (suffix)   (heif/pdf)    (base64)   (VLM)   (JSON)
//! ```
//!
//! 1. [`input`]     — resolve the trigger event to a bucket and key
//! 2. [`format`]    — classify the key by suffix
//! 3. [`normalize`] — turn HEIC/HEIF and PDF sources into a single JPEG;
//!    [`heif`] and [`render`] hold the decoders it drives. Runs in
//!    `spawn_blocking` because both decoders are synchronous
//! 4. [`encode`]    — JPEG encoding and base64 wrapping
//! 5. [`llm`]       — build the request envelope and classify the answer;
//!    the only stage with network I/O
//! 6. [`codec`]     — serialise the answer for storage and for the response

pub mod codec;
pub mod encode;
pub mod format;
pub mod heif;
pub mod input;
pub mod llm;
pub mod normalize;
pub mod render;
