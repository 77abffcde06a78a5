//! Unified error type for the bridge.
//!
//! Every engine call result is checked immediately; on failure the pipeline
//! stops and a single descriptive error propagates to the caller. All
//! failures are treated as non-transient (misconfiguration, corrupt input,
//! or an engine/library mismatch), so nothing here is retried.

use thiserror::Error;

use crate::buffer::ColorFormat;

/// Errors reported by the encode and decode pipelines.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// Input pixel layout is neither RGB nor RGBA.
    #[error("unsupported pixel layout {0:?}: JPEG XL requires RGB or RGBA")]
    UnsupportedFormat(ColorFormat),

    /// Engine instance creation returned null. This covers the encoder,
    /// the decoder, and the per-frame settings object: a null return
    /// carries no engine error code, so it is reported here rather than as
    /// [`CodecError::Config`].
    #[error("{0} failed")]
    EngineInit(&'static str),

    /// An engine configuration call was rejected.
    #[error("{call} failed with engine error code {code} for {image}")]
    Config {
        call: String,
        code: i32,
        image: String,
    },

    /// Frame submission was rejected by the encoder.
    #[error("frame submission failed with engine error code {code} for {image}")]
    FrameSubmit { code: i32, image: String },

    /// Buffer allocation or growth failed.
    #[error("allocation failure: {0}")]
    Allocation(String),

    /// Terminal encoder failure while draining output.
    #[error("encoding failed with engine error code {code} for {image}")]
    Encode { code: i32, image: String },

    /// Terminal decoder failure on the final process-input step.
    #[error("decoding failed with engine status {status} for {image}")]
    Decode { status: i32, image: String },

    /// The decoder rejected the compressed input.
    #[error("decoder rejected input with status {status} for {image}")]
    Input { status: i32, image: String },

    /// The engine state machine returned a status other than the one this
    /// step of the protocol requires. Treated as a protocol or library
    /// version mismatch, never as a retryable condition.
    #[error("{step} unexpectedly returned status {status} for {image}")]
    UnexpectedState {
        step: &'static str,
        status: i32,
        image: String,
    },

    /// Built without the `libjxl` feature; both pipelines are unavailable.
    #[error("JPEG XL support requires the `libjxl` feature")]
    EngineUnavailable,

    /// Pixel buffer metadata violates its invariants.
    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(String),
}

/// Emit the diagnostic for a failure unless `quiet`, then hand the error
/// back for propagation. The failure signal itself is never suppressed.
pub(crate) fn report(err: CodecError, quiet: bool) -> CodecError {
    if !quiet {
        log::error!("{err}");
    }
    err
}
