//! # jxl-bridge
//!
//! JPEG XL codec adapter for codec benchmarking harnesses.
//!
//! Wraps libjxl's event-driven streaming API behind the uniform per-call
//! contract a codec-comparison harness needs: [`encode`] one image,
//! [`decode`] one bitstream, list the [`lossy_qualities`] to sweep, and
//! report the [`engine_version`]. Each call constructs and owns its own
//! engine instance, so concurrent calls on independent images are safe;
//! the engine itself runs single-threaded.
//!
//! The engine is feature-gated. Without the `libjxl` feature every
//! pipeline call fails with [`CodecError::EngineUnavailable`] while
//! keeping the same signatures, so harnesses never special-case it:
//!
//! ```toml
//! [dependencies]
//! jxl-bridge = { version = "0.1", features = ["libjxl"] }
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use jxl_bridge::{ColorFormat, EncodeSettings, PixelBuffer};
//!
//! let image = PixelBuffer::new(ColorFormat::Rgb8, 640, 480)?;
//! let bitstream = jxl_bridge::encode(&EncodeSettings::new(85), &image, "image.png", false)?;
//! let decoded = jxl_bridge::decode(&bitstream, "image.png", false)?;
//! assert_eq!(decoded.image.width(), 640);
//! # Ok::<(), jxl_bridge::CodecError>(())
//! ```

pub mod buffer;
mod engine;
pub mod error;
pub mod format;
#[cfg(any(feature = "libjxl", test))]
mod output;
pub mod quality;
#[cfg(any(feature = "libjxl", test))]
mod timer;

use std::time::Duration;

pub use buffer::{ColorFormat, PixelBuffer};
pub use engine::VERSION_UNAVAILABLE;
pub use error::CodecError;
pub use format::{PixelDescriptor, SampleType, descriptor_for};
pub use quality::{DEFAULT_EFFORT, EncodeSettings, QUALITY_LOSSLESS, lossy_qualities};

/// Successful decode payload.
#[derive(Debug)]
pub struct Decoded {
    /// The decoded pixels: RGBA8 when the bitstream carries alpha, RGB8
    /// otherwise, sized from the bitstream header.
    pub image: PixelBuffer,
    /// Time the engine spent in color-space conversion while finishing the
    /// decode. The engine does not expose the phase boundary, so this is a
    /// best-effort approximation, not an exact phase timer.
    pub color_conversion: Duration,
}

/// Encode one image under the given settings.
///
/// `image_id` is an opaque label (for example a file path) used only in
/// diagnostics; `quiet` suppresses the diagnostic log line on failure but
/// never the returned error. The bitstream comes back exactly sized, with
/// no trailing garbage.
pub fn encode(
    settings: &EncodeSettings,
    image: &PixelBuffer,
    image_id: &str,
    quiet: bool,
) -> Result<Vec<u8>, CodecError> {
    engine::encode(settings, image, image_id, quiet)
}

/// Decode one bitstream into a freshly allocated buffer.
///
/// Fails atomically: no partially decoded buffer is ever returned.
pub fn decode(bitstream: &[u8], image_id: &str, quiet: bool) -> Result<Decoded, CodecError> {
    engine::decode(bitstream, image_id, quiet)
}

/// Engine version as `MAJOR.MINOR.PATCH`, or [`VERSION_UNAVAILABLE`] when
/// built without the engine.
pub fn engine_version() -> String {
    engine::version()
}
