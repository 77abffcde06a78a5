//! The external codec engine, feature-gated.
//!
//! With the `libjxl` feature enabled this module drives libjxl's streaming
//! encoder and decoder. Without it, both pipelines keep their signatures
//! but unconditionally fail with [`crate::CodecError::EngineUnavailable`] and the
//! version reports [`VERSION_UNAVAILABLE`], so callers never special-case
//! engine presence.

#[cfg(feature = "libjxl")]
mod jxl;

#[cfg(feature = "libjxl")]
pub(crate) use jxl::{decode, encode, version};

/// Version marker reported when the engine is not linked.
pub const VERSION_UNAVAILABLE: &str = "n/a";

#[cfg(not(feature = "libjxl"))]
mod stub {
    use super::VERSION_UNAVAILABLE;
    use crate::Decoded;
    use crate::buffer::PixelBuffer;
    use crate::error::{CodecError, report};
    use crate::quality::EncodeSettings;

    pub(crate) fn encode(
        _settings: &EncodeSettings,
        _image: &PixelBuffer,
        _image_id: &str,
        quiet: bool,
    ) -> Result<Vec<u8>, CodecError> {
        Err(report(CodecError::EngineUnavailable, quiet))
    }

    pub(crate) fn decode(
        _bitstream: &[u8],
        _image_id: &str,
        quiet: bool,
    ) -> Result<Decoded, CodecError> {
        Err(report(CodecError::EngineUnavailable, quiet))
    }

    pub(crate) fn version() -> String {
        VERSION_UNAVAILABLE.into()
    }
}

#[cfg(not(feature = "libjxl"))]
pub(crate) use stub::{decode, encode, version};

#[cfg(all(test, not(feature = "libjxl")))]
mod tests {
    use crate::buffer::{ColorFormat, PixelBuffer};
    use crate::error::CodecError;
    use crate::quality::EncodeSettings;

    #[test]
    fn both_pipelines_fail_uniformly_without_the_engine() {
        let image = PixelBuffer::new(ColorFormat::Rgb8, 2, 2).unwrap();
        let encoded = crate::encode(&EncodeSettings::new(50), &image, "stub.png", true);
        assert!(matches!(encoded, Err(CodecError::EngineUnavailable)));

        let decoded = crate::decode(&[0xff, 0x0a], "stub.png", true);
        assert!(matches!(decoded, Err(CodecError::EngineUnavailable)));
    }

    #[test]
    fn version_reports_the_unavailable_marker() {
        assert_eq!(crate::engine_version(), super::VERSION_UNAVAILABLE);
    }
}
