//! Pixel-format translation between [`PixelBuffer`] layouts and the
//! engine's pixel-format descriptor.
//!
//! Pure functions of their input; unit-testable without the engine.

use crate::buffer::PixelBuffer;
use crate::error::CodecError;

/// Element type of one channel sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleType {
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
}

/// Engine-facing description of an interleaved pixel layout.
///
/// Derived on demand from a buffer's color format, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelDescriptor {
    /// Interleaved channels per pixel.
    pub channels: u32,
    /// Element type of each channel sample.
    pub sample_type: SampleType,
    /// Row alignment in bytes; equals the source buffer's stride.
    pub align: usize,
}

/// Map a buffer's color format to the engine's pixel-format descriptor.
///
/// Only the RGB and RGBA layout families are supported; anything else is a
/// precondition violation reported as [`CodecError::UnsupportedFormat`],
/// never silently coerced.
///
/// Byte order is always native. Cross-endian buffers are not handled; on a
/// host whose endianness differs from the producer of a 16-bit buffer the
/// samples would be misread. Known limitation.
pub fn descriptor_for(buffer: &PixelBuffer) -> Result<PixelDescriptor, CodecError> {
    let format = buffer.format();
    if format.channels() < 3 {
        return Err(CodecError::UnsupportedFormat(format));
    }
    let bytes_per_channel = (format.bits_per_channel() as usize).div_ceil(8);
    let channels = (format.bytes_per_pixel() / bytes_per_channel) as u32;
    let sample_type = if format.bits_per_channel() == 8 {
        SampleType::U8
    } else {
        SampleType::U16
    };
    Ok(PixelDescriptor {
        channels,
        sample_type,
        align: buffer.stride(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ColorFormat;

    #[test]
    fn rgb8_maps_to_three_u8_channels() {
        let buffer = PixelBuffer::new(ColorFormat::Rgb8, 16, 16).unwrap();
        let descriptor = descriptor_for(&buffer).unwrap();
        assert_eq!(descriptor.channels, 3);
        assert_eq!(descriptor.sample_type, SampleType::U8);
        assert_eq!(descriptor.align, 48);
    }

    #[test]
    fn rgba16_maps_to_four_u16_channels() {
        let buffer = PixelBuffer::new(ColorFormat::Rgba16, 8, 8).unwrap();
        let descriptor = descriptor_for(&buffer).unwrap();
        assert_eq!(descriptor.channels, 4);
        assert_eq!(descriptor.sample_type, SampleType::U16);
    }

    #[test]
    fn align_reflects_padded_stride() {
        let buffer =
            PixelBuffer::from_raw(ColorFormat::Rgba8, 4, 2, 20, vec![0u8; 40]).unwrap();
        assert_eq!(descriptor_for(&buffer).unwrap().align, 20);
    }

    #[test]
    fn grayscale_is_rejected() {
        let buffer = PixelBuffer::new(ColorFormat::Gray8, 4, 4).unwrap();
        assert!(matches!(
            descriptor_for(&buffer),
            Err(CodecError::UnsupportedFormat(ColorFormat::Gray8))
        ));
    }
}
