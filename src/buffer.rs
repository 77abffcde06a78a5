//! Raw pixel buffers with explicit stride and color-format metadata.
//!
//! The engine reads and writes interleaved byte rows, so the buffer keeps
//! its pixels as one owned byte region plus a row stride, with typed
//! `imgref`/`rgb` views layered on top for callers that prefer them.

use imgref::{Img, ImgRef, ImgVec};
use rgb::{ComponentBytes, FromSlice, Rgb, Rgba};

use crate::error::CodecError;

/// Interleaved color layout of a [`PixelBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ColorFormat {
    /// 8-bit red, green, blue.
    Rgb8,
    /// 8-bit red, green, blue, straight alpha.
    Rgba8,
    /// 8-bit red, green, blue, premultiplied alpha.
    Rgba8Premultiplied,
    /// 8-bit single luminance channel. Not encodable; exists so callers get
    /// a clean rejection instead of silent coercion.
    Gray8,
    /// 16-bit red, green, blue.
    Rgb16,
    /// 16-bit red, green, blue, straight alpha.
    Rgba16,
}

impl ColorFormat {
    /// Number of interleaved channels per pixel.
    pub const fn channels(self) -> u32 {
        match self {
            Self::Gray8 => 1,
            Self::Rgb8 | Self::Rgb16 => 3,
            Self::Rgba8 | Self::Rgba8Premultiplied | Self::Rgba16 => 4,
        }
    }

    /// Bit depth of a single channel.
    pub const fn bits_per_channel(self) -> u32 {
        match self {
            Self::Rgb8 | Self::Rgba8 | Self::Rgba8Premultiplied | Self::Gray8 => 8,
            Self::Rgb16 | Self::Rgba16 => 16,
        }
    }

    /// Byte size of a single channel value.
    pub const fn bytes_per_channel(self) -> usize {
        self.bits_per_channel().div_ceil(8) as usize
    }

    /// Byte size of one whole pixel.
    pub const fn bytes_per_pixel(self) -> usize {
        self.channels() as usize * self.bytes_per_channel()
    }

    /// Whether this layout carries an alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba8 | Self::Rgba8Premultiplied | Self::Rgba16)
    }

    /// Whether the alpha channel is premultiplied into the color channels.
    pub const fn premultiplied(self) -> bool {
        matches!(self, Self::Rgba8Premultiplied)
    }
}

/// A rectangular pixel grid: dimensions, color format, row stride in bytes,
/// and one owned byte region.
///
/// Invariants, enforced by every constructor:
/// - `stride >= width * bytes_per_pixel`
/// - `data.len() >= byte_span()`
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    format: ColorFormat,
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a zeroed buffer with a tight stride.
    pub fn new(format: ColorFormat, width: u32, height: u32) -> Result<Self, CodecError> {
        let stride = (width as usize)
            .checked_mul(format.bytes_per_pixel())
            .ok_or_else(|| CodecError::Allocation("row size overflow".into()))?;
        let total = stride
            .checked_mul(height as usize)
            .ok_or_else(|| CodecError::Allocation("buffer size overflow".into()))?;
        let mut data = Vec::new();
        data.try_reserve_exact(total)
            .map_err(|_| CodecError::Allocation(format!("{total} bytes for {width}x{height}")))?;
        data.resize(total, 0);
        Ok(Self {
            format,
            width,
            height,
            stride,
            data,
        })
    }

    /// Wrap caller-provided bytes, which may carry trailing row padding.
    pub fn from_raw(
        format: ColorFormat,
        width: u32,
        height: u32,
        stride: usize,
        data: Vec<u8>,
    ) -> Result<Self, CodecError> {
        let row = width as usize * format.bytes_per_pixel();
        if stride < row {
            return Err(CodecError::InvalidBuffer(format!(
                "stride {stride} is smaller than row size {row}"
            )));
        }
        let buffer = Self {
            format,
            width,
            height,
            stride,
            data,
        };
        if buffer.data.len() < buffer.byte_span() {
            return Err(CodecError::InvalidBuffer(format!(
                "{} bytes provided, {} required",
                buffer.data.len(),
                buffer.byte_span()
            )));
        }
        Ok(buffer)
    }

    /// Copy a typed RGB8 image into a tightly-packed buffer.
    pub fn from_rgb8(img: ImgRef<'_, Rgb<u8>>) -> Self {
        let mut data = Vec::with_capacity(img.width() * img.height() * 3);
        for row in img.rows() {
            data.extend_from_slice(row.as_bytes());
        }
        Self {
            format: ColorFormat::Rgb8,
            width: img.width() as u32,
            height: img.height() as u32,
            stride: img.width() * 3,
            data,
        }
    }

    /// Copy a typed RGBA8 image into a tightly-packed buffer.
    pub fn from_rgba8(img: ImgRef<'_, Rgba<u8>>) -> Self {
        let mut data = Vec::with_capacity(img.width() * img.height() * 4);
        for row in img.rows() {
            data.extend_from_slice(row.as_bytes());
        }
        Self {
            format: ColorFormat::Rgba8,
            width: img.width() as u32,
            height: img.height() as u32,
            stride: img.width() * 4,
            data,
        }
    }

    pub fn format(&self) -> ColorFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The exact span the engine reads or writes:
    /// `(height - 1) * stride + width * bytes_per_pixel`.
    ///
    /// Not `height * stride` — the trailing padding of the last row is not
    /// part of the image and must never be handed to the engine.
    pub fn byte_span(&self) -> usize {
        if self.height == 0 {
            return 0;
        }
        (self.height as usize - 1) * self.stride
            + self.width as usize * self.format.bytes_per_pixel()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// One row of pixels, without any trailing padding.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(y < self.height, "row {y} out of range for height {}", self.height);
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * self.format.bytes_per_pixel()]
    }

    /// Typed RGB8 view. `None` unless the buffer is `Rgb8` with a stride
    /// that is a whole number of pixels.
    pub fn as_rgb8(&self) -> Option<ImgRef<'_, Rgb<u8>>> {
        if self.format != ColorFormat::Rgb8 || self.stride % 3 != 0 {
            return None;
        }
        let pixels = self.data[..self.byte_span()].as_rgb();
        Some(Img::new_stride(
            pixels,
            self.width as usize,
            self.height as usize,
            self.stride / 3,
        ))
    }

    /// Typed RGBA8 view. `None` unless the buffer is straight-alpha `Rgba8`
    /// with a stride that is a whole number of pixels.
    pub fn as_rgba8(&self) -> Option<ImgRef<'_, Rgba<u8>>> {
        if self.format != ColorFormat::Rgba8 || self.stride % 4 != 0 {
            return None;
        }
        let pixels = self.data[..self.byte_span()].as_rgba();
        Some(Img::new_stride(
            pixels,
            self.width as usize,
            self.height as usize,
            self.stride / 4,
        ))
    }

    /// Copy into an owned typed RGBA8 image, for harnesses that compute
    /// metrics on `ImgVec` pixels.
    pub fn to_rgba8_vec(&self) -> Option<ImgVec<Rgba<u8>>> {
        let view = self.as_rgba8()?;
        let mut pixels = Vec::with_capacity(view.width() * view.height());
        for row in view.rows() {
            pixels.extend_from_slice(row);
        }
        Some(ImgVec::new(pixels, view.width(), view.height()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_span_excludes_trailing_padding_of_last_row() {
        // 4x3 RGB with 2 bytes of padding per row.
        let data = vec![0u8; 3 * 14];
        let buffer = PixelBuffer::from_raw(ColorFormat::Rgb8, 4, 3, 14, data).unwrap();
        assert_eq!(buffer.byte_span(), 2 * 14 + 4 * 3);
        assert!(buffer.byte_span() < 3 * 14);
    }

    #[test]
    fn tight_stride_span_covers_whole_allocation() {
        let buffer = PixelBuffer::new(ColorFormat::Rgba8, 7, 5).unwrap();
        assert_eq!(buffer.stride(), 28);
        assert_eq!(buffer.byte_span(), buffer.as_bytes().len());
    }

    #[test]
    fn undersized_stride_is_rejected() {
        let result = PixelBuffer::from_raw(ColorFormat::Rgba8, 10, 1, 39, vec![0u8; 40]);
        assert!(matches!(result, Err(CodecError::InvalidBuffer(_))));
    }

    #[test]
    fn undersized_data_is_rejected() {
        let result = PixelBuffer::from_raw(ColorFormat::Rgb8, 4, 4, 12, vec![0u8; 40]);
        assert!(matches!(result, Err(CodecError::InvalidBuffer(_))));
    }

    #[test]
    fn typed_round_trip_preserves_pixels() {
        let pixels: Vec<Rgb<u8>> = (0..12u8).map(|v| Rgb { r: v, g: v, b: v }).collect();
        let img = ImgVec::new(pixels.clone(), 4, 3);
        let buffer = PixelBuffer::from_rgb8(img.as_ref());
        let view = buffer.as_rgb8().unwrap();
        let collected: Vec<Rgb<u8>> = view.rows().flatten().copied().collect();
        assert_eq!(collected, pixels);
    }

    #[test]
    fn row_access_skips_padding() {
        let mut data = vec![0u8; 26];
        // Second row starts at the stride boundary.
        data[13] = 7;
        let buffer = PixelBuffer::from_raw(ColorFormat::Rgb8, 4, 2, 13, data).unwrap();
        assert_eq!(buffer.row(1)[0], 7);
        assert_eq!(buffer.row(0).len(), 12);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn row_out_of_range_panics() {
        let buffer = PixelBuffer::new(ColorFormat::Rgb8, 4, 2).unwrap();
        let _ = buffer.row(2);
    }

    #[test]
    fn gray_view_is_unavailable_as_rgb() {
        let buffer = PixelBuffer::new(ColorFormat::Gray8, 4, 4).unwrap();
        assert!(buffer.as_rgb8().is_none());
        assert!(buffer.as_rgba8().is_none());
    }

    #[test]
    fn format_metadata() {
        assert_eq!(ColorFormat::Rgb8.bytes_per_pixel(), 3);
        assert_eq!(ColorFormat::Rgba16.bytes_per_pixel(), 8);
        assert!(ColorFormat::Rgba8Premultiplied.premultiplied());
        assert!(!ColorFormat::Rgba8.premultiplied());
        assert!(ColorFormat::Rgba16.has_alpha());
        assert!(!ColorFormat::Gray8.has_alpha());
    }
}
