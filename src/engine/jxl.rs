//! Streaming pipelines over libjxl's event-driven C API.
//!
//! Both pipelines advance the engine one step at a time and validate the
//! status returned against the single status that step requires; any other
//! status aborts the call. Encoding drains output into a doubling byte
//! arena; decoding subscribes to the basic-info and full-image events and
//! allocates its output buffer from the decoded header.
//!
//! Operation is single-threaded: the engine's parallel-runner hook is
//! deliberately left unconfigured, so one fresh engine instance per call
//! keeps concurrent calls on independent images data-race free.

use std::ffi::c_void;
use std::mem::MaybeUninit;
use std::ptr;

use jpegxl_sys::color::color_encoding::{JxlColorEncoding, JxlRenderingIntent};
use jpegxl_sys::common::types::{JxlBool, JxlDataType, JxlEndianness, JxlPixelFormat};
use jpegxl_sys::decoder::decode::{
    JxlDecoder, JxlDecoderCloseInput, JxlDecoderCreate, JxlDecoderDestroy,
    JxlDecoderGetBasicInfo, JxlDecoderProcessInput, JxlDecoderSetImageOutBuffer,
    JxlDecoderSetInput, JxlDecoderStatus, JxlDecoderSubscribeEvents,
};
use jpegxl_sys::encoder::encode::{
    FrameSetting, JxlColorEncodingSetToSRGB, JxlEncoder, JxlEncoderAddImageFrame,
    JxlEncoderCloseInput, JxlEncoderCreate, JxlEncoderDestroy, JxlEncoderDistanceFromQuality,
    JxlEncoderFrameSettingsCreate, JxlEncoderFrameSettingsSetOption, JxlEncoderGetError,
    JxlEncoderInitBasicInfo, JxlEncoderProcessOutput, JxlEncoderSetBasicInfo,
    JxlEncoderSetColorEncoding, JxlEncoderSetFrameDistance, JxlEncoderSetFrameLossless,
    JxlEncoderStatus, JxlEncoderVersion,
};
use jpegxl_sys::metadata::codestream_header::JxlBasicInfo;

use crate::Decoded;
use crate::buffer::{ColorFormat, PixelBuffer};
use crate::error::{CodecError, report};
use crate::format::{PixelDescriptor, SampleType, descriptor_for};
use crate::output::OutputSink;
use crate::quality::EncodeSettings;
use crate::timer::Timer;

/// Engine version as `MAJOR.MINOR.PATCH`, decoded from libjxl's packed
/// integer version.
pub(crate) fn version() -> String {
    let v = unsafe { JxlEncoderVersion() };
    format!("{}.{}.{}", v / 1_000_000, v / 1_000 % 1_000, v % 1_000)
}

fn jxl_bool(value: bool) -> JxlBool {
    if value { JxlBool::True } else { JxlBool::False }
}

fn jxl_pixel_format(descriptor: &PixelDescriptor) -> JxlPixelFormat {
    JxlPixelFormat {
        num_channels: descriptor.channels,
        data_type: match descriptor.sample_type {
            SampleType::U8 => JxlDataType::Uint8,
            SampleType::U16 => JxlDataType::Uint16,
        },
        // Native byte order only; cross-endian buffers are unsupported.
        endianness: JxlEndianness::Native,
        align: descriptor.align,
    }
}

/// Owns one encoder instance for the duration of a single encode call.
struct Encoder(*mut JxlEncoder);

impl Encoder {
    fn create() -> Option<Self> {
        let raw = unsafe { JxlEncoderCreate(ptr::null()) };
        (!raw.is_null()).then_some(Self(raw))
    }

    fn raw(&self) -> *mut JxlEncoder {
        self.0
    }

    /// The engine's internal error code for the most recent failure.
    fn error_code(&self) -> i32 {
        unsafe { JxlEncoderGetError(self.0) as i32 }
    }

    fn check(
        &self,
        status: JxlEncoderStatus,
        call: String,
        image_id: &str,
        quiet: bool,
    ) -> Result<(), CodecError> {
        if matches!(status, JxlEncoderStatus::Success) {
            return Ok(());
        }
        Err(report(
            CodecError::Config {
                call,
                code: self.error_code(),
                image: image_id.to_owned(),
            },
            quiet,
        ))
    }
}

impl Drop for Encoder {
    fn drop(&mut self) {
        unsafe { JxlEncoderDestroy(self.0) };
    }
}

/// Owns one decoder instance for the duration of a single decode call.
struct Decoder(*mut JxlDecoder);

impl Decoder {
    fn create() -> Option<Self> {
        let raw = unsafe { JxlDecoderCreate(ptr::null()) };
        (!raw.is_null()).then_some(Self(raw))
    }

    fn raw(&self) -> *mut JxlDecoder {
        self.0
    }

    /// Advance the decoder state machine and require the one status this
    /// step of the protocol expects.
    fn advance_expecting(
        &self,
        wanted: JxlDecoderStatus,
        step: &'static str,
        image_id: &str,
        quiet: bool,
    ) -> Result<(), CodecError> {
        let status = unsafe { JxlDecoderProcessInput(self.0) };
        if status as i32 == wanted as i32 {
            return Ok(());
        }
        Err(report(
            CodecError::UnexpectedState {
                step,
                status: status as i32,
                image: image_id.to_owned(),
            },
            quiet,
        ))
    }
}

impl Drop for Decoder {
    fn drop(&mut self) {
        unsafe { JxlDecoderDestroy(self.0) };
    }
}

/// Encode one full image frame into a JPEG XL bitstream.
pub(crate) fn encode(
    settings: &EncodeSettings,
    image: &PixelBuffer,
    image_id: &str,
    quiet: bool,
) -> Result<Vec<u8>, CodecError> {
    // Precondition: RGB(A) only. Also yields the pixel descriptor reused
    // when the frame is submitted.
    let descriptor = descriptor_for(image).map_err(|e| report(e, quiet))?;

    let encoder = Encoder::create()
        .ok_or_else(|| report(CodecError::EngineInit("JxlEncoderCreate"), quiet))?;

    let mut basic_info = unsafe {
        let mut info = MaybeUninit::<JxlBasicInfo>::uninit();
        JxlEncoderInitBasicInfo(info.as_mut_ptr());
        info.assume_init()
    };
    basic_info.xsize = image.width();
    basic_info.ysize = image.height();
    basic_info.bits_per_sample = image.format().bits_per_channel();
    basic_info.uses_original_profile = jxl_bool(settings.is_lossless());
    basic_info.num_color_channels = 3;
    if image.format().has_alpha() {
        // No extra-channel info call is needed for a plain alpha channel.
        basic_info.num_extra_channels = 1;
        basic_info.alpha_bits = basic_info.bits_per_sample;
        basic_info.alpha_premultiplied = jxl_bool(image.format().premultiplied());
    }
    let status = unsafe { JxlEncoderSetBasicInfo(encoder.raw(), &basic_info) };
    encoder.check(status, "JxlEncoderSetBasicInfo".into(), image_id, quiet)?;

    // Standard sRGB with perceptual intent, matching cjxl's default output
    // so bitstreams stay comparable with the reference tool's.
    let color_encoding = unsafe {
        let mut enc = MaybeUninit::<JxlColorEncoding>::zeroed();
        JxlColorEncodingSetToSRGB(enc.as_mut_ptr(), jxl_bool(false));
        let mut enc = enc.assume_init();
        enc.rendering_intent = JxlRenderingIntent::Perceptual;
        enc
    };
    let status = unsafe { JxlEncoderSetColorEncoding(encoder.raw(), &color_encoding) };
    encoder.check(status, "JxlEncoderSetColorEncoding".into(), image_id, quiet)?;

    // Frame settings are owned by the encoder and freed with it.
    let frame_settings = unsafe { JxlEncoderFrameSettingsCreate(encoder.raw(), ptr::null()) };
    if frame_settings.is_null() {
        return Err(report(
            CodecError::EngineInit("JxlEncoderFrameSettingsCreate"),
            quiet,
        ));
    }

    if settings.is_lossless() {
        let status = unsafe { JxlEncoderSetFrameLossless(frame_settings, jxl_bool(true)) };
        encoder.check(status, "JxlEncoderSetFrameLossless".into(), image_id, quiet)?;
    } else {
        // The engine owns the quality-to-distance mapping.
        let distance = unsafe { JxlEncoderDistanceFromQuality(settings.quality as f32) };
        let status = unsafe { JxlEncoderSetFrameDistance(frame_settings, distance) };
        encoder.check(
            status,
            format!(
                "JxlEncoderSetFrameDistance({distance}) for quality {}",
                settings.quality
            ),
            image_id,
            quiet,
        )?;
    }
    let status = unsafe {
        JxlEncoderFrameSettingsSetOption(frame_settings, FrameSetting::Effort, settings.effort as i64)
    };
    encoder.check(
        status,
        format!("JxlEncoderFrameSettingsSetOption(effort={})", settings.effort),
        image_id,
        quiet,
    )?;

    let pixel_format = jxl_pixel_format(&descriptor);
    let status = unsafe {
        JxlEncoderAddImageFrame(
            frame_settings,
            &pixel_format,
            image.as_bytes().as_ptr().cast::<c_void>(),
            image.byte_span(),
        )
    };
    if !matches!(status, JxlEncoderStatus::Success) {
        return Err(report(
            CodecError::FrameSubmit {
                code: encoder.error_code(),
                image: image_id.to_owned(),
            },
            quiet,
        ));
    }
    unsafe { JxlEncoderCloseInput(encoder.raw()) };

    // Drain: offer the free tail, double on NeedMoreOutput, stop on any
    // terminal status.
    let mut sink = OutputSink::new();
    loop {
        let free = sink.spare();
        let offered = free.len();
        let mut next_out = free.as_mut_ptr();
        let mut avail_out = offered;
        let status =
            unsafe { JxlEncoderProcessOutput(encoder.raw(), &mut next_out, &mut avail_out) };
        sink.advance(offered - avail_out);
        match status {
            JxlEncoderStatus::NeedMoreOutput => sink.grow().map_err(|e| report(e, quiet))?,
            JxlEncoderStatus::Success => break,
            _ => {
                return Err(report(
                    CodecError::Encode {
                        code: encoder.error_code(),
                        image: image_id.to_owned(),
                    },
                    quiet,
                ));
            }
        }
    }
    Ok(sink.finish())
}

/// Decode a JPEG XL bitstream into a freshly allocated pixel buffer,
/// measuring the time the engine spends in color-space conversion.
pub(crate) fn decode(
    bitstream: &[u8],
    image_id: &str,
    quiet: bool,
) -> Result<Decoded, CodecError> {
    let decoder = Decoder::create()
        .ok_or_else(|| report(CodecError::EngineInit("JxlDecoderCreate"), quiet))?;

    let events = JxlDecoderStatus::BasicInfo as i32 | JxlDecoderStatus::FullImage as i32;
    let status = unsafe { JxlDecoderSubscribeEvents(decoder.raw(), events) };
    if !matches!(status, JxlDecoderStatus::Success) {
        return Err(report(
            CodecError::Config {
                call: "JxlDecoderSubscribeEvents".into(),
                code: status as i32,
                image: image_id.to_owned(),
            },
            quiet,
        ));
    }

    let status =
        unsafe { JxlDecoderSetInput(decoder.raw(), bitstream.as_ptr(), bitstream.len()) };
    if !matches!(status, JxlDecoderStatus::Success) {
        return Err(report(
            CodecError::Input {
                status: status as i32,
                image: image_id.to_owned(),
            },
            quiet,
        ));
    }
    // The whole bitstream is in; no further input will arrive.
    unsafe { JxlDecoderCloseInput(decoder.raw()) };

    decoder.advance_expecting(
        JxlDecoderStatus::BasicInfo,
        "first process-input step",
        image_id,
        quiet,
    )?;

    let info = unsafe {
        let mut info = MaybeUninit::<JxlBasicInfo>::uninit();
        let status = JxlDecoderGetBasicInfo(decoder.raw(), info.as_mut_ptr());
        if !matches!(status, JxlDecoderStatus::Success) {
            return Err(report(
                CodecError::Config {
                    call: "JxlDecoderGetBasicInfo".into(),
                    code: status as i32,
                    image: image_id.to_owned(),
                },
                quiet,
            ));
        }
        info.assume_init()
    };
    let format = if info.alpha_bits > 0 {
        ColorFormat::Rgba8
    } else {
        ColorFormat::Rgb8
    };
    let mut image =
        PixelBuffer::new(format, info.xsize, info.ysize).map_err(|e| report(e, quiet))?;

    decoder.advance_expecting(
        JxlDecoderStatus::NeedImageOutBuffer,
        "second process-input step",
        image_id,
        quiet,
    )?;

    let descriptor = descriptor_for(&image).map_err(|e| report(e, quiet))?;
    let pixel_format = jxl_pixel_format(&descriptor);
    let span = image.byte_span();
    let status = unsafe {
        JxlDecoderSetImageOutBuffer(
            decoder.raw(),
            &pixel_format,
            image.as_bytes_mut().as_mut_ptr().cast::<c_void>(),
            span,
        )
    };
    if !matches!(status, JxlDecoderStatus::Success) {
        return Err(report(
            CodecError::Config {
                call: "JxlDecoderSetImageOutBuffer".into(),
                code: status as i32,
                image: image_id.to_owned(),
            },
            quiet,
        ));
    }

    decoder.advance_expecting(
        JxlDecoderStatus::FullImage,
        "third process-input step",
        image_id,
        quiet,
    )?;

    // The engine performs its color-space conversion somewhere between
    // delivering pixels and reporting final success; the exact boundary is
    // an engine internal, so this window is a best-effort approximation.
    let timer = Timer::start();
    let status = unsafe { JxlDecoderProcessInput(decoder.raw()) };
    if !matches!(status, JxlDecoderStatus::Success) {
        return Err(report(
            CodecError::Decode {
                status: status as i32,
                image: image_id.to_owned(),
            },
            quiet,
        ));
    }
    let color_conversion = timer.elapsed();

    Ok(Decoded {
        image,
        color_conversion,
    })
}
