//! BC6H codec backed by the ISPC texture-compression kernels.
//!
//! The per-block math lives in `intel_tex_2::bc6h`; this codec assembles a
//! half-float RGBA surface from the source buffer (converting f32 and
//! 16-bit UNORM sources as needed), maps the quality parameter to a kernel
//! preset and hands the whole band to the kernel in one call.
//!
//! The signed-float variant (`Bc6HSf`) shares the path: sign travels in the
//! half-float encoding itself.

use crate::codec::{ignore_parameter, Codec, CodecBuffer, CodecBufferMut, CodecOutcome, ParamValue};
use crate::feedback::Feedback;
use crate::format::{codec_buffer_type_for_format, CodecBufferType, CodecType, PixelFormat};
use crate::options::DEFAULT_QUALITY;
use half::f16;
use intel_tex_2::{bc6h, RgbaSurface};

/// BC6H / BC6H_SF codec.
pub struct Bc6hCodec {
    codec_type: CodecType,
    quality: f32,
}

impl Bc6hCodec {
    pub fn new(codec_type: CodecType) -> Self {
        Self {
            codec_type,
            quality: DEFAULT_QUALITY,
        }
    }

    fn settings(&self) -> bc6h::EncodeSettings {
        match self.quality {
            q if q < 0.2 => bc6h::very_fast_settings(),
            q if q < 0.4 => bc6h::fast_settings(),
            q if q < 0.6 => bc6h::basic_settings(),
            q if q < 0.8 => bc6h::slow_settings(),
            _ => bc6h::very_slow_settings(),
        }
    }
}

impl Codec for Bc6hCodec {
    fn codec_type(&self) -> CodecType {
        self.codec_type
    }

    fn buffer_type(&self) -> CodecBufferType {
        let format = match self.codec_type {
            CodecType::Bc6HSf => PixelFormat::Bc6HSf,
            _ => PixelFormat::Bc6H,
        };
        codec_buffer_type_for_format(format)
    }

    fn set_parameter(&mut self, name: &str, value: ParamValue<'_>) {
        match name {
            "Quality" => {
                if let Some(v) = value.as_f32() {
                    self.quality = v.clamp(0.0, 1.0);
                }
            }
            "CompressionSpeed" | "UseChannelWeighting" | "WeightR" | "WeightG" | "WeightB"
            | "UseAdaptiveWeighting" | "DXT1UseAlpha" | "AlphaThreshold" => {}
            _ => ignore_parameter(self.codec_type, name),
        }
    }

    fn compress(
        &mut self,
        src: &CodecBuffer<'_>,
        dst: &mut CodecBufferMut<'_>,
        feedback: Option<&Feedback<'_>>,
    ) -> CodecOutcome {
        if !src.supports_rgba_f32() {
            return CodecOutcome::Unknown;
        }
        if let Some(feedback) = feedback {
            if feedback.report(0.0) {
                return CodecOutcome::Aborted;
            }
        }

        // The kernel wants whole blocks: assemble a half-float RGBA surface
        // padded up to 4-pixel multiples (out-of-image pixels read as zero).
        let width = dst.width().div_ceil(4) * 4;
        let height = dst.height().div_ceil(4) * 4;
        let mut pixels = Vec::with_capacity((width * height * 8) as usize);
        for y in 0..height {
            for x in 0..width {
                let rgba = src.pixel_rgba_f32(x, y);
                for channel in rgba {
                    pixels.extend_from_slice(&f16::from_f32(channel).to_bits().to_le_bytes());
                }
            }
        }

        let surface = RgbaSurface {
            width,
            height,
            stride: width * 8,
            data: &pixels,
        };
        let blocks = bc6h::compress_blocks(&self.settings(), &surface);

        let out = dst.data_mut();
        if blocks.len() > out.len() {
            return CodecOutcome::Unknown;
        }
        out[..blocks.len()].copy_from_slice(&blocks);

        if let Some(feedback) = feedback {
            if feedback.report(100.0) {
                return CodecOutcome::Aborted;
            }
        }
        CodecOutcome::Ok
    }
}
