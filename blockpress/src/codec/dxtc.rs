//! DXT/ATI codec family.
//!
//! One codec struct covers the whole S3TC/3Dc lineage because the members
//! share all their machinery: DXT1 is a bare colour block, DXT3/DXT5 prepend
//! an alpha block, the DXT5 swizzle variants remap channels before encoding
//! (storing one channel in the high-precision alpha slot, a normal-map
//! trick), and ATI1N/ATI2N reuse the interpolated alpha block as
//! single-channel compressors.

use crate::codec::blocks::{
    adaptive_weights, encode_color_block, encode_explicit_alpha_block,
    encode_interpolated_alpha_block, extract_channel, ColorWeights,
};
use crate::codec::{ignore_parameter, Codec, CodecBuffer, CodecBufferMut, CodecOutcome, ParamValue};
use crate::feedback::Feedback;
use crate::format::{codec_buffer_type_for_format, CodecBufferType, CodecType, PixelFormat};
use crate::options::CompressionSpeed;

/// Block layout for one family member.
enum BlockLayout {
    /// 8-byte colour block (DXT1).
    Color,
    /// 8-byte explicit alpha block + colour block (DXT3).
    ExplicitAlpha,
    /// 8-byte interpolated alpha block + colour block (DXT5 and friends).
    InterpolatedAlpha,
    /// One interpolated block over a single channel (ATI1N).
    SingleChannel(usize),
    /// Two interpolated blocks over two channels (ATI2N variants).
    DualChannel(usize, usize),
}

/// DXT1/3/5, DXT5 swizzle variants, ATI1N and ATI2N codec.
pub struct DxtcCodec {
    codec_type: CodecType,
    use_channel_weighting: bool,
    weight_r: f32,
    weight_g: f32,
    weight_b: f32,
    use_adaptive_weighting: bool,
    dxt1_use_alpha: bool,
    alpha_threshold: u8,
    speed: CompressionSpeed,
}

impl DxtcCodec {
    pub fn new(codec_type: CodecType) -> Self {
        Self {
            codec_type,
            use_channel_weighting: false,
            weight_r: 0.0,
            weight_g: 0.0,
            weight_b: 0.0,
            use_adaptive_weighting: false,
            dxt1_use_alpha: false,
            alpha_threshold: 0,
            speed: CompressionSpeed::Normal,
        }
    }

    fn layout(&self) -> BlockLayout {
        match self.codec_type {
            CodecType::Dxt1 => BlockLayout::Color,
            CodecType::Dxt3 => BlockLayout::ExplicitAlpha,
            CodecType::Ati1N => BlockLayout::SingleChannel(0),
            // Legacy ATI2N stores the channels swapped; the XY variant (and
            // its BC5 alias) is red-then-green.
            CodecType::Ati2N => BlockLayout::DualChannel(1, 0),
            CodecType::Ati2NXy => BlockLayout::DualChannel(0, 1),
            _ => BlockLayout::InterpolatedAlpha,
        }
    }

    /// Channel remap applied before encoding, as output-slot <- source
    /// channel. `None` slots read as zero (the "x" in the variant names).
    fn swizzle(&self) -> Option<[Option<usize>; 4]> {
        match self.codec_type {
            CodecType::Dxt5Xgbr => Some([None, Some(1), Some(2), Some(0)]),
            CodecType::Dxt5Rxbg => Some([Some(0), None, Some(2), Some(1)]),
            CodecType::Dxt5Rbxg => Some([Some(0), Some(2), None, Some(1)]),
            CodecType::Dxt5Xrbg => Some([None, Some(0), Some(2), Some(1)]),
            CodecType::Dxt5Rgxb => Some([Some(0), Some(1), None, Some(2)]),
            CodecType::Dxt5Xgxr => Some([None, Some(1), None, Some(0)]),
            // Normal map packed as X in alpha, Y in green.
            CodecType::Ati2NDxt5 => Some([None, Some(1), None, Some(0)]),
            _ => None,
        }
    }

    fn weights_for(&self, block: &[[u8; 4]; 16]) -> ColorWeights {
        if self.use_channel_weighting {
            ColorWeights {
                r: self.weight_r,
                g: self.weight_g,
                b: self.weight_b,
            }
        } else if self.use_adaptive_weighting {
            adaptive_weights(block)
        } else {
            ColorWeights::PERCEPTUAL
        }
    }

    fn encode_block(&self, block: &[[u8; 4]; 16], output: &mut Vec<u8>) {
        let mut pixels = *block;
        if let Some(map) = self.swizzle() {
            for pixel in &mut pixels {
                let source = *pixel;
                for (slot, mapping) in map.iter().enumerate() {
                    pixel[slot] = match mapping {
                        Some(channel) => source[*channel],
                        None => {
                            if slot == 3 {
                                255
                            } else {
                                0
                            }
                        }
                    };
                }
            }
        }

        let weights = self.weights_for(&pixels);
        match self.layout() {
            BlockLayout::Color => {
                output.extend_from_slice(&encode_color_block(
                    &pixels,
                    &weights,
                    self.speed,
                    self.dxt1_use_alpha,
                    self.alpha_threshold,
                ));
            }
            BlockLayout::ExplicitAlpha => {
                let alpha = extract_channel(&pixels, 3);
                output.extend_from_slice(&encode_explicit_alpha_block(&alpha));
                output.extend_from_slice(&encode_color_block(
                    &pixels, &weights, self.speed, false, 0,
                ));
            }
            BlockLayout::InterpolatedAlpha => {
                let alpha = extract_channel(&pixels, 3);
                output.extend_from_slice(&encode_interpolated_alpha_block(&alpha));
                output.extend_from_slice(&encode_color_block(
                    &pixels, &weights, self.speed, false, 0,
                ));
            }
            BlockLayout::SingleChannel(channel) => {
                let values = extract_channel(&pixels, channel);
                output.extend_from_slice(&encode_interpolated_alpha_block(&values));
            }
            BlockLayout::DualChannel(first, second) => {
                let a = extract_channel(&pixels, first);
                let b = extract_channel(&pixels, second);
                output.extend_from_slice(&encode_interpolated_alpha_block(&a));
                output.extend_from_slice(&encode_interpolated_alpha_block(&b));
            }
        }
    }
}

impl Codec for DxtcCodec {
    fn codec_type(&self) -> CodecType {
        self.codec_type
    }

    fn buffer_type(&self) -> CodecBufferType {
        let format = match self.codec_type {
            CodecType::Dxt1 => PixelFormat::Dxt1,
            CodecType::Dxt3 => PixelFormat::Dxt3,
            CodecType::Dxt5 => PixelFormat::Dxt5,
            CodecType::Dxt5Xgbr => PixelFormat::Dxt5Xgbr,
            CodecType::Dxt5Rxbg => PixelFormat::Dxt5Rxbg,
            CodecType::Dxt5Rbxg => PixelFormat::Dxt5Rbxg,
            CodecType::Dxt5Xrbg => PixelFormat::Dxt5Xrbg,
            CodecType::Dxt5Rgxb => PixelFormat::Dxt5Rgxb,
            CodecType::Dxt5Xgxr => PixelFormat::Dxt5Xgxr,
            CodecType::Ati1N => PixelFormat::Ati1N,
            CodecType::Ati2N => PixelFormat::Ati2N,
            CodecType::Ati2NXy => PixelFormat::Ati2NXy,
            _ => PixelFormat::Ati2NDxt5,
        };
        codec_buffer_type_for_format(format)
    }

    fn set_parameter(&mut self, name: &str, value: ParamValue<'_>) {
        match name {
            "UseChannelWeighting" => {
                if let Some(v) = value.as_bool() {
                    self.use_channel_weighting = v;
                }
            }
            "WeightR" => {
                if let Some(v) = value.as_f32() {
                    self.weight_r = v;
                }
            }
            "WeightG" => {
                if let Some(v) = value.as_f32() {
                    self.weight_g = v;
                }
            }
            "WeightB" => {
                if let Some(v) = value.as_f32() {
                    self.weight_b = v;
                }
            }
            "UseAdaptiveWeighting" => {
                if let Some(v) = value.as_bool() {
                    self.use_adaptive_weighting = v;
                }
            }
            "DXT1UseAlpha" => {
                if let Some(v) = value.as_bool() {
                    self.dxt1_use_alpha = v;
                }
            }
            "AlphaThreshold" => {
                if let Some(v) = value.as_u32() {
                    self.alpha_threshold = v.min(255) as u8;
                }
            }
            "CompressionSpeed" => {
                if let Some(v) = value.as_u32() {
                    self.speed = CompressionSpeed::from_raw(v);
                }
            }
            _ => ignore_parameter(self.codec_type, name),
        }
    }

    fn compress(
        &mut self,
        src: &CodecBuffer<'_>,
        dst: &mut CodecBufferMut<'_>,
        feedback: Option<&Feedback<'_>>,
    ) -> CodecOutcome {
        if !src.supports_rgba8() {
            return CodecOutcome::Unknown;
        }

        let blocks_wide = dst.blocks_wide();
        let blocks_high = dst.blocks_high();
        let bytes_per_block = dst.bytes_per_block();
        let mut encoded = Vec::with_capacity(bytes_per_block);

        for block_y in 0..blocks_high {
            for block_x in 0..blocks_wide {
                let block = src.read_block_rgba8(block_x, block_y);
                encoded.clear();
                self.encode_block(&block, &mut encoded);
                if !dst.write_block(block_x, block_y, &encoded) {
                    return CodecOutcome::Unknown;
                }
            }
            if let Some(feedback) = feedback {
                let percent = (block_y + 1) as f32 * 100.0 / blocks_high as f32;
                if feedback.report(percent) {
                    return CodecOutcome::Aborted;
                }
            }
        }

        CodecOutcome::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_buffer(width: u32, height: u32, data: &[u8]) -> CodecBuffer<'_> {
        CodecBuffer::new(
            codec_buffer_type_for_format(PixelFormat::Rgba8888),
            4,
            4,
            1,
            width,
            height,
            0,
            data,
        )
    }

    fn compress_with(
        codec_type: CodecType,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> (CodecOutcome, Vec<u8>) {
        let mut codec = DxtcCodec::new(codec_type);
        let src = source_buffer(width, height, data);
        let format = codec.buffer_type().format();
        let size = crate::texture::compute_buffer_size(format, width, height, 0, 4, 4);
        let mut out = vec![0u8; size];
        let mut dst = codec.create_buffer(4, 4, 1, width, height, 0, &mut out);
        let outcome = codec.compress(&src, &mut dst, None);
        (outcome, out)
    }

    fn solid_rgba(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&pixel);
        }
        data
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Output sizes
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_dxt1_output_size() {
        let data = solid_rgba(16, 16, [128, 64, 32, 255]);
        let (outcome, out) = compress_with(CodecType::Dxt1, 16, 16, &data);
        assert_eq!(outcome, CodecOutcome::Ok);
        assert_eq!(out.len(), 128);
    }

    #[test]
    fn test_dxt5_output_size() {
        let data = solid_rgba(8, 8, [1, 2, 3, 200]);
        let (outcome, out) = compress_with(CodecType::Dxt5, 8, 8, &data);
        assert_eq!(outcome, CodecOutcome::Ok);
        assert_eq!(out.len(), 4 * 16);
    }

    #[test]
    fn test_ati1n_output_size() {
        let data = solid_rgba(8, 8, [77, 0, 0, 255]);
        let (outcome, out) = compress_with(CodecType::Ati1N, 8, 8, &data);
        assert_eq!(outcome, CodecOutcome::Ok);
        assert_eq!(out.len(), 4 * 8);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Block contents
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_dxt5_block_is_alpha_then_color() {
        let data = solid_rgba(4, 4, [10, 20, 30, 99]);
        let (_, out) = compress_with(CodecType::Dxt5, 4, 4, &data);
        // Interpolated alpha block endpoints carry the solid alpha.
        assert_eq!(out[0], 99);
        assert_eq!(out[1], 99);
        // Colour endpoints follow in the second 8 bytes.
        let c0 = u16::from_le_bytes([out[8], out[9]]);
        assert_eq!(c0, crate::codec::blocks::rgb888_to_rgb565(10, 20, 30));
    }

    #[test]
    fn test_dxt3_uses_explicit_alpha_nibbles() {
        let data = solid_rgba(4, 4, [0, 0, 0, 0xF0]);
        let (_, out) = compress_with(CodecType::Dxt3, 4, 4, &data);
        // 4-bit alpha 0xF replicated across the first 8 bytes.
        assert_eq!(&out[0..8], &[0xFF; 8]);
    }

    #[test]
    fn test_ati1n_compresses_red_channel() {
        let data = solid_rgba(4, 4, [123, 45, 67, 255]);
        let (_, out) = compress_with(CodecType::Ati1N, 4, 4, &data);
        assert_eq!(out[0], 123);
        assert_eq!(out[1], 123);
    }

    #[test]
    fn test_ati2n_channel_order_differs_from_xy() {
        let data = solid_rgba(4, 4, [200, 50, 0, 255]);
        let (_, legacy) = compress_with(CodecType::Ati2N, 4, 4, &data);
        let (_, xy) = compress_with(CodecType::Ati2NXy, 4, 4, &data);
        // Legacy order stores green first; XY stores red first.
        assert_eq!(legacy[0], 50);
        assert_eq!(legacy[8], 200);
        assert_eq!(xy[0], 200);
        assert_eq!(xy[8], 50);
    }

    #[test]
    fn test_dxt5_xgbr_stores_red_in_alpha() {
        let data = solid_rgba(4, 4, [210, 3, 4, 255]);
        let (_, out) = compress_with(CodecType::Dxt5Xgbr, 4, 4, &data);
        // The alpha block endpoints carry the source red channel.
        assert_eq!(out[0], 210);
        assert_eq!(out[1], 210);
    }

    #[test]
    fn test_dxt1_punch_through_alpha_flag() {
        let mut data = solid_rgba(4, 4, [100, 100, 100, 255]);
        data[3] = 0; // first pixel transparent

        let mut codec = DxtcCodec::new(CodecType::Dxt1);
        codec.set_parameter("DXT1UseAlpha", ParamValue::U32(1));
        codec.set_parameter("AlphaThreshold", ParamValue::U32(128));

        let src = source_buffer(4, 4, &data);
        let mut out = vec![0u8; 8];
        let mut dst = codec.create_buffer(4, 4, 1, 4, 4, 0, &mut out);
        assert_eq!(codec.compress(&src, &mut dst, None), CodecOutcome::Ok);

        let c0 = u16::from_le_bytes([out[0], out[1]]);
        let c1 = u16::from_le_bytes([out[2], out[3]]);
        assert!(c0 <= c1, "punch-through alpha selects 3-colour mode");
        let indices = u32::from_le_bytes([out[4], out[5], out[6], out[7]]);
        assert_eq!(indices & 0x3, 3, "transparent pixel uses index 3");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Contracts
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_float_source_is_rejected_cleanly() {
        let data = vec![0u8; 4 * 4 * 16];
        let mut codec = DxtcCodec::new(CodecType::Dxt1);
        let src = CodecBuffer::new(
            codec_buffer_type_for_format(PixelFormat::Argb32F),
            4,
            4,
            1,
            4,
            4,
            0,
            &data,
        );
        let mut out = vec![0u8; 8];
        let mut dst = codec.create_buffer(4, 4, 1, 4, 4, 0, &mut out);
        assert_eq!(codec.compress(&src, &mut dst, None), CodecOutcome::Unknown);
    }

    #[test]
    fn test_feedback_abort_stops_compression() {
        let data = solid_rgba(16, 16, [1, 2, 3, 255]);
        let mut codec = DxtcCodec::new(CodecType::Dxt1);
        let src = source_buffer(16, 16, &data);
        let mut out = vec![0u8; 128];
        let mut dst = codec.create_buffer(4, 4, 1, 16, 16, 0, &mut out);

        let abort_immediately = |_: f32, _: usize, _: usize| true;
        let feedback = Feedback::new(&abort_immediately, 0, 0);
        assert_eq!(
            codec.compress(&src, &mut dst, Some(&feedback)),
            CodecOutcome::Aborted
        );
    }

    #[test]
    fn test_feedback_reports_progress() {
        use std::sync::atomic::{AtomicU32, Ordering};
        let data = solid_rgba(16, 16, [1, 2, 3, 255]);
        let mut codec = DxtcCodec::new(CodecType::Dxt1);
        let src = source_buffer(16, 16, &data);
        let mut out = vec![0u8; 128];
        let mut dst = codec.create_buffer(4, 4, 1, 16, 16, 0, &mut out);

        let calls = AtomicU32::new(0);
        let count = |_: f32, _: usize, _: usize| {
            calls.fetch_add(1, Ordering::Relaxed);
            false
        };
        let feedback = Feedback::new(&count, 0, 0);
        assert_eq!(
            codec.compress(&src, &mut dst, Some(&feedback)),
            CodecOutcome::Ok
        );
        // One report per block row.
        assert_eq!(calls.load(Ordering::Relaxed), 4);
    }
}
