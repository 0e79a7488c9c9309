//! Experimental generic-transform codec.
//!
//! Not a rate-reducing codec: it rewrites RGBA8 pixel data into block-linear
//! order (all 16 texels of a 4x4 block stored contiguously), the layout the
//! downstream experiments consume. Output is 64 bytes per block, lossless.
//!
//! The transform treats the image as one unit — block-linear addressing
//! bakes absolute block coordinates into the layout — so the row-band
//! dispatcher always runs it sequentially.

use crate::codec::{ignore_parameter, Codec, CodecBuffer, CodecBufferMut, CodecOutcome, ParamValue};
use crate::feedback::Feedback;
use crate::format::{codec_buffer_type_for_format, CodecBufferType, CodecType, PixelFormat};
use crate::options::DEFAULT_QUALITY;

/// Generic block-linear transform codec.
pub struct TransformCodec {
    quality: f32,
}

impl TransformCodec {
    pub fn new() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }
}

impl Default for TransformCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for TransformCodec {
    fn codec_type(&self) -> CodecType {
        CodecType::GenericTransform
    }

    fn buffer_type(&self) -> CodecBufferType {
        codec_buffer_type_for_format(PixelFormat::GenericTransform)
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
            _ => ignore_parameter(CodecType::GenericTransform, name),
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
        tracing::debug!(quality = self.quality, "block-linear transform");

        let blocks_wide = dst.blocks_wide();
        let blocks_high = dst.blocks_high();
        let mut encoded = [0u8; 64];

        for block_y in 0..blocks_high {
            for block_x in 0..blocks_wide {
                let block = src.read_block_rgba8(block_x, block_y);
                for (i, pixel) in block.iter().enumerate() {
                    encoded[i * 4..i * 4 + 4].copy_from_slice(pixel);
                }
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

    #[test]
    fn test_transform_is_lossless_block_linear() {
        // 8x4 image: two blocks side by side with distinct colours.
        let mut data = Vec::new();
        for _ in 0..4 {
            for x in 0..8u8 {
                let v = if x < 4 { 10 } else { 20 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        let mut codec = TransformCodec::new();
        let src = CodecBuffer::new(
            codec_buffer_type_for_format(PixelFormat::Rgba8888),
            4,
            4,
            1,
            8,
            4,
            0,
            &data,
        );
        let mut out = vec![0u8; 2 * 64];
        let mut dst = codec.create_buffer(4, 4, 1, 8, 4, 0, &mut out);
        assert_eq!(codec.compress(&src, &mut dst, None), CodecOutcome::Ok);

        // First block holds only colour 10, second only colour 20.
        assert!(out[0..64].chunks(4).all(|p| p[0] == 10));
        assert!(out[64..128].chunks(4).all(|p| p[0] == 20));
    }

    #[test]
    fn test_transform_output_size_ratio() {
        assert_eq!(
            crate::texture::compute_buffer_size(PixelFormat::GenericTransform, 16, 16, 0, 4, 4),
            16 * 16 * 4
        );
    }
}
