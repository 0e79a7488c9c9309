//! ASTC codec.
//!
//! Fast-path encoder: every block becomes an LDR void-extent block carrying
//! the block's average colour. Void-extent blocks are part of the ASTC
//! bitstream proper, so the output decodes everywhere; a cluster-fit
//! encoder can replace this behind the same trait without touching the
//! dispatch layer.
//!
//! The block footprint comes from the destination descriptor (ASTC is not
//! fixed at 4x4), which is also why the row-band dispatcher never splits
//! ASTC work.

use crate::codec::{ignore_parameter, Codec, CodecBuffer, CodecBufferMut, CodecOutcome, ParamValue};
use crate::feedback::Feedback;
use crate::format::{codec_buffer_type_for_format, CodecBufferType, CodecType, PixelFormat};
use crate::options::DEFAULT_QUALITY;

/// ASTC codec.
pub struct AstcCodec {
    quality: f32,
}

impl AstcCodec {
    pub fn new() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }
}

impl Default for AstcCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode one LDR void-extent block with the given RGBA8 colour.
///
/// First 64 bits: the void-extent magic (0x1FC), LDR flag and all-ones
/// texel extents; second 64 bits: the colour as four UNORM16 channels.
fn encode_void_extent_block(rgba: [u8; 4]) -> [u8; 16] {
    let mut block = [0u8; 16];
    block[0] = 0xFC;
    block[1] = 0xFD;
    for byte in block.iter_mut().take(8).skip(2) {
        *byte = 0xFF;
    }
    for (i, &channel) in rgba.iter().enumerate() {
        let unorm16 = channel as u16 * 257; // replicate to 16 bits
        block[8 + i * 2..10 + i * 2].copy_from_slice(&unorm16.to_le_bytes());
    }
    block
}

impl Codec for AstcCodec {
    fn codec_type(&self) -> CodecType {
        CodecType::Astc
    }

    fn buffer_type(&self) -> CodecBufferType {
        codec_buffer_type_for_format(PixelFormat::Astc)
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
            _ => ignore_parameter(CodecType::Astc, name),
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
        tracing::debug!(quality = self.quality, "astc void-extent fast path");

        let block_width = dst.block_width().max(1);
        let block_height = dst.block_height().max(1);
        let blocks_wide = dst.blocks_wide();
        let blocks_high = dst.blocks_high();

        for block_y in 0..blocks_high {
            for block_x in 0..blocks_wide {
                // Average colour over the in-image portion of the block.
                let mut sums = [0u32; 4];
                let mut count = 0u32;
                for dy in 0..block_height {
                    for dx in 0..block_width {
                        let x = block_x * block_width + dx;
                        let y = block_y * block_height + dy;
                        if x < src.width() && y < src.height() {
                            let pixel = src.pixel_rgba8(x, y);
                            for c in 0..4 {
                                sums[c] += pixel[c] as u32;
                            }
                            count += 1;
                        }
                    }
                }
                let average = if count == 0 {
                    [0u8; 4]
                } else {
                    [
                        (sums[0] / count) as u8,
                        (sums[1] / count) as u8,
                        (sums[2] / count) as u8,
                        (sums[3] / count) as u8,
                    ]
                };
                if !dst.write_block(block_x, block_y, &encode_void_extent_block(average)) {
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
    fn test_void_extent_magic() {
        let block = encode_void_extent_block([0, 0, 0, 255]);
        assert_eq!(block[0], 0xFC);
        assert_eq!(block[1], 0xFD);
        assert_eq!(&block[2..8], &[0xFF; 6]);
    }

    #[test]
    fn test_void_extent_color_unorm16() {
        let block = encode_void_extent_block([255, 0, 128, 255]);
        assert_eq!(u16::from_le_bytes([block[8], block[9]]), 0xFFFF);
        assert_eq!(u16::from_le_bytes([block[10], block[11]]), 0);
        assert_eq!(u16::from_le_bytes([block[12], block[13]]), 128 * 257);
    }

    #[test]
    fn test_astc_respects_descriptor_block_footprint() {
        let data = vec![200u8; 16 * 16 * 4];
        let mut codec = AstcCodec::new();
        let src = CodecBuffer::new(
            codec_buffer_type_for_format(PixelFormat::Rgba8888),
            8,
            8,
            1,
            16,
            16,
            0,
            &data,
        );
        // 8x8 footprint: 2x2 blocks of 16 bytes.
        let mut out = vec![0u8; 4 * 16];
        let mut dst = codec.create_buffer(8, 8, 1, 16, 16, 0, &mut out);
        assert_eq!(codec.compress(&src, &mut dst, None), CodecOutcome::Ok);
        // Solid input: every block carries the same colour.
        assert_eq!(&out[0..16], &out[16..32]);
        assert_eq!(u16::from_le_bytes([out[8], out[9]]), 200 * 257);
    }
}
