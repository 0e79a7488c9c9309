//! ATC (ATI Texture Compression) codec family.
//!
//! ATC colour blocks look like DXT colour blocks with asymmetric endpoint
//! precision: the first endpoint is stored as RGB555 (top bit clear), the
//! second as RGB565. The RGBA variants prepend the same explicit or
//! interpolated alpha block DXT3/DXT5 use.

use crate::codec::blocks::{
    adaptive_weights, encode_explicit_alpha_block, encode_interpolated_alpha_block,
    extract_channel, ColorWeights,
};
use crate::codec::{ignore_parameter, Codec, CodecBuffer, CodecBufferMut, CodecOutcome, ParamValue};
use crate::feedback::Feedback;
use crate::format::{codec_buffer_type_for_format, CodecBufferType, CodecType, PixelFormat};

/// ATC_RGB / ATC_RGBA_Explicit / ATC_RGBA_Interpolated codec.
pub struct AtcCodec {
    codec_type: CodecType,
    use_channel_weighting: bool,
    weight_r: f32,
    weight_g: f32,
    weight_b: f32,
    use_adaptive_weighting: bool,
}

impl AtcCodec {
    pub fn new(codec_type: CodecType) -> Self {
        Self {
            codec_type,
            use_channel_weighting: false,
            weight_r: 0.0,
            weight_g: 0.0,
            weight_b: 0.0,
            use_adaptive_weighting: false,
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

    fn encode_block(&self, pixels: &[[u8; 4]; 16], output: &mut Vec<u8>) {
        match self.codec_type {
            CodecType::AtcRgbaExplicit => {
                let alpha = extract_channel(pixels, 3);
                output.extend_from_slice(&encode_explicit_alpha_block(&alpha));
            }
            CodecType::AtcRgbaInterpolated => {
                let alpha = extract_channel(pixels, 3);
                output.extend_from_slice(&encode_interpolated_alpha_block(&alpha));
            }
            _ => {}
        }
        output.extend_from_slice(&encode_atc_color_block(pixels, &self.weights_for(pixels)));
    }
}

/// Encode a 4x4 block as an 8-byte ATC colour block.
fn encode_atc_color_block(pixels: &[[u8; 4]; 16], weights: &ColorWeights) -> [u8; 8] {
    let mut min = [255u8; 3];
    let mut max = [0u8; 3];
    for pixel in pixels {
        for c in 0..3 {
            min[c] = min[c].min(pixel[c]);
            max[c] = max[c].max(pixel[c]);
        }
    }

    // Endpoint 0: RGB555 with the mode bit clear. Endpoint 1: RGB565.
    let c0 = rgb888_to_rgb555(min[0], min[1], min[2]);
    let c1 = crate::codec::blocks::rgb888_to_rgb565(max[0], max[1], max[2]);

    let rgb0 = rgb555_to_rgb888(c0);
    let rgb1 = crate::codec::blocks::rgb565_to_rgb888(c1);
    let palette = [
        rgb0,
        mix_thirds(&rgb0, &rgb1, 1),
        mix_thirds(&rgb0, &rgb1, 2),
        rgb1,
    ];

    let mut indices: u32 = 0;
    for (i, pixel) in pixels.iter().enumerate() {
        let mut best = 0u8;
        let mut best_dist = f32::MAX;
        for (idx, pal) in palette.iter().enumerate() {
            let dist = weights.distance(pixel, pal);
            if dist < best_dist {
                best_dist = dist;
                best = idx as u8;
            }
        }
        indices |= (best as u32) << (i * 2);
    }

    let mut output = [0u8; 8];
    output[0..2].copy_from_slice(&c0.to_le_bytes());
    output[2..4].copy_from_slice(&c1.to_le_bytes());
    output[4..8].copy_from_slice(&indices.to_le_bytes());
    output
}

fn rgb888_to_rgb555(r: u8, g: u8, b: u8) -> u16 {
    let r5 = (r >> 3) as u16;
    let g5 = (g >> 3) as u16;
    let b5 = (b >> 3) as u16;
    (r5 << 10) | (g5 << 5) | b5
}

fn rgb555_to_rgb888(color: u16) -> [u8; 3] {
    let r5 = (color >> 10) & 0x1F;
    let g5 = (color >> 5) & 0x1F;
    let b5 = color & 0x1F;
    [
        ((r5 << 3) | (r5 >> 2)) as u8,
        ((g5 << 3) | (g5 >> 2)) as u8,
        ((b5 << 3) | (b5 >> 2)) as u8,
    ]
}

fn mix_thirds(a: &[u8; 3], b: &[u8; 3], t: u16) -> [u8; 3] {
    [
        (((3 - t) * a[0] as u16 + t * b[0] as u16) / 3) as u8,
        (((3 - t) * a[1] as u16 + t * b[1] as u16) / 3) as u8,
        (((3 - t) * a[2] as u16 + t * b[2] as u16) / 3) as u8,
    ]
}

impl Codec for AtcCodec {
    fn codec_type(&self) -> CodecType {
        self.codec_type
    }

    fn buffer_type(&self) -> CodecBufferType {
        let format = match self.codec_type {
            CodecType::AtcRgb => PixelFormat::AtcRgb,
            CodecType::AtcRgbaExplicit => PixelFormat::AtcRgbaExplicit,
            _ => PixelFormat::AtcRgbaInterpolated,
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
            // Accepted for interface compatibility; the single-mode search
            // has no speed/quality levers.
            "CompressionSpeed" | "DXT1UseAlpha" | "AlphaThreshold" => {}
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
        let mut encoded = Vec::with_capacity(dst.bytes_per_block());

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
