//! ETC1 / ETC2 codec.
//!
//! Single-mode ETC1 encoder: every 4x4 block is encoded in differential
//! mode with one base colour (the block average, quantized to RGB555) shared
//! by both sub-blocks, a per-sub-block modifier table chosen from the
//! luminance spread, and per-pixel modifier indices. ETC2_RGB emits the
//! ETC1-compatible subset, which every ETC2 decoder accepts unchanged.
//!
//! ETC1 packs pixel indices column-major and the index planes big-endian;
//! see the bit layout notes on [`encode_etc1_block`].

use crate::codec::{ignore_parameter, Codec, CodecBuffer, CodecBufferMut, CodecOutcome, ParamValue};
use crate::feedback::Feedback;
use crate::format::{codec_buffer_type_for_format, CodecBufferType, CodecType, PixelFormat};

/// ETC1 modifier tables, one `[small, large]` magnitude pair per codeword.
const MODIFIER_TABLES: [[i32; 2]; 8] = [
    [2, 8],
    [5, 17],
    [9, 29],
    [13, 42],
    [18, 60],
    [24, 80],
    [33, 106],
    [47, 183],
];

/// ETC_RGB / ETC2_RGB codec.
pub struct EtcCodec {
    codec_type: CodecType,
}

impl EtcCodec {
    pub fn new(codec_type: CodecType) -> Self {
        Self { codec_type }
    }
}

/// Encode a 4x4 RGBA block as an 8-byte ETC1 block.
///
/// Layout (differential mode, flip bit clear — sub-blocks are the left and
/// right 2x4 halves):
///
/// - byte 0..2: base colour R/G/B, 5 bits each, plus a zero 3-bit delta
/// - byte 3: table0 (3 bits) | table1 (3 bits) | diff bit (1) | flip bit (0)
/// - byte 4..7: two 16-bit index planes (most-significant bit plane first),
///   big-endian, pixels ordered column-major
fn encode_etc1_block(pixels: &[[u8; 4]; 16]) -> [u8; 8] {
    // Base colour: block average quantized to 555.
    let mut sums = [0u32; 3];
    for pixel in pixels {
        for c in 0..3 {
            sums[c] += pixel[c] as u32;
        }
    }
    let base = [
        (sums[0] / 16) as u8 >> 3,
        (sums[1] / 16) as u8 >> 3,
        (sums[2] / 16) as u8 >> 3,
    ];
    let base888 = [
        (base[0] << 3) | (base[0] >> 2),
        (base[1] << 3) | (base[1] >> 2),
        (base[2] << 3) | (base[2] >> 2),
    ];
    let base_luma =
        (base888[0] as i32 * 299 + base888[1] as i32 * 587 + base888[2] as i32 * 114) / 1000;

    // Per-pixel luminance deltas against the base, column-major order as
    // ETC1 indexes pixels.
    let mut deltas = [0i32; 16];
    for x in 0..4 {
        for y in 0..4 {
            let pixel = &pixels[y * 4 + x];
            let luma =
                (pixel[0] as i32 * 299 + pixel[1] as i32 * 587 + pixel[2] as i32 * 114) / 1000;
            deltas[x * 4 + y] = luma - base_luma;
        }
    }

    // Pick one modifier table per 2x4 sub-block from the mean absolute
    // delta.
    let table_for = |range: std::ops::Range<usize>| -> usize {
        let mean: i32 =
            deltas[range.clone()].iter().map(|d| d.abs()).sum::<i32>() / range.len() as i32;
        let mut best = 0;
        let mut best_err = i32::MAX;
        for (idx, table) in MODIFIER_TABLES.iter().enumerate() {
            let err = (table[0] - mean).abs().min((table[1] - mean).abs());
            if err < best_err {
                best_err = err;
                best = idx;
            }
        }
        best
    };
    let table0 = table_for(0..8);
    let table1 = table_for(8..16);

    // Per-pixel 2-bit index: sign bit plane plus magnitude plane.
    let mut msb_plane: u16 = 0;
    let mut lsb_plane: u16 = 0;
    for (i, &delta) in deltas.iter().enumerate() {
        let table = MODIFIER_TABLES[if i < 8 { table0 } else { table1 }];
        let mut best_bits = (0u16, 0u16);
        let mut best_err = i32::MAX;
        for (msb, lsb, modifier) in [
            (0u16, 0u16, table[0]),
            (0, 1, table[1]),
            (1, 0, -table[0]),
            (1, 1, -table[1]),
        ] {
            let err = (delta - modifier).abs();
            if err < best_err {
                best_err = err;
                best_bits = (msb, lsb);
            }
        }
        msb_plane |= best_bits.0 << i;
        lsb_plane |= best_bits.1 << i;
    }

    let mut output = [0u8; 8];
    output[0] = base[0] << 3; // delta bits zero
    output[1] = base[1] << 3;
    output[2] = base[2] << 3;
    output[3] = ((table0 as u8) << 5) | ((table1 as u8) << 2) | 0b10; // diff=1, flip=0
    output[4..6].copy_from_slice(&msb_plane.to_be_bytes());
    output[6..8].copy_from_slice(&lsb_plane.to_be_bytes());
    output
}

impl Codec for EtcCodec {
    fn codec_type(&self) -> CodecType {
        self.codec_type
    }

    fn buffer_type(&self) -> CodecBufferType {
        let format = match self.codec_type {
            CodecType::EtcRgb => PixelFormat::EtcRgb,
            _ => PixelFormat::Etc2Rgb,
        };
        codec_buffer_type_for_format(format)
    }

    fn set_parameter(&mut self, name: &str, value: ParamValue<'_>) {
        let _ = value;
        match name {
            // Accepted for interface compatibility; the single-mode encoder
            // has no speed levers.
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
        if !src.supports_rgba8() {
            return CodecOutcome::Unknown;
        }

        let blocks_wide = dst.blocks_wide();
        let blocks_high = dst.blocks_high();

        for block_y in 0..blocks_high {
            for block_x in 0..blocks_wide {
                let block = src.read_block_rgba8(block_x, block_y);
                let encoded = encode_etc1_block(&block);
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
