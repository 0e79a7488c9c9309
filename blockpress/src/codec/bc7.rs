//! BC7 codec backed by the ISPC texture-compression kernels.
//!
//! Unlike the rest of the family this codec manages its own parallelism:
//! the MultiThreading/NumThreads parameters split the image into row chunks
//! compressed on scoped worker threads inside `compress`. That is exactly
//! why the row-band dispatcher never bands BC7 — doing both would
//! oversubscribe the machine for no benefit.

use crate::codec::{ignore_parameter, Codec, CodecBuffer, CodecBufferMut, CodecOutcome, ParamValue};
use crate::feedback::Feedback;
use crate::format::{codec_buffer_type_for_format, CodecBufferType, CodecType, PixelFormat};
use crate::options::DEFAULT_QUALITY;
use intel_tex_2::{bc7, RgbaSurface};
use tracing::debug;

/// BC7 codec.
pub struct Bc7Codec {
    quality: f32,
    multithreading: bool,
    num_threads: u32,
    mode_mask: u32,
    restrict_colour: bool,
    restrict_alpha: bool,
}

impl Bc7Codec {
    pub fn new() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            multithreading: true,
            num_threads: 0,
            mode_mask: 0xFF,
            restrict_colour: false,
            restrict_alpha: false,
        }
    }

    fn settings(&self) -> bc7::EncodeSettings {
        // Alpha-restricted encodes skip the alpha planes entirely and use
        // the opaque presets.
        if self.restrict_alpha {
            match self.quality {
                q if q < 0.2 => bc7::opaque_ultra_fast_settings(),
                q if q < 0.4 => bc7::opaque_very_fast_settings(),
                q if q < 0.6 => bc7::opaque_fast_settings(),
                q if q < 0.85 => bc7::opaque_basic_settings(),
                _ => bc7::opaque_slow_settings(),
            }
        } else {
            match self.quality {
                q if q < 0.2 => bc7::alpha_ultra_fast_settings(),
                q if q < 0.4 => bc7::alpha_very_fast_settings(),
                q if q < 0.6 => bc7::alpha_fast_settings(),
                q if q < 0.85 => bc7::alpha_basic_settings(),
                _ => bc7::alpha_slow_settings(),
            }
        }
    }

    fn worker_count(&self, block_rows: u32) -> u32 {
        if !self.multithreading {
            return 1;
        }
        let requested = if self.num_threads == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get() as u32)
                .unwrap_or(1)
        } else {
            self.num_threads
        };
        requested.clamp(1, block_rows.max(1))
    }
}

impl Default for Bc7Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for Bc7Codec {
    fn codec_type(&self) -> CodecType {
        CodecType::Bc7
    }

    fn buffer_type(&self) -> CodecBufferType {
        codec_buffer_type_for_format(PixelFormat::Bc7)
    }

    fn set_parameter(&mut self, name: &str, value: ParamValue<'_>) {
        match name {
            "Quality" => {
                if let Some(v) = value.as_f32() {
                    self.quality = v.clamp(0.0, 1.0);
                }
            }
            "MultiThreading" => {
                if let Some(v) = value.as_bool() {
                    self.multithreading = v;
                }
            }
            "NumThreads" => {
                if let Some(v) = value.as_u32() {
                    self.num_threads = v;
                }
            }
            "ModeMask" => {
                if let Some(v) = value.as_u32() {
                    self.mode_mask = v;
                }
            }
            "ColourRestrict" => {
                if let Some(v) = value.as_bool() {
                    self.restrict_colour = v;
                }
            }
            "AlphaRestrict" => {
                if let Some(v) = value.as_bool() {
                    self.restrict_alpha = v;
                }
            }
            "CompressionSpeed" | "UseChannelWeighting" | "WeightR" | "WeightG" | "WeightB"
            | "UseAdaptiveWeighting" | "DXT1UseAlpha" | "AlphaThreshold" => {}
            _ => ignore_parameter(CodecType::Bc7, name),
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
        if let Some(feedback) = feedback {
            if feedback.report(0.0) {
                return CodecOutcome::Aborted;
            }
        }

        // Assemble a padded RGBA8 surface (whole 4x4 blocks).
        let width = dst.width().div_ceil(4) * 4;
        let height = dst.height().div_ceil(4) * 4;
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&src.pixel_rgba8(x, y));
            }
        }

        let settings = self.settings();
        let block_rows = height / 4;
        let workers = self.worker_count(block_rows);
        debug!(
            quality = self.quality,
            mode_mask = self.mode_mask,
            restrict_colour = self.restrict_colour,
            restrict_alpha = self.restrict_alpha,
            workers,
            "bc7 kernel settings resolved"
        );
        let bytes_per_block_row = (width / 4) as usize * 16;
        let out = dst.data_mut();
        let needed = block_rows as usize * bytes_per_block_row;
        if out.len() < needed {
            return CodecOutcome::Unknown;
        }

        if workers <= 1 {
            let surface = RgbaSurface {
                width,
                height,
                stride: width * 4,
                data: &pixels,
            };
            let blocks = bc7::compress_blocks(&settings, &surface);
            out[..blocks.len()].copy_from_slice(&blocks);
        } else {
            // Split into contiguous block-row chunks, one worker each. Each
            // chunk is an independent surface over the shared pixel buffer
            // and a disjoint slice of the destination.
            let chunk_block_rows = block_rows.div_ceil(workers);
            let settings = &settings;
            std::thread::scope(|scope| {
                let mut rest = &mut out[..needed];
                let mut row = 0u32;
                while row < block_rows {
                    let rows = chunk_block_rows.min(block_rows - row);
                    let (chunk_out, tail) = std::mem::take(&mut rest)
                        .split_at_mut(rows as usize * bytes_per_block_row);
                    rest = tail;
                    let chunk_pixels = &pixels[(row * 4) as usize * (width * 4) as usize..];
                    scope.spawn(move || {
                        let surface = RgbaSurface {
                            width,
                            height: rows * 4,
                            stride: width * 4,
                            data: chunk_pixels,
                        };
                        let blocks = bc7::compress_blocks(settings, &surface);
                        chunk_out[..blocks.len()].copy_from_slice(&blocks);
                    });
                    row += rows;
                }
            });
        }

        if let Some(feedback) = feedback {
            if feedback.report(100.0) {
                return CodecOutcome::Aborted;
            }
        }
        CodecOutcome::Ok
    }
}
