//! Parallel row-band dispatcher.
//!
//! The image is split into horizontal bands, each a multiple of the codec's
//! native block height (except possibly the tail), and each band runs on its
//! own worker thread with an independently configured codec instance and a
//! disjoint pair of source/destination windows.
//!
//! Band geometry is the highest-risk arithmetic in the engine: a wrong byte
//! offset would mean two workers writing the same destination range. The
//! windows are produced by `split_at`/`split_at_mut`, so the partition is
//! compiler-enforced — but the *sizes* feeding those splits must still be
//! exact, which is why they come from the same [`compute_buffer_size`]
//! used by validation, evaluated with each band's actual row count.

use crate::codec::{create_codec, CodecBuffer, CodecOutcome};
use crate::error::CompressError;
use crate::feedback::Feedback;
use crate::format::{codec_buffer_type_for_format, CodecType};
use crate::options::{configure_codec, CompressOptions};
use crate::texture::{compute_buffer_size, TextureDescriptor};
use tracing::debug;

use super::{map_outcome, reduce_outcomes};

/// One worker's slice of the image. Ephemeral: computed per call, dropped at
/// call end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RowBand {
    /// Index of the owning worker (also the reduction order).
    pub worker_index: usize,
    /// Rows in this band; a positive multiple of the codec block height for
    /// every band except the last non-empty one.
    pub rows: u32,
    /// Byte offset of this band in the source buffer.
    pub src_offset: usize,
    /// Byte offset of this band in the destination buffer.
    pub dst_offset: usize,
}

/// Distribute `height` rows over up to `workers` bands.
///
/// Each band except the last gets the fair share of the remaining rows
/// rounded *up* to the next block-height multiple (capped at what remains);
/// the final band absorbs the tail. Entries may be zero when there are more
/// workers than block rows; callers skip those.
pub(crate) fn band_row_counts(height: u32, block_height: u32, workers: usize) -> Vec<u32> {
    debug_assert!(block_height > 0, "codec block height must be nonzero");
    let block_height = block_height.max(1);
    let mut counts = Vec::with_capacity(workers);
    let mut remaining = height;
    for index in 0..workers {
        let workers_left = (workers - index) as u32;
        let rows = if workers_left > 1 {
            let fair_share = remaining / workers_left;
            let rounded = fair_share.div_ceil(block_height) * block_height;
            rounded.min(remaining)
        } else {
            remaining
        };
        counts.push(rows);
        remaining -= rows;
    }
    counts
}

/// Lay out the non-empty bands with exact byte offsets.
///
/// The offset of band `i` is the sum of the buffer sizes of bands `0..i`,
/// computed from each band's *actual* row count — never an estimate, so the
/// windows neither overlap nor leave gaps.
pub(crate) fn plan_bands(
    src: &TextureDescriptor,
    dst: &TextureDescriptor,
    block_height: u32,
    workers: usize,
) -> Vec<RowBand> {
    let counts = band_row_counts(dst.height, block_height, workers);
    let mut bands = Vec::with_capacity(counts.len());
    let mut src_offset = 0usize;
    let mut dst_offset = 0usize;
    for (worker_index, rows) in counts.into_iter().enumerate() {
        if rows == 0 {
            continue;
        }
        bands.push(RowBand {
            worker_index,
            rows,
            src_offset,
            dst_offset,
        });
        src_offset += compute_buffer_size(
            src.format,
            src.width,
            rows,
            src.pitch,
            src.block_width,
            src.block_height,
        );
        dst_offset += compute_buffer_size(
            dst.format,
            dst.width,
            rows,
            dst.pitch,
            dst.block_width,
            dst.block_height,
        );
    }
    bands
}

/// Row-banded parallel compression.
///
/// One codec instance per worker, each fully configured through the option
/// translator; scoped spawn/join-all; outcomes reduced in worker-index
/// order. A worker that panics reduces as `Unknown` — its siblings keep
/// their buffers and join normally.
#[allow(clippy::too_many_arguments)]
pub(super) fn compress_banded(
    src: &TextureDescriptor,
    src_data: &[u8],
    dst: &TextureDescriptor,
    dst_data: &mut [u8],
    options: Option<&CompressOptions>,
    feedback: Option<&Feedback<'_>>,
    codec_type: CodecType,
    workers: usize,
) -> Result<(), CompressError> {
    // Construct and configure every codec before any worker spawns: a
    // factory failure must abort with zero side effects.
    let mut codecs = Vec::with_capacity(workers);
    for _ in 0..workers {
        let mut codec = create_codec(codec_type).ok_or(CompressError::UnableToInitCodec)?;
        configure_codec(codec.as_mut(), options, codec_type);
        codecs.push(codec);
    }

    let block_height = codecs[0].block_height();
    let bands = plan_bands(src, dst, block_height, workers);
    debug!(
        codec = %codec_type,
        bands = bands.len(),
        block_height,
        height = dst.height,
        "row bands planned"
    );

    let src_type = codec_buffer_type_for_format(src.format);
    let outcomes: Vec<CodecOutcome> = std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(bands.len());
        let mut src_rest = src_data;
        let mut dst_rest = dst_data;
        let mut src_consumed = 0usize;
        let mut dst_consumed = 0usize;
        for (band, mut codec) in bands.iter().zip(codecs) {
            // The windows handed out so far must land exactly on this
            // band's planned offsets.
            debug_assert_eq!(band.src_offset, src_consumed);
            debug_assert_eq!(band.dst_offset, dst_consumed);

            let src_len = compute_buffer_size(
                src.format,
                src.width,
                band.rows,
                src.pitch,
                src.block_width,
                src.block_height,
            );
            let dst_len = compute_buffer_size(
                dst.format,
                dst.width,
                band.rows,
                dst.pitch,
                dst.block_width,
                dst.block_height,
            );
            let (src_band, rest) = src_rest.split_at(src_len);
            src_rest = rest;
            let (dst_band, rest) = std::mem::take(&mut dst_rest).split_at_mut(dst_len);
            dst_rest = rest;
            src_consumed += src_len;
            dst_consumed += dst_len;

            let rows = band.rows;
            let worker_index = band.worker_index;
            handles.push(scope.spawn(move || {
                tracing::trace!(worker_index, rows, "row-band worker running");
                let src_buffer = CodecBuffer::new(
                    src_type,
                    src.block_width,
                    src.block_height,
                    src.block_depth,
                    src.width,
                    rows,
                    src.pitch,
                    src_band,
                );
                let mut dst_buffer = codec.create_buffer(
                    dst.block_width,
                    dst.block_height,
                    dst.block_depth,
                    dst.width,
                    rows,
                    dst.pitch,
                    dst_band,
                );
                codec.compress(&src_buffer, &mut dst_buffer, feedback)
            }));
        }
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(CodecOutcome::Unknown))
            .collect()
    });

    map_outcome(reduce_outcomes(&outcomes))
}
