//! Compression dispatch: validation, codec resolution, sequential and
//! parallel execution, outcome mapping.
//!
//! Control flow for a [`compress_texture`] call:
//!
//! ```text
//! validate(src) ── validate(dst) ── resolve codec type
//!        │
//!        ├── parallel eligible? ──> row-band dispatcher (one codec + buffer
//!        │                          pair per worker, scoped joins)
//!        └── otherwise ──────────> sequential (one codec, full-image pair)
//!                                        │
//!                              outcome ── map to public result
//! ```
//!
//! Everything is call-scoped: codecs, buffers and worker handles are created
//! fresh per call and torn down before return on every path.

pub(crate) mod banding;

use crate::codec::{create_codec, CodecBuffer, CodecOutcome};
use crate::error::CompressError;
use crate::feedback::Feedback;
use crate::format::{codec_buffer_type_for_format, codec_type_for_format, CodecType};
use crate::options::{configure_codec, CompressOptions};
use crate::texture::{validate_texture, TextureDescriptor, TextureRole};
use tracing::debug;

/// Upper bound on row-band workers regardless of detected hardware
/// concurrency.
pub const MAX_WORKERS: usize = 64;

/// Compress a source texture into a caller-allocated destination buffer.
///
/// The destination descriptor selects the target format; its buffer must be
/// pre-sized via [`compute_buffer_size`]. `options` tunes the codec (see
/// [`CompressOptions`]); `feedback` receives progress and may cancel.
///
/// When the feedback callback is shared across row-band workers it may be
/// invoked concurrently; it must be reentrant. The two user tokens pass
/// through unchanged.
///
/// [`compute_buffer_size`]: crate::compute_buffer_size
pub fn compress_texture(
    src: &TextureDescriptor,
    src_data: &[u8],
    dst: &TextureDescriptor,
    dst_data: &mut [u8],
    options: Option<&CompressOptions>,
    feedback: Option<Feedback<'_>>,
) -> Result<(), CompressError> {
    validate_texture(src, src_data, TextureRole::Source)?;
    validate_texture(dst, dst_data, TextureRole::Destination)?;

    let codec_type = codec_type_for_format(dst.format);
    let workers = effective_worker_count(options);

    if workers > 1 && codec_type.supports_row_banding() {
        debug!(codec = %codec_type, workers, "dispatching row-banded compression");
        banding::compress_banded(
            src,
            src_data,
            dst,
            dst_data,
            options,
            feedback.as_ref(),
            codec_type,
            workers,
        )
    } else {
        debug!(codec = %codec_type, "dispatching sequential compression");
        compress_sequential(
            src,
            src_data,
            dst,
            dst_data,
            options,
            feedback.as_ref(),
            codec_type,
        )
    }
}

/// Worker budget for this call: detected hardware concurrency (queried per
/// call — it can change under virtualization) capped by [`MAX_WORKERS`] and
/// by the caller's explicit thread count.
fn effective_worker_count(options: Option<&CompressOptions>) -> usize {
    let opts = options.filter(|o| o.size_tag == CompressOptions::SIZE_TAG);
    if let Some(opts) = opts {
        if opts.disable_multithreading {
            return 1;
        }
    }
    let hardware = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    let mut workers = hardware.min(MAX_WORKERS);
    if let Some(opts) = opts {
        if opts.thread_count != 0 {
            workers = workers.min(opts.thread_count as usize);
        }
    }
    workers.max(1)
}

/// Single-threaded path: one codec, one buffer pair spanning the image.
fn compress_sequential(
    src: &TextureDescriptor,
    src_data: &[u8],
    dst: &TextureDescriptor,
    dst_data: &mut [u8],
    options: Option<&CompressOptions>,
    feedback: Option<&Feedback<'_>>,
    codec_type: CodecType,
) -> Result<(), CompressError> {
    let mut codec = create_codec(codec_type).ok_or(CompressError::UnableToInitCodec)?;
    configure_codec(codec.as_mut(), options, codec_type);

    let src_buffer = CodecBuffer::new(
        codec_buffer_type_for_format(src.format),
        src.block_width,
        src.block_height,
        src.block_depth,
        src.width,
        src.height,
        src.pitch,
        src_data,
    );
    let mut dst_buffer = codec.create_buffer(
        dst.block_width,
        dst.block_height,
        dst.block_depth,
        dst.width,
        dst.height,
        dst.pitch,
        dst_data,
    );

    let outcome = codec.compress(&src_buffer, &mut dst_buffer, feedback);
    map_outcome(outcome)
}

/// Map an internal codec outcome to the public result (error code mapper).
///
/// Unknown or future outcome values map to [`CompressError::Generic`] —
/// nothing unclassified ever reads as success.
pub(crate) fn map_outcome(outcome: CodecOutcome) -> Result<(), CompressError> {
    match outcome {
        CodecOutcome::Ok => Ok(()),
        CodecOutcome::Aborted => Err(CompressError::Aborted),
        CodecOutcome::Unknown => Err(CompressError::Generic),
    }
}

/// Reduce per-worker outcomes to a single outcome.
///
/// The first non-ok outcome in worker-index order wins and is sticky: an
/// Aborted band is never overwritten by a later Ok from a sibling.
pub(crate) fn reduce_outcomes(outcomes: &[CodecOutcome]) -> CodecOutcome {
    outcomes
        .iter()
        .copied()
        .find(|outcome| *outcome != CodecOutcome::Ok)
        .unwrap_or(CodecOutcome::Ok)
}
