//! Codec capability surface and factory.
//!
//! Every block-compression algorithm plugs in behind the [`Codec`] trait:
//! a string-keyed parameter surface (needed for forward-compatible overflow
//! commands), buffer construction, the native block height used by the
//! row-band dispatcher, and the compress entry point itself.
//!
//! [`create_codec`] is a closed-set factory: `CodecType` is a fixed
//! enumeration, so dispatch is an exhaustive match rather than a dynamic
//! registry.
//!
//! # Concurrency contract
//!
//! `compress` must be safe to invoke concurrently from *independent*
//! instances sharing no mutable state — the parallel dispatcher builds one
//! instance per worker. A feedback callback handed to several concurrently
//! running instances may be invoked concurrently; reentrancy is the
//! caller's responsibility.

mod astc;
mod atc;
mod bc6h;
mod bc7;
mod blocks;
mod buffer;
mod dxtc;
mod etc;
mod transform;

pub use buffer::{CodecBuffer, CodecBufferMut};

use crate::feedback::Feedback;
use crate::format::{CodecBufferType, CodecType};
use tracing::debug;

// =============================================================================
// Outcome and parameters
// =============================================================================

/// Result of a single codec compress run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecOutcome {
    /// Compression completed.
    Ok,
    /// The feedback callback requested cancellation.
    Aborted,
    /// The codec failed for a reason it cannot classify.
    Unknown,
}

/// A typed parameter value for [`Codec::set_parameter`].
///
/// Overflow commands arrive as text; codecs parse numeric text for known
/// numeric parameters, so a text value can override any typed setting
/// (last write wins).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue<'a> {
    U32(u32),
    F32(f32),
    Text(&'a str),
}

impl ParamValue<'_> {
    /// Interpret the value as an unsigned integer, if possible.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            ParamValue::U32(v) => Some(*v),
            ParamValue::F32(v) => Some(*v as u32),
            ParamValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Interpret the value as a float, if possible.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ParamValue::U32(v) => Some(*v as f32),
            ParamValue::F32(v) => Some(*v),
            ParamValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Interpret the value as a boolean (nonzero = true), if possible.
    pub fn as_bool(&self) -> Option<bool> {
        self.as_u32().map(|v| v != 0)
    }
}

// =============================================================================
// Codec trait
// =============================================================================

/// One pluggable block-compression implementation.
///
/// Instances are cheap to construct and owned exclusively by the dispatcher
/// (one per worker on the parallel path); they are never shared across
/// threads.
pub trait Codec: Send {
    /// The codec type this instance implements.
    fn codec_type(&self) -> CodecType;

    /// Storage layout of the destination buffers this codec writes.
    fn buffer_type(&self) -> CodecBufferType;

    /// Apply a named configuration parameter.
    ///
    /// Unrecognized names are tolerated (logged at debug level, otherwise
    /// ignored) — the overflow command list may carry parameters meant for
    /// newer codec revisions.
    fn set_parameter(&mut self, name: &str, value: ParamValue<'_>);

    /// Native row granularity for row banding.
    fn block_height(&self) -> u32 {
        4
    }

    /// Construct a destination buffer view for this codec's output layout.
    #[allow(clippy::too_many_arguments)]
    fn create_buffer<'a>(
        &self,
        block_width: u32,
        block_height: u32,
        block_depth: u32,
        width: u32,
        height: u32,
        pitch: u32,
        data: &'a mut [u8],
    ) -> CodecBufferMut<'a> {
        CodecBufferMut::new(
            self.buffer_type(),
            block_width,
            block_height,
            block_depth,
            width,
            height,
            pitch,
            data,
        )
    }

    /// Compress `src` into `dst`, relaying progress through `feedback`.
    fn compress(
        &mut self,
        src: &CodecBuffer<'_>,
        dst: &mut CodecBufferMut<'_>,
        feedback: Option<&Feedback<'_>>,
    ) -> CodecOutcome;
}

/// Log-and-ignore helper for unrecognized parameter names.
pub(crate) fn ignore_parameter(codec: CodecType, name: &str) {
    debug!(codec = %codec, parameter = name, "ignoring unrecognized codec parameter");
}

// =============================================================================
// Factory
// =============================================================================

/// Construct the codec instance for a codec type.
///
/// Returns `None` for `CodecType::None` (uncompressed layouts never reach
/// the compression path) and `CodecType::Unknown`; the dispatcher maps that
/// to [`CompressError::UnableToInitCodec`].
///
/// [`CompressError::UnableToInitCodec`]: crate::CompressError::UnableToInitCodec
pub fn create_codec(codec_type: CodecType) -> Option<Box<dyn Codec>> {
    use CodecType as Ct;
    match codec_type {
        Ct::Dxt1
        | Ct::Dxt3
        | Ct::Dxt5
        | Ct::Dxt5Xgbr
        | Ct::Dxt5Rxbg
        | Ct::Dxt5Rbxg
        | Ct::Dxt5Xrbg
        | Ct::Dxt5Rgxb
        | Ct::Dxt5Xgxr
        | Ct::Ati1N
        | Ct::Ati2N
        | Ct::Ati2NXy
        | Ct::Ati2NDxt5 => Some(Box::new(dxtc::DxtcCodec::new(codec_type))),
        Ct::AtcRgb | Ct::AtcRgbaExplicit | Ct::AtcRgbaInterpolated => {
            Some(Box::new(atc::AtcCodec::new(codec_type)))
        }
        Ct::EtcRgb | Ct::Etc2Rgb => Some(Box::new(etc::EtcCodec::new(codec_type))),
        Ct::Bc6H | Ct::Bc6HSf => Some(Box::new(bc6h::Bc6hCodec::new(codec_type))),
        Ct::Bc7 => Some(Box::new(bc7::Bc7Codec::new())),
        Ct::Astc => Some(Box::new(astc::AstcCodec::new())),
        Ct::GenericTransform => Some(Box::new(transform::TransformCodec::new())),
        Ct::None | Ct::Unknown => None,
    }
}
