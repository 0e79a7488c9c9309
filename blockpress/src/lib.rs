//! Blockpress — texture block-compression dispatch engine.
//!
//! Given an uncompressed image buffer and a target block-compression format
//! (DXT1/3/5, ATI1N/2N, BC6H, BC7, ASTC, ATC, ETC and friends), blockpress
//! resolves the matching codec, configures it from caller options, validates
//! both buffer descriptors and drives compression — splitting the image into
//! block-aligned row bands compressed concurrently by a bounded worker pool
//! when the codec allows it.
//!
//! # Example
//!
//! ```
//! use blockpress::{
//!     compress_texture, compute_buffer_size, PixelFormat, TextureDescriptor,
//! };
//!
//! let src = TextureDescriptor::new(16, 16, PixelFormat::Rgba8888);
//! let src_data = vec![0u8; src.min_buffer_size()];
//!
//! let dst = TextureDescriptor::new(16, 16, PixelFormat::Dxt1);
//! let mut dst_data = vec![0u8; dst.min_buffer_size()];
//!
//! compress_texture(&src, &src_data, &dst, &mut dst_data, None, None).unwrap();
//! assert_eq!(dst_data.len(), compute_buffer_size(PixelFormat::Dxt1, 16, 16, 0, 4, 4));
//! ```
//!
//! # Architecture
//!
//! ```text
//! caller ──> validate(src), validate(dst)
//!               │
//!               ▼
//!        format registry ──> codec factory ──> option translator
//!               │
//!               ▼
//!   sequential dispatcher ─ or ─ row-band dispatcher (scoped workers)
//!               │                        │
//!               └────────> codec.compress per buffer pair <──┘
//!                                 │
//!                                 ▼
//!                       outcome ──> public result
//! ```
//!
//! All state is call-scoped: no globals, no persistence, no worker reuse
//! across calls.

pub mod codec;
pub mod dispatch;
pub mod error;
pub mod feedback;
pub mod format;
pub mod logging;
pub mod options;
pub mod texture;

pub use dispatch::{compress_texture, MAX_WORKERS};
pub use error::CompressError;
pub use feedback::Feedback;
pub use format::{
    codec_buffer_type_for_format, codec_type_for_format, CodecBufferType, CodecType, PixelFormat,
};
pub use options::{
    CompressOptions, CompressionSpeed, ExtraCommand, DEFAULT_QUALITY, MAX_EXTRA_COMMANDS,
    MINIMUM_WEIGHT_VALUE,
};
pub use texture::{compute_buffer_size, validate_texture, TextureDescriptor, TextureRole};
