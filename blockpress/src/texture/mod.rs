//! Texture descriptors, buffer-size computation and validation.
//!
//! A [`TextureDescriptor`] describes a caller-owned pixel buffer; the pixel
//! data itself travels beside the descriptor as a plain byte slice. Before
//! any codec work the dispatcher runs both descriptors through
//! [`validate_texture`], which checks structural correctness (layout version
//! tag, dimensions, pitch, format, minimum buffer size) and tags failures
//! with the buffer's role so callers can tell source problems from
//! destination problems.
//!
//! [`compute_buffer_size`] is the single source of truth for "how many bytes
//! does this image occupy" — validation uses it for the lower-bound check
//! and the parallel dispatcher uses it for per-band byte offsets, so the two
//! can never disagree.

use crate::error::CompressError;
use crate::format::PixelFormat;

// =============================================================================
// Descriptor
// =============================================================================

/// Descriptor for a texture buffer handed to the compression engine.
///
/// The `size_tag` field versions the descriptor layout: constructors fill it
/// with [`TextureDescriptor::SIZE_TAG`] and validation rejects any other
/// value, so a caller built against a stale layout fails loudly instead of
/// being misinterpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// Layout version tag; must equal [`TextureDescriptor::SIZE_TAG`].
    pub size_tag: u32,
    /// Width in pixels. Must be nonzero.
    pub width: u32,
    /// Height in pixels. Must be nonzero.
    pub height: u32,
    /// Bytes per row for uncompressed layouts; 0 means tightly packed.
    pub pitch: u32,
    /// Pixel/block layout of the data.
    pub format: PixelFormat,
    /// Block width for block-compressed layouts (normally 4).
    pub block_width: u32,
    /// Block height for block-compressed layouts (normally 4).
    pub block_height: u32,
    /// Block depth for block-compressed layouts (normally 1).
    pub block_depth: u32,
}

impl TextureDescriptor {
    /// Current layout version tag.
    pub const SIZE_TAG: u32 = std::mem::size_of::<TextureDescriptor>() as u32;

    /// Create a descriptor with a tightly packed buffer and default 4x4x1
    /// block dimensions.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            size_tag: Self::SIZE_TAG,
            width,
            height,
            pitch: 0,
            format,
            block_width: 4,
            block_height: 4,
            block_depth: 1,
        }
    }

    /// Minimum data buffer size in bytes for this descriptor.
    pub fn min_buffer_size(&self) -> usize {
        compute_buffer_size(
            self.format,
            self.width,
            self.height,
            self.pitch,
            self.block_width,
            self.block_height,
        )
    }
}

/// Whether a texture acts as compression input or output.
///
/// Validation rules are identical for both roles; the role only selects
/// which error variant a failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureRole {
    Source,
    Destination,
}

impl TextureRole {
    fn invalid_texture(self) -> CompressError {
        match self {
            TextureRole::Source => CompressError::InvalidSourceTexture,
            TextureRole::Destination => CompressError::InvalidDestTexture,
        }
    }

    fn unsupported_format(self) -> CompressError {
        match self {
            TextureRole::Source => CompressError::UnsupportedSourceFormat,
            TextureRole::Destination => CompressError::UnsupportedDestFormat,
        }
    }
}

// =============================================================================
// Buffer size computation
// =============================================================================

/// Compute the byte size of an image buffer.
///
/// Pure function shared by descriptor validation and row-band offset
/// accumulation. For uncompressed layouts a nonzero `pitch` overrides the
/// natural row stride; block layouts ignore `pitch` and round dimensions up
/// to whole blocks. Unknown formats (and zero block dimensions) yield 0,
/// which the validator then rejects via its other checks.
pub fn compute_buffer_size(
    format: PixelFormat,
    width: u32,
    height: u32,
    pitch: u32,
    block_width: u32,
    block_height: u32,
) -> usize {
    if let Some(bytes_per_pixel) = format.bytes_per_pixel() {
        let row = if pitch != 0 {
            pitch as usize
        } else {
            width as usize * bytes_per_pixel as usize
        };
        return row * height as usize;
    }

    if let Some(bytes_per_block) = format.bytes_per_block() {
        if block_width == 0 || block_height == 0 {
            return 0;
        }
        let blocks_wide = width.div_ceil(block_width) as usize;
        let blocks_high = height.div_ceil(block_height) as usize;
        return blocks_wide * blocks_high * bytes_per_block as usize;
    }

    0
}

// =============================================================================
// Validation
// =============================================================================

/// Debug assertion mirroring a validation predicate.
///
/// Compiled in only with the `strict-asserts` feature so that the error
/// contract stays testable; with the feature on, a failing predicate aborts
/// in debug builds before the error is returned.
#[cfg(feature = "strict-asserts")]
macro_rules! contract_assert {
    ($($args:tt)*) => {
        debug_assert!($($args)*)
    };
}

#[cfg(not(feature = "strict-asserts"))]
macro_rules! contract_assert {
    ($($args:tt)*) => {};
}

/// Validate a texture descriptor and its data buffer for the given role.
///
/// Checks run in order and short-circuit on the first failure:
///
/// 1. layout version tag matches the current descriptor layout,
/// 2. width and height are nonzero,
/// 3. the format is known,
/// 4. a caller-specified pitch on a 4-byte-per-pixel packed layout
///    (`Argb8888`, `Argb2101010`) covers at least `width * 4` bytes,
/// 5. the data buffer is non-empty,
/// 6. the data buffer meets the computed minimum size.
///
/// With the `strict-asserts` feature each failing predicate additionally
/// fires a debug assertion before returning, to aid integration testing;
/// the error return is the contract either way.
pub fn validate_texture(
    descriptor: &TextureDescriptor,
    data: &[u8],
    role: TextureRole,
) -> Result<(), CompressError> {
    contract_assert!(
        descriptor.size_tag == TextureDescriptor::SIZE_TAG,
        "descriptor layout tag mismatch"
    );
    if descriptor.size_tag != TextureDescriptor::SIZE_TAG {
        return Err(role.invalid_texture());
    }

    contract_assert!(descriptor.width > 0, "texture width must be nonzero");
    if descriptor.width == 0 {
        return Err(role.invalid_texture());
    }

    contract_assert!(descriptor.height > 0, "texture height must be nonzero");
    if descriptor.height == 0 {
        return Err(role.invalid_texture());
    }

    contract_assert!(
        descriptor.format != PixelFormat::Unknown,
        "texture format must be known"
    );
    if descriptor.format == PixelFormat::Unknown {
        return Err(role.unsupported_format());
    }

    let pitch_constrained = matches!(
        descriptor.format,
        PixelFormat::Argb8888 | PixelFormat::Argb2101010
    );
    let pitch_ok = !pitch_constrained
        || descriptor.pitch == 0
        || descriptor.pitch >= descriptor.width * 4;
    contract_assert!(pitch_ok, "pitch must cover width * 4 bytes");
    if !pitch_ok {
        return Err(role.unsupported_format());
    }

    contract_assert!(!data.is_empty(), "texture data must not be empty");
    if data.is_empty() {
        return Err(role.invalid_texture());
    }

    let min_size = descriptor.min_buffer_size();
    contract_assert!(
        data.len() >= min_size,
        "texture data smaller than computed minimum"
    );
    if data.len() < min_size {
        return Err(role.invalid_texture());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba_descriptor(width: u32, height: u32) -> TextureDescriptor {
        TextureDescriptor::new(width, height, PixelFormat::Rgba8888)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // compute_buffer_size
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_buffer_size_uncompressed_tight() {
        assert_eq!(
            compute_buffer_size(PixelFormat::Rgba8888, 16, 16, 0, 4, 4),
            16 * 16 * 4
        );
        assert_eq!(
            compute_buffer_size(PixelFormat::Rgb888, 10, 3, 0, 4, 4),
            10 * 3 * 3
        );
        assert_eq!(compute_buffer_size(PixelFormat::R8, 7, 5, 0, 4, 4), 35);
    }

    #[test]
    fn test_buffer_size_uncompressed_pitch_overrides() {
        assert_eq!(
            compute_buffer_size(PixelFormat::Argb8888, 16, 16, 100, 4, 4),
            100 * 16
        );
    }

    #[test]
    fn test_buffer_size_dxt1_16x16() {
        // 4x4 = 16 blocks at 8 bytes each.
        assert_eq!(compute_buffer_size(PixelFormat::Dxt1, 16, 16, 0, 4, 4), 128);
    }

    #[test]
    fn test_buffer_size_block_rounds_up() {
        // 100x100 rounds to 25x25 blocks.
        assert_eq!(
            compute_buffer_size(PixelFormat::Dxt1, 100, 100, 0, 4, 4),
            25 * 25 * 8
        );
        // A single partial row still occupies one block row.
        assert_eq!(compute_buffer_size(PixelFormat::Dxt5, 4, 1, 0, 4, 4), 16);
    }

    #[test]
    fn test_buffer_size_block_ignores_pitch() {
        assert_eq!(
            compute_buffer_size(PixelFormat::Dxt1, 16, 16, 9999, 4, 4),
            128
        );
    }

    #[test]
    fn test_buffer_size_astc_block_footprint() {
        // ASTC footprint comes from the descriptor's block dimensions.
        assert_eq!(
            compute_buffer_size(PixelFormat::Astc, 64, 64, 0, 8, 8),
            8 * 8 * 16
        );
    }

    #[test]
    fn test_buffer_size_hdr_formats() {
        assert_eq!(
            compute_buffer_size(PixelFormat::Argb16F, 8, 8, 0, 4, 4),
            8 * 8 * 8
        );
        assert_eq!(
            compute_buffer_size(PixelFormat::Argb32F, 8, 8, 0, 4, 4),
            8 * 8 * 16
        );
    }

    #[test]
    fn test_buffer_size_unknown_is_zero() {
        assert_eq!(
            compute_buffer_size(PixelFormat::Unknown, 16, 16, 0, 4, 4),
            0
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // validate_texture — accepting paths
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_validate_accepts_exact_buffer() {
        let descriptor = rgba_descriptor(16, 16);
        let data = vec![0u8; 16 * 16 * 4];
        assert!(validate_texture(&descriptor, &data, TextureRole::Source).is_ok());
    }

    #[test]
    fn test_validate_accepts_oversized_buffer() {
        let descriptor = rgba_descriptor(4, 4);
        let data = vec![0u8; 1024];
        assert!(validate_texture(&descriptor, &data, TextureRole::Destination).is_ok());
    }

    #[test]
    fn test_validate_accepts_zero_pitch_on_packed_32bpp() {
        let descriptor = TextureDescriptor::new(16, 16, PixelFormat::Argb2101010);
        let data = vec![0u8; 16 * 16 * 4];
        assert!(validate_texture(&descriptor, &data, TextureRole::Source).is_ok());
    }

    #[test]
    fn test_validate_pitch_unconstrained_for_other_formats() {
        // Rgb888 carries no 32bpp pitch constraint; a small pitch is simply
        // used as the row stride.
        let mut descriptor = TextureDescriptor::new(4, 4, PixelFormat::Rgb888);
        descriptor.pitch = 12;
        let data = vec![0u8; 48];
        assert!(validate_texture(&descriptor, &data, TextureRole::Source).is_ok());
    }

    #[test]
    fn test_descriptor_constructor_fills_tag_and_blocks() {
        let descriptor = rgba_descriptor(8, 8);
        assert_eq!(descriptor.size_tag, TextureDescriptor::SIZE_TAG);
        assert_eq!(descriptor.pitch, 0);
        assert_eq!(
            (
                descriptor.block_width,
                descriptor.block_height,
                descriptor.block_depth
            ),
            (4, 4, 1)
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // validate_texture — rejection paths (role-correct variants)
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_validate_rejects_stale_size_tag() {
        let mut descriptor = rgba_descriptor(4, 4);
        descriptor.size_tag = 12;
        let data = vec![0u8; 64];
        assert_eq!(
            validate_texture(&descriptor, &data, TextureRole::Source),
            Err(CompressError::InvalidSourceTexture)
        );
        assert_eq!(
            validate_texture(&descriptor, &data, TextureRole::Destination),
            Err(CompressError::InvalidDestTexture)
        );
    }

    #[test]
    fn test_validate_rejects_zero_dimensions() {
        let data = vec![0u8; 64];
        let descriptor = rgba_descriptor(0, 4);
        assert_eq!(
            validate_texture(&descriptor, &data, TextureRole::Source),
            Err(CompressError::InvalidSourceTexture)
        );
        let descriptor = rgba_descriptor(4, 0);
        assert_eq!(
            validate_texture(&descriptor, &data, TextureRole::Destination),
            Err(CompressError::InvalidDestTexture)
        );
    }

    #[test]
    fn test_validate_rejects_unknown_format() {
        let descriptor = TextureDescriptor::new(4, 4, PixelFormat::Unknown);
        let data = vec![0u8; 64];
        assert_eq!(
            validate_texture(&descriptor, &data, TextureRole::Source),
            Err(CompressError::UnsupportedSourceFormat)
        );
        assert_eq!(
            validate_texture(&descriptor, &data, TextureRole::Destination),
            Err(CompressError::UnsupportedDestFormat)
        );
    }

    #[test]
    fn test_validate_rejects_short_pitch_on_packed_32bpp() {
        let mut descriptor = TextureDescriptor::new(16, 16, PixelFormat::Argb8888);
        descriptor.pitch = 16; // needs at least 64
        let data = vec![0u8; 16 * 16 * 4];
        assert_eq!(
            validate_texture(&descriptor, &data, TextureRole::Source),
            Err(CompressError::UnsupportedSourceFormat)
        );
    }

    #[test]
    fn test_validate_rejects_empty_data() {
        let descriptor = rgba_descriptor(4, 4);
        assert_eq!(
            validate_texture(&descriptor, &[], TextureRole::Destination),
            Err(CompressError::InvalidDestTexture)
        );
    }

    #[test]
    fn test_validate_rejects_undersized_data() {
        let descriptor = rgba_descriptor(16, 16);
        let data = vec![0u8; 16 * 16 * 4 - 1];
        assert_eq!(
            validate_texture(&descriptor, &data, TextureRole::Source),
            Err(CompressError::InvalidSourceTexture)
        );
    }
}
