//! Pixel formats, codec types and the format registry.
//!
//! Three related but distinct identifiers live here:
//!
//! - [`PixelFormat`] — the caller-facing tag describing how pixel data is
//!   laid out, covering both uncompressed layouts and block-compressed
//!   layouts.
//! - [`CodecType`] — which compression codec handles a destination format.
//!   The mapping from [`PixelFormat`] is many-to-one (several formats alias
//!   to the same codec, e.g. `Bc1` and `Dxt1`) and total.
//! - [`CodecBufferType`] — the storage-layout tag used when constructing
//!   codec buffers. Unlike [`CodecType`] this is 1:1 with [`PixelFormat`]
//!   and orthogonal to codec selection: uncompressed layouts have a buffer
//!   type but no codec.

use std::fmt;

// =============================================================================
// Pixel Format
// =============================================================================

/// Pixel/block layout of a texture buffer.
///
/// `Unknown` is the total-mapping escape hatch for foreign integer input
/// (see [`PixelFormat::from_raw`]); it never validates successfully.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Unknown = 0,

    // Uncompressed layouts
    Argb8888 = 1,
    Rgba8888 = 2,
    Bgra8888 = 3,
    Argb2101010 = 4,
    Rgb888 = 5,
    Rg8 = 6,
    R8 = 7,
    Argb16 = 8,
    Rg16 = 9,
    R16 = 10,
    Argb16F = 11,
    Rg16F = 12,
    R16F = 13,
    Argb32F = 14,
    Rg32F = 15,
    R32F = 16,
    Rgbe32F = 17,

    // Block-compressed layouts
    Dxt1 = 18,
    Dxt3 = 19,
    Dxt5 = 20,
    Dxt5Xgbr = 21,
    Dxt5Rxbg = 22,
    Dxt5Rbxg = 23,
    Dxt5Xrbg = 24,
    Dxt5Rgxb = 25,
    Dxt5Xgxr = 26,
    Ati1N = 27,
    Ati2N = 28,
    Ati2NXy = 29,
    Ati2NDxt5 = 30,
    Bc1 = 31,
    Bc2 = 32,
    Bc3 = 33,
    Bc4 = 34,
    Bc5 = 35,
    Bc6H = 36,
    Bc6HSf = 37,
    Bc7 = 38,
    Astc = 39,
    AtcRgb = 40,
    AtcRgbaExplicit = 41,
    AtcRgbaInterpolated = 42,
    EtcRgb = 43,
    Etc2Rgb = 44,
    GenericTransform = 45,
}

impl PixelFormat {
    /// Map a foreign integer tag to a format.
    ///
    /// Total: any value outside the known range maps to `Unknown`, which the
    /// descriptor validator then rejects with the role's unsupported-format
    /// error.
    pub fn from_raw(raw: u32) -> Self {
        use PixelFormat::*;
        match raw {
            1 => Argb8888,
            2 => Rgba8888,
            3 => Bgra8888,
            4 => Argb2101010,
            5 => Rgb888,
            6 => Rg8,
            7 => R8,
            8 => Argb16,
            9 => Rg16,
            10 => R16,
            11 => Argb16F,
            12 => Rg16F,
            13 => R16F,
            14 => Argb32F,
            15 => Rg32F,
            16 => R32F,
            17 => Rgbe32F,
            18 => Dxt1,
            19 => Dxt3,
            20 => Dxt5,
            21 => Dxt5Xgbr,
            22 => Dxt5Rxbg,
            23 => Dxt5Rbxg,
            24 => Dxt5Xrbg,
            25 => Dxt5Rgxb,
            26 => Dxt5Xgxr,
            27 => Ati1N,
            28 => Ati2N,
            29 => Ati2NXy,
            30 => Ati2NDxt5,
            31 => Bc1,
            32 => Bc2,
            33 => Bc3,
            34 => Bc4,
            35 => Bc5,
            36 => Bc6H,
            37 => Bc6HSf,
            38 => Bc7,
            39 => Astc,
            40 => AtcRgb,
            41 => AtcRgbaExplicit,
            42 => AtcRgbaInterpolated,
            43 => EtcRgb,
            44 => Etc2Rgb,
            45 => GenericTransform,
            _ => Unknown,
        }
    }

    /// The integer tag for this format.
    pub fn as_raw(self) -> u32 {
        self as u32
    }

    /// Whether this is an uncompressed pixel layout.
    pub fn is_uncompressed(self) -> bool {
        matches!(
            self,
            PixelFormat::Argb8888
                | PixelFormat::Rgba8888
                | PixelFormat::Bgra8888
                | PixelFormat::Argb2101010
                | PixelFormat::Rgb888
                | PixelFormat::Rg8
                | PixelFormat::R8
                | PixelFormat::Argb16
                | PixelFormat::Rg16
                | PixelFormat::R16
                | PixelFormat::Argb16F
                | PixelFormat::Rg16F
                | PixelFormat::R16F
                | PixelFormat::Argb32F
                | PixelFormat::Rg32F
                | PixelFormat::R32F
                | PixelFormat::Rgbe32F
        )
    }

    /// Bytes per pixel for uncompressed layouts, `None` for block layouts.
    pub fn bytes_per_pixel(self) -> Option<u32> {
        use PixelFormat::*;
        match self {
            Argb8888 | Rgba8888 | Bgra8888 | Argb2101010 | Rgbe32F => Some(4),
            Rgb888 => Some(3),
            Rg8 => Some(2),
            R8 => Some(1),
            Argb16 | Argb16F => Some(8),
            Rg16 | Rg16F => Some(4),
            R16 | R16F => Some(2),
            Argb32F => Some(16),
            Rg32F => Some(8),
            R32F => Some(4),
            _ => None,
        }
    }

    /// Bytes per compressed block for block layouts, `None` otherwise.
    pub fn bytes_per_block(self) -> Option<u32> {
        use PixelFormat::*;
        match self {
            Dxt1 | Bc1 | Ati1N | Bc4 | AtcRgb | EtcRgb | Etc2Rgb => Some(8),
            Dxt3 | Dxt5 | Dxt5Xgbr | Dxt5Rxbg | Dxt5Rbxg | Dxt5Xrbg | Dxt5Rgxb | Dxt5Xgxr
            | Ati2N | Ati2NXy | Ati2NDxt5 | Bc2 | Bc3 | Bc5 | Bc6H | Bc6HSf | Bc7 | Astc
            | AtcRgbaExplicit | AtcRgbaInterpolated => Some(16),
            // Experimental block-linear transform: stores the full 4x4 RGBA
            // payload per block.
            GenericTransform => Some(64),
            _ => None,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// =============================================================================
// Codec Type
// =============================================================================

/// Which codec implementation handles a destination format.
///
/// Derived from [`PixelFormat`] through [`codec_type_for_format`]; the
/// mapping is surjective, not injective. `None` marks uncompressed layouts
/// (no codec); `Unknown` marks invalid input and never reaches the
/// compression path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecType {
    None,
    Dxt1,
    Dxt3,
    Dxt5,
    Dxt5Xgbr,
    Dxt5Rxbg,
    Dxt5Rbxg,
    Dxt5Xrbg,
    Dxt5Rgxb,
    Dxt5Xgxr,
    Ati1N,
    Ati2N,
    Ati2NXy,
    Ati2NDxt5,
    Bc6H,
    Bc6HSf,
    Bc7,
    Astc,
    AtcRgb,
    AtcRgbaExplicit,
    AtcRgbaInterpolated,
    EtcRgb,
    Etc2Rgb,
    GenericTransform,
    Unknown,
}

impl CodecType {
    /// Whether the parallel row-band dispatcher may split work for this
    /// codec.
    ///
    /// BC7 manages its own worker threads, ASTC's block footprint is not
    /// fixed at four rows, and the generic transform carries whole-image
    /// state; all three always run on the sequential path.
    pub fn supports_row_banding(self) -> bool {
        !matches!(
            self,
            CodecType::Bc7 | CodecType::Astc | CodecType::GenericTransform
        )
    }
}

impl fmt::Display for CodecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// =============================================================================
// Codec Buffer Type
// =============================================================================

/// Storage-layout tag for codec buffer construction.
///
/// 1:1 with [`PixelFormat`] and orthogonal to [`CodecType`]: two formats
/// that alias to the same codec (`Bc1` / `Dxt1`) still carry distinct buffer
/// types, and uncompressed layouts have a buffer type even though they have
/// no codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodecBufferType(PixelFormat);

impl CodecBufferType {
    /// The pixel format this buffer type describes.
    pub fn format(self) -> PixelFormat {
        self.0
    }
}

impl fmt::Display for CodecBufferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Resolve the codec responsible for a destination format.
///
/// Total over [`PixelFormat`]. Uncompressed layouts resolve to
/// [`CodecType::None`] and are never handed to the compression path. Every
/// alias is preserved exactly: `Bc1`/`Dxt1`, `Bc2`/`Dxt3`, `Bc3`/`Dxt5`,
/// `Bc4`/`Ati1N` and `Bc5`/`Ati2NXy` resolve pairwise to the same codec.
///
/// `Unknown` input is a contract violation (the descriptor validator rejects
/// it before this point) and maps to [`CodecType::Unknown`].
pub fn codec_type_for_format(format: PixelFormat) -> CodecType {
    use PixelFormat as Pf;
    match format {
        Pf::Argb8888
        | Pf::Rgba8888
        | Pf::Bgra8888
        | Pf::Argb2101010
        | Pf::Rgb888
        | Pf::Rg8
        | Pf::R8
        | Pf::Argb16
        | Pf::Rg16
        | Pf::R16
        | Pf::Argb16F
        | Pf::Rg16F
        | Pf::R16F
        | Pf::Argb32F
        | Pf::Rg32F
        | Pf::R32F
        | Pf::Rgbe32F => CodecType::None,
        Pf::Dxt1 => CodecType::Dxt1,
        Pf::Dxt3 => CodecType::Dxt3,
        Pf::Dxt5 => CodecType::Dxt5,
        Pf::Dxt5Xgbr => CodecType::Dxt5Xgbr,
        Pf::Dxt5Rxbg => CodecType::Dxt5Rxbg,
        Pf::Dxt5Rbxg => CodecType::Dxt5Rbxg,
        Pf::Dxt5Xrbg => CodecType::Dxt5Xrbg,
        Pf::Dxt5Rgxb => CodecType::Dxt5Rgxb,
        Pf::Dxt5Xgxr => CodecType::Dxt5Xgxr,
        Pf::Ati1N => CodecType::Ati1N,
        Pf::Ati2N => CodecType::Ati2N,
        Pf::Ati2NXy => CodecType::Ati2NXy,
        Pf::Ati2NDxt5 => CodecType::Ati2NDxt5,
        Pf::Bc1 => CodecType::Dxt1,
        Pf::Bc2 => CodecType::Dxt3,
        Pf::Bc3 => CodecType::Dxt5,
        Pf::Bc4 => CodecType::Ati1N,
        Pf::Bc5 => CodecType::Ati2NXy,
        Pf::Bc6H => CodecType::Bc6H,
        Pf::Bc6HSf => CodecType::Bc6HSf,
        Pf::Bc7 => CodecType::Bc7,
        Pf::Astc => CodecType::Astc,
        Pf::AtcRgb => CodecType::AtcRgb,
        Pf::AtcRgbaExplicit => CodecType::AtcRgbaExplicit,
        Pf::AtcRgbaInterpolated => CodecType::AtcRgbaInterpolated,
        Pf::EtcRgb => CodecType::EtcRgb,
        Pf::Etc2Rgb => CodecType::Etc2Rgb,
        Pf::GenericTransform => CodecType::GenericTransform,
        Pf::Unknown => {
            debug_assert!(false, "codec_type_for_format called with Unknown format");
            CodecType::Unknown
        }
    }
}

/// Resolve the buffer-construction layout tag for a format. 1:1.
pub fn codec_buffer_type_for_format(format: PixelFormat) -> CodecBufferType {
    CodecBufferType(format)
}
