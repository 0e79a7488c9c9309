//! Minimal DDS container writer.
//!
//! Wraps a compressed payload in a DirectDraw Surface header so the output
//! loads in engines and texture tools. Legacy formats use a FourCC code in
//! the pixel-format block; BC6H/BC7 need the DX10 extension header with a
//! DXGI format code.
//!
//! Layout per the Microsoft DDS specification:
//! https://docs.microsoft.com/en-us/windows/win32/direct3ddds/dds-header

// DDS header flags (DDSD_*)
const DDSD_CAPS: u32 = 0x1;
const DDSD_HEIGHT: u32 = 0x2;
const DDSD_WIDTH: u32 = 0x4;
const DDSD_PIXELFORMAT: u32 = 0x1000;
const DDSD_LINEARSIZE: u32 = 0x80000;

// DDS pixel format flags (DDPF_*)
const DDPF_FOURCC: u32 = 0x4;

// DDS caps flags (DDSCAPS_*)
const DDSCAPS_TEXTURE: u32 = 0x1000;

// DX10 extension constants
const D3D10_RESOURCE_DIMENSION_TEXTURE2D: u32 = 3;

/// How the payload format is declared in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdsPayloadFormat {
    /// Legacy FourCC pixel format ("DXT1", "ATI2", ...).
    FourCc([u8; 4]),
    /// DX10 extension header with a DXGI format code.
    Dx10(u32),
}

impl DdsPayloadFormat {
    pub const DXT1: Self = Self::FourCc(*b"DXT1");
    pub const DXT3: Self = Self::FourCc(*b"DXT3");
    pub const DXT5: Self = Self::FourCc(*b"DXT5");
    pub const ATI1: Self = Self::FourCc(*b"ATI1");
    pub const ATI2: Self = Self::FourCc(*b"ATI2");
    pub const BC6H_UF16: Self = Self::Dx10(95);
    pub const BC6H_SF16: Self = Self::Dx10(96);
    pub const BC7_UNORM: Self = Self::Dx10(98);
}

/// Serialize a complete DDS file: magic, header, optional DX10 extension,
/// payload.
pub fn encode_dds(
    format: DdsPayloadFormat,
    width: u32,
    height: u32,
    payload: &[u8],
) -> Vec<u8> {
    let mut out = Vec::with_capacity(148 + payload.len());
    out.extend_from_slice(b"DDS ");

    let push_u32 = |out: &mut Vec<u8>, value: u32| out.extend_from_slice(&value.to_le_bytes());

    // Header (124 bytes).
    push_u32(&mut out, 124);
    push_u32(
        &mut out,
        DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT | DDSD_LINEARSIZE,
    );
    push_u32(&mut out, height);
    push_u32(&mut out, width);
    push_u32(&mut out, payload.len() as u32); // linear size of the top level
    push_u32(&mut out, 0); // depth
    push_u32(&mut out, 1); // mipmap count
    for _ in 0..11 {
        push_u32(&mut out, 0); // reserved1
    }

    // Pixel format (32 bytes).
    push_u32(&mut out, 32);
    push_u32(&mut out, DDPF_FOURCC);
    match format {
        DdsPayloadFormat::FourCc(code) => out.extend_from_slice(&code),
        DdsPayloadFormat::Dx10(_) => out.extend_from_slice(b"DX10"),
    }
    for _ in 0..5 {
        push_u32(&mut out, 0); // bit counts and masks unused with FourCC
    }

    // Caps.
    push_u32(&mut out, DDSCAPS_TEXTURE);
    push_u32(&mut out, 0); // caps2
    push_u32(&mut out, 0); // caps3
    push_u32(&mut out, 0); // caps4
    push_u32(&mut out, 0); // reserved2

    // DX10 extension (20 bytes) when needed.
    if let DdsPayloadFormat::Dx10(dxgi_format) = format {
        push_u32(&mut out, dxgi_format);
        push_u32(&mut out, D3D10_RESOURCE_DIMENSION_TEXTURE2D);
        push_u32(&mut out, 0); // misc flags
        push_u32(&mut out, 1); // array size
        push_u32(&mut out, 0); // misc flags 2
    }

    out.extend_from_slice(payload);
    out
}
