//! Blockpress CLI - compress images into GPU texture formats.
//!
//! This binary provides a command-line interface to the blockpress library:
//! it decodes an input image, drives the compression dispatch engine and
//! wraps the result in a DDS container.

mod dds;

use blockpress::{
    compress_texture, CompressOptions, CompressionSpeed, ExtraCommand, Feedback, PixelFormat,
    TextureDescriptor,
};
use clap::{Parser, ValueEnum};
use dds::DdsPayloadFormat;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// BC1/DXT1 (8 bytes per 4x4 block, 1-bit alpha at most)
    Dxt1,
    /// BC2/DXT3 (explicit 4-bit alpha)
    Dxt3,
    /// BC3/DXT5 (interpolated alpha)
    Dxt5,
    /// BC4/ATI1N (single channel)
    Bc4,
    /// BC5/ATI2N (two channels, e.g. normal maps)
    Bc5,
    /// BC6H (HDR, requires a float input image such as EXR)
    Bc6h,
    /// BC7 (highest-quality LDR)
    Bc7,
}

impl OutputFormat {
    fn pixel_format(self) -> PixelFormat {
        match self {
            OutputFormat::Dxt1 => PixelFormat::Dxt1,
            OutputFormat::Dxt3 => PixelFormat::Dxt3,
            OutputFormat::Dxt5 => PixelFormat::Dxt5,
            OutputFormat::Bc4 => PixelFormat::Bc4,
            OutputFormat::Bc5 => PixelFormat::Bc5,
            OutputFormat::Bc6h => PixelFormat::Bc6H,
            OutputFormat::Bc7 => PixelFormat::Bc7,
        }
    }

    fn dds_format(self) -> DdsPayloadFormat {
        match self {
            OutputFormat::Dxt1 => DdsPayloadFormat::DXT1,
            OutputFormat::Dxt3 => DdsPayloadFormat::DXT3,
            OutputFormat::Dxt5 => DdsPayloadFormat::DXT5,
            OutputFormat::Bc4 => DdsPayloadFormat::ATI1,
            OutputFormat::Bc5 => DdsPayloadFormat::ATI2,
            OutputFormat::Bc6h => DdsPayloadFormat::BC6H_UF16,
            OutputFormat::Bc7 => DdsPayloadFormat::BC7_UNORM,
        }
    }

    fn needs_float_source(self) -> bool {
        matches!(self, OutputFormat::Bc6h)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SpeedArg {
    Normal,
    Fast,
    SuperFast,
}

impl From<SpeedArg> for CompressionSpeed {
    fn from(speed: SpeedArg) -> Self {
        match speed {
            SpeedArg::Normal => CompressionSpeed::Normal,
            SpeedArg::Fast => CompressionSpeed::Fast,
            SpeedArg::SuperFast => CompressionSpeed::SuperFast,
        }
    }
}

#[derive(Parser)]
#[command(name = "blockpress")]
#[command(about = "Block-compress images into GPU texture formats", long_about = None)]
struct Args {
    /// Input image (PNG, JPEG, EXR, ...)
    input: PathBuf,

    /// Output DDS file path
    #[arg(short, long)]
    output: PathBuf,

    /// Target compression format
    #[arg(long, value_enum, default_value = "dxt1")]
    format: OutputFormat,

    /// Quality in 0.0..=1.0; also selects the speed tier for DXT codecs
    #[arg(long)]
    quality: Option<f32>,

    /// Explicit speed tier, used when --quality is not given
    #[arg(long, value_enum, default_value = "normal")]
    speed: SpeedArg,

    /// Worker threads (0 = all available cores)
    #[arg(long, default_value = "0")]
    threads: u32,

    /// Disable multithreaded compression
    #[arg(long)]
    single_threaded: bool,

    /// Encode DXT1 punch-through alpha
    #[arg(long)]
    dxt1_alpha: bool,

    /// Alpha threshold for punch-through transparency
    #[arg(long, default_value = "128")]
    alpha_threshold: u8,

    /// Extra codec parameter as NAME=VALUE (repeatable, applied in order)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    set_parameters: Vec<String>,

    /// Suppress the progress indicator
    #[arg(long)]
    quiet: bool,
}

fn parse_extra_commands(raw: &[String]) -> Result<Vec<ExtraCommand>, String> {
    raw.iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(name, value)| ExtraCommand::new(name.trim(), value.trim()))
                .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", entry))
        })
        .collect()
}

/// Load the source image as the pixel layout the target codec wants.
///
/// Returns the descriptor plus raw bytes: RGBA8 for LDR targets, ARGB32F
/// for BC6H.
fn load_source(
    path: &PathBuf,
    format: OutputFormat,
) -> Result<(TextureDescriptor, Vec<u8>), String> {
    let image = image::open(path).map_err(|e| format!("cannot open {}: {}", path.display(), e))?;

    if format.needs_float_source() {
        let float_image = image.to_rgba32f();
        let (width, height) = float_image.dimensions();
        let mut data = Vec::with_capacity((width * height * 16) as usize);
        for pixel in float_image.pixels() {
            // Argb layout stores [a, r, g, b] per pixel.
            for channel in [pixel[3], pixel[0], pixel[1], pixel[2]] {
                data.extend_from_slice(&channel.to_le_bytes());
            }
        }
        Ok((
            TextureDescriptor::new(width, height, PixelFormat::Argb32F),
            data,
        ))
    } else {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok((
            TextureDescriptor::new(width, height, PixelFormat::Rgba8888),
            rgba.into_raw(),
        ))
    }
}

fn main() {
    let args = Args::parse();
    blockpress::logging::init_console_logging();

    let extra_commands = match parse_extra_commands(&args.set_parameters) {
        Ok(commands) => commands,
        Err(message) => {
            eprintln!("Error: {}", message);
            process::exit(1);
        }
    };

    let (src, src_data) = match load_source(&args.input, args.format) {
        Ok(loaded) => loaded,
        Err(message) => {
            eprintln!("Error: {}", message);
            process::exit(1);
        }
    };

    tracing::info!(
        width = src.width,
        height = src.height,
        format = ?args.format,
        "loaded source image"
    );

    let dst = TextureDescriptor::new(src.width, src.height, args.format.pixel_format());
    let mut dst_data = vec![0u8; dst.min_buffer_size()];

    let options = CompressOptions {
        quality: args.quality,
        compression_speed: args.speed.into(),
        disable_multithreading: args.single_threaded,
        thread_count: args.threads,
        dxt1_use_alpha: args.dxt1_alpha,
        alpha_threshold: args.alpha_threshold,
        extra_commands,
        ..Default::default()
    };

    // Progress line; the callback is shared across band workers, so it only
    // touches an atomic.
    let last_percent = AtomicU32::new(0);
    let quiet = args.quiet;
    let progress = move |percent: f32, _: usize, _: usize| {
        let rounded = percent as u32;
        if !quiet && rounded > last_percent.fetch_max(rounded, Ordering::Relaxed) {
            eprint!("\rcompressing... {:3}%", rounded);
        }
        false
    };

    let started = std::time::Instant::now();
    let result = compress_texture(
        &src,
        &src_data,
        &dst,
        &mut dst_data,
        Some(&options),
        Some(Feedback::new(&progress, 0, 0)),
    );
    if !args.quiet {
        eprintln!();
    }

    if let Err(error) = result {
        eprintln!("Error: {}", error);
        process::exit(1);
    }

    let file = dds::encode_dds(args.format.dds_format(), dst.width, dst.height, &dst_data);
    if let Err(error) = std::fs::write(&args.output, &file) {
        eprintln!("Error: cannot write {}: {}", args.output.display(), error);
        process::exit(1);
    }

    println!(
        "{} -> {} ({}x{}, {} -> {} bytes, {:.2}s)",
        args.input.display(),
        args.output.display(),
        dst.width,
        dst.height,
        src_data.len(),
        file.len(),
        started.elapsed().as_secs_f64()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_mapping() {
        assert_eq!(OutputFormat::Dxt1.pixel_format(), PixelFormat::Dxt1);
        assert_eq!(OutputFormat::Bc4.pixel_format(), PixelFormat::Bc4);
        assert_eq!(OutputFormat::Bc7.pixel_format(), PixelFormat::Bc7);
        assert!(OutputFormat::Bc6h.needs_float_source());
        assert!(!OutputFormat::Dxt5.needs_float_source());
    }

    #[test]
    fn test_parse_extra_commands() {
        let parsed = parse_extra_commands(&[
            "CompressionSpeed=2".to_string(),
            "Quality = 0.9".to_string(),
        ])
        .unwrap();
        assert_eq!(parsed[0], ExtraCommand::new("CompressionSpeed", "2"));
        assert_eq!(parsed[1], ExtraCommand::new("Quality", "0.9"));
    }

    #[test]
    fn test_parse_extra_commands_rejects_missing_equals() {
        assert!(parse_extra_commands(&["CompressionSpeed".to_string()]).is_err());
    }
}
