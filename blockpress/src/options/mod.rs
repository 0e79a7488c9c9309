//! Compression options and the option translator.
//!
//! [`CompressOptions`] is the flat, call-scoped configuration record callers
//! hand to [`compress_texture`]. [`configure_codec`] translates it into the
//! typed `set_parameter` sequence a codec instance understands, with
//! codec-type-specific branching, and finally replays the free-form overflow
//! command list so forward-compatible tuning can override any typed setting
//! (codecs apply parameters by name, last write wins).
//!
//! On the parallel path the translation runs once per worker: every worker
//! owns an independently configured codec instance.
//!
//! [`compress_texture`]: crate::compress_texture

use crate::codec::{Codec, ParamValue};
use crate::format::CodecType;
use tracing::debug;

// =============================================================================
// Constants
// =============================================================================

/// Floor applied to each enabled channel weight.
pub const MINIMUM_WEIGHT_VALUE: f32 = 0.01;

/// Hard cap on applied overflow commands; excess entries are silently
/// truncated, not an error.
pub const MAX_EXTRA_COMMANDS: usize = 20;

/// Quality handed to quality-driven codecs when the caller leaves
/// [`CompressOptions::quality`] unset.
pub const DEFAULT_QUALITY: f32 = 0.05;

// =============================================================================
// Types
// =============================================================================

/// Compression speed tier for the DXT-style codecs.
///
/// The full three-tier mapping is always available; historically one build
/// configuration lacked the two fast tiers, which this implementation treats
/// as legacy-platform debt rather than behaviour to reproduce.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionSpeed {
    #[default]
    Normal = 0,
    Fast = 1,
    SuperFast = 2,
}

impl CompressionSpeed {
    /// Map a raw parameter value back to a tier, defaulting to `Normal`.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => CompressionSpeed::Fast,
            2 => CompressionSpeed::SuperFast,
            _ => CompressionSpeed::Normal,
        }
    }
}

/// One free-form overflow command: a short parameter name and a
/// string-or-numeric value, applied in order after all typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraCommand {
    pub name: String,
    pub value: String,
}

impl ExtraCommand {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Caller-supplied compression options.
///
/// Read-only per call, never retained. Like [`TextureDescriptor`] the record
/// carries a layout version tag; an options value with a stale tag is
/// ignored wholesale (the codec runs on its defaults), matching how foreign
/// callers built against an older layout have always been treated.
///
/// [`TextureDescriptor`]: crate::TextureDescriptor
#[derive(Debug, Clone, PartialEq)]
pub struct CompressOptions {
    /// Layout version tag; must equal [`CompressOptions::SIZE_TAG`].
    pub size_tag: u32,
    /// Enable per-channel error weighting.
    pub use_channel_weighting: bool,
    pub weight_red: f32,
    pub weight_green: f32,
    pub weight_blue: f32,
    /// Derive weights from each block instead of fixed values.
    pub use_adaptive_weighting: bool,
    /// Encode punch-through alpha in DXT1 blocks.
    pub dxt1_use_alpha: bool,
    /// Alpha threshold for punch-through transparency.
    pub alpha_threshold: u8,
    /// Quality in `0.0..=1.0`; `None` leaves speed selection to
    /// [`CompressOptions::compression_speed`] and quality-driven codecs on
    /// [`DEFAULT_QUALITY`].
    pub quality: Option<f32>,
    /// Explicit speed tier, used only when `quality` is `None`.
    pub compression_speed: CompressionSpeed,
    /// Force the sequential path.
    pub disable_multithreading: bool,
    /// Worker cap; 0 means use the detected hardware concurrency.
    pub thread_count: u32,
    /// BC7 mode mask (one bit per mode).
    pub mode_mask: u32,
    /// BC7 colour restriction flag.
    pub restrict_colour: bool,
    /// BC7 alpha restriction flag.
    pub restrict_alpha: bool,
    /// Overflow command list; at most [`MAX_EXTRA_COMMANDS`] are applied.
    pub extra_commands: Vec<ExtraCommand>,
}

impl CompressOptions {
    /// Current layout version tag.
    pub const SIZE_TAG: u32 = std::mem::size_of::<CompressOptions>() as u32;
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            size_tag: Self::SIZE_TAG,
            use_channel_weighting: false,
            weight_red: 0.0,
            weight_green: 0.0,
            weight_blue: 0.0,
            use_adaptive_weighting: false,
            dxt1_use_alpha: false,
            alpha_threshold: 0,
            quality: None,
            compression_speed: CompressionSpeed::Normal,
            disable_multithreading: false,
            thread_count: 0,
            mode_mask: 0xFF,
            restrict_colour: false,
            restrict_alpha: false,
            extra_commands: Vec::new(),
        }
    }
}

// =============================================================================
// Translator
// =============================================================================

/// Translate caller options into a codec's parameter surface.
///
/// Ordering matters and is part of the contract:
///
/// 1. channel weights (each floored at [`MINIMUM_WEIGHT_VALUE`]), only when
///    weighting is enabled and at least one weight is positive,
/// 2. adaptive weighting, DXT1 alpha flag and alpha threshold,
/// 3. speed: a set `quality` maps to a tier (`< 0.3` SuperFast, `< 0.6`
///    Fast, else Normal); otherwise the explicit speed passes through,
/// 4. codec-type extras (BC7 threading/mode parameters; quality-driven
///    codecs get `Quality`),
/// 5. up to [`MAX_EXTRA_COMMANDS`] overflow commands, in order — these can
///    override any earlier setting.
///
/// `None` options (or a stale layout tag) leave the codec on its defaults.
pub fn configure_codec(
    codec: &mut dyn Codec,
    options: Option<&CompressOptions>,
    codec_type: CodecType,
) {
    let Some(opts) = options else {
        return;
    };
    if opts.size_tag != CompressOptions::SIZE_TAG {
        debug!(
            codec = %codec_type,
            "options layout tag mismatch; running codec on defaults"
        );
        return;
    }

    if opts.use_channel_weighting
        && (opts.weight_red > 0.0 || opts.weight_green > 0.0 || opts.weight_blue > 0.0)
    {
        codec.set_parameter("UseChannelWeighting", ParamValue::U32(1));
        codec.set_parameter(
            "WeightR",
            ParamValue::F32(opts.weight_red.max(MINIMUM_WEIGHT_VALUE)),
        );
        codec.set_parameter(
            "WeightG",
            ParamValue::F32(opts.weight_green.max(MINIMUM_WEIGHT_VALUE)),
        );
        codec.set_parameter(
            "WeightB",
            ParamValue::F32(opts.weight_blue.max(MINIMUM_WEIGHT_VALUE)),
        );
    }
    codec.set_parameter(
        "UseAdaptiveWeighting",
        ParamValue::U32(opts.use_adaptive_weighting as u32),
    );
    codec.set_parameter("DXT1UseAlpha", ParamValue::U32(opts.dxt1_use_alpha as u32));
    codec.set_parameter(
        "AlphaThreshold",
        ParamValue::U32(opts.alpha_threshold as u32),
    );

    let speed = match opts.quality {
        Some(quality) if quality < 0.3 => CompressionSpeed::SuperFast,
        Some(quality) if quality < 0.6 => CompressionSpeed::Fast,
        Some(_) => CompressionSpeed::Normal,
        None => opts.compression_speed,
    };
    codec.set_parameter("CompressionSpeed", ParamValue::U32(speed as u32));

    match codec_type {
        CodecType::Bc7 => {
            codec.set_parameter(
                "MultiThreading",
                ParamValue::U32(!opts.disable_multithreading as u32),
            );
            if !opts.disable_multithreading {
                codec.set_parameter("NumThreads", ParamValue::U32(opts.thread_count));
            } else {
                codec.set_parameter("NumThreads", ParamValue::U32(1));
            }
            codec.set_parameter("ModeMask", ParamValue::U32(opts.mode_mask));
            codec.set_parameter("ColourRestrict", ParamValue::U32(opts.restrict_colour as u32));
            codec.set_parameter("AlphaRestrict", ParamValue::U32(opts.restrict_alpha as u32));
            codec.set_parameter(
                "Quality",
                ParamValue::F32(opts.quality.unwrap_or(DEFAULT_QUALITY)),
            );
        }
        CodecType::Astc | CodecType::Bc6H | CodecType::Bc6HSf | CodecType::GenericTransform => {
            codec.set_parameter(
                "Quality",
                ParamValue::F32(opts.quality.unwrap_or(DEFAULT_QUALITY)),
            );
        }
        _ => {}
    }

    for command in opts.extra_commands.iter().take(MAX_EXTRA_COMMANDS) {
        codec.set_parameter(&command.name, ParamValue::Text(&command.value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecBuffer, CodecBufferMut, CodecOutcome};
    use crate::feedback::Feedback;
    use crate::format::{codec_buffer_type_for_format, CodecBufferType, PixelFormat};

    /// Records every set_parameter call for inspection.
    struct RecordingCodec {
        calls: Vec<(String, String)>,
    }

    impl RecordingCodec {
        fn new() -> Self {
            Self { calls: Vec::new() }
        }

        fn value_of(&self, name: &str) -> Option<&str> {
            // Last write wins, as in the real codecs.
            self.calls
                .iter()
                .rev()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        }
    }

    impl Codec for RecordingCodec {
        fn codec_type(&self) -> CodecType {
            CodecType::Dxt1
        }

        fn buffer_type(&self) -> CodecBufferType {
            codec_buffer_type_for_format(PixelFormat::Dxt1)
        }

        fn set_parameter(&mut self, name: &str, value: ParamValue<'_>) {
            let rendered = match value {
                ParamValue::U32(v) => v.to_string(),
                ParamValue::F32(v) => v.to_string(),
                ParamValue::Text(v) => v.to_string(),
            };
            self.calls.push((name.to_string(), rendered));
        }

        fn compress(
            &mut self,
            _src: &CodecBuffer<'_>,
            _dst: &mut CodecBufferMut<'_>,
            _feedback: Option<&Feedback<'_>>,
        ) -> CodecOutcome {
            CodecOutcome::Ok
        }
    }

    fn translate(options: &CompressOptions, codec_type: CodecType) -> RecordingCodec {
        let mut codec = RecordingCodec::new();
        configure_codec(&mut codec, Some(options), codec_type);
        codec
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Channel weighting
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_weights_floored_at_minimum() {
        let options = CompressOptions {
            use_channel_weighting: true,
            weight_red: 0.5,
            weight_green: 0.001,
            weight_blue: 0.0,
            ..Default::default()
        };
        let codec = translate(&options, CodecType::Dxt1);
        assert_eq!(codec.value_of("UseChannelWeighting"), Some("1"));
        assert_eq!(codec.value_of("WeightR"), Some("0.5"));
        assert_eq!(codec.value_of("WeightG"), Some("0.01"));
        assert_eq!(codec.value_of("WeightB"), Some("0.01"));
    }

    #[test]
    fn test_weights_skipped_when_all_zero() {
        let options = CompressOptions {
            use_channel_weighting: true,
            ..Default::default()
        };
        let codec = translate(&options, CodecType::Dxt1);
        assert_eq!(codec.value_of("UseChannelWeighting"), None);
        assert_eq!(codec.value_of("WeightR"), None);
    }

    #[test]
    fn test_weights_skipped_when_disabled() {
        let options = CompressOptions {
            use_channel_weighting: false,
            weight_red: 1.0,
            ..Default::default()
        };
        let codec = translate(&options, CodecType::Dxt1);
        assert_eq!(codec.value_of("UseChannelWeighting"), None);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Speed resolution
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_quality_below_03_resolves_super_fast() {
        let options = CompressOptions {
            quality: Some(0.1),
            ..Default::default()
        };
        let codec = translate(&options, CodecType::Dxt1);
        assert_eq!(codec.value_of("CompressionSpeed"), Some("2"));
    }

    #[test]
    fn test_quality_below_06_resolves_fast() {
        let options = CompressOptions {
            quality: Some(0.4),
            ..Default::default()
        };
        let codec = translate(&options, CodecType::Dxt1);
        assert_eq!(codec.value_of("CompressionSpeed"), Some("1"));
    }

    #[test]
    fn test_high_quality_resolves_normal() {
        let options = CompressOptions {
            quality: Some(0.9),
            ..Default::default()
        };
        let codec = translate(&options, CodecType::Dxt1);
        assert_eq!(codec.value_of("CompressionSpeed"), Some("0"));
    }

    #[test]
    fn test_unset_quality_passes_explicit_speed() {
        let options = CompressOptions {
            quality: None,
            compression_speed: CompressionSpeed::SuperFast,
            ..Default::default()
        };
        let codec = translate(&options, CodecType::Dxt1);
        assert_eq!(codec.value_of("CompressionSpeed"), Some("2"));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Per-codec extras
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_bc7_gets_threading_and_mode_parameters() {
        let options = CompressOptions {
            thread_count: 6,
            mode_mask: 0xCF,
            restrict_colour: true,
            quality: Some(0.8),
            ..Default::default()
        };
        let codec = translate(&options, CodecType::Bc7);
        assert_eq!(codec.value_of("MultiThreading"), Some("1"));
        assert_eq!(codec.value_of("NumThreads"), Some("6"));
        assert_eq!(codec.value_of("ModeMask"), Some("207"));
        assert_eq!(codec.value_of("ColourRestrict"), Some("1"));
        assert_eq!(codec.value_of("AlphaRestrict"), Some("0"));
        assert_eq!(codec.value_of("Quality"), Some("0.8"));
    }

    #[test]
    fn test_bc7_threading_disabled_forces_one_thread() {
        let options = CompressOptions {
            disable_multithreading: true,
            thread_count: 6,
            ..Default::default()
        };
        let codec = translate(&options, CodecType::Bc7);
        assert_eq!(codec.value_of("MultiThreading"), Some("0"));
        assert_eq!(codec.value_of("NumThreads"), Some("1"));
    }

    #[test]
    fn test_quality_driven_codecs_get_only_quality_extra() {
        for codec_type in [
            CodecType::Astc,
            CodecType::Bc6H,
            CodecType::Bc6HSf,
            CodecType::GenericTransform,
        ] {
            let options = CompressOptions {
                quality: Some(0.7),
                ..Default::default()
            };
            let codec = translate(&options, codec_type);
            assert_eq!(codec.value_of("Quality"), Some("0.7"), "{}", codec_type);
            assert_eq!(codec.value_of("ModeMask"), None, "{}", codec_type);
        }
    }

    #[test]
    fn test_dxt_codecs_get_no_quality_parameter() {
        let options = CompressOptions {
            quality: Some(0.7),
            ..Default::default()
        };
        let codec = translate(&options, CodecType::Dxt5);
        assert_eq!(codec.value_of("Quality"), None);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Overflow commands
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_extra_commands_apply_in_order_and_override() {
        let options = CompressOptions {
            quality: None,
            compression_speed: CompressionSpeed::Normal,
            extra_commands: vec![
                ExtraCommand::new("CompressionSpeed", "2"),
                ExtraCommand::new("FutureKnob", "on"),
            ],
            ..Default::default()
        };
        let codec = translate(&options, CodecType::Dxt1);
        // The overflow command overrides the typed setting.
        assert_eq!(codec.value_of("CompressionSpeed"), Some("2"));
        assert_eq!(codec.value_of("FutureKnob"), Some("on"));
    }

    #[test]
    fn test_extra_commands_truncated_at_cap() {
        let extra_commands: Vec<ExtraCommand> = (0..MAX_EXTRA_COMMANDS + 5)
            .map(|i| ExtraCommand::new(format!("Knob{}", i), "1"))
            .collect();
        let options = CompressOptions {
            extra_commands,
            ..Default::default()
        };
        let codec = translate(&options, CodecType::Dxt1);
        assert_eq!(
            codec.value_of(&format!("Knob{}", MAX_EXTRA_COMMANDS - 1)),
            Some("1")
        );
        assert_eq!(codec.value_of(&format!("Knob{}", MAX_EXTRA_COMMANDS)), None);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Gating
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_missing_options_leave_codec_untouched() {
        let mut codec = RecordingCodec::new();
        configure_codec(&mut codec, None, CodecType::Dxt1);
        assert!(codec.calls.is_empty());
    }

    #[test]
    fn test_stale_tag_ignores_options_wholesale() {
        let options = CompressOptions {
            size_tag: 4,
            quality: Some(0.1),
            ..Default::default()
        };
        let mut codec = RecordingCodec::new();
        configure_codec(&mut codec, Some(&options), CodecType::Dxt1);
        assert!(codec.calls.is_empty());
    }

    #[test]
    fn test_default_options_have_current_tag() {
        assert_eq!(CompressOptions::default().size_tag, CompressOptions::SIZE_TAG);
    }
}
