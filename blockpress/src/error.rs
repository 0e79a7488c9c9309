//! Error types for the compression engine.

use thiserror::Error;

/// Errors surfaced by the public compression API.
///
/// All validation failures are reported before any codec is constructed or
/// any worker spawned; mid-compression failures surface as [`Aborted`]
/// (caller cancelled through the feedback callback) or [`Generic`] (any
/// other codec failure).
///
/// [`Aborted`]: CompressError::Aborted
/// [`Generic`]: CompressError::Generic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CompressError {
    /// The source texture descriptor or its data buffer is malformed.
    #[error("invalid source texture")]
    InvalidSourceTexture,

    /// The destination texture descriptor or its data buffer is malformed.
    #[error("invalid destination texture")]
    InvalidDestTexture,

    /// The source texture format is not usable in this role.
    #[error("unsupported source texture format")]
    UnsupportedSourceFormat,

    /// The destination texture format is not usable in this role.
    #[error("unsupported destination texture format")]
    UnsupportedDestFormat,

    /// No codec implementation exists for the requested destination format.
    #[error("unable to initialize codec")]
    UnableToInitCodec,

    /// The caller's feedback callback requested cancellation.
    #[error("compression aborted by caller")]
    Aborted,

    /// The codec reported a failure it could not classify.
    #[error("compression failed")]
    Generic,
}
