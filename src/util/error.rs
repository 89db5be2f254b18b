//! Error types for silmatch.

use thiserror::Error;

/// Result alias for silmatch operations.
pub type SilMatchResult<T> = std::result::Result<T, SilMatchError>;

/// Errors that can occur while canonicalizing, storing, or ranking silhouettes.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SilMatchError {
    /// The encoded payload could not be decoded into a raster image.
    #[error("image load failed: {reason}")]
    ImageLoad { reason: String },
    /// No foreground pixel survived the named pipeline stage.
    #[error("degenerate image: no foreground after {stage}")]
    Degenerate { stage: &'static str },
    /// Two bitmaps that must share dimensions do not.
    #[error("dimension mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    /// An identifier appears twice in one corpus.
    #[error("duplicate identifier: {id}")]
    DuplicateIdentifier { id: String },
    /// Width or height is zero or overflows.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The pixel buffer is shorter than the declared dimensions require.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// The persistence collaborator failed for an identifier.
    #[error("store failed for {id}: {reason}")]
    Store { id: String, reason: String },
}

impl SilMatchError {
    /// Returns true when the error means "nothing to canonicalize".
    ///
    /// Callers use this to report an empty query drawing separately from a
    /// ranking in which nothing scored well.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, SilMatchError::Degenerate { .. })
    }
}
