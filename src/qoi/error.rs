// Error types for QOI encoding and decoding.
//
// Every failure is detected synchronously and aborts the current call;
// no partial image is ever returned.

use thiserror::Error;

/// Result alias used throughout the codec.
pub type Result<T> = std::result::Result<T, QoiError>;

/// Reasons a header (or image description) is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The header slice is not exactly [`HEADER_SIZE`](super::HEADER_SIZE) bytes.
    #[error("header must be {expected} bytes, got {actual}")]
    HeaderLength { expected: usize, actual: usize },
    /// The first four bytes are not `qoif`.
    #[error("invalid QOI magic: expected 71 6F 69 66, got {0:02X?}")]
    Magic([u8; 4]),
    /// Channel tag other than 3 or 4.
    #[error("invalid channel count {0}, expected 3 (RGB) or 4 (RGBA)")]
    Channels(u8),
    /// Colorspace tag other than 0 or 1.
    #[error("invalid colorspace {0}, expected 0 (linear) or 1 (sRGB)")]
    Colorspace(u8),
}

/// Errors produced by the QOI codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QoiError {
    /// Malformed header: bad magic, channel/colorspace tag or length.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Input ran out before the expected number of pixels was produced.
    #[error("truncated stream: decoded {decoded} of {expected} pixels")]
    TruncatedStream { decoded: u64, expected: u64 },

    /// The file does not end with the 8-byte end marker.
    #[error("truncated stream: missing end marker")]
    MissingEndMarker,

    /// Bytes remain after the last expected pixel.
    #[error("trailing data: {remaining} bytes after the last pixel")]
    TrailingData { remaining: usize },

    /// The chunk stream violates an internal invariant.
    #[error("corrupt stream at byte {offset}: {reason}")]
    CorruptStream { offset: usize, reason: &'static str },

    /// A value presented as a pixel does not have exactly 4 channels.
    #[error("invalid pixel: expected 4 channels, got {len}")]
    InvalidPixel { len: usize },

    /// Pixel buffer length disagrees with width × height.
    #[error("pixel data holds {actual} values, image needs {expected}")]
    DimensionMismatch { expected: u64, actual: u64 },

    /// Header declares more pixels than the decoder is allowed to allocate.
    #[error("image has {pixels} pixels, limit is {max}")]
    TooManyPixels { pixels: u64, max: u64 },
}

impl QoiError {
    /// Whether the error means the input ended too early.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::TruncatedStream { .. } | Self::MissingEndMarker)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
