// QOI file header and end marker.
//
// Layout (all integers big-endian):
//   0..4    magic "qoif"
//   4..8    width  (u32)
//   8..12   height (u32)
//   12      channels   (3 = RGB, 4 = RGBA)
//   13      colorspace (0 = all channels linear, 1 = sRGB with linear alpha)

use std::io::{self, Write};

use super::error::{FormatError, QoiError};

// ---------------------------------------------------------------------------
// Magic and framing
// ---------------------------------------------------------------------------

pub const QOI_MAGIC: [u8; 4] = *b"qoif";

/// Encoded header size in bytes.
pub const HEADER_SIZE: usize = 14;

/// Fixed marker following the last chunk.
pub const END_MARKER: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];

// ---------------------------------------------------------------------------
// Channel and colorspace tags
// ---------------------------------------------------------------------------

/// Channel-count tag.  Pixels are always decoded as RGBA; the tag only
/// describes the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Channels {
    Rgb = 3,
    Rgba = 4,
}

impl Channels {
    /// Bytes per pixel in interleaved raw data.
    #[inline]
    pub fn count(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Channels {
    type Error = FormatError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            other => Err(FormatError::Channels(other)),
        }
    }
}

impl From<Channels> for u8 {
    fn from(c: Channels) -> u8 {
        c as u8
    }
}

/// Colorspace tag.  Passed through untouched; no conversion is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Colorspace {
    /// All channels linear.
    Linear = 0,
    /// sRGB color channels with linear alpha.
    #[default]
    Srgb = 1,
}

impl TryFrom<u8> for Colorspace {
    type Error = FormatError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Linear),
            1 => Ok(Self::Srgb),
            other => Err(FormatError::Colorspace(other)),
        }
    }
}

impl From<Colorspace> for u8 {
    fn from(c: Colorspace) -> u8 {
        c as u8
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Parsed QOI file header.
///
/// Non-zero width and height are expected by callers but not enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    pub width: u32,
    pub height: u32,
    pub channels: Channels,
    pub colorspace: Colorspace,
}

impl Header {
    /// Number of pixels the chunk stream must decode to.
    #[inline]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Pack into the 14-byte on-disk form.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&QOI_MAGIC);
        out[4..8].copy_from_slice(&self.width.to_be_bytes());
        out[8..12].copy_from_slice(&self.height.to_be_bytes());
        out[12] = self.channels.into();
        out[13] = self.colorspace.into();
        out
    }

    /// Encode the header to a writer.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.encode())
    }

    /// Parse exactly [`HEADER_SIZE`] bytes.
    ///
    /// Validation order: length, magic, channels, colorspace.
    pub fn decode(bytes: &[u8]) -> Result<Self, QoiError> {
        let bytes: &[u8; HEADER_SIZE] =
            bytes.try_into().map_err(|_| FormatError::HeaderLength {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            })?;

        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if magic != QOI_MAGIC {
            return Err(FormatError::Magic(magic).into());
        }

        let width = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let height = u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        let channels = Channels::try_from(bytes[12])?;
        let colorspace = Colorspace::try_from(bytes[13])?;

        Ok(Self {
            width,
            height,
            channels,
            colorspace,
        })
    }
}

/// Tuple form of [`Header::encode`] taking raw tags.
///
/// Fails with [`FormatError`] if a tag is out of range.
pub fn encode_header(
    width: u32,
    height: u32,
    channels: u8,
    colorspace: u8,
) -> Result<[u8; HEADER_SIZE], QoiError> {
    let header = Header {
        width,
        height,
        channels: Channels::try_from(channels)?,
        colorspace: Colorspace::try_from(colorspace)?,
    };
    Ok(header.encode())
}

/// Tuple form of [`Header::decode`]: `(width, height, channels, colorspace)`.
pub fn decode_header(bytes: &[u8]) -> Result<(u32, u32, u8, u8), QoiError> {
    let h = Header::decode(bytes)?;
    Ok((h.width, h.height, h.channels.into(), h.colorspace.into()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
