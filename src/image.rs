// In-memory image container.
//
// Pixels are always held as 4-channel RGBA values regardless of the declared
// channel count.  The channel tag only matters when converting to and from
// interleaved raw bytes.

use crate::qoi::error::{QoiError, Result};
use crate::qoi::header::Header;
use crate::qoi::pixel::Pixel;

pub use crate::qoi::header::{Channels, Colorspace};

/// A decoded image: dimensions, tags and `width * height` pixels in row-major
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub channels: Channels,
    pub colorspace: Colorspace,
    pub pixels: Vec<Pixel>,
}

impl Image {
    /// Build an image, checking that `pixels` holds exactly `width * height`
    /// entries.
    pub fn new(
        width: u32,
        height: u32,
        channels: Channels,
        colorspace: Colorspace,
        pixels: Vec<Pixel>,
    ) -> Result<Self> {
        let image = Self {
            width,
            height,
            channels,
            colorspace,
            pixels,
        };
        let expected = image.pixel_count();
        let actual = image.pixels.len() as u64;
        if expected != actual {
            return Err(QoiError::DimensionMismatch { expected, actual });
        }
        Ok(image)
    }

    /// Build an image from interleaved RGB or RGBA bytes.
    ///
    /// RGB input gets alpha 255.  On a length mismatch the error reports
    /// byte counts; dimensions too large to address saturate the expected
    /// count, so they always mismatch.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: Channels,
        colorspace: Colorspace,
        raw: &[u8],
    ) -> Result<Self> {
        let stride = channels.count();
        let expected = (u64::from(width) * u64::from(height)).saturating_mul(stride as u64);
        let actual = raw.len() as u64;
        if expected != actual {
            return Err(QoiError::DimensionMismatch { expected, actual });
        }

        let pixels = match channels {
            Channels::Rgba => raw
                .chunks_exact(stride)
                .map(Pixel::try_from)
                .collect::<Result<Vec<_>>>()?,
            Channels::Rgb => raw
                .chunks_exact(stride)
                .map(|c| Pixel::new(c[0], c[1], c[2], 255))
                .collect(),
        };

        Ok(Self {
            width,
            height,
            channels,
            colorspace,
            pixels,
        })
    }

    /// Interleave the pixels per the declared channel count (alpha dropped
    /// for RGB).
    pub fn to_raw(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * self.channels.count());
        match self.channels {
            Channels::Rgba => {
                for px in &self.pixels {
                    out.extend_from_slice(&px.0);
                }
            }
            Channels::Rgb => {
                for px in &self.pixels {
                    out.extend_from_slice(&px.rgb());
                }
            }
        }
        out
    }

    pub fn header(&self) -> Header {
        Header {
            width: self.width,
            height: self.height,
            channels: self.channels,
            colorspace: self.colorspace,
        }
    }

    /// `width * height`, without overflow.
    #[inline]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Size of [`to_raw`](Self::to_raw) output in bytes, saturating at
    /// `u64::MAX`.
    #[inline]
    pub fn raw_len(&self) -> u64 {
        self.pixel_count()
            .saturating_mul(self.channels.count() as u64)
    }
}
