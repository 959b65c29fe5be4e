// Pixel value model.
//
// A pixel is always exactly four 8-bit channels (R, G, B, A).  All channel
// arithmetic wraps modulo 256; DIFF and LUMA chunks depend on it.

use super::error::QoiError;

/// Number of channels in a [`Pixel`].
pub const CHANNELS: usize = 4;

/// A 4-channel RGBA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pixel(pub [u8; CHANNELS]);

impl Pixel {
    /// The all-zero pixel every color index slot starts with.
    pub const ZERO: Pixel = Pixel([0, 0, 0, 0]);

    /// Synthetic "previous pixel" before the first real one: opaque black.
    pub const START: Pixel = Pixel([0, 0, 0, 255]);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Build a pixel from RGB channels and an explicit alpha.
    #[inline]
    pub const fn from_rgb(rgb: [u8; 3], a: u8) -> Self {
        Self([rgb[0], rgb[1], rgb[2], a])
    }

    #[inline]
    pub const fn r(self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub const fn g(self) -> u8 {
        self.0[1]
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.0[2]
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.0[3]
    }

    /// The color channels without alpha.
    #[inline]
    pub const fn rgb(self) -> [u8; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Whether `values` has the shape of a pixel (exactly 4 channels).
    #[inline]
    pub fn is_valid_channels(values: &[u8]) -> bool {
        values.len() == CHANNELS
    }

    /// Per-channel wrapping difference `self - prev`.
    #[inline]
    pub fn delta(self, prev: Pixel) -> Delta {
        Delta {
            r: self.r().wrapping_sub(prev.r()) as i8,
            g: self.g().wrapping_sub(prev.g()) as i8,
            b: self.b().wrapping_sub(prev.b()) as i8,
            a: self.a().wrapping_sub(prev.a()) as i8,
        }
    }

    /// Apply wrapping RGB offsets, keeping alpha.
    #[inline]
    pub fn offset_rgb(self, dr: i8, dg: i8, db: i8) -> Pixel {
        Pixel([
            self.r().wrapping_add(dr as u8),
            self.g().wrapping_add(dg as u8),
            self.b().wrapping_add(db as u8),
            self.a(),
        ])
    }
}

impl From<[u8; CHANNELS]> for Pixel {
    #[inline]
    fn from(channels: [u8; CHANNELS]) -> Self {
        Self(channels)
    }
}

impl From<Pixel> for [u8; CHANNELS] {
    #[inline]
    fn from(pixel: Pixel) -> Self {
        pixel.0
    }
}

impl TryFrom<&[u8]> for Pixel {
    type Error = QoiError;

    fn try_from(values: &[u8]) -> Result<Self, Self::Error> {
        <[u8; CHANNELS]>::try_from(values)
            .map(Pixel)
            .map_err(|_| QoiError::InvalidPixel { len: values.len() })
    }
}

/// Wrapping per-channel difference between two pixels, read as signed bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    pub r: i8,
    pub g: i8,
    pub b: i8,
    pub a: i8,
}

impl Delta {
    /// DIFF and LUMA chunks only apply when alpha is unchanged.
    #[inline]
    pub fn alpha_unchanged(&self) -> bool {
        self.a == 0
    }

    /// Red delta relative to the green delta.
    #[inline]
    pub fn r_minus_g(&self) -> i8 {
        self.r.wrapping_sub(self.g)
    }

    /// Blue delta relative to the green delta.
    #[inline]
    pub fn b_minus_g(&self) -> i8 {
        self.b.wrapping_sub(self.g)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
