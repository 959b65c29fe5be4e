// QOI encoder: greedy chunk selection over a pixel sequence.
//
// For every pixel the first applicable chunk kind wins, in this order:
//
//   RUN    pixel equals the previous one (deferred, flushed at 62)
//   INDEX  pixel already sits in its color index slot
//   DIFF   small per-channel deltas, alpha unchanged
//   LUMA   green-relative deltas, alpha unchanged
//   RGB    alpha unchanged
//   RGBA   fallback
//
// A pixel that misses the index is stored into its slot before the delta
// checks, so the decoder (which observes every pixel) stays in sync.

use super::chunk::{Chunk, MAX_RUN};
use super::color_index::ColorIndex;
use super::error::{QoiError, Result};
use super::header::{END_MARKER, HEADER_SIZE};
use super::pixel::Pixel;
use crate::image::Image;

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Per-image encoder state.
///
/// Pixels are fed one at a time with [`push`](Self::push); [`finish`](Self::finish)
/// flushes any open run and returns the chunk stream (no header, no end
/// marker).
///
/// # Example
/// ```
/// use oxiqoi::qoi::{Encoder, Pixel};
///
/// let mut enc = Encoder::new();
/// enc.push(Pixel::new(10, 20, 30, 255));
/// enc.push(Pixel::new(10, 20, 30, 255));
/// assert_eq!(enc.finish(), vec![0xFE, 10, 20, 30, 0xC0]);
/// ```
#[derive(Debug, Clone)]
pub struct Encoder {
    index: ColorIndex,
    prev: Pixel,
    run: u8,
    out: Vec<u8>,
    pixels_in: u64,
}

impl Encoder {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an encoder whose output buffer is pre-sized to `bytes`.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            index: ColorIndex::new(),
            prev: Pixel::START,
            run: 0,
            out: Vec::with_capacity(bytes),
            pixels_in: 0,
        }
    }

    /// Encode the next pixel.
    pub fn push(&mut self, pixel: Pixel) {
        self.pixels_in += 1;

        if pixel == self.prev {
            self.run += 1;
            if self.run == MAX_RUN {
                self.flush_run();
            }
            return;
        }

        self.flush_run();
        let chunk = self.select(pixel);
        chunk.write_to(&mut self.out);
        self.prev = pixel;
    }

    /// Encode a slice of pixels.
    pub fn extend(&mut self, pixels: &[Pixel]) {
        for &px in pixels {
            self.push(px);
        }
    }

    /// Number of pixels pushed so far.
    pub fn pixels_in(&self) -> u64 {
        self.pixels_in
    }

    /// Bytes of chunk data produced so far (an open run is not counted).
    pub fn bytes_out(&self) -> usize {
        self.out.len()
    }

    /// Flush the pending run and return the chunk stream.
    pub fn finish(mut self) -> Vec<u8> {
        self.flush_run();
        self.out
    }

    /// Pick the chunk for a pixel that differs from the previous one.
    fn select(&mut self, pixel: Pixel) -> Chunk {
        if let Some(slot) = self.index.match_or_observe(pixel) {
            return Chunk::Index(slot);
        }

        let delta = pixel.delta(self.prev);
        if !delta.alpha_unchanged() {
            return Chunk::Rgba(pixel.0);
        }

        Chunk::diff(delta)
            .or_else(|| Chunk::luma(delta))
            .unwrap_or(Chunk::Rgb(pixel.rgb()))
    }

    #[inline]
    fn flush_run(&mut self) {
        if self.run > 0 {
            Chunk::Run(self.run).write_to(&mut self.out);
            self.run = 0;
        }
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Convenience functions
// ---------------------------------------------------------------------------

/// Encode a pixel sequence into a bare chunk stream.
pub fn encode_data(pixels: &[Pixel]) -> Vec<u8> {
    let mut enc = Encoder::with_capacity(pixels.len());
    enc.extend(pixels);
    enc.finish()
}

/// Encode a complete QOI file: header, chunk stream, end marker.
///
/// Fails with [`QoiError::DimensionMismatch`] if the pixel buffer does not
/// hold exactly `width * height` pixels.
pub fn encode(image: &Image) -> Result<Vec<u8>> {
    let header = image.header();
    let expected = header.pixel_count();
    let actual = image.pixels.len() as u64;
    if expected != actual {
        return Err(QoiError::DimensionMismatch { expected, actual });
    }

    let mut out = Vec::with_capacity(HEADER_SIZE + image.pixels.len() + END_MARKER.len());
    out.extend_from_slice(&header.encode());

    let mut enc = Encoder::with_capacity(image.pixels.len());
    enc.extend(&image.pixels);
    out.extend_from_slice(&enc.finish());

    out.extend_from_slice(&END_MARKER);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qoi::chunk::{ChunkKind, QOI_OP_RUN};
    use crate::qoi::header::{Channels, Colorspace};

    fn px(r: u8, g: u8, b: u8, a: u8) -> Pixel {
        Pixel::new(r, g, b, a)
    }

    #[test]
    fn rgb_literal_for_first_pixel() {
        assert_eq!(encode_data(&[px(101, 102, 103, 255)]), vec![0xFE, 101, 102, 103]);
    }

    #[test]
    fn rgba_literal_when_alpha_changes() {
        assert_eq!(
            encode_data(&[px(101, 102, 103, 104)]),
            vec![0xFF, 101, 102, 103, 104]
        );
    }

    #[test]
    fn start_pixel_is_a_run() {
        assert_eq!(encode_data(&[Pixel::START]), vec![0xC0]);
    }

    #[test]
    fn run_is_flushed_at_end() {
        let data = encode_data(&[px(10, 20, 30, 255), px(10, 20, 30, 255)]);
        assert_eq!(data, vec![0xFE, 10, 20, 30, 0xC0]);
    }

    #[test]
    fn run_saturates_at_62() {
        let pixels = vec![Pixel::START; 62 * 2 + 5];
        let data = encode_data(&pixels);
        assert_eq!(data, vec![QOI_OP_RUN | 61, QOI_OP_RUN | 61, QOI_OP_RUN | 4]);
    }

    #[test]
    fn run_exactly_62_emits_one_chunk() {
        let data = encode_data(&vec![Pixel::START; 62]);
        assert_eq!(data, vec![0xFD]);
    }

    #[test]
    fn run_flushed_before_next_chunk() {
        let a = px(10, 20, 30, 255);
        let b = px(11, 20, 30, 255);
        let data = encode_data(&[a, a, a, b]);
        // RGB(a), RUN(2), DIFF(+1,0,0)
        assert_eq!(data, vec![0xFE, 10, 20, 30, 0xC1, 0x40 | 3 << 4 | 2 << 2 | 2]);
    }

    #[test]
    fn index_for_recurring_pixel() {
        let a = px(10, 20, 30, 255);
        let b = px(200, 100, 50, 255);
        let data = encode_data(&[a, b, a]);
        let slot = ColorIndex::hash(a) as u8;
        assert_eq!(*data.last().unwrap(), slot);
        assert_eq!(data.len(), 4 + 4 + 1);
    }

    #[test]
    fn index_beats_diff() {
        // b is within DIFF range of a, but a is already indexed.
        let a = px(10, 20, 30, 255);
        let b = px(11, 20, 30, 255);
        let data = encode_data(&[a, b, a]);
        assert_eq!(data[5], ColorIndex::hash(a) as u8);
    }

    #[test]
    fn diff_and_luma_selection() {
        let base = px(100, 100, 100, 255);
        let diff = px(99, 101, 100, 255);
        let luma = px(110, 105, 100, 255);

        let mut enc = Encoder::new();
        enc.push(base);
        let after_base = enc.bytes_out();
        enc.push(diff);
        enc.push(luma);
        let data = enc.finish();

        let (c, _) = Chunk::read(&data[after_base..]).unwrap();
        assert_eq!(c.kind(), ChunkKind::Diff);
        let (c, _) = Chunk::read(&data[after_base + 1..]).unwrap();
        assert_eq!(
            c,
            Chunk::Luma {
                dg: 4,
                dr_dg: 7,
                db_dg: -4
            }
        );
    }

    #[test]
    fn rgb_when_deltas_too_large() {
        let data = encode_data(&[px(0, 0, 0, 255), px(0, 100, 0, 255)]);
        assert_eq!(data, vec![0xC0, 0xFE, 0, 100, 0]);
    }

    #[test]
    fn deterministic() {
        let pixels: Vec<Pixel> = (0..500u32)
            .map(|i| px((i * 7) as u8, (i / 3) as u8, (i % 5) as u8, 255 - (i % 3) as u8))
            .collect();
        assert_eq!(encode_data(&pixels), encode_data(&pixels));
    }

    #[test]
    fn encode_frames_header_and_end_marker() {
        let image = Image::new(
            2,
            1,
            Channels::Rgba,
            Colorspace::Srgb,
            vec![px(10, 20, 30, 255); 2],
        )
        .unwrap();
        let bytes = encode(&image).unwrap();
        assert_eq!(&bytes[..4], b"qoif");
        assert_eq!(&bytes[4..8], &2u32.to_be_bytes());
        assert_eq!(&bytes[8..12], &1u32.to_be_bytes());
        assert_eq!(bytes[12], 4);
        assert_eq!(bytes[13], 1);
        assert_eq!(&bytes[14..19], &[0xFE, 10, 20, 30, 0xC0]);
        assert_eq!(&bytes[19..], &END_MARKER);
    }

    #[test]
    fn encode_rejects_wrong_pixel_count() {
        let mut image =
            Image::new(1, 1, Channels::Rgb, Colorspace::Srgb, vec![Pixel::START]).unwrap();
        image.pixels.push(Pixel::START);
        assert_eq!(
            encode(&image),
            Err(QoiError::DimensionMismatch {
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn pixels_in_counts_runs() {
        let mut enc = Encoder::new();
        enc.extend(&[Pixel::START; 10]);
        assert_eq!(enc.pixels_in(), 10);
        assert_eq!(enc.bytes_out(), 0);
        assert_eq!(enc.finish(), vec![0xC9]);
    }
}
