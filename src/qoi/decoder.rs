// QOI decoder: chunk stream reconstruction.
//
// State per image: previous pixel (starts as opaque black), a fresh color
// index, the input cursor and the output position.  Decoding ends when the
// output holds exactly width * height pixels AND the cursor sits at the end
// of the chunk stream; reaching one without the other is an error.
//
// Every produced pixel, including each pixel of a run, is observed into the
// color index before it becomes the new previous pixel.

use super::chunk::{Chunk, ChunkError};
use super::color_index::ColorIndex;
use super::error::{QoiError, Result};
use super::header::{END_MARKER, HEADER_SIZE, Header};
use super::pixel::Pixel;
use crate::image::Image;

/// Reference decoder limit: 400 million pixels.
pub const DEFAULT_MAX_PIXELS: u64 = 400_000_000;

/// Longest pixel expansion of a single input byte (a full RUN chunk).
const MAX_PIXELS_PER_BYTE: usize = 62;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for whole-file decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Largest `width * height` accepted before any allocation.
    pub max_pixels: u64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Per-image decoder state over a bare chunk stream.
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
    index: ColorIndex,
    prev: Pixel,
    output: Vec<Pixel>,
    expected: usize,
}

impl<'a> Decoder<'a> {
    /// Create a decoder that must produce exactly `expected` pixels from
    /// `data`.
    pub fn new(data: &'a [u8], expected: usize) -> Self {
        // A hostile header cannot force a huge allocation: every byte yields
        // at most one full run.
        let capacity = expected.min(data.len().saturating_mul(MAX_PIXELS_PER_BYTE));
        Self {
            data,
            pos: 0,
            index: ColorIndex::new(),
            prev: Pixel::START,
            output: Vec::with_capacity(capacity),
            expected,
        }
    }

    /// Input bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Pixels produced so far.
    pub fn pixels_decoded(&self) -> usize {
        self.output.len()
    }

    /// Run to the terminal state and return the pixels.
    pub fn decode(mut self) -> Result<Vec<Pixel>> {
        while self.output.len() < self.expected {
            let chunk = self.next_chunk()?;
            self.apply(chunk)?;
        }

        if self.pos != self.data.len() {
            return Err(QoiError::TrailingData {
                remaining: self.data.len() - self.pos,
            });
        }

        Ok(self.output)
    }

    fn next_chunk(&mut self) -> Result<Chunk> {
        match Chunk::read(&self.data[self.pos..]) {
            Ok((chunk, consumed)) => {
                self.pos += consumed;
                Ok(chunk)
            }
            Err(ChunkError::Empty | ChunkError::Truncated { .. }) => {
                Err(QoiError::TruncatedStream {
                    decoded: self.output.len() as u64,
                    expected: self.expected as u64,
                })
            }
            Err(ChunkError::UnknownTag(_)) => Err(QoiError::CorruptStream {
                offset: self.pos,
                reason: "unclassifiable chunk tag",
            }),
        }
    }

    fn apply(&mut self, chunk: Chunk) -> Result<()> {
        let pixel = match chunk {
            Chunk::Rgba(rgba) => Pixel(rgba),
            Chunk::Rgb(rgb) => Pixel::from_rgb(rgb, self.prev.a()),
            Chunk::Luma { dg, dr_dg, db_dg } => self.prev.offset_rgb(
                dg.wrapping_add(dr_dg),
                dg,
                dg.wrapping_add(db_dg),
            ),
            Chunk::Diff { dr, dg, db } => self.prev.offset_rgb(dr, dg, db),
            Chunk::Index(slot) => self.index.lookup(usize::from(slot)),
            Chunk::Run(len) => {
                let remaining = self.expected - self.output.len();
                if usize::from(len) > remaining {
                    return Err(QoiError::CorruptStream {
                        offset: self.pos - 1,
                        reason: "run extends past the last pixel",
                    });
                }
                let pixel = self.prev;
                for _ in 0..len {
                    self.emit(pixel);
                }
                return Ok(());
            }
        };
        self.emit(pixel);
        Ok(())
    }

    #[inline]
    fn emit(&mut self, pixel: Pixel) {
        self.output.push(pixel);
        self.index.observe(pixel);
        self.prev = pixel;
    }
}

// ---------------------------------------------------------------------------
// Convenience functions
// ---------------------------------------------------------------------------

/// Decode a bare chunk stream (no header, no end marker) into exactly
/// `width * height` pixels.
pub fn decode_data(data: &[u8], width: u32, height: u32) -> Result<Vec<Pixel>> {
    let pixels = u64::from(width) * u64::from(height);
    let expected = usize::try_from(pixels).map_err(|_| QoiError::TooManyPixels {
        pixels,
        max: usize::MAX as u64,
    })?;
    Decoder::new(data, expected).decode()
}

/// Decode a complete QOI file with default options.
pub fn decode(bytes: &[u8]) -> Result<Image> {
    decode_with(bytes, &DecodeOptions::default())
}

/// Decode a complete QOI file.
///
/// The first [`HEADER_SIZE`] bytes are the header, the last 8 bytes must be
/// the end marker, and everything in between must decode to exactly
/// `width * height` pixels.
pub fn decode_with(bytes: &[u8], opts: &DecodeOptions) -> Result<Image> {
    let (header, body) = split_header(bytes)?;

    let pixels = header.pixel_count();
    if pixels > opts.max_pixels {
        return Err(QoiError::TooManyPixels {
            pixels,
            max: opts.max_pixels,
        });
    }

    let data = strip_end_marker(body)?;
    let pixels = decode_data(data, header.width, header.height)?;

    Ok(Image {
        width: header.width,
        height: header.height,
        channels: header.channels,
        colorspace: header.colorspace,
        pixels,
    })
}

/// Split a file into its parsed header and the bytes after it.
pub fn split_header(bytes: &[u8]) -> Result<(Header, &[u8])> {
    let split = bytes.len().min(HEADER_SIZE);
    let (head, body) = bytes.split_at(split);
    Ok((Header::decode(head)?, body))
}

/// The chunk stream of a file body, without the trailing end marker.
pub fn strip_end_marker(body: &[u8]) -> Result<&[u8]> {
    body.strip_suffix(&END_MARKER[..])
        .ok_or(QoiError::MissingEndMarker)
}

// ---------------------------------------------------------------------------
// Chunk iterator (for inspection/debugging)
// ---------------------------------------------------------------------------

/// Iterate over the chunks of a bare chunk stream without reconstructing
/// pixels.
///
/// Stops after the first error.
pub struct ChunkIter<'a> {
    data: &'a [u8],
    pos: usize,
    pixels: u64,
    failed: bool,
}

impl<'a> ChunkIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            pixels: 0,
            failed: false,
        }
    }

    /// Byte offset of the next chunk.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Pixels covered by the chunks yielded so far.
    pub fn pixels(&self) -> u64 {
        self.pixels
    }
}

impl Iterator for ChunkIter<'_> {
    type Item = std::result::Result<Chunk, ChunkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }

        match Chunk::read(&self.data[self.pos..]) {
            Ok((chunk, consumed)) => {
                self.pos += consumed;
                self.pixels += chunk.pixel_count() as u64;
                Some(Ok(chunk))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
