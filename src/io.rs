// File-level I/O helpers for QOI encoding/decoding.
//
// Provides reader/writer forms of the codec (`encode_to`, `decode_from`),
// whole-file helpers (`read_image`, `write_image`) and raw <-> QOI file
// conversion (`encode_file`, `decode_file`) with buffered I/O.  Optionally
// computes SHA-256 checksums of the raw pixel bytes (feature-gated behind
// `file-io`).

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::image::{Channels, Colorspace, Image};
use crate::qoi::decoder::{self, DecodeOptions};
use crate::qoi::encoder;
use crate::qoi::error::QoiError;

// ---------------------------------------------------------------------------
// Raw layout
// ---------------------------------------------------------------------------

/// Shape of a headerless interleaved pixel file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLayout {
    pub width: u32,
    pub height: u32,
    pub channels: Channels,
    pub colorspace: Colorspace,
}

impl RawLayout {
    /// Expected raw file size in bytes, saturating at `u64::MAX`.
    pub fn raw_len(&self) -> u64 {
        (u64::from(self.width) * u64::from(self.height))
            .saturating_mul(self.channels.count() as u64)
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `encode_file()`.
#[derive(Debug, Clone)]
pub struct EncodeStats {
    pub width: u32,
    pub height: u32,
    pub channels: Channels,
    /// Raw input size in bytes.
    pub raw_size: u64,
    /// QOI output size in bytes.
    pub qoi_size: u64,
    /// SHA-256 of the raw input (if `file-io` feature is enabled).
    pub raw_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `decode_file()`.
#[derive(Debug, Clone)]
pub struct DecodeStats {
    pub width: u32,
    pub height: u32,
    pub channels: Channels,
    /// Raw output size in bytes.
    pub raw_size: u64,
    /// QOI input size in bytes.
    pub qoi_size: u64,
    /// SHA-256 of the raw output (if `file-io` feature is enabled).
    pub raw_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Encoding or decoding error.
    #[error("codec error: {0}")]
    Codec(#[from] QoiError),
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Reader / writer forms
// ---------------------------------------------------------------------------

/// Encode `image` and write the complete QOI file to `w`.
///
/// Returns the number of bytes written.
pub fn encode_to<W: Write>(image: &Image, w: &mut W) -> Result<u64, IoError> {
    let bytes = encoder::encode(image)?;
    w.write_all(&bytes)?;
    Ok(bytes.len() as u64)
}

/// Read a complete QOI file from `r` and decode it.
pub fn decode_from<R: Read>(r: &mut R, opts: &DecodeOptions) -> Result<Image, IoError> {
    let mut bytes = Vec::new();
    r.read_to_end(&mut bytes)?;
    Ok(decoder::decode_with(&bytes, opts)?)
}

// ---------------------------------------------------------------------------
// Whole-file helpers
// ---------------------------------------------------------------------------

/// Read and decode a QOI file with default options.
pub fn read_image(path: &Path) -> Result<Image, IoError> {
    read_image_with(path, &DecodeOptions::default())
}

/// Read and decode a QOI file.
pub fn read_image_with(path: &Path, opts: &DecodeOptions) -> Result<Image, IoError> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(BUF_SIZE, file);
    let image = decode_from(&mut reader, opts)?;
    log::debug!(
        "read {}: {}x{} {:?}",
        path.display(),
        image.width,
        image.height,
        image.channels
    );
    Ok(image)
}

/// Encode `image` into a QOI file at `path`, returning the bytes written.
pub fn write_image(path: &Path, image: &Image) -> Result<u64, IoError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, file);
    let written = encode_to(image, &mut writer)?;
    writer.flush()?;
    log::debug!("wrote {}: {written} bytes", path.display());
    Ok(written)
}

// ---------------------------------------------------------------------------
// encode_file
// ---------------------------------------------------------------------------

/// Encode a headerless raw pixel file into a QOI file.
///
/// The raw input is streamed through a `BufReader` into memory (QOI encodes
/// whole images).  When the `file-io` feature is enabled, a SHA-256 checksum
/// of the raw bytes is computed as they are read.
pub fn encode_file(
    raw_path: &Path,
    qoi_path: &Path,
    layout: &RawLayout,
) -> Result<EncodeStats, IoError> {
    let raw_file = File::open(raw_path)?;
    let size_hint = raw_file.metadata()?.len();
    let mut reader = BufReader::with_capacity(BUF_SIZE, raw_file);

    #[cfg(feature = "file-io")]
    let mut hasher = sha2::Sha256::new();

    let mut raw = Vec::with_capacity(usize::try_from(size_hint).unwrap_or(0));
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        #[cfg(feature = "file-io")]
        {
            hasher.update(&buf[..n]);
        }
        raw.extend_from_slice(&buf[..n]);
    }

    let image = Image::from_raw(
        layout.width,
        layout.height,
        layout.channels,
        layout.colorspace,
        &raw,
    )?;
    let qoi_size = write_image(qoi_path, &image)?;

    #[cfg(feature = "file-io")]
    let raw_sha256 = Some(hasher.finalize().into());
    #[cfg(not(feature = "file-io"))]
    let raw_sha256: Option<[u8; 32]> = None;

    log::debug!(
        "encoded {} -> {}: {} raw bytes, {qoi_size} QOI bytes",
        raw_path.display(),
        qoi_path.display(),
        raw.len()
    );

    Ok(EncodeStats {
        width: layout.width,
        height: layout.height,
        channels: layout.channels,
        raw_size: raw.len() as u64,
        qoi_size,
        raw_sha256,
    })
}

// ---------------------------------------------------------------------------
// decode_file
// ---------------------------------------------------------------------------

/// Decode a QOI file into a headerless raw pixel file with default options.
pub fn decode_file(qoi_path: &Path, raw_path: &Path) -> Result<DecodeStats, IoError> {
    decode_file_with(qoi_path, raw_path, &DecodeOptions::default())
}

/// Decode a QOI file into a headerless raw pixel file.
///
/// The raw output is interleaved per the header's channel count.  When the
/// `file-io` feature is enabled, a SHA-256 checksum of the output is
/// computed as it is written.
pub fn decode_file_with(
    qoi_path: &Path,
    raw_path: &Path,
    opts: &DecodeOptions,
) -> Result<DecodeStats, IoError> {
    let qoi_file = File::open(qoi_path)?;
    let qoi_size = qoi_file.metadata()?.len();
    let mut reader = BufReader::with_capacity(BUF_SIZE, qoi_file);
    let image = decode_from(&mut reader, opts)?;
    let raw = image.to_raw();

    let raw_file = File::create(raw_path)?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, raw_file);

    #[cfg(feature = "file-io")]
    let raw_sha256 = {
        let mut hasher = sha2::Sha256::new();
        let mut hashing_writer = HashingWriter {
            inner: &mut writer,
            hasher: &mut hasher,
        };
        hashing_writer.write_all(&raw)?;
        Some(hasher.finalize().into())
    };
    #[cfg(not(feature = "file-io"))]
    let raw_sha256: Option<[u8; 32]> = {
        writer.write_all(&raw)?;
        None
    };

    writer.flush()?;

    log::debug!(
        "decoded {} -> {}: {}x{}, {} raw bytes",
        qoi_path.display(),
        raw_path.display(),
        image.width,
        image.height,
        raw.len()
    );

    Ok(DecodeStats {
        width: image.width,
        height: image.height,
        channels: image.channels,
        raw_size: raw.len() as u64,
        qoi_size,
        raw_sha256,
    })
}

// ---------------------------------------------------------------------------
// Hashing writer (used with file-io feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
struct HashingWriter<'a, W: Write> {
    inner: &'a mut W,
    hasher: &'a mut sha2::Sha256,
}

#[cfg(feature = "file-io")]
impl<W: Write> Write for HashingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
