// QOI chunk grammar.
//
// Chunk tag encoding (first byte):
//
//   RGB    11111110  r g b        4 bytes
//   RGBA   11111111  r g b a      5 bytes
//   INDEX  00iiiiii               1 byte
//   DIFF   01rrggbb               1 byte   (each delta biased by 2)
//   LUMA   10gggggg  rrrrbbbb     2 bytes  (dg biased by 32, dr-dg / db-dg by 8)
//   RUN    11llllll               1 byte   (length - 1, 0..=61)
//
// The two full-byte tags live inside the 2-bit RUN tag space, so they must be
// tested first.

use thiserror::Error;

use super::pixel::Delta;

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

pub const QOI_OP_INDEX: u8 = 0x00;
pub const QOI_OP_DIFF: u8 = 0x40;
pub const QOI_OP_LUMA: u8 = 0x80;
pub const QOI_OP_RUN: u8 = 0xC0;
pub const QOI_OP_RGB: u8 = 0xFE;
pub const QOI_OP_RGBA: u8 = 0xFF;

/// Mask selecting the 2-bit tag.
pub const TAG_MASK: u8 = 0xC0;
/// Mask selecting the 6-bit payload of a 2-bit-tagged chunk.
pub const PAYLOAD_MASK: u8 = 0x3F;

/// Longest run a single RUN chunk can carry.
pub const MAX_RUN: u8 = 62;

const DIFF_BIAS: i8 = 2;
const LUMA_GREEN_BIAS: i8 = 32;
const LUMA_RB_BIAS: i8 = 8;

// ---------------------------------------------------------------------------
// Chunk kinds
// ---------------------------------------------------------------------------

/// The six chunk kinds, in decoder classification order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChunkKind {
    Rgba,
    Rgb,
    Luma,
    Diff,
    Index,
    Run,
}

impl ChunkKind {
    pub const ALL: [ChunkKind; 6] = [
        ChunkKind::Rgba,
        ChunkKind::Rgb,
        ChunkKind::Luma,
        ChunkKind::Diff,
        ChunkKind::Index,
        ChunkKind::Run,
    ];

    /// Classify a chunk by its first byte.
    ///
    /// Full-byte tags are matched before the 2-bit tags.  The tag space is
    /// exhaustive, but callers still treat `None` as a corrupt stream.
    #[inline]
    pub fn classify(tag: u8) -> Option<ChunkKind> {
        match tag {
            QOI_OP_RGBA => Some(ChunkKind::Rgba),
            QOI_OP_RGB => Some(ChunkKind::Rgb),
            _ => match tag & TAG_MASK {
                QOI_OP_LUMA => Some(ChunkKind::Luma),
                QOI_OP_DIFF => Some(ChunkKind::Diff),
                QOI_OP_INDEX => Some(ChunkKind::Index),
                QOI_OP_RUN => Some(ChunkKind::Run),
                _ => None,
            },
        }
    }

    /// Encoded size in bytes, tag included.
    #[inline]
    pub fn encoded_len(self) -> usize {
        match self {
            ChunkKind::Rgba => 5,
            ChunkKind::Rgb => 4,
            ChunkKind::Luma => 2,
            ChunkKind::Diff | ChunkKind::Index | ChunkKind::Run => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChunkKind::Rgba => "RGBA",
            ChunkKind::Rgb => "RGB",
            ChunkKind::Luma => "LUMA",
            ChunkKind::Diff => "DIFF",
            ChunkKind::Index => "INDEX",
            ChunkKind::Run => "RUN",
        }
    }
}

// ---------------------------------------------------------------------------
// Chunks
// ---------------------------------------------------------------------------

/// One decoded chunk.  Deltas are stored unbiased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk {
    /// Literal RGBA pixel.
    Rgba([u8; 4]),
    /// Literal RGB, alpha carried over from the previous pixel.
    Rgb([u8; 3]),
    /// Green delta in -32..=31, red/blue relative to green in -8..=7.
    Luma { dg: i8, dr_dg: i8, db_dg: i8 },
    /// Per-channel deltas in -2..=1.
    Diff { dr: i8, dg: i8, db: i8 },
    /// Color index slot, 0..64.
    Index(u8),
    /// Repeat count, 1..=62.
    Run(u8),
}

/// Why a chunk could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// No bytes left to read a tag from.
    #[error("no chunk tag at end of input")]
    Empty,
    /// Tag matched none of the six chunk kinds.
    #[error("unclassifiable chunk tag {0:#04X}")]
    UnknownTag(u8),
    /// The chunk's payload extends past the end of input.
    #[error("{kind:?} chunk needs {needed} bytes, {available} available")]
    Truncated {
        kind: ChunkKind,
        needed: usize,
        available: usize,
    },
}

impl Chunk {
    /// DIFF chunk for `delta`, if alpha is unchanged and every color delta
    /// lies in -2..=1.
    #[inline]
    pub fn diff(delta: Delta) -> Option<Chunk> {
        let fits = |d: i8| (-2..=1).contains(&d);
        (delta.alpha_unchanged() && fits(delta.r) && fits(delta.g) && fits(delta.b)).then_some(
            Chunk::Diff {
                dr: delta.r,
                dg: delta.g,
                db: delta.b,
            },
        )
    }

    /// LUMA chunk for `delta`, if alpha is unchanged, the green delta lies in
    /// -32..=31 and both red-green and blue-green lie in -8..=7.
    #[inline]
    pub fn luma(delta: Delta) -> Option<Chunk> {
        let dr_dg = delta.r_minus_g();
        let db_dg = delta.b_minus_g();
        let fits = (-32..=31).contains(&delta.g)
            && (-8..=7).contains(&dr_dg)
            && (-8..=7).contains(&db_dg);
        (delta.alpha_unchanged() && fits).then_some(Chunk::Luma {
            dg: delta.g,
            dr_dg,
            db_dg,
        })
    }

    #[inline]
    pub fn kind(&self) -> ChunkKind {
        match self {
            Chunk::Rgba(_) => ChunkKind::Rgba,
            Chunk::Rgb(_) => ChunkKind::Rgb,
            Chunk::Luma { .. } => ChunkKind::Luma,
            Chunk::Diff { .. } => ChunkKind::Diff,
            Chunk::Index(_) => ChunkKind::Index,
            Chunk::Run(_) => ChunkKind::Run,
        }
    }

    /// Encoded size in bytes, tag included.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        self.kind().encoded_len()
    }

    /// Number of pixels this chunk expands to.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        match self {
            Chunk::Run(n) => usize::from(*n),
            _ => 1,
        }
    }

    /// Append the encoded bytes to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        match *self {
            Chunk::Rgba([r, g, b, a]) => out.extend_from_slice(&[QOI_OP_RGBA, r, g, b, a]),
            Chunk::Rgb([r, g, b]) => out.extend_from_slice(&[QOI_OP_RGB, r, g, b]),
            Chunk::Luma { dg, dr_dg, db_dg } => {
                let g = dg.wrapping_add(LUMA_GREEN_BIAS) as u8;
                let r = dr_dg.wrapping_add(LUMA_RB_BIAS) as u8;
                let b = db_dg.wrapping_add(LUMA_RB_BIAS) as u8;
                out.extend_from_slice(&[QOI_OP_LUMA | (g & PAYLOAD_MASK), (r << 4) | (b & 0x0F)]);
            }
            Chunk::Diff { dr, dg, db } => {
                let r = dr.wrapping_add(DIFF_BIAS) as u8;
                let g = dg.wrapping_add(DIFF_BIAS) as u8;
                let b = db.wrapping_add(DIFF_BIAS) as u8;
                out.push(QOI_OP_DIFF | (r & 0x03) << 4 | (g & 0x03) << 2 | (b & 0x03));
            }
            Chunk::Index(slot) => out.push(QOI_OP_INDEX | (slot & PAYLOAD_MASK)),
            Chunk::Run(len) => {
                debug_assert!((1..=MAX_RUN).contains(&len));
                out.push(QOI_OP_RUN | (len - 1));
            }
        }
    }

    /// Read one chunk from the front of `data`.
    ///
    /// Returns the chunk and the number of bytes consumed.
    pub fn read(data: &[u8]) -> Result<(Chunk, usize), ChunkError> {
        let &tag = data.first().ok_or(ChunkError::Empty)?;
        let kind = ChunkKind::classify(tag).ok_or(ChunkError::UnknownTag(tag))?;
        let needed = kind.encoded_len();
        let bytes = data.get(..needed).ok_or(ChunkError::Truncated {
            kind,
            needed,
            available: data.len(),
        })?;

        let chunk = match kind {
            ChunkKind::Rgba => Chunk::Rgba([bytes[1], bytes[2], bytes[3], bytes[4]]),
            ChunkKind::Rgb => Chunk::Rgb([bytes[1], bytes[2], bytes[3]]),
            ChunkKind::Luma => {
                let second = bytes[1];
                Chunk::Luma {
                    dg: ((tag & PAYLOAD_MASK) as i8) - LUMA_GREEN_BIAS,
                    dr_dg: ((second >> 4) as i8) - LUMA_RB_BIAS,
                    db_dg: ((second & 0x0F) as i8) - LUMA_RB_BIAS,
                }
            }
            ChunkKind::Diff => Chunk::Diff {
                dr: ((tag >> 4 & 0x03) as i8) - DIFF_BIAS,
                dg: ((tag >> 2 & 0x03) as i8) - DIFF_BIAS,
                db: ((tag & 0x03) as i8) - DIFF_BIAS,
            },
            ChunkKind::Index => Chunk::Index(tag & PAYLOAD_MASK),
            ChunkKind::Run => Chunk::Run((tag & PAYLOAD_MASK) + 1),
        };
        Ok((chunk, needed))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
