// QOI ("Quite OK Image") format implementation.
//
// Encoder and decoder share the same chunk grammar and maintain identical
// per-image state (previous pixel + 64-slot color index), so every INDEX
// reference resolves to the same pixel on both sides.
//
// # Modules
//
// - `pixel`      : 4-channel pixel value and wrapping channel deltas
// - `color_index`: 64-slot direct-mapped cache of recently seen pixels
// - `header`     : 14-byte file header, channel/colorspace tags, end marker
// - `chunk`      : Chunk tags, classification and byte emission
// - `encoder`    : Greedy chunk selection over a pixel sequence
// - `decoder`    : Chunk stream reconstruction and inspection
// - `error`      : Error types shared by encoder and decoder

pub mod chunk;
pub mod color_index;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod header;
pub mod pixel;

// Re-export key types for convenience.
pub use chunk::{Chunk, ChunkError, ChunkKind, MAX_RUN};
pub use color_index::{ColorIndex, INDEX_SIZE};
pub use decoder::{
    ChunkIter, DEFAULT_MAX_PIXELS, DecodeOptions, Decoder, decode, decode_data, decode_with,
};
pub use encoder::{Encoder, encode, encode_data};
pub use error::{FormatError, QoiError, Result};
pub use header::{
    Channels, Colorspace, END_MARKER, HEADER_SIZE, Header, QOI_MAGIC, decode_header,
    encode_header,
};
pub use pixel::{Delta, Pixel};
