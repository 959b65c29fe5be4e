//! Oxiqoi: lossless "Quite OK Image" (QOI) encoding/decoding in Rust.
//!
//! The crate provides:
//! - A pure-Rust QOI codec (`qoi`)
//! - An in-memory image container (`image`)
//! - File-oriented helpers (`io`)
//! - Batch encode/decode of independent images (`batch`, parallel with the
//!   `parallel` feature)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use oxiqoi::{Channels, Colorspace, Image, Pixel};
//!
//! let pixels = vec![Pixel::new(10, 20, 30, 255); 2];
//! let image = Image::new(2, 1, Channels::Rgba, Colorspace::Srgb, pixels).unwrap();
//!
//! let bytes = oxiqoi::encode(&image).unwrap();
//! assert_eq!(&bytes[14..19], &[0xFE, 10, 20, 30, 0xC0]);
//!
//! let decoded = oxiqoi::decode(&bytes).unwrap();
//! assert_eq!(decoded, image);
//! ```

pub mod batch;
pub mod image;
pub mod io;
pub mod qoi;

#[cfg(feature = "cli")]
pub mod cli;

pub use image::Image;
pub use qoi::{
    Channels, Colorspace, DecodeOptions, Header, Pixel, QoiError, decode, decode_with, encode,
};
