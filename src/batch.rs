// Batch encode/decode of independent images.
//
// Each image carries its own encoder/decoder state, so a batch is
// embarrassingly parallel.  With the `parallel` feature the work is spread
// over rayon's global pool; otherwise it runs sequentially.  Either way the
// results come back in input order and one failure does not affect the
// others.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::image::Image;
use crate::qoi::decoder::{self, DecodeOptions};
use crate::qoi::encoder;
use crate::qoi::error::Result;

/// Encode every image into a complete QOI file.
pub fn encode_batch(images: &[Image]) -> Vec<Result<Vec<u8>>> {
    let encode_one = |(i, image): (usize, &Image)| {
        let result = encoder::encode(image);
        log::trace!(
            "batch encode #{i}: {}x{} -> {:?} bytes",
            image.width,
            image.height,
            result.as_ref().map(Vec::len)
        );
        result
    };

    #[cfg(feature = "parallel")]
    {
        images.par_iter().enumerate().map(encode_one).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        images.iter().enumerate().map(encode_one).collect()
    }
}

/// Decode every buffer as a complete QOI file.
pub fn decode_batch<B>(files: &[B], opts: &DecodeOptions) -> Vec<Result<Image>>
where
    B: AsRef<[u8]> + Sync,
{
    let decode_one = |(i, bytes): (usize, &B)| {
        let result = decoder::decode_with(bytes.as_ref(), opts);
        match &result {
            Ok(image) => log::trace!("batch decode #{i}: {}x{}", image.width, image.height),
            Err(e) => log::trace!("batch decode #{i}: {e}"),
        }
        result
    };

    #[cfg(feature = "parallel")]
    {
        files.par_iter().enumerate().map(decode_one).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        files.iter().enumerate().map(decode_one).collect()
    }
}
