use oxiqoi::qoi::{self, Channels, Colorspace, Header, Pixel};
use oxiqoi::{DecodeOptions, Image};
use proptest::prelude::*;

fn any_pixel() -> impl Strategy<Value = Pixel> {
    any::<[u8; 4]>().prop_map(Pixel)
}

/// Pixels from a tiny palette with small jitter so every chunk kind shows up.
fn textured_pixels(max: usize) -> impl Strategy<Value = Vec<Pixel>> {
    proptest::collection::vec((0u8..4, 0u8..3, any::<bool>()), 0..max).prop_map(|picks| {
        let palette = [
            Pixel::new(0, 0, 0, 255),
            Pixel::new(200, 10, 50, 255),
            Pixel::new(90, 90, 90, 128),
            Pixel::new(255, 255, 255, 0),
        ];
        picks
            .into_iter()
            .map(|(color, jitter, luma)| {
                let base = palette[color as usize];
                let d = if luma { jitter as i8 * 5 } else { jitter as i8 - 1 };
                base.offset_rgb(d, d, d)
            })
            .collect()
    })
}

fn image_of(pixels: Vec<Pixel>, channels: Channels) -> Image {
    let width = pixels.len() as u32;
    Image::new(width, 1, channels, Colorspace::Srgb, pixels).unwrap()
}

proptest! {
    #[test]
    fn prop_random_pixels_roundtrip(pixels in proptest::collection::vec(any_pixel(), 1..2048)) {
        let image = image_of(pixels, Channels::Rgba);
        let bytes = oxiqoi::encode(&image).unwrap();
        prop_assert_eq!(oxiqoi::decode(&bytes).unwrap(), image);
    }

    #[test]
    fn prop_textured_pixels_roundtrip(pixels in textured_pixels(4096)) {
        let data = qoi::encode_data(&pixels);
        let decoded = qoi::decode_data(&data, pixels.len() as u32, 1).unwrap();
        prop_assert_eq!(decoded, pixels);
    }

    #[test]
    fn prop_encoded_size_is_bounded(pixels in proptest::collection::vec(any_pixel(), 0..2048)) {
        // Worst case is one RGBA literal per pixel.
        let data = qoi::encode_data(&pixels);
        prop_assert!(data.len() <= pixels.len() * 5);
    }

    #[test]
    fn prop_encoding_is_deterministic(pixels in textured_pixels(1024)) {
        prop_assert_eq!(qoi::encode_data(&pixels), qoi::encode_data(&pixels));
    }

    #[test]
    fn prop_repeated_pixel_run_count(px in any_pixel(), n in 1usize..1000) {
        // A distinct lead pixel, then px once as a non-run chunk, then n repeats.
        let lead = Pixel::new(px.r() ^ 0x80, px.g(), px.b(), px.a());
        let mut pixels = vec![lead];
        pixels.extend(std::iter::repeat_n(px, n + 1));
        let data = qoi::encode_data(&pixels);
        let runs = qoi::ChunkIter::new(&data)
            .filter(|c| c.as_ref().unwrap().kind() == qoi::ChunkKind::Run)
            .count();
        // The lead pixel is itself a run of one when it equals the start pixel.
        let lead_run = usize::from(lead == Pixel::START);
        prop_assert_eq!(runs, n.div_ceil(62) + lead_run);
    }

    #[test]
    fn prop_header_roundtrip(
        width in 1u32..,
        height in 1u32..,
        rgba in any::<bool>(),
        srgb in any::<bool>()
    ) {
        let hdr = Header {
            width,
            height,
            channels: if rgba { Channels::Rgba } else { Channels::Rgb },
            colorspace: if srgb { Colorspace::Srgb } else { Colorspace::Linear },
        };
        prop_assert_eq!(Header::decode(&hdr.encode()).unwrap(), hdr);
        let (w, h, c, s) = qoi::decode_header(&hdr.encode()).unwrap();
        prop_assert_eq!((w, h), (width, height));
        prop_assert_eq!(c, if rgba { 4 } else { 3 });
        prop_assert_eq!(s, u8::from(srgb));
    }

    #[test]
    fn prop_invalid_tags_rejected(channels in any::<u8>(), colorspace in any::<u8>()) {
        let valid = matches!(channels, 3 | 4) && colorspace <= 1;
        prop_assert_eq!(qoi::encode_header(1, 1, channels, colorspace).is_ok(), valid);
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let opts = DecodeOptions { max_pixels: 1 << 16 };
        let _ = oxiqoi::decode_with(&data, &opts);
        let _ = qoi::decode_data(&data, 16, 16);
    }

    #[test]
    fn prop_raw_bytes_roundtrip(raw in proptest::collection::vec(any::<u8>(), 1..300)) {
        let width = (raw.len() / 3) as u32;
        let raw = &raw[..width as usize * 3];
        let image = Image::from_raw(width, 1, Channels::Rgb, Colorspace::Linear, raw).unwrap();
        let decoded = oxiqoi::decode(&oxiqoi::encode(&image).unwrap()).unwrap();
        prop_assert_eq!(decoded.to_raw(), raw.to_vec());
    }
}
