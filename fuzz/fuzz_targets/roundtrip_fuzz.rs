#![no_main]
use libfuzzer_sys::fuzz_target;
use oxiqoi::{Channels, Colorspace, Image};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let channels = if data[0] & 1 == 0 { Channels::Rgb } else { Channels::Rgba };
    let colorspace = if data[0] & 2 == 0 { Colorspace::Linear } else { Colorspace::Srgb };
    let raw = &data[1..];
    let stride = channels.count();
    let pixels = raw.len() / stride;
    if pixels == 0 {
        return;
    }

    let width = 1 + data[1] as usize % pixels;
    let height = pixels / width;
    let raw = &raw[..width * height * stride];

    let image = Image::from_raw(width as u32, height as u32, channels, colorspace, raw)
        .expect("raw length matches layout");
    let bytes = oxiqoi::encode(&image).expect("encode");
    let decoded = oxiqoi::decode(&bytes).expect("decode of fresh encode");
    assert_eq!(decoded, image);
    assert_eq!(decoded.to_raw(), raw);
});
