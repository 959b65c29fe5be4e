#![no_main]
use libfuzzer_sys::fuzz_target;
use oxiqoi::qoi::{self, Encoder, Pixel};

fuzz_target!(|data: &[u8]| {
    // First byte picks how many distinct colors to fold the input into, so
    // both literal-heavy and run/index-heavy streams get exercised.
    let Some((&mode, payload)) = data.split_first() else {
        return;
    };
    let mask = match mode % 4 {
        0 => 0xFF,
        1 => 0x0F,
        2 => 0x03,
        _ => 0x01,
    };

    let pixels: Vec<Pixel> = payload
        .chunks_exact(4)
        .map(|c| Pixel::new(c[0] & mask, c[1] & mask, c[2] & mask, c[3] | !mask))
        .collect();

    let mut enc = Encoder::new();
    for &px in &pixels {
        enc.push(px);
    }
    let streamed = enc.finish();
    assert_eq!(streamed, qoi::encode_data(&pixels));

    let decoded = qoi::decode_data(&streamed, pixels.len() as u32, 1).expect("decode");
    assert_eq!(decoded, pixels);
});
