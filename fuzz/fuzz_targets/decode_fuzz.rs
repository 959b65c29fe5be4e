#![no_main]
use libfuzzer_sys::fuzz_target;
use oxiqoi::DecodeOptions;
use oxiqoi::qoi;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must only ever produce errors, never panics.
    let opts = DecodeOptions {
        max_pixels: 1 << 20,
    };
    let _ = oxiqoi::decode_with(data, &opts);

    // Bare chunk stream with small dimensions taken from the input.
    if data.len() >= 2 {
        let (w, h) = (u32::from(data[0]), u32::from(data[1]));
        let _ = qoi::decode_data(&data[2..], w, h);
        qoi::ChunkIter::new(&data[2..]).for_each(drop);
    }
});
