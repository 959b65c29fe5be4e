use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use oxiqoi::batch;
use oxiqoi::qoi::{self, ColorIndex, Pixel};
use oxiqoi::{Channels, Colorspace, DecodeOptions, Image};
use std::fs;
use std::path::Path;

/// LCG noise: worst case for QOI (mostly literals).
fn gen_noise(pixels: usize, seed: u64) -> Vec<Pixel> {
    let mut s = seed;
    (0..pixels)
        .map(|_| {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
            let v = (s >> 24) as u32;
            Pixel::new(v as u8, (v >> 8) as u8, (v >> 16) as u8, 255)
        })
        .collect()
}

/// Photo-like content: smooth gradients with a little LCG jitter.
fn gen_photo(width: usize, height: usize, seed: u64) -> Vec<Pixel> {
    let mut s = seed;
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
            let jitter = ((s >> 60) as u8) & 0x03;
            out.push(Pixel::new(
                (x / 4) as u8 ^ jitter,
                (y / 4) as u8,
                ((x + y) / 8) as u8,
                255,
            ));
        }
    }
    out
}

/// Flat UI-like content: large solid blocks.
fn gen_flat(width: usize, height: usize) -> Vec<Pixel> {
    (0..width * height)
        .map(|i| {
            let block = ((i % width) / 64 + (i / width) / 64) % 5;
            Pixel::new(block as u8 * 50, 200, 255 - block as u8 * 30, 255)
        })
        .collect()
}

fn image(width: usize, height: usize, pixels: Vec<Pixel>) -> Image {
    Image::new(
        width as u32,
        height as u32,
        Channels::Rgba,
        Colorspace::Srgb,
        pixels,
    )
    .unwrap()
}

fn write_ratio_snapshot() {
    let (w, h) = (512usize, 512usize);
    let mut csv = String::from("content,raw_bytes,qoi_bytes,ratio\n");
    for (name, pixels) in [
        ("noise", gen_noise(w * h, 1)),
        ("photo", gen_photo(w, h, 2)),
        ("flat", gen_flat(w, h)),
    ] {
        let raw = pixels.len() * 4;
        let qoi = qoi::encode_data(&pixels).len();
        let ratio = qoi as f64 / raw as f64;
        csv.push_str(&format!("{name},{raw},{qoi},{ratio}\n"));
    }
    let out_dir = Path::new("target/criterion/custom_reports");
    let _ = fs::create_dir_all(out_dir);
    let _ = fs::write(out_dir.join("ratio_snapshot.csv"), csv);
}

fn bench_encoding_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("encoding_speed_mpix_s");
    for side in [64usize, 512, 2048] {
        let pixels = gen_photo(side, side, 1);
        g.throughput(Throughput::Elements((side * side) as u64));
        g.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            b.iter(|| {
                let data = qoi::encode_data(black_box(&pixels));
                black_box(data);
            });
        });
    }
    g.finish();
}

fn bench_decoding_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("decoding_speed_mpix_s");
    for side in [64usize, 512, 2048] {
        let data = qoi::encode_data(&gen_photo(side, side, 2));
        g.throughput(Throughput::Elements((side * side) as u64));
        g.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, &side| {
            b.iter(|| {
                let out =
                    qoi::decode_data(black_box(&data), side as u32, side as u32).unwrap();
                black_box(out);
            });
        });
    }
    g.finish();
}

fn bench_content_kinds(c: &mut Criterion) {
    write_ratio_snapshot();
    let mut g = c.benchmark_group("roundtrip_by_content");
    let (w, h) = (1024usize, 1024usize);
    let scenarios = [
        ("noise", gen_noise(w * h, 3)),
        ("photo", gen_photo(w, h, 4)),
        ("flat", gen_flat(w, h)),
    ];

    for (name, pixels) in scenarios {
        let img = image(w, h, pixels);
        g.throughput(Throughput::Bytes(img.raw_len()));
        g.bench_function(name, |b| {
            b.iter(|| {
                let bytes = oxiqoi::encode(&img).unwrap();
                let out = oxiqoi::decode(&bytes).unwrap();
                black_box(out);
            });
        });
    }
    g.finish();
}

fn bench_color_index(c: &mut Criterion) {
    let pixels = gen_noise(1 << 16, 5);
    c.bench_function("color_index_observe_lookup", |b| {
        b.iter(|| {
            let mut index = ColorIndex::new();
            let mut hits = 0u32;
            for &px in &pixels {
                if index.match_or_observe(px).is_some() {
                    hits += 1;
                }
            }
            black_box(hits);
        });
    });
}

fn bench_batch(c: &mut Criterion) {
    let mut g = c.benchmark_group("batch_32_images");
    let images: Vec<Image> = (0..32u64)
        .map(|seed| image(256, 256, gen_photo(256, 256, seed)))
        .collect();
    let files: Vec<Vec<u8>> = images
        .iter()
        .map(|img| oxiqoi::encode(img).unwrap())
        .collect();
    let opts = DecodeOptions::default();

    g.bench_function("encode", |b| {
        b.iter(|| black_box(batch::encode_batch(black_box(&images))));
    });
    g.bench_function("decode", |b| {
        b.iter(|| black_box(batch::decode_batch(black_box(&files), &opts)));
    });
    g.finish();
}

criterion_group!(
    benches,
    bench_encoding_speed,
    bench_decoding_speed,
    bench_content_kinds,
    bench_color_index,
    bench_batch
);
criterion_main!(benches);
