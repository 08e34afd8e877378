//! Benchmarks for grayscale decoding.
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use zune_png::Decoder;

fn crc32(type_and_data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut c = 0xFFFF_FFFFu32;
    for &byte in type_and_data {
        let mut x = c ^ u32::from(byte);
        for _ in 0..8 {
            x = if x & 1 != 0 { POLY ^ (x >> 1) } else { x >> 1 };
        }
        c = (c >> 8) ^ x;
    }
    c ^ 0xFFFF_FFFF
}

fn chunk(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(12 + data.len());
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    out.extend_from_slice(&crc32(&[chunk_type.as_slice(), data].concat()).to_be_bytes());
    out
}

/// Build a synthetic 256x256 8-bit grayscale gradient, stored (uncompressed)
/// inside the zlib/DEFLATE envelope, since this crate has no encoder and the
/// pack ships no real PNG fixtures. Stored blocks exercise the chunk state
/// machine and defiltering the same as a compressed image would; the
/// Huffman path is covered separately by the dynamic-block unit tests.
fn synthetic_png(side: u32) -> Vec<u8> {
    let mut scanlines = Vec::with_capacity(((side + 1) * side) as usize);
    for y in 0..side {
        scanlines.push(0u8); // filter type: None
        for x in 0..side {
            scanlines.push(((x + y) % 256) as u8);
        }
    }

    let mut deflate = Vec::new();
    const MAX_STORED: usize = 65535;
    let mut offset = 0;
    while offset < scanlines.len() {
        let end = (offset + MAX_STORED).min(scanlines.len());
        let chunk_payload = &scanlines[offset..end];
        let is_final = end == scanlines.len();
        deflate.push(u8::from(is_final));
        let len = chunk_payload.len() as u16;
        deflate.extend_from_slice(&len.to_le_bytes());
        deflate.extend_from_slice(&(!len).to_le_bytes());
        deflate.extend_from_slice(chunk_payload);
        offset = end;
    }

    let mut adler_a = 1u32;
    let mut adler_b = 0u32;
    for &byte in &scanlines {
        adler_a = (adler_a + u32::from(byte)) % 65521;
        adler_b = (adler_b + adler_a) % 65521;
    }
    let adler = (adler_b << 16) | adler_a;

    let mut zlib = vec![0x78, 0x01];
    zlib.extend_from_slice(&deflate);
    zlib.extend_from_slice(&adler.to_be_bytes());

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&side.to_be_bytes());
    ihdr.extend_from_slice(&side.to_be_bytes());
    ihdr.extend_from_slice(&[8, 0, 0, 0, 0]);

    let mut png = crate_signature();
    png.extend(chunk(b"IHDR", &ihdr));
    png.extend(chunk(b"IDAT", &zlib));
    png.extend(chunk(b"IEND", &[]));
    png
}

fn crate_signature() -> Vec<u8> {
    vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]
}

fn decode_png(buf: &[u8]) -> Vec<u8> {
    let mut d = Decoder::new();
    d.decode_buffer(buf).unwrap().0
}

fn criterion_benchmark(c: &mut Criterion) {
    let data = synthetic_png(256);

    c.bench_function("PNG decoding zune-png grayscale 256x256", |b| {
        b.iter(|| black_box(decode_png(data.as_slice())))
    });
}

criterion_group!(name=benches;
      config={
      let c = Criterion::default();
        c.measurement_time(Duration::from_secs(5))
      };
    targets=criterion_benchmark);

criterion_main!(benches);
