use std::hint::black_box;

use criterion::Criterion;
use keybed::io::midi::decode;

pub fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    // Notes, pedal, wheels, and clock traffic that gets dropped
    let stream: Vec<[u8; 3]> = (0..256u32)
        .map(|i| match i % 8 {
            0 | 1 => [0x90, 48 + (i % 24) as u8, 100],
            2 | 3 => [0x80, 48 + (i % 24) as u8, 0],
            4 => [0xB0, 0x40, if i % 16 == 4 { 127 } else { 0 }],
            5 => [0xE0, (i % 128) as u8, 0x40],
            6 => [0xB0, 0x01, (i % 128) as u8],
            _ => [0xF8, 0, 0],
        })
        .collect();

    group.bench_function("mixed_256", |b| {
        b.iter(|| {
            let mut decoded = 0usize;
            for bytes in &stream {
                if decode(black_box(bytes)).is_some() {
                    decoded += 1;
                }
            }
            decoded
        })
    });

    group.finish();
}
