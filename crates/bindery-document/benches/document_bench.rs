// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for page encoding and PDF export in the
// bindery-document crate, on small synthetic images.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use bindery_core::assembly::build;
use bindery_core::{PageEncoder, Quality};
use bindery_document::{JpegPageEncoder, PdfExporter};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A 600x800 PNG with a light gradient, roughly the look of a phone scan.
fn synthetic_scan() -> Vec<u8> {
    let img = RgbImage::from_fn(600, 800, |x, y| {
        let shade = 200 + ((x + y) % 40) as u8;
        Rgb([shade, shade, shade])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("png encode");
    bytes
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_encode(c: &mut Criterion) {
    let scan = synthetic_scan();
    let encoder = JpegPageEncoder::new(Some(400));

    c.bench_function("jpeg encode + downscale (600x800)", |b| {
        b.iter(|| {
            let out = encoder
                .encode(black_box(&scan), Quality::DEFAULT)
                .expect("encode");
            black_box(out);
        });
    });
}

fn bench_export(c: &mut Criterion) {
    let scan = synthetic_scan();
    let encoder = JpegPageEncoder::new(Some(400));
    let document = build(vec![scan; 5], "bench", &encoder, Quality::DEFAULT).expect("build");
    let exporter = PdfExporter::default();

    c.bench_function("pdf export (5 pages)", |b| {
        b.iter(|| {
            let exported = exporter.render(black_box(&document)).expect("export");
            black_box(exported.bytes);
        });
    });
}

criterion_group!(benches, bench_encode, bench_export);
criterion_main!(benches);
