use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::io::Cursor;
use avmkit::files::{scan_packets, JpegContainer, PngContainer};
use avmkit::{AvmFile, AvmMeta, ContainerKind, EmbedOptions, ExtractOptions, XmpContainer};

fn encode(format: image::ImageFormat) -> Vec<u8> {
    let pixels = image::RgbImage::from_fn(512, 512, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(pixels)
        .write_to(&mut out, format)
        .unwrap();
    out.into_inner()
}

fn create_meta() -> AvmMeta {
    let mut meta = AvmMeta::new();
    meta.set("ID", "eso1723a").unwrap();
    meta.set("Title", "Benchmark Test").unwrap();
    meta.set("Spatial.ReferenceValue", [274.7, -13.8]).unwrap();
    meta.set("Spatial.Scale", [-0.0002, 0.0002]).unwrap();
    meta
}

/// Encoded image with the benchmark metadata embedded
fn tagged(format: image::ImageFormat) -> Vec<u8> {
    create_meta()
        .embed_bytes(&encode(format), EmbedOptions::default())
        .unwrap()
        .data
}

fn bench_read_jpeg_from_bytes(c: &mut Criterion) {
    let jpeg_data = tagged(image::ImageFormat::Jpeg);

    c.bench_function("read_jpeg_from_bytes", |b| {
        b.iter(|| {
            let _meta =
                AvmMeta::from_image_bytes(black_box(&jpeg_data), ExtractOptions::default())
                    .unwrap();
        });
    });
}

fn bench_read_png_from_bytes(c: &mut Criterion) {
    let png_data = tagged(image::ImageFormat::Png);

    c.bench_function("read_png_from_bytes", |b| {
        b.iter(|| {
            let _meta =
                AvmMeta::from_image_bytes(black_box(&png_data), ExtractOptions::default())
                    .unwrap();
        });
    });
}

fn bench_write_jpeg_to_bytes(c: &mut Criterion) {
    let jpeg_data = encode(image::ImageFormat::Jpeg);
    let meta = create_meta();

    c.bench_function("write_jpeg_to_bytes", |b| {
        b.iter(|| {
            let _embedded = meta
                .embed_bytes(black_box(&jpeg_data), EmbedOptions::default())
                .unwrap();
        });
    });
}

fn bench_write_png_verified(c: &mut Criterion) {
    let png_data = encode(image::ImageFormat::Png);
    let file = AvmFile::from_bytes(png_data);
    let meta = create_meta();

    c.bench_function("write_png_verified", |b| {
        b.iter(|| {
            let _embedded = file
                .embed(black_box(&meta), EmbedOptions::default().verify())
                .unwrap();
        });
    });
}

fn bench_container_round_trip(c: &mut Criterion) {
    let jpeg_data = tagged(image::ImageFormat::Jpeg);
    let png_data = tagged(image::ImageFormat::Png);

    c.bench_function("container_round_trip_jpeg", |b| {
        b.iter(|| {
            let _bytes = JpegContainer::parse(black_box(&jpeg_data))
                .unwrap()
                .serialize();
        });
    });
    c.bench_function("container_round_trip_png", |b| {
        b.iter(|| {
            let _bytes = PngContainer::parse(black_box(&png_data)).unwrap().serialize();
        });
    });
}

fn bench_scan_packets(c: &mut Criterion) {
    let jpeg_data = tagged(image::ImageFormat::Jpeg);

    c.bench_function("scan_packets", |b| {
        b.iter(|| {
            let _packets = scan_packets(black_box(&jpeg_data));
        });
    });
}

fn bench_detect_format(c: &mut Criterion) {
    let jpeg_data = encode(image::ImageFormat::Jpeg);

    c.bench_function("detect_format", |b| {
        b.iter(|| {
            let _kind = ContainerKind::detect(black_box(&jpeg_data));
        });
    });
}

criterion_group!(
    benches,
    bench_read_jpeg_from_bytes,
    bench_read_png_from_bytes,
    bench_write_jpeg_to_bytes,
    bench_write_png_verified,
    bench_container_round_trip,
    bench_scan_packets,
    bench_detect_format
);
criterion_main!(benches);
