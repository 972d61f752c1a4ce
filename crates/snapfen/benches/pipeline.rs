use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use snapfen::board::{split_squares, BoardLocator};
use snapfen::core::NormalizedBoard;
use snapfen::{DetectConfig, Detector};

fn table_photo() -> RgbImage {
    RgbImage::from_fn(800, 600, |x, y| {
        let inside = (150..630).contains(&x) && (60..540).contains(&y);
        if !inside {
            return Rgb([30, 30, 30]);
        }
        if ((x - 150) / 60 + (y - 60) / 60) % 2 == 0 {
            Rgb([235, 235, 210])
        } else {
            Rgb([110, 140, 90])
        }
    })
}

fn bench_pipeline(c: &mut Criterion) {
    let img = table_photo();
    let detector = Detector::from_config(&DetectConfig::default());
    let locator = BoardLocator::default();

    c.bench_function("locate_800x600", |b| {
        b.iter(|| black_box(locator.locate(black_box(&img))))
    });

    let board: NormalizedBoard = locator.locate(&img);
    c.bench_function("classify_assemble_heuristic", |b| {
        b.iter(|| black_box(detector.detect_board(black_box(&board))))
    });
    c.bench_function("split_squares", |b| {
        b.iter(|| black_box(split_squares(black_box(&board))))
    });

    c.bench_function("detect_end_to_end", |b| {
        b.iter(|| black_box(detector.detect(black_box(&img))))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
