use criterion::{criterion_group, criterion_main, Criterion};
use silmatch::{
    CanonConfig, Canonicalizer, Corpus, RankConfig, RasterImage, SimilarityRanker,
};
use std::hint::black_box;

fn make_shape(width: usize, height: usize, seed: usize) -> RasterImage {
    let cx = width as f32 * (0.4 + 0.02 * (seed % 10) as f32);
    let cy = height as f32 * 0.5;
    let rx = width as f32 * (0.15 + 0.01 * (seed % 7) as f32);
    let ry = height as f32 * (0.2 + 0.015 * (seed % 5) as f32);
    let mut data = vec![255u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let dx = (x as f32 - cx) / rx;
            let dy = (y as f32 - cy) / ry;
            let lobe = ((x * 31 + y * 17 + seed) % 41) < 3;
            if dx * dx + dy * dy <= 1.0 || (lobe && dx.abs() < 1.4 && dy.abs() < 1.4) {
                data[y * width + x] = 0;
            }
        }
    }
    RasterImage::from_gray(&data, width, height).unwrap()
}

fn bench_canonicalize(c: &mut Criterion) {
    let canon = Canonicalizer::new(CanonConfig::default()).unwrap();
    let small = make_shape(120, 90, 3);
    let large = make_shape(1200, 900, 3);

    c.bench_function("canonicalize_120x90", |b| {
        b.iter(|| black_box(canon.canonicalize(&small).unwrap()));
    });
    c.bench_function("canonicalize_1200x900", |b| {
        b.iter(|| black_box(canon.canonicalize(&large).unwrap()));
    });
}

fn bench_rank(c: &mut Criterion) {
    let sources: Vec<(String, RasterImage)> = (0..200)
        .map(|i| (format!("shape-{i:03}"), make_shape(240, 180, i)))
        .collect();
    let corpus = Corpus::build(&sources, &CanonConfig::default()).unwrap();
    let query = Canonicalizer::new(CanonConfig::default())
        .unwrap()
        .canonicalize(&make_shape(300, 300, 42))
        .unwrap();

    let seq = SimilarityRanker::new().with_config(RankConfig {
        parallel: false,
        ..RankConfig::default()
    });
    c.bench_function("rank_200_sequential", |b| {
        b.iter(|| black_box(seq.rank(&query, &corpus).unwrap()));
    });

    let par = SimilarityRanker::new().with_config(RankConfig {
        parallel: true,
        ..RankConfig::default()
    });
    c.bench_function("rank_200_parallel", |b| {
        b.iter(|| black_box(par.rank(&query, &corpus).unwrap()));
    });
}

criterion_group!(benches, bench_canonicalize, bench_rank);
criterion_main!(benches);
