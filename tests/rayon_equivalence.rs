#![cfg(feature = "rayon")]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use silmatch::{CanonConfig, Canonicalizer, Corpus, RankConfig, RasterImage, SimilarityRanker};

fn blob(rng: &mut StdRng, width: usize, height: usize) -> RasterImage {
    let cx = rng.random_range(0.3..0.7) * width as f32;
    let cy = rng.random_range(0.3..0.7) * height as f32;
    let rx = rng.random_range(0.05..0.3) * width as f32;
    let ry = rng.random_range(0.05..0.3) * height as f32;
    let mut data = vec![255u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let dx = (x as f32 - cx) / rx;
            let dy = (y as f32 - cy) / ry;
            if dx * dx + dy * dy <= 1.0 || (x + y) % 97 == 0 {
                data[y * width + x] = 0;
            }
        }
    }
    RasterImage::from_gray(&data, width, height).unwrap()
}

#[test]
fn parallel_ranking_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(99);
    let sources: Vec<(String, RasterImage)> = (0..24)
        .map(|i| (format!("shape-{i:02}"), blob(&mut rng, 160, 120)))
        .collect();
    let corpus = Corpus::build(&sources, &CanonConfig::default()).unwrap();
    assert_eq!(corpus.len(), sources.len());

    let query = Canonicalizer::new(CanonConfig::default())
        .unwrap()
        .canonicalize(&blob(&mut rng, 200, 200))
        .unwrap();

    let seq = SimilarityRanker::new()
        .with_config(RankConfig {
            parallel: false,
            ..RankConfig::default()
        })
        .rank(&query, &corpus)
        .unwrap();
    let par = SimilarityRanker::new()
        .with_config(RankConfig {
            parallel: true,
            ..RankConfig::default()
        })
        .rank(&query, &corpus)
        .unwrap();

    assert_eq!(seq, par);
}

#[test]
fn parallel_build_keeps_source_order() {
    let mut rng = StdRng::seed_from_u64(5);
    let sources: Vec<(String, RasterImage)> = (0..32)
        .map(|i| (format!("{}", 31 - i), blob(&mut rng, 90, 140)))
        .collect();
    let corpus = Corpus::build(&sources, &CanonConfig::default()).unwrap();
    let ids: Vec<_> = corpus.entries().iter().map(|e| e.id().to_string()).collect();
    let expected: Vec<_> = sources.iter().map(|(id, _)| id.clone()).collect();
    assert_eq!(ids, expected);
}

#[test]
fn sequential_build_matches_parallel_build() {
    let mut rng = StdRng::seed_from_u64(17);
    let sources: Vec<(String, RasterImage)> = (0..16)
        .map(|i| (format!("shape-{i:02}"), blob(&mut rng, 130, 110)))
        .collect();
    let parallel = Corpus::build(&sources, &CanonConfig::default()).unwrap();
    let sequential = Corpus::build(
        &sources,
        &CanonConfig {
            parallel: false,
            ..CanonConfig::default()
        },
    )
    .unwrap();

    assert_eq!(parallel.len(), sequential.len());
    for (a, b) in parallel.entries().iter().zip(sequential.entries()) {
        assert_eq!(a, b);
    }
}
