// Recommendation benchmarks over generated catalogs
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use std::sync::Arc;
use tunematch_core::{Catalog, FeatureSchema, Song, CANONICAL_FEATURES};
use tunematch_similarity::{RecommendationCache, RecommendationEngine};

fn generate_random_song(rng: &mut impl Rng, id: usize) -> Song {
    let features = CANONICAL_FEATURES.iter().map(|name| {
        let value = match *name {
            "tempo" => rng.random_range(60.0..200.0),
            "loudness" => rng.random_range(-40.0..0.0),
            "key" => rng.random_range(0..12) as f64,
            "mode" => rng.random_range(0..2) as f64,
            "duration_ms" => rng.random_range(90_000.0..420_000.0),
            _ => rng.random_range(0.0..1.0),
        };
        (*name, value)
    });
    Song::new(format!("song-{}", id), format!("Title {}", id), format!("Artist {}", id % 97))
        .with_features(features)
}

fn generate_catalog(size: usize) -> Arc<Catalog> {
    let mut rng = rand::rng();
    let songs = (0..size).map(|i| generate_random_song(&mut rng, i)).collect();
    Arc::new(Catalog::new(songs, &FeatureSchema::canonical()).unwrap())
}

fn benchmark_engine_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_build");

    for size in [1_000, 10_000, 50_000].iter() {
        let catalog = generate_catalog(*size);
        group.bench_with_input(BenchmarkId::new("standardize", size), size, |b, _| {
            b.iter(|| RecommendationEngine::new(black_box(catalog.clone())).unwrap());
        });
    }

    group.finish();
}

fn benchmark_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend");

    for size in [1_000, 10_000, 50_000].iter() {
        let engine = RecommendationEngine::new(generate_catalog(*size)).unwrap();
        let query = format!("song-{}", size / 2);
        group.bench_with_input(BenchmarkId::new("top10", size), size, |b, _| {
            b.iter(|| engine.recommend(black_box(&query), 10).unwrap());
        });
    }

    group.finish();
}

fn benchmark_cached_recommend(c: &mut Criterion) {
    let engine = RecommendationEngine::new(generate_catalog(10_000)).unwrap();
    let cache = RecommendationCache::default();

    c.bench_function("recommend_cached_10k", |b| {
        b.iter(|| cache.get_or_compute(&engine, black_box("song-42"), 10).unwrap());
    });
}

fn benchmark_concurrent_queries(c: &mut Criterion) {
    let engine = Arc::new(RecommendationEngine::new(generate_catalog(10_000)).unwrap());

    c.bench_function("concurrent_recommend_4_threads", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let engine = engine.clone();
                    std::thread::spawn(move || {
                        for i in 0..10 {
                            let id = format!("song-{}", t * 1000 + i);
                            black_box(engine.recommend(&id, 10).unwrap());
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
        });
    });
}

criterion_group!(
    benches,
    benchmark_engine_build,
    benchmark_recommend,
    benchmark_cached_recommend,
    benchmark_concurrent_queries
);
criterion_main!(benches);
