//! Benchmarks for ranking
//!
//! Run with: cargo bench --package recommend
//!
//! Ranks a synthetic 1,000 record catalogue against a mixed profile.

use catalog::Record;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use recommend::{PreferenceProfile, Recommender};

const NOTES: [&str; 10] = [
    "rose", "musk", "amber", "oud", "citrus", "vanilla", "cedar", "jasmine", "tonka", "vetiver",
];

fn synthetic_catalogue(size: usize) -> Vec<Record> {
    (0..size)
        .map(|i| Record {
            id: format!("id-{}", i),
            name: format!("Scent {}", i),
            brand: format!("Brand {}", i % 12),
            price: 20.0 + (i % 90) as f64,
            notes: vec![
                NOTES[i % NOTES.len()].to_string(),
                NOTES[(i * 3 + 1) % NOTES.len()].to_string(),
            ],
            allergens: if i % 5 == 0 {
                vec!["coumarin".to_string()]
            } else {
                Vec::new()
            },
            rating: Some((i % 6) as f64 * 0.8),
            stock: (i % 4) as u32,
        })
        .collect()
}

fn bench_recommend(c: &mut Criterion) {
    let catalogue = synthetic_catalogue(1_000);
    let recommender = Recommender::new();
    let prefs = PreferenceProfile::new()
        .prefer(["rose", "amber", "vanilla"])
        .avoid(["coumarin", "oud"])
        .brand("Brand 3")
        .budget(60.0);

    c.bench_function("recommend_top_10_of_1000", |b| {
        b.iter(|| {
            let ranked = recommender
                .recommend(black_box(catalogue.clone()), black_box(&prefs), 10)
                .unwrap();
            black_box(ranked)
        })
    });
}

criterion_group!(benches, bench_recommend);
criterion_main!(benches);
