use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use listing_features::prelude::*;
use listing_features::presets::{listing_branches_v3_with, PresetConfig};

fn generate_listings(n: usize) -> Vec<String> {
    let brands = ["Nike", "Levi's", "Apple", "Zara", "Sony", "Lululemon"];
    let items = [
        "running shoes",
        "slim jeans",
        "iPhone case",
        "floral dress",
        "headphones",
        "yoga pants",
    ];
    let notes = [
        "Brand new with tags!!",
        "Worn twice, great condition :)",
        "Bought in 2016 for $120",
        "No description yet",
        "Véritable cuir -- très bon état",
    ];

    (0..n)
        .map(|i| {
            let brand = brands[i % brands.len()];
            let item = items[(i / 6) % items.len()];
            let note = notes[(i / 36) % notes.len()];
            format!("{} {} size {} | {}", brand, item, i % 12, note)
        })
        .collect()
}

fn listing_batch(n: usize) -> RowBatch {
    let texts = generate_listings(n);
    RowBatch::new(vec![
        (
            "name".to_string(),
            texts.iter().map(|t| Value::from(t.as_str())).collect(),
        ),
        (
            "item_description".to_string(),
            texts.iter().rev().map(|t| Value::from(t.as_str())).collect(),
        ),
        (
            "brand_name".to_string(),
            (0..n).map(|i| Value::from(format!("brand {}", i % 7))).collect(),
        ),
        (
            "category_name".to_string(),
            (0..n)
                .map(|i| Value::from(format!("Women/Tops/Style {}", i % 5)))
                .collect(),
        ),
        (
            "shipping".to_string(),
            (0..n).map(|i| Value::from((i % 2) as f64)).collect(),
        ),
        (
            "item_condition_id".to_string(),
            (0..n)
                .map(|i| Value::Category(format!("{}", i % 5 + 1)))
                .collect(),
        ),
    ])
    .expect("columns have equal length")
}

fn bench_clean(c: &mut Criterion) {
    let mut group = c.benchmark_group("clean_text");

    for size in [100, 1_000, 10_000].iter() {
        let texts = generate_listings(*size);
        group.bench_with_input(BenchmarkId::new("uncached", size), size, |b, _| {
            b.iter(|| {
                for text in &texts {
                    black_box(clean_text(black_box(text)));
                }
            });
        });

        // warm cache shared across iterations
        let cleaner = TextCleaner::default();
        group.bench_with_input(BenchmarkId::new("cached", size), size, |b, _| {
            b.iter(|| {
                for text in &texts {
                    black_box(cleaner.clean(black_box(text)));
                }
            });
        });
    }

    group.finish();
}

fn bench_tokenize(c: &mut Criterion) {
    let text = generate_listings(1_000).join(" ");
    c.bench_function("tokenize_1k_listings", |b| {
        b.iter(|| tokenize(black_box(&text)).count());
    });
}

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble_v3");
    group.sample_size(20);

    let prepared = ListingPreprocessor::listing(TextCleaner::default())
        .process(&listing_batch(2_000))
        .expect("listing columns exist");

    for n_jobs in [1, 2, 4].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n_jobs), n_jobs, |b, &n_jobs| {
            b.iter(|| {
                assemble(
                    black_box(&prepared),
                    listing_branches_v3_with(PresetConfig::uniform(2)),
                    AssemblerConfig::default().with_n_jobs(n_jobs),
                )
                .expect("should succeed")
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_clean, bench_tokenize, bench_assemble);
criterion_main!(benches);
