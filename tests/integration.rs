//! Integration tests for the listing feature pipeline.
//!
//! These tests verify end-to-end workflows: preprocessing, branches,
//! assembly and sanitization.

use listing_features::features::{Extracted, FeatureExtractor};
use listing_features::prelude::*;
use listing_features::presets::{
    listing_branches_v1_with, listing_branches_v3_with, listing_vectorizer_v1,
    listing_vectorizer_v2, listing_vectorizer_v3, PresetConfig,
};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn listings() -> RowBatch {
    let text = |values: &[&str]| values.iter().map(|v| Value::from(*v)).collect::<Vec<_>>();
    RowBatch::new(vec![
        (
            "name".to_string(),
            text(&[
                "Vintage Levi's Jeans 1999",
                "Nike Air Max 90",
                "iPhone 7 Plus 128GB",
                "Red Floral Dress",
            ]),
        ),
        (
            "item_description".to_string(),
            vec![
                Value::from("Great condition!! Worn twice :)"),
                Value::Missing,
                Value::from("Screen has -- minor scratches. Bought 2016 for $650"),
                Value::from("No description yet"),
            ],
        ),
        (
            "brand_name".to_string(),
            vec![
                Value::from("Levi's"),
                Value::from("Nike"),
                Value::from("Apple"),
                Value::Missing,
            ],
        ),
        (
            "category_name".to_string(),
            vec![
                Value::from("Women/Jeans/Slim, Skinny"),
                Value::from("Men/Shoes/Athletic"),
                Value::from("Electronics/Cell Phones & Accessories/Cell Phones & Smartphones"),
                Value::Missing,
            ],
        ),
        (
            "shipping".to_string(),
            vec![
                Value::from(1.0),
                Value::from(0.0),
                Value::from(1.0),
                Value::from(0.0),
            ],
        ),
        (
            "item_condition_id".to_string(),
            vec![
                Value::Category("3".into()),
                Value::Category("1".into()),
                Value::Category("2".into()),
                Value::Category("1".into()),
            ],
        ),
    ])
    .expect("valid listing batch")
}

#[test]
fn test_v1_end_to_end() {
    init_tracing();
    let cleaner = TextCleaner::default();
    let prepared = ListingPreprocessor::listing(cleaner.clone())
        .process(&listings())
        .expect("listing columns exist");

    let branches = listing_branches_v1_with(PresetConfig::uniform(1));
    let mut assembler =
        FeatureAssembler::with_config(branches, AssemblerConfig::default().with_n_jobs(4))
            .expect("non-empty preset");
    let matrix = assembler.fit_transform(&prepared).expect("fit succeeds");
    let (features, report) = MatrixSanitizer::new()
        .sanitize(matrix)
        .expect("well-formed");

    assert_eq!(features.nrows, 4);
    let ranges = assembler.block_ranges().expect("fitted");
    assert_eq!(ranges.len(), 11);
    assert_eq!(ranges.last().map(|r| r.end), Some(report.cols));
    assert!(features.is_canonical());
    assert_eq!(report.non_finite_replaced, 0);

    // transforming the same batch again gives the same matrix
    let again = assembler.transform(&prepared).expect("transform succeeds");
    let (again, _) = MatrixSanitizer::new().sanitize(again).expect("well-formed");
    assert_eq!(again, features);

    // the preprocessor filled the shared stem cache
    assert!(cleaner.stem_cache().stats().hits > 0);
}

#[test]
fn test_v3_end_to_end_and_unseen_rows() {
    let prepared = ListingPreprocessor::listing(TextCleaner::default())
        .process(&listings())
        .expect("listing columns exist");
    let mut assembler = FeatureAssembler::new(listing_branches_v3_with(PresetConfig::uniform(1)))
        .expect("non-empty preset");
    let fitted = assembler.fit_transform(&prepared).expect("fit succeeds");
    assert!(fitted.is_sparse());

    let one_row = prepared.take_rows(&[2]).expect("row 2 exists");
    let transformed = assembler.transform(&one_row).expect("transform succeeds");
    assert_eq!(transformed.shape(), (1, fitted.n_cols()));
    for j in 0..fitted.n_cols() {
        assert!((transformed.get(0, j) - fitted.get(2, j)).abs() < 1e-6);
    }
}

#[test]
fn test_default_thresholds_yield_narrow_but_valid_blocks() {
    // with min_df = 5 on four rows most vocabularies are empty
    let cleaner = TextCleaner::default();
    let prepared = ListingPreprocessor::listing(cleaner.clone())
        .process(&listings())
        .expect("listing columns exist");
    let m = assemble(
        &prepared,
        listing_branches_v1_with(PresetConfig::default()),
        AssemblerConfig::default().with_n_jobs(2),
    )
    .expect("empty vocabularies are allowed");
    assert_eq!(m.n_rows(), 4);
}

#[test]
fn test_missing_column_identifies_branch() {
    // raw batch: the *_clean columns were never produced
    let err = assemble(
        &listings(),
        listing_branches_v1_with(PresetConfig::uniform(1)),
        AssemblerConfig::default().with_n_jobs(2),
    )
    .expect_err("desc_clean is absent");
    assert_eq!(err.branch_name(), Some("desc_clean"));
    assert!(err.to_string().contains("desc_clean"));
}

#[test]
fn test_vectorizers_keep_fitted_width_on_unseen_rows() {
    init_tracing();
    let assembler = AssemblerConfig::default().with_n_jobs(2);
    let config = PresetConfig::uniform(1);
    let vectorizers = [
        listing_vectorizer_v1(TextCleaner::default(), config, assembler),
        listing_vectorizer_v2(config, assembler),
        listing_vectorizer_v3(TextCleaner::default(), config, assembler),
    ];

    for vectorizer in vectorizers {
        let mut vectorizer = vectorizer.expect("valid preset");
        let fitted = vectorizer.fit_transform(&listings()).expect("fit succeeds");
        let width = vectorizer.n_features().expect("fitted");
        assert_eq!((fitted.nrows, fitted.ncols), (4, width));

        let unseen = listings().take_rows(&[3, 0]).expect("rows exist");
        let rows = vectorizer.transform(&unseen).expect("transform succeeds");
        assert_eq!((rows.nrows, rows.ncols), (2, width));
        for j in 0..width {
            assert!((rows.get(0, j) - fitted.get(3, j)).abs() < 1e-6);
            assert!((rows.get(1, j) - fitted.get(0, j)).abs() < 1e-6);
        }
    }
}

#[test]
fn test_v2_vectorizer_flags_missing_descriptions() {
    let mut vectorizer = listing_vectorizer_v2(
        PresetConfig::uniform(1),
        AssemblerConfig::default().with_n_jobs(2),
    )
    .expect("valid preset");
    let (features, report) = vectorizer
        .fit_transform_with_report(&listings())
        .expect("fit succeeds");
    assert_eq!(report.rows, 4);
    assert!(features.is_canonical());

    assert_eq!(vectorizer.assembler().block_ranges().map(|r| r.len()), Some(4));

    let prepared = vectorizer
        .preprocessor()
        .process(&listings())
        .expect("listing columns exist");
    assert_eq!(
        prepared.column("name").expect("rewritten")[2],
        Value::from("iphone 7 plus 128 gb")
    );
    let flags: Vec<f64> = prepared
        .column("no_description")
        .expect("added")
        .iter()
        .filter_map(Value::as_number)
        .collect();
    assert_eq!(flags, [0.0, 1.0, 0.0, 1.0]);
}

#[derive(Debug)]
struct Broken {
    columns: Vec<String>,
}

impl FeatureExtractor for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn extract(&self, _batch: &RowBatch) -> listing_features::Result<Extracted> {
        Err(FeatureError::InvalidConfiguration("malformed input".to_string()))
    }
}

#[test]
fn test_transform_error_aborts_whole_assembly() {
    init_tracing();
    let branches = vec![
        Branch::new("name")
            .with_stage(Stage::column("name"))
            .with_stage(Stage::Count(CountVectorizer::new())),
        Branch::new("explodes").with_stage(Stage::extract(Broken {
            columns: vec!["name".to_string()],
        })),
    ];
    let err = assemble(&listings(), branches, AssemblerConfig::default())
        .expect_err("second branch fails");
    match err {
        FeatureError::Branch { index, name, source } => {
            assert_eq!(index, 1);
            assert_eq!(name, "explodes");
            assert!(source.to_string().contains("malformed input"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_config_from_json_drives_components() {
    let config = FeaturesConfig::from_json_str(
        r#"{"cache": {"stem_capacity": 16}, "cleaner": {"hash_chars": true}, "assembler": {"n_jobs": 2}}"#,
    )
    .expect("valid json");
    config.validate().expect("valid config");

    let cleaner = TextCleaner::from_config(&config.cache, &config.cleaner);
    assert!(cleaner.hash_chars());
    assert_eq!(cleaner.stem_cache().memo().capacity(), 16);
    assert_eq!(cleaner.charset_cache().memo().capacity(), 10_000);

    let prepared = ListingPreprocessor::new()
        .with_cleaner(cleaner)
        .with_text_column("name")
        .with_config(config.assembler)
        .process(&listings())
        .expect("name exists");
    assert!(prepared.has_column("name_clean"));
}

/// Blocks until the test releases it.
#[derive(Debug)]
struct Gate {
    columns: Vec<String>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl FeatureExtractor for Gate {
    fn name(&self) -> &str {
        "gate"
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn extract(&self, batch: &RowBatch) -> listing_features::Result<Extracted> {
        if let Ok(rx) = self.release.lock() {
            let _ = rx.recv();
        }
        Ok(Extracted::Matrix(FeatureMatrix::Dense(Matrix::zeros(
            batch.n_rows(),
            1,
        ))))
    }
}

/// There is no timeout: a hung branch blocks the whole batch until it
/// returns. Timing-based, so it is opt-in.
#[test]
#[ignore = "timing-based: asserts that a hung branch blocks assembly"]
fn test_hung_branch_blocks_assembly() {
    let (release, rx) = mpsc::channel();
    let branches = vec![
        Branch::new("quick")
            .with_stage(Stage::column("name"))
            .with_stage(Stage::Count(CountVectorizer::new())),
        Branch::new("hung").with_stage(Stage::extract(Gate {
            columns: vec!["name".to_string()],
            release: Mutex::new(rx),
        })),
    ];
    let batch = Arc::new(listings());
    let (done_tx, done_rx) = mpsc::channel();
    let worker = {
        let batch = Arc::clone(&batch);
        std::thread::spawn(move || {
            let result = assemble(&batch, branches, AssemblerConfig::default().with_n_jobs(2));
            let _ = done_tx.send(result.map(|m| m.shape()));
        })
    };

    assert!(
        done_rx.recv_timeout(Duration::from_millis(300)).is_err(),
        "assembly returned while a branch was still running"
    );

    release.send(()).expect("gate is waiting");
    let shape = done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("assembly finishes once released")
        .expect("assembly succeeds");
    assert_eq!(shape.0, 4);
    worker.join().expect("worker thread");
}
