pub(crate) use super::*;
pub(crate) use crate::data::{Record, Value};
pub(crate) use crate::error::FeatureError;

fn record(pairs: &[(&str, Value)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

// ========== CountVectorizer ==========

#[test]
fn test_count_vectorizer_basic() {
    let docs = vec!["cat dog", "dog bird", "cat bird bird"];
    let mut vectorizer = CountVectorizer::new();
    let matrix = vectorizer
        .fit_transform(&docs)
        .expect("fit_transform should succeed");

    assert_eq!(matrix.shape(), (3, 3));
    assert_eq!(vectorizer.feature_names(), &["bird", "cat", "dog"]);
    assert_eq!(matrix.get(2, 0), 2.0);
    assert_eq!(matrix.get(2, 1), 1.0);
    assert_eq!(matrix.get(2, 2), 0.0);
    assert!(matrix.is_canonical());
}

#[test]
fn test_count_vectorizer_word_analyzer_drops_whitespace_only() {
    let mut vectorizer = CountVectorizer::new();
    vectorizer.fit(&["wi-fi, ok!"]).expect("fit should succeed");
    assert_eq!(vectorizer.feature_names(), &["!", ",", "ok", "wi-fi"]);
}

#[test]
fn test_count_vectorizer_bigrams() {
    let mut vectorizer = CountVectorizer::new().with_ngram_range(1, 2);
    vectorizer
        .fit(&["the quick brown fox"])
        .expect("fit should succeed");
    let vocab = vectorizer.vocabulary().expect("fitted");
    assert_eq!(vocab.len(), 7);
    assert!(vocab.contains_key("quick brown"));
}

#[test]
fn test_count_vectorizer_pattern_analyzer() {
    let mut vectorizer = CountVectorizer::new().with_analyzer(Analyzer::words());
    vectorizer
        .fit(&["Hello, big world!"])
        .expect("fit should succeed");
    assert_eq!(vectorizer.feature_names(), &["big", "hello", "world"]);
}

#[test]
fn test_count_vectorizer_char_analyzer() {
    let mut vectorizer = CountVectorizer::new()
        .with_analyzer(Analyzer::Char)
        .with_ngram_range(2, 2);
    vectorizer.fit(&["abc"]).expect("fit should succeed");
    assert_eq!(vectorizer.feature_names(), &["ab", "bc"]);

    vectorizer.fit(&["a  b"]).expect("fit should succeed");
    assert_eq!(vectorizer.feature_names(), &[" b", "a "]);
}

#[test]
fn test_count_vectorizer_char_wb_analyzer() {
    let mut vectorizer = CountVectorizer::new()
        .with_analyzer(Analyzer::CharWb)
        .with_ngram_range(3, 3);
    vectorizer.fit(&["ab cd"]).expect("fit should succeed");
    assert_eq!(vectorizer.feature_names(), &[" ab", " cd", "ab ", "cd "]);
}

#[test]
fn test_count_vectorizer_char_wb_short_word_counted_once() {
    let mut vectorizer = CountVectorizer::new()
        .with_analyzer(Analyzer::CharWb)
        .with_ngram_range(2, 4);
    let counts = vectorizer.fit_transform(&["a"]).expect("fit should succeed");
    assert_eq!(vectorizer.feature_names(), &[" a", " a ", "a "]);
    assert_eq!(counts.nnz(), 3);
}

#[test]
fn test_count_vectorizer_binary() {
    let mut counts = CountVectorizer::new();
    let mut presence = CountVectorizer::new().with_binary(true);
    assert_eq!(counts.fit_transform(&["red red"]).expect("fit").get(0, 0), 2.0);
    assert_eq!(presence.fit_transform(&["red red"]).expect("fit").get(0, 0), 1.0);
}

#[test]
fn test_count_vectorizer_df_filters() {
    let mut vectorizer = CountVectorizer::new().with_max_df(0.5);
    vectorizer.fit(&["a b", "a c"]).expect("fit should succeed");
    assert_eq!(vectorizer.feature_names(), &["b", "c"]);

    let mut vectorizer = CountVectorizer::new().with_min_df(2);
    vectorizer.fit(&["a b", "a c"]).expect("fit should succeed");
    assert_eq!(vectorizer.feature_names(), &["a"]);
}

#[test]
fn test_count_vectorizer_max_features_keeps_most_frequent() {
    let mut vectorizer = CountVectorizer::new().with_max_features(2);
    vectorizer
        .fit(&["z y y x x x"])
        .expect("fit should succeed");
    assert_eq!(vectorizer.feature_names(), &["x", "y"]);
}

#[test]
fn test_count_vectorizer_lowercase_toggle() {
    let mut vectorizer = CountVectorizer::new().with_lowercase(false);
    vectorizer.fit(&["Red red"]).expect("fit should succeed");
    assert_eq!(vectorizer.vocabulary_size(), 2);

    let mut vectorizer = CountVectorizer::new();
    vectorizer.fit(&["Red red"]).expect("fit should succeed");
    assert_eq!(vectorizer.vocabulary_size(), 1);
}

#[test]
fn test_count_vectorizer_unseen_terms_ignored() {
    let mut vectorizer = CountVectorizer::new();
    vectorizer.fit(&["red dress"]).expect("fit should succeed");
    let m = vectorizer
        .transform(&["blue dress", ""])
        .expect("transform should succeed");
    assert_eq!(m.shape(), (2, 2));
    assert_eq!(m.nnz(), 1);
    assert_eq!(m.get(0, 0), 1.0);
}

#[test]
fn test_count_vectorizer_empty_vocabulary_allowed() {
    let mut vectorizer = CountVectorizer::new().with_min_df(5);
    let m = vectorizer.fit_transform(&["rare words"]).expect("fit should succeed");
    assert_eq!(m.shape(), (1, 0));
}

#[test]
fn test_count_vectorizer_errors() {
    let docs: Vec<&str> = vec![];
    assert!(matches!(
        CountVectorizer::new().fit(&docs),
        Err(FeatureError::EmptyInput(_))
    ));
    assert!(matches!(
        CountVectorizer::new().transform(&["x"]),
        Err(FeatureError::NotFitted { .. })
    ));
}

// ========== TfidfVectorizer ==========

#[test]
fn test_tfidf_idf_values() {
    let mut vectorizer = TfidfVectorizer::new();
    vectorizer
        .fit(&["hello world", "hello rust"])
        .expect("fit should succeed");

    assert_eq!(vectorizer.feature_names(), &["hello", "rust", "world"]);
    let idf = vectorizer.idf_values();
    assert!((idf[0] - 1.0).abs() < 1e-6);
    assert!((idf[1] - ((3.0_f32 / 2.0).ln() + 1.0)).abs() < 1e-6);
    assert!((idf[1] - idf[2]).abs() < 1e-6);
}

#[test]
fn test_tfidf_rows_unit_norm() {
    let mut vectorizer = TfidfVectorizer::new();
    let m = vectorizer
        .fit_transform(&["hello world", "hello rust", "world world programming"])
        .expect("fit_transform should succeed");
    for i in 0..m.nrows {
        let (_, vals) = m.row(i);
        let norm: f32 = vals.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "row {i} norm {norm}");
    }
}

#[test]
fn test_tfidf_sublinear_without_norm() {
    let mut vectorizer = TfidfVectorizer::new()
        .with_sublinear_tf(true)
        .with_norm(false);
    let m = vectorizer.fit_transform(&["a a a"]).expect("fit should succeed");
    let expected = 1.0 + 3.0_f32.ln();
    assert!((m.get(0, 0) - expected).abs() < 1e-5);
}

#[test]
fn test_tfidf_not_fitted() {
    assert!(matches!(
        TfidfVectorizer::new().transform(&["x"]),
        Err(FeatureError::NotFitted { .. })
    ));
}

#[test]
fn test_tfidf_char_ngrams() {
    let mut vectorizer = TfidfVectorizer::new()
        .with_analyzer(Analyzer::Char)
        .with_ngram_range(3, 3);
    let m = vectorizer.fit_transform(&["abcd"]).expect("fit should succeed");
    assert_eq!(vectorizer.feature_names(), &["abc", "bcd"]);
    assert_eq!(m.nnz(), 2);
}

// ========== DictVectorizer ==========

#[test]
fn test_dict_vectorizer_one_hot_and_numbers() {
    let records = vec![
        record(&[
            ("brand", Value::Category("nike".into())),
            ("shipping", Value::Number(1.0)),
        ]),
        record(&[
            ("brand", Value::Category("adidas".into())),
            ("shipping", Value::Number(0.5)),
        ]),
    ];
    let mut vectorizer = DictVectorizer::new();
    let m = vectorizer.fit_transform(&records).expect("fit should succeed");

    assert_eq!(
        vectorizer.feature_names(),
        &["brand=adidas", "brand=nike", "shipping"]
    );
    assert_eq!(m.get(0, 1), 1.0);
    assert_eq!(m.get(0, 2), 1.0);
    assert_eq!(m.get(1, 0), 1.0);
    assert_eq!(m.get(1, 2), 0.5);
}

#[test]
fn test_dict_vectorizer_missing_contributes_nothing() {
    let records = vec![
        record(&[("brand", Value::Missing), ("cat_1", Value::from("women"))]),
        record(&[("brand", Value::from("nike")), ("cat_1", Value::from("men"))]),
    ];
    let mut vectorizer = DictVectorizer::new();
    let m = vectorizer.fit_transform(&records).expect("fit should succeed");
    assert_eq!(vectorizer.feature_names().len(), 3);
    let (cols, _) = m.row(0);
    assert_eq!(cols.len(), 1);
}

#[test]
fn test_dict_vectorizer_unseen_values_ignored() {
    let mut vectorizer = DictVectorizer::new();
    vectorizer
        .fit(&[record(&[("brand", Value::from("nike"))])])
        .expect("fit should succeed");
    let m = vectorizer
        .transform(&[record(&[("brand", Value::from("puma")), ("other", Value::from(3.0))])])
        .expect("transform should succeed");
    assert_eq!(m.shape(), (1, 1));
    assert_eq!(m.nnz(), 0);
}

#[test]
fn test_dict_vectorizer_errors() {
    assert!(matches!(
        DictVectorizer::new().fit(&[]),
        Err(FeatureError::EmptyInput(_))
    ));
    assert!(matches!(
        DictVectorizer::new().transform(&[]),
        Err(FeatureError::NotFitted { .. })
    ));
}
