//! Tests for preprocessing module.

use super::*;
use crate::primitives::CsrMatrix;

fn dense(rows: usize, cols: usize, data: Vec<f32>) -> FeatureMatrix {
    FeatureMatrix::Dense(Matrix::from_vec(rows, cols, data).expect("valid matrix dimensions"))
}

fn sparse(rows: usize, cols: usize, data: Vec<f32>) -> FeatureMatrix {
    let m = Matrix::from_vec(rows, cols, data).expect("valid matrix dimensions");
    FeatureMatrix::Sparse(CsrMatrix::from_dense(&m))
}

// ========== MinMaxScaler ==========

#[test]
fn test_minmax_new() {
    let scaler = MinMaxScaler::new();
    assert!(!scaler.is_fitted());
    assert!(scaler.data_min().is_none());
}

#[test]
fn test_minmax_fit_transform() {
    let data = dense(3, 2, vec![0.0, 10.0, 5.0, 20.0, 10.0, 30.0]);
    let mut scaler = MinMaxScaler::new();
    let scaled = scaler
        .fit_transform(&data)
        .expect("fit_transform should succeed");

    assert_eq!(scaler.data_min(), Some(&[0.0, 10.0][..]));
    assert_eq!(scaler.data_max(), Some(&[10.0, 30.0][..]));
    assert!(!scaled.is_sparse());
    assert!((scaled.get(0, 0) - 0.0).abs() < 1e-6);
    assert!((scaled.get(1, 1) - 0.5).abs() < 1e-6);
    assert!((scaled.get(2, 1) - 1.0).abs() < 1e-6);
}

#[test]
fn test_minmax_custom_range() {
    let data = dense(2, 1, vec![0.0, 4.0]);
    let mut scaler = MinMaxScaler::new().with_range(-1.0, 1.0);
    let scaled = scaler.fit_transform(&data).expect("fit should succeed");
    assert!((scaled.get(0, 0) + 1.0).abs() < 1e-6);
    assert!((scaled.get(1, 0) - 1.0).abs() < 1e-6);
}

#[test]
fn test_minmax_constant_column_maps_to_range_min() {
    let data = dense(3, 1, vec![7.0, 7.0, 7.0]);
    let mut scaler = MinMaxScaler::new().with_range(2.0, 5.0);
    let scaled = scaler.fit_transform(&data).expect("fit should succeed");
    for i in 0..3 {
        assert_eq!(scaled.get(i, 0), 2.0);
    }
}

#[test]
fn test_minmax_densifies_sparse_input() {
    let data = sparse(2, 2, vec![0.0, 2.0, 4.0, 0.0]);
    let mut scaler = MinMaxScaler::new();
    let scaled = scaler.fit_transform(&data).expect("fit should succeed");
    assert!(!scaled.is_sparse());
    assert_eq!(scaled.get(0, 1), 1.0);
    assert_eq!(scaled.get(1, 0), 1.0);
}

#[test]
fn test_minmax_transform_does_not_refit() {
    let mut scaler = MinMaxScaler::new();
    scaler
        .fit(&dense(2, 1, vec![0.0, 10.0]))
        .expect("fit should succeed");
    let out = scaler
        .transform(&dense(1, 1, vec![20.0]))
        .expect("transform should succeed");
    assert!((out.get(0, 0) - 2.0).abs() < 1e-6);
    assert_eq!(scaler.data_max(), Some(&[10.0][..]));
}

#[test]
fn test_minmax_errors() {
    let scaler = MinMaxScaler::new();
    assert!(matches!(
        scaler.transform(&dense(1, 1, vec![1.0])),
        Err(FeatureError::NotFitted { .. })
    ));

    let mut scaler = MinMaxScaler::new();
    assert!(matches!(
        scaler.fit(&FeatureMatrix::Dense(Matrix::zeros(0, 2))),
        Err(FeatureError::EmptyInput(_))
    ));

    scaler
        .fit(&dense(1, 2, vec![1.0, 2.0]))
        .expect("fit should succeed");
    assert!(matches!(
        scaler.transform(&dense(1, 3, vec![1.0, 2.0, 3.0])),
        Err(FeatureError::DimensionMismatch { .. })
    ));
}

// ========== MaxAbsScaler ==========

#[test]
fn test_maxabs_dense() {
    let data = dense(2, 2, vec![-4.0, 1.0, 2.0, 0.5]);
    let mut scaler = MaxAbsScaler::new();
    let scaled = scaler.fit_transform(&data).expect("fit should succeed");
    assert_eq!(scaler.scale(), Some(&[4.0, 1.0][..]));
    assert_eq!(scaled.get(0, 0), -1.0);
    assert_eq!(scaled.get(1, 0), 0.5);
    assert_eq!(scaled.get(1, 1), 0.5);
}

#[test]
fn test_maxabs_preserves_sparsity() {
    let data = sparse(3, 2, vec![0.0, 2.0, -8.0, 0.0, 0.0, 1.0]);
    let mut scaler = MaxAbsScaler::new();
    let scaled = scaler.fit_transform(&data).expect("fit should succeed");
    assert!(scaled.is_sparse());
    assert_eq!(scaled.nnz(), 3);
    assert_eq!(scaled.get(1, 0), -1.0);
    assert_eq!(scaled.get(2, 1), 0.5);
}

#[test]
fn test_maxabs_zero_column_uses_unit_scale() {
    let data = dense(2, 2, vec![0.0, 3.0, 0.0, 6.0]);
    let mut scaler = MaxAbsScaler::new();
    let scaled = scaler.fit_transform(&data).expect("fit should succeed");
    assert_eq!(scaler.scale(), Some(&[1.0, 6.0][..]));
    assert_eq!(scaled.get(0, 0), 0.0);
}

#[test]
fn test_maxabs_not_fitted() {
    assert!(matches!(
        MaxAbsScaler::new().transform(&dense(1, 1, vec![1.0])),
        Err(FeatureError::NotFitted { .. })
    ));
}

// ========== SparsityFilter ==========

#[test]
fn test_sparsity_filter_sparse() {
    let data = sparse(3, 3, vec![1.0, 0.0, 2.0, 1.0, 0.0, 0.0, 0.0, 5.0, 3.0]);
    let mut filter = SparsityFilter::new(2);
    let kept = filter.fit_transform(&data).expect("fit should succeed");
    assert!(kept.is_sparse());
    assert_eq!(kept.shape(), (3, 2));
    assert_eq!(filter.kept_columns(), Some(&[0, 2][..]));
    assert_eq!(kept.get(2, 1), 3.0);
}

#[test]
fn test_sparsity_filter_dense_keeps_order() {
    let data = dense(2, 3, vec![1.0, 0.0, 2.0, 3.0, 0.0, 4.0]);
    let mut filter = SparsityFilter::default();
    let kept = filter.fit_transform(&data).expect("fit should succeed");
    assert!(!kept.is_sparse());
    assert_eq!(kept.shape(), (2, 2));
    assert_eq!(kept.get(1, 0), 3.0);
    assert_eq!(kept.get(1, 1), 4.0);
}

#[test]
fn test_sparsity_filter_can_drop_everything() {
    let data = dense(2, 2, vec![1.0, 0.0, 0.0, 0.0]);
    let mut filter = SparsityFilter::new(5);
    let kept = filter.fit_transform(&data).expect("fit should succeed");
    assert_eq!(kept.shape(), (2, 0));
}

#[test]
fn test_sparsity_filter_errors() {
    let filter = SparsityFilter::new(1);
    assert!(matches!(
        filter.transform(&dense(1, 1, vec![1.0])),
        Err(FeatureError::NotFitted { .. })
    ));

    let mut filter = SparsityFilter::new(1);
    filter
        .fit(&dense(1, 2, vec![1.0, 1.0]))
        .expect("fit should succeed");
    assert!(matches!(
        filter.transform(&dense(1, 1, vec![1.0])),
        Err(FeatureError::DimensionMismatch { .. })
    ));
}
