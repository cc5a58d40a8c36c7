pub(crate) use super::*;

fn listings() -> RowBatch {
    RowBatch::new(vec![
        (
            "name".to_string(),
            vec![Value::from("Red Dress"), Value::from("Tee"), Value::Missing],
        ),
        (
            "brand_name".to_string(),
            vec![
                Value::Category("Nike".into()),
                Value::Missing,
                Value::Category("H&M".into()),
            ],
        ),
        (
            "price".to_string(),
            vec![Value::from(10.0), Value::Missing, Value::from(3.5)],
        ),
    ])
    .expect("valid batch")
}

// ========== Value ==========

#[test]
fn test_value_accessors() {
    assert_eq!(Value::from("x").as_text(), Some("x"));
    assert_eq!(Value::Category("c".into()).as_text(), Some("c"));
    assert_eq!(Value::from(2.5).as_number(), Some(2.5));
    assert_eq!(Value::from(2.5).as_text(), None);
    assert!(Value::Missing.is_missing());
}

#[test]
fn test_value_to_text() {
    assert_eq!(Value::Missing.to_text(), "");
    assert_eq!(Value::from(3.0).to_text(), "3");
    assert_eq!(Value::from("abc").to_string(), "abc");
}

#[test]
fn test_value_from_option() {
    assert_eq!(Value::from(None::<&str>), Value::Missing);
    assert_eq!(Value::from(Some(1.0)), Value::Number(1.0));
}

// ========== Construction ==========

#[test]
fn test_new_shape() {
    let batch = listings();
    assert_eq!(batch.shape(), (3, 3));
    assert_eq!(batch.column_names(), vec!["name", "brand_name", "price"]);
}

#[test]
fn test_new_rejects_ragged() {
    let result = RowBatch::new(vec![
        ("a".to_string(), vec![Value::Missing]),
        ("b".to_string(), vec![]),
    ]);
    assert!(matches!(result, Err(FeatureError::DimensionMismatch { .. })));
}

#[test]
fn test_new_rejects_duplicates_and_empty() {
    assert!(RowBatch::new(vec![]).is_err());
    assert!(RowBatch::new(vec![
        ("a".to_string(), vec![]),
        ("a".to_string(), vec![]),
    ])
    .is_err());
    assert!(RowBatch::new(vec![(String::new(), vec![])]).is_err());
}

// ========== Selection ==========

#[test]
fn test_column_missing_lists_available() {
    let batch = listings();
    let err = batch.column("category_name").expect_err("absent column");
    match err {
        FeatureError::MissingColumn { column, available } => {
            assert_eq!(column, "category_name");
            assert_eq!(available, vec!["name", "brand_name", "price"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_select_preserves_requested_order() {
    let selected = listings().select(&["price", "name"]).expect("both exist");
    assert_eq!(selected.column_names(), vec!["price", "name"]);
    assert_eq!(selected.n_rows(), 3);
}

#[test]
fn test_select_fails_fast() {
    let err = listings()
        .select(&["name", "nope", "also_nope"])
        .expect_err("absent column");
    assert!(matches!(err, FeatureError::MissingColumn { ref column, .. } if column == "nope"));
}

#[test]
fn test_select_empty() {
    let names: [&str; 0] = [];
    assert!(listings().select(&names).is_err());
}

#[test]
fn test_require() {
    let batch = listings();
    assert!(batch.require(&["name", "price"]).is_ok());
    assert!(batch.require(&["cat_1"]).is_err());
}

// ========== Mutation ==========

#[test]
fn test_add_column() {
    let mut batch = listings();
    batch
        .add_column("flag".to_string(), vec![Value::from(1.0); 3])
        .expect("new column");
    assert!(batch.has_column("flag"));
    assert!(batch
        .add_column("flag".to_string(), vec![Value::from(1.0); 3])
        .is_err());
    assert!(batch
        .add_column("short".to_string(), vec![Value::Missing])
        .is_err());
}

#[test]
fn test_set_column_replaces() {
    let mut batch = listings();
    batch
        .set_column("name".to_string(), vec![Value::from("z"); 3])
        .expect("same length");
    assert_eq!(batch.column("name").expect("exists")[0], Value::from("z"));
    assert_eq!(batch.n_cols(), 3);
    assert!(batch.set_column("name".to_string(), vec![]).is_err());
}

#[test]
fn test_fill_empty_skips_numeric_columns() {
    let mut batch = listings();
    batch.fill_empty();
    assert_eq!(batch.column("name").expect("exists")[2], Value::from(""));
    assert_eq!(batch.column("brand_name").expect("exists")[1], Value::from(""));
    assert!(batch.column("price").expect("exists")[1].is_missing());
}

// ========== Rows ==========

#[test]
fn test_row_and_records() {
    let batch = listings();
    let row = batch.row(0).expect("in range");
    assert_eq!(row["name"], Value::from("Red Dress"));
    assert_eq!(row["price"], Value::from(10.0));
    assert!(batch.row(3).is_err());

    let records = batch.records();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2]["brand_name"], Value::Category("H&M".into()));
}

#[test]
fn test_take_rows() {
    let batch = listings().take_rows(&[2, 0]).expect("in range");
    assert_eq!(batch.n_rows(), 2);
    assert_eq!(batch.column("price").expect("exists")[0], Value::from(3.5));
    assert!(listings().take_rows(&[9]).is_err());
}
