//! Integration tests: load datasets from disk and query them

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use geomx_store::prelude::*;
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

const SAMPLES_CSV: &str = "\
Sample_ID,group,segment,Software_Version,Raw_Reads
A,X,tumor,4.0.0.3,1200
B,Y,stroma,4.0.0.3,3400
";

const FEATURES_CSV: &str = "\
RTS_ID,TargetName,CodeClass
f1,CD3E,Endogenous
f2,KRT18,Endogenous
f3,NegProbe-WTX,Negative
";

const COUNTS_CSV: &str = "\
feature_id,sample_id,count
f1,B,10
f2,B,20
f3,B,30
f1,A,1
f2,A,2
f3,A,6
";

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

fn csv_dataset(counts: &str) -> (TempDir, Manifest) {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "samples.csv", SAMPLES_CSV);
    write(dir.path(), "features.csv", FEATURES_CSV);
    write(dir.path(), "counts.csv", counts);

    let manifest = Manifest {
        protocol_columns: vec!["Software_Version".to_string(), "Raw_Reads".to_string()],
        ..Manifest::new("counts.csv", "samples.csv", "features.csv")
    };
    write(dir.path(), "dataset.json", &manifest.to_json().unwrap());
    let manifest = Manifest::from_path(&dir.path().join("dataset.json")).unwrap();
    (dir, manifest)
}

#[test]
fn test_raw_matrix_keys_match_annotation() {
    let (_dir, manifest) = csv_dataset(COUNTS_CSV);
    let store = load_dataset(&manifest).unwrap();

    let raw = store.get_matrix(RAW_MATRIX).unwrap();
    assert_eq!(raw.feature_ids(), store.features().keys());
    assert_eq!(raw.sample_ids(), store.samples().keys());
    assert_eq!(raw.sample_ids(), store.protocol().keys());
    assert_eq!(store.dims(), (3, 2));
    assert_eq!(raw.get("f3", "A").unwrap(), 6.0);
}

#[test]
fn test_protocol_columns_split_from_samples() {
    let (_dir, manifest) = csv_dataset(COUNTS_CSV);
    let store = load_dataset(&manifest).unwrap();

    assert_eq!(store.sample_labels(), &["group", "segment"]);
    assert_eq!(store.protocol().field_names(), &["Raw_Reads", "Software_Version"]);
    assert_eq!(
        store.protocol().value("B", "Raw_Reads").unwrap(),
        MetadataValue::Integer(3400)
    );
}

#[test]
fn test_group_mean_per_sample_group() {
    let (_dir, manifest) = csv_dataset(COUNTS_CSV);
    let store = load_dataset(&manifest).unwrap();

    let means = store
        .group_apply(Axis::Sample, "group", |part| {
            stats::mean(part.get_matrix(RAW_MATRIX).unwrap().values())
        })
        .unwrap();

    let expected_x = stats::mean(&store.get_matrix(RAW_MATRIX).unwrap().column(0));
    let expected_y = stats::mean(&store.get_matrix(RAW_MATRIX).unwrap().column(1));
    assert_eq!(means.len(), 2);
    assert!((means[&MetadataValue::from("X")] - expected_x).abs() < 1e-12);
    assert!((means[&MetadataValue::from("Y")] - expected_y).abs() < 1e-12);
}

#[test]
fn test_negative_probe_geomean_per_sample() {
    let (_dir, manifest) = csv_dataset(COUNTS_CSV);
    let store = load_dataset(&manifest).unwrap();

    let negatives = store.subset_features(Selection::new().accept("CodeClass", ["Negative"]).predicate());
    assert_eq!(negatives.feature_ids(), &["f3"]);

    let neg_geomean = negatives
        .element_apply(Axis::Sample, RAW_MATRIX, |_, col| stats::geometric_mean(col))
        .unwrap();
    assert_eq!(neg_geomean.len(), 2);
    assert!((neg_geomean[0] - 6.0).abs() < 1e-9);
    assert!((neg_geomean[1] - 30.0).abs() < 1e-9);
}

#[test]
fn test_subset_then_derive_is_consistent() {
    let (_dir, manifest) = csv_dataset(COUNTS_CSV);
    let store = load_dataset(&manifest)
        .unwrap()
        .derive_matrix(RAW_MATRIX, "log2", |v| v.max(1.0).log2())
        .unwrap();

    let tumor = Selection::new().accept("segment", ["tumor"]);
    let sub = store.subset_samples(tumor.predicate());
    assert_eq!(sub.sample_ids(), &["A"]);
    assert_eq!(sub.subset_samples(tumor.predicate()), sub);

    let log2 = sub.get_matrix("log2").unwrap();
    assert_eq!(log2.sample_ids(), sub.sample_ids());
    assert!((log2.get("f2", "A").unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn test_unannotated_sample_is_schema_mismatch() {
    let counts = format!("{COUNTS_CSV}f1,C,4\n");
    let (_dir, manifest) = csv_dataset(&counts);
    let err = load_dataset(&manifest).unwrap_err();

    let store_err = err.downcast_ref::<StoreError>().unwrap();
    assert!(matches!(store_err, StoreError::SchemaMismatch(_)));
}

#[test]
fn test_parquet_counts_and_annotation() {
    let dir = tempfile::tempdir().unwrap();

    let counts_schema = Arc::new(Schema::new(vec![
        Field::new("feature_id", DataType::Utf8, false),
        Field::new("sample_id", DataType::Utf8, false),
        Field::new("count", DataType::Int64, false),
    ]));
    let counts = RecordBatch::try_new(
        counts_schema.clone(),
        vec![
            Arc::new(StringArray::from(vec!["f1", "f2", "f1", "f2"])),
            Arc::new(StringArray::from(vec!["A", "A", "B", "B"])),
            Arc::new(Int64Array::from(vec![3, 4, 5, 6])),
        ],
    )
    .unwrap();
    let file = File::create(dir.path().join("counts.parquet")).unwrap();
    let mut writer = ArrowWriter::try_new(file, counts_schema, None).unwrap();
    writer.write(&counts).unwrap();
    writer.close().unwrap();

    let samples_schema = Arc::new(Schema::new(vec![
        Field::new("Sample_ID", DataType::Utf8, false),
        Field::new("area", DataType::Float64, true),
    ]));
    let samples = RecordBatch::try_new(
        samples_schema.clone(),
        vec![
            Arc::new(StringArray::from(vec!["B", "A"])),
            Arc::new(Float64Array::from(vec![Some(1500.0), None])),
        ],
    )
    .unwrap();
    let file = File::create(dir.path().join("samples.parquet")).unwrap();
    let mut writer = ArrowWriter::try_new(file, samples_schema, None).unwrap();
    writer.write(&samples).unwrap();
    writer.close().unwrap();

    write(dir.path(), "features.csv", "RTS_ID,TargetName\nf1,CD3E\nf2,KRT18\n");

    let manifest = Manifest::new("counts.parquet", "samples.parquet", "features.csv")
        .resolve_against(dir.path());
    let store = load_dataset(&manifest).unwrap();

    assert_eq!(store.sample_ids(), &["B", "A"]);
    assert_eq!(store.get_matrix(RAW_MATRIX).unwrap().row(0), &[5.0, 3.0]);
    assert_eq!(store.samples().value("A", "area").unwrap(), MetadataValue::Null);
    assert_eq!(
        store.samples().value("B", "area").unwrap(),
        MetadataValue::Float(1500.0)
    );
}
