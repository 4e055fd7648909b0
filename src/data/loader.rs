use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::config::Manifest;

use super::model::{AnnotationTable, MetadataValue, Record};
use super::store::{AnnotatedMatrixStore, SampleCounts};

/// Column names of a long-format counts table.
pub const FEATURE_ID_COLUMN: &str = "feature_id";
pub const SAMPLE_ID_COLUMN: &str = "sample_id";
pub const COUNT_COLUMN: &str = "count";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read every input named by `manifest` and assemble the store.
///
/// Fields listed in `protocol_columns` move from the sample annotation into
/// the protocol table, next to any run fields carried by the counts file.
pub fn load_dataset(manifest: &Manifest) -> Result<AnnotatedMatrixStore> {
    let mut sources = load_counts(&manifest.counts)
        .with_context(|| format!("loading counts from {}", manifest.counts.display()))?;

    let annotation = load_annotation(&manifest.sample_annotation, &manifest.sample_id_column)
        .with_context(|| {
            format!(
                "loading sample annotation from {}",
                manifest.sample_annotation.display()
            )
        })?;
    let features = load_annotation(&manifest.feature_annotation, &manifest.feature_id_column)
        .with_context(|| {
            format!(
                "loading feature annotation from {}",
                manifest.feature_annotation.display()
            )
        })?;

    let (samples, protocol) = annotation.split_fields(&manifest.protocol_columns);
    for source in &mut sources {
        if let Ok(fields) = protocol.record(&source.sample_id) {
            source
                .protocol
                .extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }

    let store = AnnotatedMatrixStore::load(sources, samples, features)?;
    info!(
        "dataset ready: {} features x {} samples",
        store.dims().0,
        store.dims().1
    );
    Ok(store)
}

/// Load per-sample counts.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – long table with `feature_id`, `sample_id`, `count` columns
/// * `.csv`     – the same long table as CSV
/// * `.json`    – `[{ "sample_id": .., "protocol": {..}, "counts": {feature: n} }, ...]`
pub fn load_counts(path: &Path) -> Result<Vec<SampleCounts>> {
    match extension(path).as_str() {
        "parquet" | "pq" => load_counts_parquet(path),
        "json" => load_counts_json(path),
        "csv" => load_counts_csv(path),
        other => bail!("Unsupported counts file extension: .{other}"),
    }
}

/// Load an annotation table keyed by `key_column`.  Dispatch by extension.
///
/// Every column except the key becomes a field.
pub fn load_annotation(path: &Path, key_column: &str) -> Result<AnnotationTable> {
    let rows = match extension(path).as_str() {
        "parquet" | "pq" => load_annotation_parquet(path, key_column)?,
        "json" => load_annotation_json(path, key_column)?,
        "csv" => load_annotation_csv(path, key_column)?,
        other => bail!("Unsupported annotation file extension: .{other}"),
    };
    debug!("{}: {} annotated keys", path.display(), rows.len());
    Ok(AnnotationTable::from_records(rows)?)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Collects long-format `(feature, sample, count)` rows into per-sample sources,
/// samples in first-seen order.
#[derive(Default)]
struct CountsBuilder {
    order: Vec<String>,
    by_sample: BTreeMap<String, SampleCounts>,
}

impl CountsBuilder {
    fn push(&mut self, feature_id: String, sample_id: String, count: f64) {
        let entry = self.by_sample.entry(sample_id.clone()).or_insert_with(|| {
            self.order.push(sample_id.clone());
            SampleCounts::new(sample_id)
        });
        entry.counts.push((feature_id, count));
    }

    fn finish(mut self) -> Vec<SampleCounts> {
        self.order
            .iter()
            .filter_map(|s| self.by_sample.remove(s))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Expected counts schema, one object per sample:
///
/// ```json
/// [
///   {
///     "sample_id": "DSP-1001250007851-H-A02",
///     "protocol": { "Software_Version": "4.0.0.3", "Raw_Reads": 289248 },
///     "counts": { "RTS0039454": 1, "RTS0039455": 7 }
///   }
/// ]
/// ```
fn load_counts_json(path: &Path) -> Result<Vec<SampleCounts>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let entries: Vec<CountsEntry> = serde_json::from_str(&text).context("parsing JSON counts")?;

    Ok(entries
        .into_iter()
        .map(|entry| {
            let mut source = SampleCounts::new(entry.sample_id);
            source.protocol = entry
                .protocol
                .iter()
                .map(|(key, val)| (key.clone(), json_to_metadata(val)))
                .collect();
            source.counts = entry.counts;
            source
        })
        .collect())
}

#[derive(Deserialize)]
struct CountsEntry {
    sample_id: String,
    #[serde(default)]
    protocol: serde_json::Map<String, JsonValue>,
    #[serde(deserialize_with = "deserialize_count_pairs")]
    counts: Vec<(String, f64)>,
}

/// `{feature: n, ...}` in document order; a feature listed twice is an error.
fn deserialize_count_pairs<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, f64)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct CountPairs;

    impl<'de> Visitor<'de> for CountPairs {
        type Value = Vec<(String, f64)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an object mapping feature IDs to counts")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut seen = BTreeSet::new();
            let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((feature_id, count)) = map.next_entry::<String, f64>()? {
                if !seen.insert(feature_id.clone()) {
                    return Err(de::Error::custom(format_args!(
                        "duplicate count for feature '{feature_id}'"
                    )));
                }
                pairs.push((feature_id, count));
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(CountPairs)
}

/// Records-oriented table: `[{ "<key_column>": "...", field: value, ... }, ...]`.
fn load_annotation_json(path: &Path, key_column: &str) -> Result<Vec<(String, Record)>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| -> Result<(String, Record)> {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            let key = match obj.get(key_column) {
                Some(JsonValue::String(s)) => s.clone(),
                Some(JsonValue::Number(n)) => n.to_string(),
                _ => bail!("Row {i}: missing key column '{key_column}'"),
            };
            let record = obj
                .iter()
                .filter(|(name, _)| name.as_str() != key_column)
                .map(|(name, val)| (name.clone(), json_to_metadata(val)))
                .collect();
            Ok((key, record))
        })
        .collect()
}

/// Arrays and objects are kept as their JSON text.
fn json_to_metadata(val: &JsonValue) -> MetadataValue {
    match val {
        JsonValue::String(s) => MetadataValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                MetadataValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                MetadataValue::Float(f)
            } else {
                MetadataValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => MetadataValue::Bool(*b),
        JsonValue::Null => MetadataValue::Null,
        other => MetadataValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn load_counts_csv(path: &Path) -> Result<Vec<SampleCounts>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("CSV missing '{name}' column"))
    };
    let feature_idx = column(FEATURE_ID_COLUMN)?;
    let sample_idx = column(SAMPLE_ID_COLUMN)?;
    let count_idx = column(COUNT_COLUMN)?;

    let mut builder = CountsBuilder::default();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let count_text = field(count_idx);
        let count = count_text
            .parse::<f64>()
            .with_context(|| format!("CSV row {row_no}: '{count_text}' is not a number"))?;
        builder.push(field(feature_idx).to_string(), field(sample_idx).to_string(), count);
    }

    Ok(builder.finish())
}

/// Header row with column names; every column but `key_column` is a field.
fn load_annotation_csv(path: &Path, key_column: &str) -> Result<Vec<(String, Record)>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let key_idx = headers
        .iter()
        .position(|h| h == key_column)
        .with_context(|| format!("CSV missing key column '{key_column}'"))?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let key = record.get(key_idx).unwrap_or("").to_string();
        if key.is_empty() {
            bail!("CSV row {row_no}: empty key in '{key_column}'");
        }

        let mut fields = Record::new();
        for (col_idx, value) in record.iter().enumerate() {
            if col_idx == key_idx {
                continue;
            }
            fields.insert(headers[col_idx].clone(), guess_metadata_type(value));
        }
        rows.push((key, fields));
    }

    Ok(rows)
}

fn guess_metadata_type(s: &str) -> MetadataValue {
    let s = s.trim();
    if s.is_empty() || s == "NA" {
        return MetadataValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return MetadataValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return MetadataValue::Float(f);
    }
    match s {
        "true" | "TRUE" => MetadataValue::Bool(true),
        "false" | "FALSE" => MetadataValue::Bool(false),
        _ => MetadataValue::String(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Long-format counts; `count` may be any integer or float column.
fn load_counts_parquet(path: &Path) -> Result<Vec<SampleCounts>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut counts = CountsBuilder::default();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let feature_col = named_column(&batch, FEATURE_ID_COLUMN)?;
        let sample_col = named_column(&batch, SAMPLE_ID_COLUMN)?;
        let count_col = named_column(&batch, COUNT_COLUMN)?;

        for row in 0..batch.num_rows() {
            let feature_id = extract_string(feature_col, row)
                .with_context(|| format!("Row {row}: failed to read '{FEATURE_ID_COLUMN}'"))?;
            let sample_id = extract_string(sample_col, row)
                .with_context(|| format!("Row {row}: failed to read '{SAMPLE_ID_COLUMN}'"))?;
            let count = extract_f64(count_col, row)
                .with_context(|| format!("Row {row}: failed to read '{COUNT_COLUMN}'"))?;
            counts.push(feature_id, sample_id, count);
        }
    }

    Ok(counts.finish())
}

/// Works with files written by both Pandas (`df.to_parquet()`) and Polars.
fn load_annotation_parquet(path: &Path, key_column: &str) -> Result<Vec<(String, Record)>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let key_idx = schema
            .index_of(key_column)
            .map_err(|_| anyhow!("Parquet file missing key column '{key_column}'"))?;
        let key_col = batch.column(key_idx);

        let field_cols: Vec<(usize, String)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != key_idx)
            .map(|(i, f)| (i, f.name().clone()))
            .collect();

        for row in 0..batch.num_rows() {
            let key = extract_string(key_col, row)
                .with_context(|| format!("Row {row}: failed to read key '{key_column}'"))?;

            let mut fields = Record::new();
            for (col_idx, name) in &field_cols {
                let value = extract_metadata_value(batch.column(*col_idx), row)?;
                fields.insert(name.clone(), value);
            }
            rows.push((key, fields));
        }
    }

    Ok(rows)
}

// -- Arrow helpers --

fn named_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

fn extract_string(col: &ArrayRef, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value in key column");
    }
    match col.data_type() {
        DataType::Utf8 => Ok(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 | DataType::Int64 => Ok(array_value_to_string(col, row)?),
        other => bail!("Expected string column, got {other:?}"),
    }
}

fn extract_f64(col: &ArrayRef, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in numeric column");
    }
    match col.data_type() {
        DataType::Int32 => Ok(col.as_primitive::<Int32Type>().value(row) as f64),
        DataType::Int64 => Ok(col.as_primitive::<Int64Type>().value(row) as f64),
        DataType::Float32 => Ok(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Ok(col.as_primitive::<Float64Type>().value(row)),
        other => bail!("Expected numeric column, got {other:?}"),
    }
}

/// Extract a single annotation value; list and other nested cells keep their text.
fn extract_metadata_value(col: &ArrayRef, row: usize) -> Result<MetadataValue> {
    if col.is_null(row) {
        return Ok(MetadataValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => MetadataValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => {
            MetadataValue::String(col.as_string::<i64>().value(row).to_string())
        }
        DataType::Int32 => MetadataValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => MetadataValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => {
            MetadataValue::Float(col.as_primitive::<Float32Type>().value(row) as f64)
        }
        DataType::Float64 => MetadataValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => MetadataValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 | DataType::Date64 => {
            MetadataValue::Date(array_value_to_string(col, row)?)
        }
        _ => MetadataValue::String(array_value_to_string(col, row)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Builder, Int64Array, ListBuilder, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    fn write_parquet(batch: &RecordBatch) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
        file
    }

    #[test]
    fn test_guess_metadata_type() {
        assert_eq!(guess_metadata_type("12"), MetadataValue::Integer(12));
        assert_eq!(guess_metadata_type("0.5"), MetadataValue::Float(0.5));
        assert_eq!(guess_metadata_type("TRUE"), MetadataValue::Bool(true));
        assert_eq!(guess_metadata_type("NA"), MetadataValue::Null);
        assert_eq!(guess_metadata_type(" tumor "), MetadataValue::from("tumor"));
    }

    #[test]
    fn test_json_nested_values_kept_as_text() {
        let v: JsonValue = serde_json::json!(["a", "b"]);
        assert_eq!(json_to_metadata(&v), MetadataValue::from(r#"["a","b"]"#));
    }

    #[test]
    fn test_counts_csv_grouped_in_first_seen_order() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "feature_id,sample_id,count").unwrap();
        writeln!(file, "f1,S2,3").unwrap();
        writeln!(file, "f1,S1,5").unwrap();
        writeln!(file, "f2,S2,7").unwrap();
        file.flush().unwrap();

        let sources = load_counts(file.path()).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].sample_id, "S2");
        assert_eq!(
            sources[0].counts,
            vec![("f1".to_string(), 3.0), ("f2".to_string(), 7.0)]
        );
        assert_eq!(sources[1].counts, vec![("f1".to_string(), 5.0)]);
    }

    #[test]
    fn test_counts_json_with_protocol() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"sample_id": "S1", "protocol": {{"Raw_Reads": 1200}}, "counts": {{"f1": 4}}}}]"#
        )
        .unwrap();
        file.flush().unwrap();

        let sources = load_counts(file.path()).unwrap();
        assert_eq!(sources[0].protocol["Raw_Reads"], MetadataValue::Integer(1200));
        assert_eq!(sources[0].counts, vec![("f1".to_string(), 4.0)]);
    }

    #[test]
    fn test_annotation_csv_missing_key_column() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "ROI,group").unwrap();
        writeln!(file, "r1,X").unwrap();
        file.flush().unwrap();

        let err = load_annotation(file.path(), "Sample_ID").unwrap_err();
        assert!(err.to_string().contains("Sample_ID"));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(load_counts(Path::new("counts.xlsx")).is_err());
    }

    #[test]
    fn test_counts_json_duplicate_feature_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"sample_id": "S1", "counts": {{"f1": 4, "f2": 1, "f1": 9}}}}]"#
        )
        .unwrap();
        file.flush().unwrap();

        let err = load_counts(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("duplicate count for feature 'f1'"));
    }

    #[test]
    fn test_counts_json_keeps_document_order() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"sample_id": "S1", "counts": {{"f2": 2, "f1": 1.5}}}}]"#).unwrap();
        file.flush().unwrap();

        let sources = load_counts(file.path()).unwrap();
        assert!(sources[0].protocol.is_empty());
        assert_eq!(
            sources[0].counts,
            vec![("f2".to_string(), 2.0), ("f1".to_string(), 1.5)]
        );
    }

    #[test]
    fn test_annotation_json_records() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[
                {{"Sample_ID": "A", "group": "X", "area": 1500.5, "tags": ["roi", "pan-ck"]}},
                {{"Sample_ID": "B", "group": "Y", "nuclei": 210}}
            ]"#
        )
        .unwrap();
        file.flush().unwrap();

        let table = load_annotation(file.path(), "Sample_ID").unwrap();
        assert_eq!(table.keys(), &["A", "B"]);
        assert_eq!(table.field_names(), &["area", "group", "nuclei", "tags"]);
        assert_eq!(table.value("A", "area").unwrap(), MetadataValue::Float(1500.5));
        assert_eq!(table.value("B", "nuclei").unwrap(), MetadataValue::Integer(210));
        assert_eq!(table.value("B", "area").unwrap(), MetadataValue::Null);
        assert_eq!(
            table.value("A", "tags").unwrap(),
            MetadataValue::from(r#"["roi","pan-ck"]"#)
        );
    }

    #[test]
    fn test_annotation_json_missing_key_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"group": "X"}}]"#).unwrap();
        file.flush().unwrap();

        assert!(load_annotation(file.path(), "Sample_ID").is_err());
    }

    #[test]
    fn test_counts_parquet_null_count_names_row() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(FEATURE_ID_COLUMN, DataType::Utf8, false),
            Field::new(SAMPLE_ID_COLUMN, DataType::Utf8, false),
            Field::new(COUNT_COLUMN, DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["f1", "f2"])),
                Arc::new(StringArray::from(vec!["A", "A"])),
                Arc::new(Int64Array::from(vec![Some(3), None])),
            ],
        )
        .unwrap();
        let file = write_parquet(&batch);

        let err = load_counts(file.path()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Row 1"), "{msg}");
        assert!(msg.contains("null value"), "{msg}");
    }

    #[test]
    fn test_annotation_parquet_list_cells_kept_as_text() {
        let mut scans = ListBuilder::new(Float64Builder::new());
        scans.values().append_value(1.5);
        scans.values().append_value(2.5);
        scans.append(true);
        scans.append(false);
        let scans = scans.finish();

        let schema = Arc::new(Schema::new(vec![
            Field::new("Sample_ID", DataType::Utf8, false),
            Field::new("scan", scans.data_type().clone(), true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec!["A", "B"])), Arc::new(scans)],
        )
        .unwrap();
        let file = write_parquet(&batch);

        let table = load_annotation(file.path(), "Sample_ID").unwrap();
        match table.value("A", "scan").unwrap() {
            MetadataValue::String(text) => {
                assert!(text.contains("1.5") && text.contains("2.5"), "{text}");
            }
            other => panic!("expected text, got {other:?}"),
        }
        assert_eq!(table.value("B", "scan").unwrap(), MetadataValue::Null);
    }
}
