use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, StoreError};

// ---------------------------------------------------------------------------
// MetadataValue – a single annotation cell
// ---------------------------------------------------------------------------

/// A dynamically-typed annotation value.
///
/// Group keys in [`crate::data::store::AnnotatedMatrixStore::group_apply`]
/// are `MetadataValue`s collected into a `BTreeMap`, so the type is totally
/// ordered: values order first by variant, then by content. Floats compare
/// by `total_cmp`, so `NaN` equals itself and `-0.0` differs from `0.0`.
#[derive(Debug, Clone)]
pub enum MetadataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date kept as text.
    Date(String),
    Null,
}

impl PartialEq for MetadataValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MetadataValue {}

impl PartialOrd for MetadataValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MetadataValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use MetadataValue::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl std::hash::Hash for MetadataValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            MetadataValue::String(s) | MetadataValue::Date(s) => s.hash(state),
            MetadataValue::Integer(i) => i.hash(state),
            MetadataValue::Float(f) => f.to_bits().hash(state),
            MetadataValue::Bool(b) => b.hash(state),
            MetadataValue::Null => {}
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) | MetadataValue::Date(s) => write!(f, "{s}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(v) => write!(f, "{v}"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::String(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::String(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        MetadataValue::Integer(i)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Float(v)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Bool(b)
    }
}

impl MetadataValue {
    fn rank(&self) -> u8 {
        match self {
            MetadataValue::Null => 0,
            MetadataValue::Bool(_) => 1,
            MetadataValue::Integer(_) => 2,
            MetadataValue::Float(_) => 3,
            MetadataValue::String(_) => 4,
            MetadataValue::Date(_) => 5,
        }
    }

    /// Interpret the value as an `f64` (integers widen, everything else is `None`).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Float(v) => Some(*v),
            MetadataValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Borrow the text of a `String` or `Date` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) | MetadataValue::Date(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, MetadataValue::Null)
    }
}

/// One annotation record: field name → value.
pub type Record = BTreeMap<String, MetadataValue>;

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// Which dimension of the store an operation runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Rows: probes / gene targets.
    Feature,
    /// Columns: regions of interest.
    Sample,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Feature => write!(f, "feature"),
            Axis::Sample => write!(f, "sample"),
        }
    }
}

// ---------------------------------------------------------------------------
// KeyIndex – ordered unique keys with position lookup
// ---------------------------------------------------------------------------

/// Ordered list of unique IDs along one axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyIndex {
    keys: Vec<String>,
    positions: HashMap<String, usize>,
}

impl KeyIndex {
    /// Build an index, rejecting duplicate keys.
    pub fn new(keys: Vec<String>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(keys.len());
        for (i, key) in keys.iter().enumerate() {
            if positions.insert(key.clone(), i).is_some() {
                return Err(StoreError::SchemaMismatch(format!("duplicate key '{key}'")));
            }
        }
        Ok(Self { keys, positions })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Same keys regardless of order.
    pub fn same_key_set(&self, other: &KeyIndex) -> bool {
        self.len() == other.len() && self.keys.iter().all(|k| other.contains(k))
    }

    /// Keep the keys at `indices`, in the given order.
    pub(crate) fn select(&self, indices: &[usize]) -> Self {
        let keys: Vec<String> = indices.iter().map(|&i| self.keys[i].clone()).collect();
        let positions = keys.iter().enumerate().map(|(i, k)| (k.clone(), i)).collect();
        Self { keys, positions }
    }
}

// ---------------------------------------------------------------------------
// AnnotationTable – keyed metadata records
// ---------------------------------------------------------------------------

/// Per-key metadata records with pre-computed column indices.
#[derive(Debug, Clone)]
pub struct AnnotationTable {
    index: Arc<KeyIndex>,
    records: Vec<Record>,
    /// Ordered list of field names seen in any record.
    field_names: Vec<String>,
    /// For each field the sorted set of unique values.
    unique_values: BTreeMap<String, BTreeSet<MetadataValue>>,
}

impl AnnotationTable {
    /// Build a table from `(key, record)` pairs, preserving their order.
    pub fn from_records(rows: Vec<(String, Record)>) -> Result<Self> {
        let (keys, records): (Vec<String>, Vec<Record>) = rows.into_iter().unzip();
        let index = KeyIndex::new(keys)?;
        Ok(Self::with_schema(Arc::new(index), records, BTreeSet::new()))
    }

    /// Build the column indices; every field in `schema` is kept even when no
    /// record carries it.
    fn with_schema(index: Arc<KeyIndex>, records: Vec<Record>, schema: BTreeSet<String>) -> Self {
        let mut unique_values: BTreeMap<String, BTreeSet<MetadataValue>> = schema
            .iter()
            .map(|field| (field.clone(), BTreeSet::new()))
            .collect();
        let mut field_set = schema;

        for rec in &records {
            for (field, val) in rec {
                field_set.insert(field.clone());
                unique_values
                    .entry(field.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }
        // A record lacking a field reads as Null for it.
        for (field, vals) in unique_values.iter_mut() {
            if records.iter().any(|r| !r.contains_key(field)) {
                vals.insert(MetadataValue::Null);
            }
        }

        AnnotationTable {
            index,
            records,
            field_names: field_set.into_iter().collect(),
            unique_values,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        self.index.keys()
    }

    pub fn index(&self) -> &Arc<KeyIndex> {
        &self.index
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.unique_values.contains_key(field)
    }

    pub fn unique_values(&self, field: &str) -> Result<&BTreeSet<MetadataValue>> {
        self.unique_values
            .get(field)
            .ok_or_else(|| StoreError::field_not_found(field))
    }

    /// Iterate `(key, record)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.index.keys().iter().map(String::as_str).zip(self.records.iter())
    }

    pub fn record(&self, key: &str) -> Result<&Record> {
        self.index
            .position(key)
            .map(|i| &self.records[i])
            .ok_or_else(|| StoreError::key_not_found(key))
    }

    /// Value of `field` for `key`; an absent field on a known key reads as Null.
    pub fn value(&self, key: &str, field: &str) -> Result<MetadataValue> {
        if !self.has_field(field) {
            return Err(StoreError::field_not_found(field));
        }
        Ok(self
            .record(key)?
            .get(field)
            .cloned()
            .unwrap_or(MetadataValue::Null))
    }

    /// A whole column in key order.
    pub fn column(&self, field: &str) -> Result<Vec<MetadataValue>> {
        if !self.has_field(field) {
            return Err(StoreError::field_not_found(field));
        }
        Ok(self
            .records
            .iter()
            .map(|r| r.get(field).cloned().unwrap_or(MetadataValue::Null))
            .collect())
    }

    /// Keep the rows at `indices`, sharing `index` when the caller already built it.
    pub(crate) fn select(&self, indices: &[usize], index: Arc<KeyIndex>) -> Self {
        let records = indices.iter().map(|&i| self.records[i].clone()).collect();
        Self::with_schema(index, records, self.schema())
    }

    fn schema(&self) -> BTreeSet<String> {
        self.field_names.iter().cloned().collect()
    }

    /// Reorder rows to follow `index`; every key of `index` must be present.
    pub(crate) fn reorder(&self, index: Arc<KeyIndex>) -> Result<Self> {
        let records = index
            .keys()
            .iter()
            .map(|k| self.record(k).cloned())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::with_schema(index, records, self.schema()))
    }

    /// Move `fields` out of this table into a new table on the same keys.
    ///
    /// Fields not present in the table are ignored.
    pub fn split_fields(&self, fields: &[String]) -> (AnnotationTable, AnnotationTable) {
        let mut kept = Vec::with_capacity(self.len());
        let mut moved = Vec::with_capacity(self.len());
        for rec in &self.records {
            let (taken, rest): (Record, Record) = rec
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .partition(|(k, _)| fields.contains(k));
            kept.push(rest);
            moved.push(taken);
        }
        let (moved_schema, kept_schema): (BTreeSet<String>, BTreeSet<String>) = self
            .schema()
            .into_iter()
            .partition(|f| fields.contains(f));
        (
            Self::with_schema(self.index.clone(), kept, kept_schema),
            Self::with_schema(self.index.clone(), moved, moved_schema),
        )
    }

    /// Merge fields of `other` (same key set) into this table; `other` wins on clashes.
    pub(crate) fn merge(&self, other: &AnnotationTable) -> Result<Self> {
        if !self.index.same_key_set(&other.index) {
            return Err(StoreError::SchemaMismatch(
                "cannot merge annotation tables with different keys".to_string(),
            ));
        }
        let records = self
            .iter()
            .map(|(key, rec)| -> Result<Record> {
                let mut merged = rec.clone();
                merged.extend(other.record(key)?.iter().map(|(k, v)| (k.clone(), v.clone())));
                Ok(merged)
            })
            .collect::<Result<Vec<_>>>()?;
        let mut schema = self.schema();
        schema.extend(other.schema());
        Ok(Self::with_schema(self.index.clone(), records, schema))
    }
}

impl PartialEq for AnnotationTable {
    fn eq(&self, other: &Self) -> bool {
        self.index.keys() == other.index.keys()
            && self.field_names == other.field_names
            && self.records == other.records
    }
}
