use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use log::{debug, info};

use crate::error::{Result, StoreError};

use super::matrix::Matrix;
use super::model::{AnnotationTable, Axis, KeyIndex, MetadataValue, Record};

/// Name of the matrix built by [`AnnotatedMatrixStore::load`].
pub const RAW_MATRIX: &str = "raw";

// ---------------------------------------------------------------------------
// Raw inputs
// ---------------------------------------------------------------------------

/// Counts read for one sample, plus the run-level fields from its header.
#[derive(Debug, Clone, Default)]
pub struct SampleCounts {
    pub sample_id: String,
    /// Run metadata (software version, read counts, ...).
    pub protocol: Record,
    /// `(feature ID, count)` pairs; features not listed count as zero.
    pub counts: Vec<(String, f64)>,
}

impl SampleCounts {
    pub fn new(sample_id: impl Into<String>) -> Self {
        Self {
            sample_id: sample_id.into(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// AnnotatedMatrixStore
// ---------------------------------------------------------------------------

/// Named features × samples matrices with feature, sample and protocol annotation.
///
/// All matrices share the feature order of `features` and the sample order of
/// `samples`; `protocol` is keyed by the same samples. Operations never mutate
/// the store, they return a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedMatrixStore {
    matrices: BTreeMap<String, Matrix>,
    features: AnnotationTable,
    samples: AnnotationTable,
    protocol: AnnotationTable,
}

impl AnnotatedMatrixStore {
    /// Assemble the raw count matrix from per-sample sources.
    ///
    /// Sample order follows `sample_annotation`, feature order follows
    /// `feature_annotation`. Fails with [`StoreError::SchemaMismatch`] when the
    /// sources and annotation tables do not describe the same keys.
    pub fn load(
        sources: Vec<SampleCounts>,
        sample_annotation: AnnotationTable,
        feature_annotation: AnnotationTable,
    ) -> Result<Self> {
        let sample_index = sample_annotation.index().clone();
        let feature_index = feature_annotation.index().clone();

        if sources.len() != sample_index.len() {
            return Err(StoreError::SchemaMismatch(format!(
                "{} count sources but {} annotated samples",
                sources.len(),
                sample_index.len()
            )));
        }

        let mut raw = Matrix::zeros(feature_index.clone(), sample_index.clone());
        let mut protocol_by_sample: BTreeMap<String, Record> = BTreeMap::new();

        for source in sources {
            let col = sample_index.position(&source.sample_id).ok_or_else(|| {
                StoreError::SchemaMismatch(format!(
                    "sample '{}' has counts but no annotation",
                    source.sample_id
                ))
            })?;
            if protocol_by_sample.contains_key(&source.sample_id) {
                return Err(StoreError::SchemaMismatch(format!(
                    "duplicate count source for sample '{}'",
                    source.sample_id
                )));
            }

            let mut seen: BTreeSet<&str> = BTreeSet::new();
            for (feature_id, count) in &source.counts {
                let row = feature_index.position(feature_id).ok_or_else(|| {
                    StoreError::SchemaMismatch(format!(
                        "feature '{feature_id}' in sample '{}' has no annotation",
                        source.sample_id
                    ))
                })?;
                if !seen.insert(feature_id.as_str()) {
                    return Err(StoreError::SchemaMismatch(format!(
                        "duplicate count for feature '{feature_id}' in sample '{}'",
                        source.sample_id
                    )));
                }
                raw.set(row, col, *count);
            }
            debug!(
                "sample {}: {} of {} features counted",
                source.sample_id,
                seen.len(),
                feature_index.len()
            );
            protocol_by_sample.insert(source.sample_id, source.protocol);
        }

        let protocol = AnnotationTable::from_records(protocol_by_sample.into_iter().collect())?
            .reorder(sample_index)?;

        info!(
            "loaded {} features x {} samples",
            feature_annotation.len(),
            sample_annotation.len()
        );

        let mut matrices = BTreeMap::new();
        matrices.insert(RAW_MATRIX.to_string(), raw);
        Ok(Self {
            matrices,
            features: feature_annotation,
            samples: sample_annotation,
            protocol,
        })
    }

    /// Build a store around an existing matrix.
    ///
    /// The annotation tables must hold exactly the matrix keys; they are
    /// reordered to follow the matrix.
    pub fn from_matrix(
        name: &str,
        matrix: Matrix,
        features: AnnotationTable,
        samples: AnnotationTable,
        protocol: AnnotationTable,
    ) -> Result<Self> {
        check_keys(Axis::Feature, matrix.row_index(), features.index())?;
        check_keys(Axis::Sample, matrix.col_index(), samples.index())?;
        check_keys(Axis::Sample, matrix.col_index(), protocol.index())?;

        let features = features.reorder(matrix.row_index().clone())?;
        let samples = samples.reorder(matrix.col_index().clone())?;
        let protocol = protocol.reorder(matrix.col_index().clone())?;

        let mut matrices = BTreeMap::new();
        matrices.insert(name.to_string(), matrix);
        Ok(Self {
            matrices,
            features,
            samples,
            protocol,
        })
    }

    // -- accessors --

    /// `(features, samples)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.features.len(), self.samples.len())
    }

    pub fn feature_ids(&self) -> &[String] {
        self.features.keys()
    }

    pub fn sample_ids(&self) -> &[String] {
        self.samples.keys()
    }

    pub fn keys(&self, axis: Axis) -> &[String] {
        match axis {
            Axis::Feature => self.feature_ids(),
            Axis::Sample => self.sample_ids(),
        }
    }

    pub fn matrix_names(&self) -> impl Iterator<Item = &str> {
        self.matrices.keys().map(String::as_str)
    }

    pub fn get_matrix(&self, name: &str) -> Result<&Matrix> {
        self.matrices
            .get(name)
            .ok_or_else(|| StoreError::matrix_not_found(name))
    }

    pub fn features(&self) -> &AnnotationTable {
        &self.features
    }

    pub fn samples(&self) -> &AnnotationTable {
        &self.samples
    }

    pub fn protocol(&self) -> &AnnotationTable {
        &self.protocol
    }

    /// The annotation table describing `axis`.
    pub fn annotation(&self, axis: Axis) -> &AnnotationTable {
        match axis {
            Axis::Feature => &self.features,
            Axis::Sample => &self.samples,
        }
    }

    /// Field names of the feature annotation.
    pub fn feature_labels(&self) -> &[String] {
        self.features.field_names()
    }

    /// Field names of the sample annotation.
    pub fn sample_labels(&self) -> &[String] {
        self.samples.field_names()
    }

    /// Sample annotation joined with protocol fields.
    pub fn sample_data(&self) -> Result<AnnotationTable> {
        self.samples.merge(&self.protocol)
    }

    // -- derived matrices --

    /// Return a copy holding `matrix` under `name`, replacing any existing one.
    pub fn add_matrix(&self, name: &str, matrix: Matrix) -> Result<Self> {
        if matrix.feature_ids() != self.feature_ids() {
            return Err(StoreError::SchemaMismatch(format!(
                "matrix '{name}' rows do not match the store's features"
            )));
        }
        if matrix.sample_ids() != self.sample_ids() {
            return Err(StoreError::SchemaMismatch(format!(
                "matrix '{name}' columns do not match the store's samples"
            )));
        }
        let mut next = self.clone();
        next.matrices.insert(name.to_string(), matrix);
        debug!("added matrix {name}");
        Ok(next)
    }

    /// Transform every value of `source` with `f` and store it as `name`.
    pub fn derive_matrix<F: Fn(f64) -> f64>(&self, source: &str, name: &str, f: F) -> Result<Self> {
        let derived = self.get_matrix(source)?.map(f);
        self.add_matrix(name, derived)
    }

    // -- subsetting --

    /// Keep features and samples whose `(key, record)` satisfy the predicates.
    ///
    /// Every matrix and annotation table is sliced the same way; relative
    /// order is kept.
    pub fn subset<FP, SP>(&self, feature_pred: FP, sample_pred: SP) -> Self
    where
        FP: Fn(&str, &Record) -> bool,
        SP: Fn(&str, &Record) -> bool,
    {
        let rows = matching_positions(&self.features, feature_pred);
        let cols = matching_positions(&self.samples, sample_pred);
        self.select(&rows, &cols)
    }

    /// Keep only the features matching `pred`.
    pub fn subset_features<F: Fn(&str, &Record) -> bool>(&self, pred: F) -> Self {
        self.subset(pred, |_, _| true)
    }

    /// Keep only the samples matching `pred`.
    pub fn subset_samples<F: Fn(&str, &Record) -> bool>(&self, pred: F) -> Self {
        self.subset(|_, _| true, pred)
    }

    /// Keep the listed keys, in the order given.
    pub fn subset_keys(&self, feature_ids: &[&str], sample_ids: &[&str]) -> Result<Self> {
        let rows = positions_of(self.features.index(), feature_ids)?;
        let cols = positions_of(self.samples.index(), sample_ids)?;
        Ok(self.select(&rows, &cols))
    }

    fn select(&self, rows: &[usize], cols: &[usize]) -> Self {
        let row_index = Arc::new(self.features.index().select(rows));
        let col_index = Arc::new(self.samples.index().select(cols));

        let matrices = self
            .matrices
            .iter()
            .map(|(name, m)| {
                (
                    name.clone(),
                    m.select(rows, cols, row_index.clone(), col_index.clone()),
                )
            })
            .collect();

        Self {
            matrices,
            features: self.features.select(rows, row_index),
            samples: self.samples.select(cols, col_index.clone()),
            protocol: self.protocol.select(cols, col_index),
        }
    }

    // -- apply --

    /// Partition `axis` by the values of `field` and run `aggregate` on each part.
    ///
    /// Each partition is handed over as a sub-store holding every matrix and
    /// all annotation for its keys, in original key order. Keys lacking the
    /// field fall into the `Null` group.
    pub fn group_apply<T, F>(
        &self,
        axis: Axis,
        field: &str,
        mut aggregate: F,
    ) -> Result<BTreeMap<MetadataValue, T>>
    where
        F: FnMut(&AnnotatedMatrixStore) -> T,
    {
        let table = self.annotation(axis);
        let groups = partition(table, field)?;
        debug!("{axis} field {field}: {} groups", groups.len());

        let all_rows: Vec<usize> = (0..self.features.len()).collect();
        let all_cols: Vec<usize> = (0..self.samples.len()).collect();

        Ok(groups
            .into_iter()
            .map(|(value, positions)| {
                let part = match axis {
                    Axis::Feature => self.select(&positions, &all_cols),
                    Axis::Sample => self.select(&all_rows, &positions),
                };
                (value, aggregate(&part))
            })
            .collect())
    }

    /// Keys along `axis` grouped by the value of `field`.
    pub fn groups(&self, axis: Axis, field: &str) -> Result<BTreeMap<MetadataValue, Vec<String>>> {
        let table = self.annotation(axis);
        Ok(partition(table, field)?
            .into_iter()
            .map(|(value, positions)| {
                let keys = positions.iter().map(|&i| table.keys()[i].clone()).collect();
                (value, keys)
            })
            .collect())
    }

    /// Run `f` on each row (features) or column (samples) of matrix `name`.
    ///
    /// Results come back in key order; `f` sees the key and the slice.
    pub fn element_apply<T, F>(&self, axis: Axis, name: &str, mut f: F) -> Result<Vec<T>>
    where
        F: FnMut(&str, &[f64]) -> T,
    {
        let matrix = self.get_matrix(name)?;
        let keys = self.keys(axis);
        let out: Vec<T> = match axis {
            Axis::Feature => keys
                .iter()
                .enumerate()
                .map(|(i, key)| f(key, matrix.row(i)))
                .collect(),
            Axis::Sample => {
                let mut buf = Vec::with_capacity(matrix.n_rows());
                keys.iter()
                    .enumerate()
                    .map(|(j, key)| {
                        buf.clear();
                        buf.extend((0..matrix.n_rows()).map(|i| matrix.row(i)[j]));
                        f(key, &buf)
                    })
                    .collect()
            }
        };
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn check_keys(axis: Axis, matrix_keys: &KeyIndex, table_keys: &KeyIndex) -> Result<()> {
    if matrix_keys.same_key_set(table_keys) {
        Ok(())
    } else {
        Err(StoreError::SchemaMismatch(format!(
            "{axis} keys of matrix ({}) and annotation ({}) differ",
            matrix_keys.len(),
            table_keys.len()
        )))
    }
}

fn matching_positions<P: Fn(&str, &Record) -> bool>(table: &AnnotationTable, pred: P) -> Vec<usize> {
    table
        .iter()
        .enumerate()
        .filter(|(_, (key, rec))| pred(*key, *rec))
        .map(|(i, _)| i)
        .collect()
}

fn positions_of(index: &KeyIndex, keys: &[&str]) -> Result<Vec<usize>> {
    let mut seen = BTreeSet::new();
    keys.iter()
        .map(|k| {
            let pos = index.position(k).ok_or_else(|| StoreError::key_not_found(k))?;
            if !seen.insert(pos) {
                return Err(StoreError::SchemaMismatch(format!("key '{k}' listed twice")));
            }
            Ok(pos)
        })
        .collect()
}

fn partition(table: &AnnotationTable, field: &str) -> Result<BTreeMap<MetadataValue, Vec<usize>>> {
    let column = table.column(field)?;
    let mut groups: BTreeMap<MetadataValue, Vec<usize>> = BTreeMap::new();
    for (i, value) in column.into_iter().enumerate() {
        groups.entry(value).or_default().push(i);
    }
    Ok(groups)
}
