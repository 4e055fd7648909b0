use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, StoreError};

use super::model::{AnnotationTable, MetadataValue, Record};

// ---------------------------------------------------------------------------
// Selection: which values are accepted per annotation field
// ---------------------------------------------------------------------------

/// Per-field value filter: field name → set of accepted values.
///
/// A record passes when, for every listed field, its value is in the set.
/// An empty set accepts nothing; a field missing from a record reads as Null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    fields: BTreeMap<String, BTreeSet<MetadataValue>>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `values` for `field` (adds to any values already accepted).
    pub fn accept<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<MetadataValue>,
    {
        self.fields
            .entry(field.to_string())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Start from every value currently present in `table` (accepts everything).
    pub fn all_of(table: &AnnotationTable) -> Self {
        let fields = table
            .field_names()
            .iter()
            .filter_map(|f| Some((f.clone(), table.unique_values(f).ok()?.clone())))
            .collect();
        Self { fields }
    }

    /// Flip one value of one field on or off.
    pub fn toggle(&mut self, field: &str, value: &MetadataValue) {
        let selected = self.fields.entry(field.to_string()).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
    }

    /// Drop every accepted value of `field`, so nothing passes.
    pub fn select_none(&mut self, field: &str) {
        self.fields.insert(field.to_string(), BTreeSet::new());
    }

    /// Remove the constraint on `field` entirely.
    pub fn clear(&mut self, field: &str) {
        self.fields.remove(field);
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.fields.iter().all(|(field, selected)| match record.get(field) {
            Some(value) => selected.contains(value),
            None => selected.contains(&MetadataValue::Null),
        })
    }

    /// Closure form for [`crate::data::store::AnnotatedMatrixStore::subset`].
    pub fn predicate(&self) -> impl Fn(&str, &Record) -> bool + '_ {
        move |_: &str, record: &Record| self.matches(record)
    }

    /// Fail with NotFound when a listed field is unknown to `table`.
    pub fn validate(&self, table: &AnnotationTable) -> Result<()> {
        match self.fields.keys().find(|f| !table.has_field(f)) {
            Some(field) => Err(StoreError::field_not_found(field)),
            None => Ok(()),
        }
    }

    /// Positions of the records in `table` that pass.
    pub fn matching_indices(&self, table: &AnnotationTable) -> Vec<usize> {
        table
            .iter()
            .enumerate()
            .filter(|(_, (_, rec))| self.matches(rec))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AnnotationTable {
        let rows = [("s1", "X", Some("tumor")), ("s2", "Y", Some("stroma")), ("s3", "X", None)];
        AnnotationTable::from_records(
            rows.iter()
                .map(|(key, group, segment)| {
                    let mut rec = Record::new();
                    rec.insert("group".to_string(), MetadataValue::from(*group));
                    if let Some(seg) = segment {
                        rec.insert("segment".to_string(), MetadataValue::from(*seg));
                    }
                    (key.to_string(), rec)
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_all_of_accepts_everything() {
        let t = table();
        assert_eq!(Selection::all_of(&t).matching_indices(&t), vec![0, 1, 2]);
    }

    #[test]
    fn test_accept_single_value() {
        let t = table();
        let sel = Selection::new().accept("group", ["X"]);
        assert_eq!(sel.matching_indices(&t), vec![0, 2]);
    }

    #[test]
    fn test_missing_field_matches_null_only() {
        let t = table();
        let sel = Selection::new().accept("segment", [MetadataValue::Null]);
        assert_eq!(sel.matching_indices(&t), vec![2]);
    }

    #[test]
    fn test_select_none_hides_everything() {
        let t = table();
        let mut sel = Selection::all_of(&t);
        sel.select_none("group");
        assert!(sel.matching_indices(&t).is_empty());
        sel.clear("group");
        assert_eq!(sel.matching_indices(&t).len(), 3);
    }

    #[test]
    fn test_toggle() {
        let t = table();
        let mut sel = Selection::all_of(&t);
        sel.toggle("group", &MetadataValue::from("Y"));
        assert_eq!(sel.matching_indices(&t), vec![0, 2]);
        sel.toggle("group", &MetadataValue::from("Y"));
        assert_eq!(sel.matching_indices(&t), vec![0, 1, 2]);
    }

    #[test]
    fn test_validate_unknown_field() {
        let t = table();
        let sel = Selection::new().accept("tissue", ["lung"]);
        assert!(matches!(sel.validate(&t), Err(StoreError::NotFound { .. })));
    }
}
