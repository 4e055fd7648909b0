//! In-memory store for GeoMx-style spatial transcriptomics datasets.
//!
//! A dataset is one or more named features × samples matrices (raw counts,
//! normalized values, ...) plus three annotation tables: per feature (probe
//! or gene target), per sample (region of interest) and per sample run
//! protocol. [`AnnotatedMatrixStore`] keeps them consistent through
//! subsetting and derived matrices, and offers group-wise and per-slice
//! apply.
//!
//! ```no_run
//! use geomx_store::prelude::*;
//!
//! let manifest = Manifest::from_path("dataset.json".as_ref()).unwrap();
//! let store = load_dataset(&manifest).unwrap();
//!
//! let endogenous = Selection::new().accept("CodeClass", ["Endogenous"]);
//! let targets = store.subset_features(endogenous.predicate());
//!
//! let per_group = targets
//!     .group_apply(Axis::Sample, "segment", |part| {
//!         stats::mean(part.get_matrix(RAW_MATRIX).unwrap().values())
//!     })
//!     .unwrap();
//! ```

pub mod config;
pub mod data;
pub mod error;

pub use config::Manifest;
pub use data::matrix::Matrix;
pub use data::model::{AnnotationTable, Axis, KeyIndex, MetadataValue, Record};
pub use data::store::{AnnotatedMatrixStore, RAW_MATRIX, SampleCounts};
pub use error::{Result, StoreError};

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::config::Manifest;
    pub use crate::data::filter::Selection;
    pub use crate::data::loader::{load_annotation, load_counts, load_dataset};
    pub use crate::data::matrix::Matrix;
    pub use crate::data::model::{AnnotationTable, Axis, MetadataValue, Record};
    pub use crate::data::stats::{self, Statistic};
    pub use crate::data::store::{AnnotatedMatrixStore, RAW_MATRIX, SampleCounts};
    pub use crate::error::StoreError;
}
