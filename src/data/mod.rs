/// Data layer: core types, loading, filtering and reducers.
///
/// Architecture:
/// ```text
///  counts (.csv / .parquet / .json)   annotation tables (.csv / .json / .parquet)
///        │                                   │
///        ▼                                   ▼
///   ┌──────────┐                      ┌─────────────────┐
///   │  loader   │  → SampleCounts      │ AnnotationTable │  key → record
///   └──────────┘                      └─────────────────┘
///        │                                   │
///        └──────────────┬────────────────────┘
///                       ▼
///           ┌──────────────────────┐
///           │ AnnotatedMatrixStore │  named matrices + feature/sample/protocol
///           └──────────────────────┘
///                       │
///        ┌──────────────┼──────────────┐
///        ▼              ▼              ▼
///    subset        group_apply    element_apply
///  (filter)                          (stats)
/// ```

pub mod filter;
pub mod loader;
pub mod matrix;
pub mod model;
pub mod stats;
pub mod store;
