//! Dataset manifest: which files make up a dataset and how they are keyed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

fn default_sample_id_column() -> String {
    "Sample_ID".to_string()
}

fn default_feature_id_column() -> String {
    "RTS_ID".to_string()
}

/// JSON manifest naming the counts file and the two annotation tables.
///
/// Relative paths are resolved against the manifest's own directory by
/// [`Manifest::from_path`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Long-format counts (`.csv`, `.parquet`) or per-sample JSON.
    pub counts: PathBuf,
    pub sample_annotation: PathBuf,
    pub feature_annotation: PathBuf,

    /// Key column of the sample annotation table.
    #[serde(default = "default_sample_id_column")]
    pub sample_id_column: String,

    /// Key column of the feature annotation table.
    #[serde(default = "default_feature_id_column")]
    pub feature_id_column: String,

    /// Sample annotation columns that hold run metadata rather than biology.
    #[serde(default)]
    pub protocol_columns: Vec<String>,
}

impl Manifest {
    pub fn new(
        counts: impl Into<PathBuf>,
        sample_annotation: impl Into<PathBuf>,
        feature_annotation: impl Into<PathBuf>,
    ) -> Self {
        Self {
            counts: counts.into(),
            sample_annotation: sample_annotation.into(),
            feature_annotation: feature_annotation.into(),
            sample_id_column: default_sample_id_column(),
            feature_id_column: default_feature_id_column(),
            protocol_columns: Vec::new(),
        }
    }

    /// Read a manifest file and resolve its paths.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading manifest {}", path.display()))?;
        let manifest: Manifest = serde_json::from_str(&text)
            .with_context(|| format!("parsing manifest {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(manifest.resolve_against(base))
    }

    /// Make relative paths relative to `base`.
    pub fn resolve_against(mut self, base: &Path) -> Self {
        for p in [
            &mut self.counts,
            &mut self.sample_annotation,
            &mut self.feature_annotation,
        ] {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
        self
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing manifest")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let m: Manifest = serde_json::from_str(
            r#"{"counts": "c.csv", "sample_annotation": "s.csv", "feature_annotation": "f.csv"}"#,
        )
        .unwrap();
        assert_eq!(m.sample_id_column, "Sample_ID");
        assert_eq!(m.feature_id_column, "RTS_ID");
        assert!(m.protocol_columns.is_empty());
    }

    #[test]
    fn test_relative_paths_resolved() {
        let m = Manifest::new("c.csv", "/abs/s.csv", "f.csv").resolve_against(Path::new("/data"));
        assert_eq!(m.counts, PathBuf::from("/data/c.csv"));
        assert_eq!(m.sample_annotation, PathBuf::from("/abs/s.csv"));
        assert_eq!(m.feature_annotation, PathBuf::from("/data/f.csv"));
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        let manifest = Manifest {
            protocol_columns: vec!["Raw_Reads".to_string()],
            ..Manifest::new("counts.csv", "samples.csv", "features.csv")
        };
        std::fs::write(&path, manifest.to_json().unwrap()).unwrap();

        let read = Manifest::from_path(&path).unwrap();
        assert_eq!(read.counts, dir.path().join("counts.csv"));
        assert_eq!(read.protocol_columns, vec!["Raw_Reads"]);
    }
}
