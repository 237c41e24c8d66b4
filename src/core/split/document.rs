use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::core::operations::write_atomic;
use crate::error::{CurateError, CurateResult};

use super::partition::SplitPartition;

/// The persisted train/test split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitAssignment {
    #[serde(default)]
    pub train: Vec<String>,
    #[serde(default)]
    pub test: Vec<String>,
}

impl From<&SplitPartition> for SplitAssignment {
    fn from(partition: &SplitPartition) -> Self {
        // BTreeSet iteration is already lexicographic
        Self {
            train: partition.train.iter().cloned().collect(),
            test: partition.test.iter().cloned().collect(),
        }
    }
}

impl SplitAssignment {
    /// Write with 2-space indentation and a trailing newline.
    pub fn save(&self, path: &Path) -> CurateResult<()> {
        let mut json =
            serde_json::to_string_pretty(self).map_err(|e| CurateError::persist(path, e))?;
        json.push('\n');
        write_atomic(path, json.as_bytes())?;
        info!(
            "Wrote {:?} (train={} | test={})",
            path,
            self.train.len(),
            self.test.len()
        );
        Ok(())
    }

    pub fn load(path: &Path) -> CurateResult<Self> {
        if !path.is_file() {
            return Err(CurateError::missing(path));
        }
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|source| CurateError::MalformedSplit {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::split::{partition_names, SplitKeywords, TieBreak};

    #[test]
    fn test_saved_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("split.json");
        let partition = partition_names(
            ["clutter_b.jpg", "extra_a.jpg", "clutter_a.jpg", "misc.jpg"],
            &SplitKeywords::default(),
            TieBreak::TrainFirst,
        );
        SplitAssignment::from(&partition).save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "{\n  \"train\": [\n    \"clutter_a.jpg\",\n    \"clutter_b.jpg\"\n  ],\n  \"test\": [\n    \"extra_a.jpg\"\n  ]\n}\n"
        );
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("split.json");
        assert!(matches!(
            SplitAssignment::load(&path).unwrap_err(),
            CurateError::MissingRequiredSubpath { .. }
        ));

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            SplitAssignment::load(&path).unwrap_err(),
            CurateError::MalformedSplit { .. }
        ));

        fs::write(&path, r#"{"train": ["clutter_1.jpg"]}"#).unwrap();
        let loaded = SplitAssignment::load(&path).unwrap();
        assert_eq!(loaded.train, vec!["clutter_1.jpg"]);
        assert!(loaded.test.is_empty());
    }
}
