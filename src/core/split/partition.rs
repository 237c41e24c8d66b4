use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Substrings that assign an image name to a split side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitKeywords {
    pub train: String,
    pub test: String,
}

impl Default for SplitKeywords {
    fn default() -> Self {
        Self {
            train: "clutter".to_string(),
            test: "extra".to_string(),
        }
    }
}

impl SplitKeywords {
    pub fn new(train: impl Into<String>, test: impl Into<String>) -> Self {
        Self {
            train: train.into(),
            test: test.into(),
        }
    }

    pub fn is_train(&self, name: &str) -> bool {
        contains_ignore_case(name, &self.train)
    }

    pub fn is_test(&self, name: &str) -> bool {
        contains_ignore_case(name, &self.test)
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Which side wins when a name carries both keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    #[default]
    TrainFirst,
    TestFirst,
}

/// Where a single name ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitSide {
    Train,
    Test,
    Unclassified,
}

pub fn classify_name(name: &str, keywords: &SplitKeywords, tie_break: TieBreak) -> SplitSide {
    let train = keywords.is_train(name);
    let test = keywords.is_test(name);
    match (train, test, tie_break) {
        (true, true, TieBreak::TrainFirst) => SplitSide::Train,
        (true, true, TieBreak::TestFirst) => SplitSide::Test,
        (true, false, _) => SplitSide::Train,
        (false, true, _) => SplitSide::Test,
        (false, false, _) => SplitSide::Unclassified,
    }
}

/// Result of partitioning a name list. Every input name is in exactly one set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitPartition {
    pub train: BTreeSet<String>,
    pub test: BTreeSet<String>,
    /// Names carrying neither keyword; reported, never persisted.
    pub unclassified: BTreeSet<String>,
}

impl SplitPartition {
    pub fn total(&self) -> usize {
        self.train.len() + self.test.len() + self.unclassified.len()
    }
}

/// Partition image names by keyword. Original casing is kept; duplicates collapse.
pub fn partition_names<I, S>(names: I, keywords: &SplitKeywords, tie_break: TieBreak) -> SplitPartition
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut partition = SplitPartition::default();
    for name in names {
        let name = name.into();
        match classify_name(&name, keywords, tie_break) {
            SplitSide::Train => partition.train.insert(name),
            SplitSide::Test => partition.test.insert(name),
            SplitSide::Unclassified => partition.unclassified.insert(name),
        };
    }
    partition
}
