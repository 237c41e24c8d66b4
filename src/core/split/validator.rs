use std::collections::BTreeSet;
use tracing::{info, warn};

use super::document::SplitAssignment;
use super::partition::SplitKeywords;

/// How many offending names are listed per side.
pub const MAX_EXAMPLES: usize = 10;

/// Violations found on one side of a split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideReport {
    pub total: usize,
    /// Entries missing the side's keyword, in document order.
    pub violations: Vec<String>,
}

impl SideReport {
    pub fn examples(&self) -> &[String] {
        &self.violations[..self.violations.len().min(MAX_EXAMPLES)]
    }
}

/// Read-only audit of a persisted split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitReport {
    pub train: SideReport,
    pub test: SideReport,
    /// Names listed on both sides.
    pub overlap: Vec<String>,
}

impl SplitReport {
    pub fn is_clean(&self) -> bool {
        self.train.violations.is_empty() && self.test.violations.is_empty() && self.overlap.is_empty()
    }
}

/// Check every entry against the keyword of its side. Never mutates the input.
pub fn validate_split(split: &SplitAssignment, keywords: &SplitKeywords) -> SplitReport {
    let check = |names: &[String], matches: &dyn Fn(&str) -> bool| SideReport {
        total: names.len(),
        violations: names.iter().filter(|n| !matches(n.as_str())).cloned().collect(),
    };

    let train_set: BTreeSet<&String> = split.train.iter().collect();
    let overlap = split
        .test
        .iter()
        .filter(|n| train_set.contains(n))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    SplitReport {
        train: check(&split.train, &|n: &str| keywords.is_train(n)),
        test: check(&split.test, &|n: &str| keywords.is_test(n)),
        overlap,
    }
}

/// Log the report: counts, up to [`MAX_EXAMPLES`] offenders per side, then a
/// pass line or a warning summary.
pub fn log_report(report: &SplitReport, keywords: &SplitKeywords) {
    info!(
        "Train images: {}, Test images: {}",
        report.train.total, report.test.total
    );

    let sides = [
        ("train", &keywords.train, &report.train),
        ("test", &keywords.test, &report.test),
    ];
    for (side, keyword, side_report) in sides {
        if side_report.violations.is_empty() {
            continue;
        }
        warn!(
            "{} {} entries missing '{}':",
            side_report.violations.len(),
            side,
            keyword
        );
        for name in side_report.examples() {
            warn!("  - {}", name);
        }
        if side_report.violations.len() > MAX_EXAMPLES {
            warn!("  ... (+{} more)", side_report.violations.len() - MAX_EXAMPLES);
        }
    }

    if !report.overlap.is_empty() {
        warn!("{} entries listed in both train and test", report.overlap.len());
        for name in report.overlap.iter().take(MAX_EXAMPLES) {
            warn!("  - {}", name);
        }
    }

    if report.is_clean() {
        info!("All train/test entries follow the expected keyword pattern.");
    } else {
        warn!(
            "Split check found {} train and {} test violations",
            report.train.violations.len(),
            report.test.violations.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(train: &[&str], test: &[&str]) -> SplitAssignment {
        SplitAssignment {
            train: train.iter().map(|s| s.to_string()).collect(),
            test: test.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_clean_split_passes() {
        let s = split(&["clutter_1.jpg", "CLUTTER_2.jpg"], &["extra_1.jpg"]);
        let report = validate_split(&s, &SplitKeywords::default());
        assert!(report.is_clean());
        assert_eq!(report.train.total, 2);
        assert_eq!(report.test.total, 1);
    }

    #[test]
    fn test_hand_edited_split_is_flagged() {
        let s = split(
            &["clutter_1.jpg", "extra_9.jpg"],
            &["extra_1.jpg", "clutter_1.jpg", "frame.jpg"],
        );
        let before = s.clone();
        let report = validate_split(&s, &SplitKeywords::default());

        assert_eq!(report.train.violations, vec!["extra_9.jpg"]);
        assert_eq!(report.test.violations, vec!["clutter_1.jpg", "frame.jpg"]);
        assert_eq!(report.overlap, vec!["clutter_1.jpg"]);
        assert!(!report.is_clean());
        assert_eq!(s, before);
    }

    #[test]
    fn test_examples_capped() {
        let names: Vec<String> = (0..25).map(|i| format!("frame_{i:02}.jpg")).collect();
        let s = SplitAssignment {
            train: names,
            test: Vec::new(),
        };
        let report = validate_split(&s, &SplitKeywords::default());
        assert_eq!(report.train.violations.len(), 25);
        assert_eq!(report.train.examples().len(), MAX_EXAMPLES);
        assert_eq!(report.train.examples()[0], "frame_00.jpg");
    }
}
