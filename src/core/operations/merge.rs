//! Unifies the labeled capture pools of a scene into the merged pool.
//!
//! Every source image lands in the destination as `<prefix><basename>`. A name
//! that is already taken gets a `_dupN` disambiguator, so nothing is ever
//! overwritten. Pools are processed strictly in the order given, which keeps
//! the duplicate numbering reproducible across reruns.

use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};

use crate::config::{AppConfig, DatasetLayout, MergeConfig};
use crate::core::dataset::walk_images;
use crate::error::{CurateError, CurateResult};

use super::file_ops::{ensure_unique, link_file, LinkMode};

/// A labeled source folder taking part in a merge.
#[derive(Debug, Clone)]
pub struct SourcePool {
    /// Human label used in reports, e.g. "Clean".
    pub label: String,
    /// Prefix prepended to every basename from this pool.
    pub prefix: String,
    pub root: PathBuf,
}

impl SourcePool {
    pub fn new(label: impl Into<String>, prefix: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            prefix: prefix.into(),
            root: root.into(),
        }
    }
}

/// A single planned source to destination mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAction {
    pub src: PathBuf,
    pub dst: PathBuf,
    /// The prefixed name was taken and a `_dupN` name was chosen instead.
    pub renamed: bool,
}

/// Per-pool outcome counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolSummary {
    pub label: String,
    pub created: usize,
    pub renamed: usize,
    pub skipped: usize,
}

/// Outcome of a whole merge run.
#[derive(Debug, Default)]
pub struct MergeSummary {
    pub pools: Vec<PoolSummary>,
    /// Files that could not be materialized; the merge carried on past them.
    pub failures: Vec<CurateError>,
}

impl MergeSummary {
    pub fn created(&self) -> usize {
        self.pools.iter().map(|p| p.created).sum()
    }

    pub fn renamed(&self) -> usize {
        self.pools.iter().map(|p| p.renamed).sum()
    }

    pub fn skipped(&self) -> usize {
        self.pools.iter().map(|p| p.skipped).sum()
    }
}

/// Destination name for `src` from a pool with `prefix`, before collision handling.
pub fn prefixed_destination(src: &Path, prefix: &str, dest_dir: &Path) -> Option<PathBuf> {
    let name = src.file_name()?.to_string_lossy();
    Some(dest_dir.join(format!("{}{}", prefix, name)))
}

/// Plan one source file against the current destination state.
///
/// Must be called right before the file is materialized: the `_dupN` choice
/// depends on what the destination already holds.
pub fn plan_link(src: &Path, prefix: &str, dest_dir: &Path) -> Option<LinkAction> {
    let wanted = prefixed_destination(src, prefix, dest_dir)?;
    if wanted.exists() {
        Some(LinkAction {
            src: src.to_path_buf(),
            dst: ensure_unique(&wanted),
            renamed: true,
        })
    } else {
        Some(LinkAction {
            src: src.to_path_buf(),
            dst: wanted,
            renamed: false,
        })
    }
}

/// Merge `pools`, in order, into `dest_dir`.
///
/// Per-file failures are logged, counted as skipped and collected; they never
/// abort the run. A renamed file that then fails to link counts as both.
///
/// # Arguments
/// * `pools` - Source pools, processed in the order given
/// * `dest_dir` - Merged image folder, created if missing
/// * `extensions` - Image extensions to pick up from the pools
/// * `mode` - Hard link or copy
///
/// # Returns
/// Per-pool counts plus the collected per-file failures
pub fn merge_pools(
    pools: &[SourcePool],
    dest_dir: &Path,
    extensions: &[String],
    mode: LinkMode,
) -> CurateResult<MergeSummary> {
    std::fs::create_dir_all(dest_dir)?;
    let mut summary = MergeSummary::default();

    for pool in pools {
        let _span = info_span!("pool", label = %pool.label).entered();
        let mut stats = PoolSummary {
            label: pool.label.clone(),
            ..Default::default()
        };

        for src in walk_images(&pool.root, extensions) {
            // Pick the destination against what the folder holds right now
            let Some(action) = plan_link(&src, &pool.prefix, dest_dir) else {
                warn!("[SKIP {}] {:?} has no file name", pool.label, src);
                stats.skipped += 1;
                continue;
            };
            if action.renamed {
                stats.renamed += 1;
            }

            // Link (or copy) the file into the merged pool
            match link_file(&action.src, &action.dst, mode) {
                Ok(()) => stats.created += 1,
                Err(e) => {
                    warn!("[SKIP {}] {}", pool.label, e);
                    stats.skipped += 1;
                    summary.failures.push(e);
                }
            }
        }

        info!(
            "[{}] created: {}, renamed(_dupN): {}, skipped: {}",
            stats.label, stats.created, stats.renamed, stats.skipped
        );
        summary.pools.push(stats);
    }

    Ok(summary)
}

/// Resolve the Clean, Clutter and merged image folders of `base` and merge
/// Clean before Clutter.
///
/// Both source folders must exist.
pub fn merge_scene(base: &Path, config: &AppConfig) -> CurateResult<(PathBuf, MergeSummary)> {
    let base = base.canonicalize().map_err(|_| CurateError::missing(base))?;
    let (pools, dest_dir) = scene_pools(&base, &config.dataset, &config.merge)?;

    info!(
        "Linking {} into {:?}",
        pools
            .iter()
            .map(|p| format!("{}={:?}", p.label, p.root))
            .collect::<Vec<_>>()
            .join(", "),
        dest_dir
    );
    let summary = merge_pools(
        &pools,
        &dest_dir,
        &config.dataset.image_extensions,
        config.merge.link_mode,
    )?;
    info!("Done. Output folder: {:?}", dest_dir);
    Ok((dest_dir, summary))
}

fn scene_pools(
    base: &Path,
    layout: &DatasetLayout,
    merge: &MergeConfig,
) -> CurateResult<(Vec<SourcePool>, PathBuf)> {
    let scene_name = base
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| CurateError::missing(base))?;

    let clean = base
        .join(layout.role_folder(&scene_name, &layout.clean_suffix))
        .join(&layout.images_dir);
    let clutter = base
        .join(layout.role_folder(&scene_name, &layout.clutter_suffix))
        .join(&layout.images_dir);
    let dest = base
        .join(layout.merged_folder(&scene_name))
        .join(&layout.images_dir);

    for required in [&clean, &clutter] {
        if !required.is_dir() {
            return Err(CurateError::missing(required.as_path()));
        }
    }

    let pools = vec![
        SourcePool::new("Clean", merge.clean_prefix.clone(), clean),
        SourcePool::new("Clutter", merge.clutter_prefix.clone(), clutter),
    ];
    Ok((pools, dest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn exts() -> Vec<String> {
        vec!["jpg".to_string(), "png".to_string()]
    }

    fn touch(path: &Path, contents: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn names_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_prefixes_keep_roles_apart() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("clean/a.jpg"), b"clean");
        touch(&tmp.path().join("clutter/a.jpg"), b"clutter");
        let dest = tmp.path().join("all");

        let pools = [
            SourcePool::new("Clean", "extra_", tmp.path().join("clean")),
            SourcePool::new("Clutter", "clutter_", tmp.path().join("clutter")),
        ];
        let summary = merge_pools(&pools, &dest, &exts(), LinkMode::HardLink).unwrap();

        assert_eq!(names_in(&dest), vec!["clutter_a.jpg", "extra_a.jpg"]);
        assert_eq!(summary.created(), 2);
        assert_eq!(summary.renamed(), 0);
        assert_eq!(summary.skipped(), 0);
        assert_eq!(fs::read(dest.join("extra_a.jpg")).unwrap(), b"clean");
    }

    #[test]
    fn test_rerun_adds_dup_instead_of_overwriting() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("clean/a.jpg"), b"first");
        let dest = tmp.path().join("all");
        let pools = [SourcePool::new("Clean", "extra_", tmp.path().join("clean"))];

        merge_pools(&pools, &dest, &exts(), LinkMode::Copy).unwrap();
        let summary = merge_pools(&pools, &dest, &exts(), LinkMode::Copy).unwrap();

        assert_eq!(names_in(&dest), vec!["extra_a.jpg", "extra_a_dup1.jpg"]);
        assert_eq!(summary.pools[0].renamed, 1);
        assert_eq!(summary.pools[0].created, 1);
    }

    #[test]
    fn test_same_basename_within_pool_is_disambiguated() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("clean/a/x.jpg"), b"1");
        touch(&tmp.path().join("clean/b/x.jpg"), b"2");
        touch(&tmp.path().join("clean/b/readme.txt"), b"-");
        let dest = tmp.path().join("all");

        let pools = [SourcePool::new("Clean", "extra_", tmp.path().join("clean"))];
        let summary = merge_pools(&pools, &dest, &exts(), LinkMode::HardLink).unwrap();

        assert_eq!(names_in(&dest), vec!["extra_x.jpg", "extra_x_dup1.jpg"]);
        // a/ is walked before b/
        assert_eq!(fs::read(dest.join("extra_x.jpg")).unwrap(), b"1");
        assert_eq!(fs::read(dest.join("extra_x_dup1.jpg")).unwrap(), b"2");
        assert_eq!(summary.created(), 2);
        assert_eq!(summary.renamed(), 1);
    }

    #[test]
    fn test_destination_count_matches_sources() {
        let tmp = tempfile::tempdir().unwrap();
        for i in 0..5 {
            touch(&tmp.path().join(format!("clean/{i}.png")), b"c");
            touch(&tmp.path().join(format!("clutter/{i}.png")), b"k");
        }
        let dest = tmp.path().join("all");
        let pools = [
            SourcePool::new("Clean", "extra_", tmp.path().join("clean")),
            SourcePool::new("Clutter", "clutter_", tmp.path().join("clutter")),
        ];
        merge_pools(&pools, &dest, &exts(), LinkMode::HardLink).unwrap();
        merge_pools(&pools, &dest, &exts(), LinkMode::HardLink).unwrap();

        let names = names_in(&dest);
        assert_eq!(names.len(), 20);
        assert_eq!(names.iter().filter(|n| n.contains("_dup1")).count(), 10);
    }

    #[test]
    fn test_failed_file_is_skipped_and_merge_continues() {
        let tmp = tempfile::tempdir().unwrap();
        // Fits as a source name, but the prefixed name exceeds the filesystem limit
        let long_name = format!("{}.jpg", "a".repeat(248));
        touch(&tmp.path().join("clutter").join(&long_name), b"long");
        touch(&tmp.path().join("clutter/z.jpg"), b"z");
        let dest = tmp.path().join("all");

        let pools = [SourcePool::new("Clutter", "clutter_", tmp.path().join("clutter"))];
        let summary = merge_pools(&pools, &dest, &exts(), LinkMode::HardLink).unwrap();

        assert_eq!(summary.created(), 1);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.failures.len(), 1);
        assert!(matches!(summary.failures[0], CurateError::LinkFailure { .. }));
        assert_eq!(names_in(&dest), vec!["clutter_z.jpg"]);
    }

    #[test]
    fn test_merge_scene_requires_both_sources() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("230825-Mascot");
        touch(&base.join("230825-Mascot-Clean/images/a.jpg"), b"c");

        let err = merge_scene(&base, &AppConfig::default()).unwrap_err();
        match err {
            CurateError::MissingRequiredSubpath { path } => {
                assert!(path.ends_with("230825-Mascot-Clutter/images"))
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!base.join("230825-Mascot-All").exists());
    }

    #[test]
    fn test_merge_scene_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("230825-Mascot");
        touch(&base.join("230825-Mascot-Clean/images/a.jpg"), b"c");
        touch(&base.join("230825-Mascot-Clutter/images/a.jpg"), b"k");

        let (dest, summary) = merge_scene(&base, &AppConfig::default()).unwrap();
        assert!(dest.ends_with("230825-Mascot-All/images"));
        assert_eq!(names_in(&dest), vec!["clutter_a.jpg", "extra_a.jpg"]);
        assert_eq!(summary.pools[0].label, "Clean");
        assert_eq!(summary.pools[1].label, "Clutter");
    }
}
