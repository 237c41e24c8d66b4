//! Train/test split of a merged pool, keyed by filename keywords.

mod document;
mod partition;
mod validator;

pub use document::SplitAssignment;
pub use partition::{classify_name, partition_names, SplitKeywords, SplitPartition, SplitSide, TieBreak};
pub use validator::{log_report, validate_split, SideReport, SplitReport, MAX_EXAMPLES};

use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};

use crate::config::SplitConfig;
use crate::core::reconstruction::{ColmapModel, ImageNameSource};
use crate::error::CurateResult;

/// Partition the names provided by `source` and persist the split at `output`.
///
/// Nothing is written if the source fails.
pub fn build_split(
    source: &dyn ImageNameSource,
    config: &SplitConfig,
    output: &Path,
) -> CurateResult<SplitPartition> {
    let names = source.image_names()?;
    let partition = partition_names(names, &config.keywords, config.tie_break);

    if !partition.unclassified.is_empty() {
        warn!(
            "{} images match neither '{}' nor '{}' and are left out",
            partition.unclassified.len(),
            config.keywords.train,
            config.keywords.test
        );
    }

    SplitAssignment::from(&partition).save(output)?;
    Ok(partition)
}

/// Build `<scene>/split.json` from the scene's reconstruction model.
pub fn build_scene_split(scene_dir: &Path, config: &SplitConfig) -> CurateResult<(PathBuf, SplitPartition)> {
    let _span = info_span!("split", scene = %scene_dir.display()).entered();
    let model = ColmapModel::new(scene_dir.join(&config.model_subdir));
    info!("Source model: {:?}", model.dir());

    let output = scene_dir.join(&config.output_file);
    let partition = build_split(&model, config, &output)?;
    Ok((output, partition))
}

/// Load `<scene>/split.json`, audit it and log the findings.
pub fn check_scene_split(scene_dir: &Path, config: &SplitConfig) -> CurateResult<SplitReport> {
    let path = scene_dir.join(&config.output_file);
    info!("Checking split: {:?}", path);
    let split = SplitAssignment::load(&path)?;
    let report = validate_split(&split, &config.keywords);
    log_report(&report, &config.keywords);
    Ok(report)
}
