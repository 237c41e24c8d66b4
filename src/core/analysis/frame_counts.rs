use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{DatasetLayout, FrameCountConfig};
use crate::core::operations::write_atomic;
use crate::error::{CurateError, CurateResult};

/// Number of posed frames of one transforms file of one scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCount {
    /// Scene folder name, e.g. `090625-TUCCookie`.
    pub scene: String,
    /// Transforms file stem, e.g. `transforms_clutter`.
    pub kind: String,
    pub frames: usize,
}

#[derive(Deserialize)]
struct TransformsFile {
    #[serde(default)]
    frames: Vec<serde_json::Value>,
}

/// Frames listed in a transforms file. Unreadable or malformed files count as 0.
pub fn load_frame_count(path: &Path) -> usize {
    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str::<TransformsFile>(&text).map_err(|e| e.to_string()));
    match parsed {
        Ok(file) => file.frames.len(),
        Err(e) => {
            warn!("Counting 0 frames for {:?}: {}", path, e);
            0
        }
    }
}

/// Collect frame counts of every merged pool folder under `base`.
pub fn collect_frame_counts(
    base: &Path,
    layout: &DatasetLayout,
    config: &FrameCountConfig,
) -> CurateResult<Vec<FrameCount>> {
    if !base.is_dir() {
        return Err(CurateError::missing(base));
    }

    let mut records = Vec::new();
    for entry in WalkDir::new(base).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {:?}: {}", base, e);
                continue;
            }
        };
        let is_merged = entry.file_type().is_dir()
            && entry
                .file_name()
                .to_string_lossy()
                .ends_with(layout.merged_suffix.as_str());
        if !is_merged {
            continue;
        }

        let scene = entry
            .path()
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        for file_name in &config.transform_files {
            let path = entry.path().join(file_name);
            if !path.is_file() {
                continue;
            }
            let kind = Path::new(file_name)
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| file_name.clone());
            let frames = load_frame_count(&path);
            debug!("{} {} -> {} frames", scene, kind, frames);
            records.push(FrameCount {
                scene: scene.clone(),
                kind,
                frames,
            });
        }
    }

    if records.is_empty() {
        return Err(CurateError::NoFrameData {
            base: base.to_path_buf(),
        });
    }
    Ok(records)
}

/// Order by kind ascending, then frames descending.
pub fn sort_records(records: &mut [FrameCount]) {
    records.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then(b.frames.cmp(&a.frames))
            .then(a.scene.cmp(&b.scene))
    });
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn to_csv(records: &[FrameCount]) -> String {
    let mut content = String::from("scene,kind,frames\n");
    for r in records {
        content.push_str(&format!("{},{},{}\n", csv_field(&r.scene), csv_field(&r.kind), r.frames));
    }
    content
}

/// Collect, log a per-kind ranking and write the CSV to `output`
/// (default `<base>/<frame_counts.output_file>`).
pub fn aggregate_frame_counts(
    base: &Path,
    output: Option<&Path>,
    layout: &DatasetLayout,
    config: &FrameCountConfig,
) -> CurateResult<(PathBuf, Vec<FrameCount>)> {
    let mut records = collect_frame_counts(base, layout, config)?;
    sort_records(&mut records);

    for file_name in &config.transform_files {
        let kind = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let of_kind: Vec<_> = records.iter().filter(|r| r.kind == kind).collect();
        if of_kind.is_empty() {
            warn!("No {} found", kind);
            continue;
        }
        info!("Frames per scene ({}):", kind);
        for r in of_kind {
            info!("  {:>6}  {}", r.frames, r.scene);
        }
    }

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| base.join(&config.output_file));
    write_atomic(&output, to_csv(&records).as_bytes())?;
    info!("Saved CSV: {:?}", output);
    Ok((output, records))
}
