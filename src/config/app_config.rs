use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::manifest::AcquisitionMetadata;
use crate::core::operations::LinkMode;
use crate::core::split::{SplitKeywords, TieBreak};
use crate::error::{CurateError, CurateResult};

/// Application configuration containing every value the pipeline used to
/// hardcode.
///
/// A single instance is passed explicitly into each component, so several
/// roots or scenes can be processed in one process without sharing state.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub dataset: DatasetLayout,
    pub manifest: ManifestConfig,
    pub merge: MergeConfig,
    pub split: SplitConfig,
    pub frame_counts: FrameCountConfig,
}

/// Folder naming conventions of a scene directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetLayout {
    /// Suffix of the uncluttered capture folder, matched case-insensitively.
    pub clean_suffix: String,
    /// Suffix of the distractor capture folder, matched case-insensitively.
    pub clutter_suffix: String,
    /// Suffix of the merged pool folder.
    pub merged_suffix: String,
    /// Name of the image child folder inside each capture folder.
    pub images_dir: String,
    /// Recognized image extensions, lower case without the dot.
    pub image_extensions: Vec<String>,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            clean_suffix: "-Clean".to_string(),
            clutter_suffix: "-Clutter".to_string(),
            merged_suffix: "-All".to_string(),
            images_dir: "images".to_string(),
            image_extensions: ["jpg", "jpeg", "png", "tif", "tiff", "bmp", "webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl DatasetLayout {
    /// Folder name of a capture role for the given scene, e.g. `040625-Bin-Clean`.
    pub fn role_folder(&self, scene_name: &str, suffix: &str) -> String {
        format!("{}{}", scene_name, suffix)
    }

    pub fn merged_folder(&self, scene_name: &str) -> String {
        self.role_folder(scene_name, &self.merged_suffix)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Output file name, relative to the scene root unless overridden.
    pub output_file: String,
    pub metadata: AcquisitionMetadata,
    /// Theme tags attached to the clean entry.
    pub clean_theme: Vec<String>,
    /// Distractor tags attached to the clutter entry.
    pub clutter_distractors: Vec<String>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            output_file: "meta.json".to_string(),
            metadata: AcquisitionMetadata::default(),
            clean_theme: vec!["oil".to_string()],
            clutter_distractors: vec!["key".to_string(), "hand".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub clean_prefix: String,
    pub clutter_prefix: String,
    pub link_mode: LinkMode,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            clean_prefix: "extra_".to_string(),
            clutter_prefix: "clutter_".to_string(),
            link_mode: LinkMode::HardLink,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub keywords: SplitKeywords,
    pub tie_break: TieBreak,
    /// Reconstruction model directory, relative to the scene root.
    pub model_subdir: PathBuf,
    pub output_file: String,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            keywords: SplitKeywords::default(),
            tie_break: TieBreak::TrainFirst,
            model_subdir: PathBuf::from("undistortion_sparse").join("0"),
            output_file: "split.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameCountConfig {
    pub transform_files: Vec<String>,
    pub output_file: String,
}

impl Default for FrameCountConfig {
    fn default() -> Self {
        Self {
            transform_files: ["transforms.json", "transforms_clutter.json", "transforms_extra.json"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            output_file: "frame_counts_by_scene.csv".to_string(),
        }
    }
}

impl AppConfig {
    /// Platform config location, e.g. `~/.config/scene-curator/config.json`.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "scene-curator")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load the configuration.
    ///
    /// An explicit path must exist and parse. Without one, the platform config
    /// file is used when present; a missing or corrupt file there falls back to
    /// defaults.
    pub fn load(explicit: Option<&Path>) -> CurateResult<Self> {
        if let Some(path) = explicit {
            info!("Loading config from: {:?}", path);
            return Self::read_from(path);
        }

        let Some(config_path) = Self::default_config_path() else {
            warn!("Could not determine config directory. Using defaults.");
            return Ok(Self::default());
        };

        if !config_path.exists() {
            info!("No config file at {:?}. Using defaults.", config_path);
            return Ok(Self::default());
        }

        match Self::read_from(&config_path) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!("{}. Using defaults.", e);
                Ok(Self::default())
            }
        }
    }

    fn read_from(path: &Path) -> CurateResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| CurateError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|e| CurateError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
