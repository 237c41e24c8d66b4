//! Scene manifest assembly.
//!
//! Scans the capture folders of one scene, enforces a single resolution across
//! them and produces the [`SceneManifest`] document. Nothing is written unless
//! the whole scene was scanned successfully.

use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};

use crate::config::{AppConfig, DatasetLayout, ManifestConfig};
use crate::core::dataset::{
    list_images, list_subdirs, relative_display, representative_resolution, ResolutionGuard,
    SceneId,
};
use crate::core::operations::write_atomic;
use crate::error::{CurateError, CurateResult};

use super::model::{RoleEntry, Role, SceneManifest, MANIFEST_VERSION};

/// What happened to one immediate subfolder of the scene root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Contributed images to the manifest under this role.
    Included { role: Role, count: usize },
    /// The merged pool folder, never scanned.
    MergedPool,
    /// Recognized role folder without an `images` child.
    MissingImagesDir,
    /// Name ends with neither role suffix.
    Unrecognized,
    /// A second folder for a role that was already filled.
    DuplicateRole(Role),
}

/// A built manifest plus the per-subfolder outcomes that led to it.
#[derive(Debug, Clone)]
pub struct ManifestBuild {
    pub manifest: SceneManifest,
    pub outcomes: Vec<(String, ScanOutcome)>,
}

fn classify(folder_name: &str, layout: &DatasetLayout) -> Option<Role> {
    let lower = folder_name.to_lowercase();
    if lower.ends_with(&layout.clean_suffix.to_lowercase()) {
        Some(Role::Clean)
    } else if lower.ends_with(&layout.clutter_suffix.to_lowercase()) {
        Some(Role::Clutter)
    } else {
        None
    }
}

fn scene_folder_name(scene_root: &Path) -> CurateResult<String> {
    let named = match scene_root.file_name() {
        Some(name) => PathBuf::from(name),
        None => scene_root.canonicalize()?,
    };
    named
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .ok_or_else(|| CurateError::MalformedSceneId {
            folder: scene_root.display().to_string(),
            reason: "scene root has no usable folder name".to_string(),
        })
}

/// Build the manifest of the scene rooted at `scene_root`.
///
/// # Arguments
/// * `scene_root` - Scene folder named `ddmmyy-Name`
/// * `layout` - Role suffixes, images folder name and image extensions
/// * `config` - Theme and distractor lists attached to the role entries
///
/// # Returns
/// The manifest plus what happened to every immediate subfolder
///
/// Fails with `MalformedSceneId` on a bad folder name, `ResolutionMismatch` when
/// two sub-collections disagree, and `NoImagesFound` when no resolution could be
/// determined at all.
pub fn build_scene_manifest(
    scene_root: &Path,
    layout: &DatasetLayout,
    config: &ManifestConfig,
) -> CurateResult<ManifestBuild> {
    if !scene_root.is_dir() {
        return Err(CurateError::missing(scene_root));
    }

    let folder_name = scene_folder_name(scene_root)?;
    let _span = info_span!("scene", id = %folder_name).entered();
    let scene_id = SceneId::parse(&folder_name)?;
    let merged_name = layout.merged_folder(&folder_name);

    let mut clean: Option<RoleEntry> = None;
    let mut clutter: Option<RoleEntry> = None;
    let mut guard = ResolutionGuard::new();
    let mut outcomes = Vec::new();

    for sub in list_subdirs(scene_root)? {
        let sub_name = sub
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if sub_name == merged_name {
            debug!("Skipping merged pool {:?}", sub);
            outcomes.push((sub_name, ScanOutcome::MergedPool));
            continue;
        }

        let Some(role) = classify(&sub_name, layout) else {
            debug!("Ignoring unrecognized folder {:?}", sub);
            outcomes.push((sub_name, ScanOutcome::Unrecognized));
            continue;
        };

        let images_dir = sub.join(&layout.images_dir);
        if !images_dir.is_dir() {
            info!("No {} folder in {:?}, skipping", layout.images_dir, sub);
            outcomes.push((sub_name, ScanOutcome::MissingImagesDir));
            continue;
        }

        // Every classified folder is held to the scene resolution, kept or not
        let abs_images = list_images(&images_dir, &layout.image_extensions)?;
        if let Some(resolution) = representative_resolution(&abs_images)? {
            guard.observe(&sub_name, resolution)?;
        }

        let slot = match role {
            Role::Clean => &mut clean,
            Role::Clutter => &mut clutter,
        };
        if slot.is_some() {
            warn!("Second {} folder {:?} ignored", role.as_str(), sub);
            outcomes.push((sub_name, ScanOutcome::DuplicateRole(role)));
            continue;
        }

        // Record image paths relative to the scene root
        let images: Vec<String> = abs_images
            .iter()
            .map(|p| relative_display(p, scene_root))
            .collect();
        let mut entry = RoleEntry::new(relative_display(&images_dir, scene_root), images);
        match role {
            Role::Clean => entry.theme = Some(config.clean_theme.clone()),
            Role::Clutter => entry.distractors = Some(config.clutter_distractors.clone()),
        }

        info!("{} folder {:?}: {} images", role.as_str(), sub_name, entry.count);
        outcomes.push((
            sub_name,
            ScanOutcome::Included {
                role,
                count: entry.count,
            },
        ));
        *slot = Some(entry);
    }

    // No image anywhere means no resolution to report
    let resolution = guard.canonical().ok_or_else(|| CurateError::NoImagesFound {
        scene: folder_name.clone(),
    })?;

    let total_images = clean.as_ref().map_or(0, |e| e.count) + clutter.as_ref().map_or(0, |e| e.count);
    let metadata = &config.metadata;

    let manifest = SceneManifest {
        version: MANIFEST_VERSION,
        meta_generated_at: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        scene_id: folder_name,
        scene_name: scene_id.name.clone(),
        scene_date_raw: scene_id.raw_date.clone(),
        scene_date_iso: scene_id.iso_date(),
        mode: metadata.mode,
        orientation: metadata.orientation,
        device: metadata.device.clone(),
        resolution,
        region: metadata.region.clone(),
        time_of_day: metadata.time_of_day,
        environment: metadata.environment,
        environment_fine: metadata.environment_fine.clone(),
        root_folder: scene_root.display().to_string(),
        total_images,
        clean,
        clutter,
    };

    Ok(ManifestBuild { manifest, outcomes })
}

/// Serialize the manifest with 2-space indentation and write it atomically.
pub fn write_manifest(manifest: &SceneManifest, output: &Path) -> CurateResult<()> {
    let mut json =
        serde_json::to_string_pretty(manifest).map_err(|e| CurateError::persist(output, e))?;
    json.push('\n');
    write_atomic(output, json.as_bytes())?;
    info!("Wrote manifest to {:?}", output);
    Ok(())
}

/// Build the manifest of one scene and write it.
///
/// The output defaults to `<scene_root>/<manifest.output_file>`.
pub fn generate_manifest(
    scene_root: &Path,
    output: Option<&Path>,
    config: &AppConfig,
) -> CurateResult<ManifestBuild> {
    let build = build_scene_manifest(scene_root, &config.dataset, &config.manifest)?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| scene_root.join(&config.manifest.output_file));
    write_manifest(&build.manifest, &output)?;
    Ok(build)
}
