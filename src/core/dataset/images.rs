use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Whether `path` carries one of the recognized image extensions (case-insensitive).
pub fn is_image(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    extensions.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed))
}

/// List image files directly inside `dir`, sorted by path.
///
/// Subdirectories are not descended into.
pub fn list_images(dir: &Path, extensions: &[String]) -> std::io::Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image(&path, extensions) {
            image_files.push(path);
        }
    }

    // Sort files for consistent ordering
    image_files.sort();
    info!("Found {} images in {:?}", image_files.len(), dir);
    Ok(image_files)
}

/// Recursively collect image files under `root`, following symlinks.
///
/// Traversal order is deterministic: entries of each directory are visited
/// sorted by file name. Unreadable entries are logged and skipped.
pub fn walk_images(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut image_files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && is_image(entry.path(), extensions) {
                    image_files.push(entry.into_path());
                }
            }
            Err(e) => warn!("Skipping unreadable entry under {:?}: {}", root, e),
        }
    }
    debug!("Walked {} images under {:?}", image_files.len(), root);
    image_files
}

/// Immediate subdirectories of `dir`, sorted by path.
pub fn list_subdirs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// `path` relative to `root`, always `/`-separated.
pub fn relative_display(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
