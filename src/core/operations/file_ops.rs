use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::error::{CurateError, CurateResult};

/// How a merged pool entry is materialized from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    /// Hard link; fails across devices.
    #[default]
    HardLink,
    /// Full copy of the file contents.
    Copy,
}

impl LinkMode {
    pub fn as_str(&self) -> &str {
        match self {
            LinkMode::HardLink => "hard_link",
            LinkMode::Copy => "copy",
        }
    }
}

/// Return `dst` if it is free, otherwise the first free `<stem>_dupN<ext>`
/// with N >= 1.
pub fn ensure_unique(dst: &Path) -> PathBuf {
    if !dst.exists() {
        return dst.to_path_buf();
    }

    let stem = dst
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = dst
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1usize;
    loop {
        let candidate = dst.with_file_name(format!("{}_dup{}{}", stem, n, ext));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Materialize `src` at `dst`, creating parent directories as needed.
///
/// Never overwrites: an existing `dst` is reported as a failure by the
/// underlying call.
pub fn link_file(src: &Path, dst: &Path, mode: LinkMode) -> CurateResult<()> {
    let link_err = |source| CurateError::LinkFailure {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        source,
    };

    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(link_err)?;
    }

    match mode {
        LinkMode::HardLink => fs::hard_link(src, dst).map_err(link_err)?,
        LinkMode::Copy => {
            // create_new refuses to clobber a file that appeared meanwhile
            let mut out = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(dst)
                .map_err(link_err)?;
            let mut input = fs::File::open(src).map_err(link_err)?;
            if let Err(e) = std::io::copy(&mut input, &mut out) {
                error!("Copy of {:?} failed midway, removing {:?}", src, dst);
                let _ = fs::remove_file(dst);
                return Err(link_err(e));
            }
        }
    }

    debug!("{} {:?} -> {:?}", mode.as_str(), src, dst);
    Ok(())
}

/// Write `contents` to `path` through a sibling temp file and a rename, so a
/// reader never observes a half-written document.
pub fn write_atomic(path: &Path, contents: &[u8]) -> CurateResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CurateError::persist(path, e))?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| CurateError::persist(path, "output path has no file name"))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    if let Err(e) = fs::write(&tmp_path, contents) {
        let _ = fs::remove_file(&tmp_path);
        return Err(CurateError::persist(path, e));
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(CurateError::persist(path, e));
    }
    Ok(())
}
