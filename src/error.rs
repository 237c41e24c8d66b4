use std::path::PathBuf;
use thiserror::Error;

use crate::core::dataset::Resolution;

pub type CurateResult<T> = Result<T, CurateError>;

/// Errors raised while curating a scene.
///
/// Structural errors (`MalformedSceneId`, `ResolutionMismatch`, `NoImagesFound`,
/// `MissingRequiredSubpath`) abort the current scene. `LinkFailure` is only ever
/// collected per file by the merge step and never aborts it.
#[derive(Debug, Error)]
pub enum CurateError {
    #[error("scene folder '{folder}' is not in expected format 'ddmmyy-SceneName': {reason}")]
    MalformedSceneId { folder: String, reason: String },

    #[error("resolution mismatch: expected {expected}, got {found} in '{sub_collection}'")]
    ResolutionMismatch {
        expected: Resolution,
        found: Resolution,
        sub_collection: String,
    },

    #[error("no images found under scene '{scene}'")]
    NoImagesFound { scene: String },

    #[error("required path not found: {}", .path.display())]
    MissingRequiredSubpath { path: PathBuf },

    #[error("failed to link {} -> {}: {source}", .src.display(), .dst.display())]
    LinkFailure {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {reason}", .path.display())]
    PersistFailure { path: PathBuf, reason: String },

    #[error("failed to read image dimensions of {}: {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to load config {}: {reason}", .path.display())]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("failed to read reconstruction model {}: {reason}", .path.display())]
    ModelRead { path: PathBuf, reason: String },

    #[error("no transforms*.json found under {}", .base.display())]
    NoFrameData { base: PathBuf },

    #[error("malformed split document {}: {source}", .path.display())]
    MalformedSplit {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CurateError {
    pub fn persist(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CurateError::PersistFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn missing(path: impl Into<PathBuf>) -> Self {
        CurateError::MissingRequiredSubpath { path: path.into() }
    }
}
