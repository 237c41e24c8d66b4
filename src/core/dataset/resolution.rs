use image::ImageReader;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::error::{CurateError, CurateResult};

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Read the pixel dimensions of one image without decoding it.
///
/// The file handle lives only for the duration of this call.
pub fn read_dimensions(path: &Path) -> CurateResult<Resolution> {
    let image_err = |source| CurateError::ImageRead {
        path: path.to_path_buf(),
        source,
    };
    let (width, height) = ImageReader::open(path)?
        .with_guessed_format()?
        .into_dimensions()
        .map_err(image_err)?;
    Ok(Resolution::new(width, height))
}

/// Resolution of a sub-collection, taken from its first image only.
///
/// Sub-collections are assumed to be homogeneous; later images are never
/// opened. Returns `None` for an empty sequence.
pub fn representative_resolution(images: &[impl AsRef<Path>]) -> CurateResult<Option<Resolution>> {
    let Some(first) = images.first() else {
        return Ok(None);
    };
    let resolution = read_dimensions(first.as_ref())?;
    debug!("Representative {:?} is {}", first.as_ref(), resolution);
    Ok(Some(resolution))
}

/// Enforces a single resolution across the sub-collections of one scene.
///
/// The first observed resolution becomes canonical.
#[derive(Debug, Default)]
pub struct ResolutionGuard {
    canonical: Option<Resolution>,
}

impl ResolutionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, sub_collection: &str, found: Resolution) -> CurateResult<()> {
        match self.canonical {
            None => {
                self.canonical = Some(found);
                Ok(())
            }
            Some(expected) if expected == found => Ok(()),
            Some(expected) => Err(CurateError::ResolutionMismatch {
                expected,
                found,
                sub_collection: sub_collection.to_string(),
            }),
        }
    }

    pub fn canonical(&self) -> Option<Resolution> {
        self.canonical
    }
}
