mod colmap;

pub use colmap::{read_images_bin, read_images_txt, ColmapModel};

use crate::error::CurateResult;

/// Anything that can list the image names a 3-D reconstruction registered.
///
/// The split step treats the result as an opaque list of strings.
pub trait ImageNameSource {
    fn image_names(&self) -> CurateResult<Vec<String>>;
}

impl ImageNameSource for Vec<String> {
    fn image_names(&self) -> CurateResult<Vec<String>> {
        Ok(self.clone())
    }
}
