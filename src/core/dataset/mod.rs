mod images;
mod resolution;
mod scene_id;

pub use images::{is_image, list_images, list_subdirs, relative_display, walk_images};
pub use resolution::{read_dimensions, representative_resolution, Resolution, ResolutionGuard};
pub use scene_id::SceneId;
