mod builder;
mod model;

pub use builder::{build_scene_manifest, generate_manifest, write_manifest, ManifestBuild, ScanOutcome};
pub use model::{
    AcquisitionMetadata, CaptureMode, Environment, Orientation, Role, RoleEntry, SceneManifest,
    TimeOfDay, MANIFEST_VERSION,
};
