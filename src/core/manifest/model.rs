use serde::{Deserialize, Serialize};

use crate::core::dataset::Resolution;

pub const MANIFEST_VERSION: &str = "simple-1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    FaceForward,
    #[serde(rename = "360_degree")]
    Degree360,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Landscape,
    Portrait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Daytime,
    Nighttime,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Indoor,
    Outdoor,
}

/// Fixed acquisition metadata recorded for a scene.
///
/// These fields are not inferred from the images; they come from config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionMetadata {
    pub mode: CaptureMode,
    pub orientation: Orientation,
    /// e.g. "iPhone 15", "Galaxy A15", "iPad Air (5th generation)"
    pub device: String,
    pub region: String,
    pub time_of_day: TimeOfDay,
    pub environment: Environment,
    /// e.g. "bedroom", "cafe", "street", "studio"
    pub environment_fine: String,
}

impl Default for AcquisitionMetadata {
    fn default() -> Self {
        Self {
            mode: CaptureMode::FaceForward,
            orientation: Orientation::Portrait,
            device: "iPhone 15".to_string(),
            region: "Denmark".to_string(),
            time_of_day: TimeOfDay::Unknown,
            environment: Environment::Indoor,
            environment_fine: "studio".to_string(),
        }
    }
}

/// Acquisition role of a capture folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Clean,
    Clutter,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Clean => "clean",
            Role::Clutter => "clutter",
        }
    }
}

/// One role's image list.
///
/// Field order matters: metadata is serialized before `images`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleEntry {
    pub folder: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distractors: Option<Vec<String>>,
    pub images: Vec<String>,
}

impl RoleEntry {
    /// Build an entry; `count` is always derived from `images`.
    pub fn new(folder: String, images: Vec<String>) -> Self {
        Self {
            folder,
            count: images.len(),
            theme: None,
            distractors: None,
            images,
        }
    }
}

/// The manifest document of one scene.
#[derive(Debug, Clone, Serialize)]
pub struct SceneManifest {
    pub version: &'static str,
    pub meta_generated_at: String,
    pub scene_id: String,
    pub scene_name: String,
    pub scene_date_raw: String,
    pub scene_date_iso: String,
    pub mode: CaptureMode,
    pub orientation: Orientation,
    pub device: String,
    pub resolution: Resolution,
    pub region: String,
    pub time_of_day: TimeOfDay,
    pub environment: Environment,
    pub environment_fine: String,
    pub root_folder: String,
    pub total_images: usize,
    pub clean: Option<RoleEntry>,
    pub clutter: Option<RoleEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&CaptureMode::Degree360).unwrap(), "\"360_degree\"");
        assert_eq!(serde_json::to_string(&CaptureMode::FaceForward).unwrap(), "\"face_forward\"");
        assert_eq!(serde_json::to_string(&TimeOfDay::Nighttime).unwrap(), "\"nighttime\"");
    }

    #[test]
    fn test_role_entry_field_order() {
        let mut entry = RoleEntry::new("S-Clean/images".into(), vec!["S-Clean/images/a.png".into()]);
        entry.theme = Some(vec!["oil".into()]);
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"folder":"S-Clean/images","count":1,"theme":["oil"],"images":["S-Clean/images/a.png"]}"#
        );
    }
}
