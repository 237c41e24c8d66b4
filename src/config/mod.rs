mod app_config;

pub use app_config::{
    AppConfig, DatasetLayout, FrameCountConfig, ManifestConfig, MergeConfig, SplitConfig,
};
