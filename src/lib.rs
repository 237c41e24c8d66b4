//! Curation of Clean/Clutter scene captures: scene manifests, merged image
//! pools and keyword-based train/test splits.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
