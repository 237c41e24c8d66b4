pub mod analysis;
pub mod dataset;
pub mod manifest;
pub mod operations;
pub mod reconstruction;
pub mod split;
