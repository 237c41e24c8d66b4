mod file_ops;
mod merge;

pub use file_ops::{ensure_unique, link_file, write_atomic, LinkMode};
pub use merge::{
    merge_pools, merge_scene, plan_link, prefixed_destination, LinkAction, MergeSummary,
    PoolSummary, SourcePool,
};
