mod frame_counts;

pub use frame_counts::{
    aggregate_frame_counts, collect_frame_counts, load_frame_count, sort_records, to_csv,
    FrameCount,
};
