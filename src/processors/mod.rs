//! Pipeline processing stages.

pub mod extract;
pub mod features;
pub mod padding;
pub mod segmenter;
pub mod split;

// Re-export key types for convenience
pub use extract::{extract_sequences, extract_tracks, split_dataset_files, ExtractOutcome, SplitOutcome};
pub use features::{build_sequence_dataset, elevation_angle_deg, FeatureError, SEQ_DIM, SEQ_FIXED_LENGTH};
pub use padding::{
    normalize_tracks, pad_track, records_to_array, validate_mode, PaddingError, PaddingMode,
    TrackRecord, MIN_FIXED_LENGTH,
};
pub use segmenter::{segment_rows, SegmentError, Track, TrackStats};
pub use split::{split_dataset, validate_ratios, SplitDataset, SplitError};
