//! Radar track preprocessing pipeline.
//!
//! This crate converts raw radar-track recordings into fixed-shape numeric
//! arrays for machine-learning consumption:
//! - Loading delimited recording files with a run-length label column
//! - Segmenting point rows into labeled tracks
//! - Zero-padding tracks to a fixed length, or keeping explicit lengths
//! - Computing a derived elevation-angle feature (sequence encoding)
//! - Stratified train/test/val splitting of processed datasets
//!
//! # Example
//!
//! ```no_run
//! use track_pipeline::core::loaders::load_track_rows;
//! use track_pipeline::processors::{normalize_tracks, segment_rows, PaddingMode};
//!
//! let rows = load_track_rows("raw_data.csv", None).unwrap();
//! let (tracks, stats) = segment_rows(&rows).unwrap();
//! let records = normalize_tracks(&tracks, PaddingMode::Fixed(11)).unwrap();
//! println!("{} tracks, mean length {:.1}", stats.total_tracks, stats.mean_length);
//! # let _ = records;
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;

pub use config::{InputConfig, PipelineConfig, SplitConfig};
pub use core::loaders::{PointRow, TrackArray};
pub use processors::{PaddingMode, Track, TrackRecord, TrackStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
