//! Stratified train/test/val dataset splitting.
//!
//! Partitions a fixed-shape track array per label class into contiguous
//! train/test/val ranges, then concatenates each split across classes.
//! No shuffling: within-class order is preserved.

use thiserror::Error;

use crate::core::loaders::TrackArray;

/// Errors that can occur during dataset splitting.
#[derive(Debug, Error)]
pub enum SplitError {
    /// A ratio falls outside [0, 1).
    #[error("{name} ratio {value} is out of range (must be in [0, 1))")]
    RatioOutOfRange { name: &'static str, value: f64 },

    /// Ratios leave nothing for the training split.
    #[error("test ratio {test_ratio} and val ratio {val_ratio} must sum to below 1")]
    RatiosTooLarge { test_ratio: f64, val_ratio: f64 },

    /// A track carries a label other than 0 or 1.
    #[error("Track {index} has label {label}, expected 0 or 1")]
    UnknownLabel { index: usize, label: f64 },
}

/// Result type for split operations.
pub type Result<T> = std::result::Result<T, SplitError>;

/// The three disjoint partitions of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitDataset {
    pub train: TrackArray,
    pub test: TrackArray,
    pub val: TrackArray,
}

/// Validate split ratios before any data is touched.
pub fn validate_ratios(test_ratio: f64, val_ratio: f64) -> Result<()> {
    for (name, value) in [("test", test_ratio), ("val", val_ratio)] {
        if !(0.0..1.0).contains(&value) {
            return Err(SplitError::RatioOutOfRange { name, value });
        }
    }
    if test_ratio + val_ratio >= 1.0 {
        return Err(SplitError::RatiosTooLarge {
            test_ratio,
            val_ratio,
        });
    }
    Ok(())
}

/// Per-class boundaries: train ends at `train_end`, test at `test_end`,
/// val takes the remainder. Floor division may shift one row between
/// neighboring splits; every index lands in exactly one range.
fn class_boundaries(class_size: usize, test_ratio: f64, val_ratio: f64) -> (usize, usize) {
    let n = class_size as f64;
    let train_end = ((1.0 - test_ratio - val_ratio) * n) as usize;
    let test_end = ((1.0 - val_ratio) * n) as usize;
    (train_end, test_end)
}

/// Split a fixed-shape track array into stratified train/test/val partitions.
///
/// Track indices are first grouped by label class in input order. Each class
/// is then sliced into contiguous train/test/val ranges by the given ratios,
/// and the per-class slices are concatenated (class 0 first).
///
/// # Errors
///
/// Returns an error for ratios outside [0, 1) or summing to 1 or more
/// (validated before any data is read), or for a trailer label other than
/// 0/1.
pub fn split_dataset(array: &TrackArray, test_ratio: f64, val_ratio: f64) -> Result<SplitDataset> {
    validate_ratios(test_ratio, val_ratio)?;

    // Group track indices per class, preserving input order
    let mut class_indices: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    for index in 0..array.num_tracks() {
        let label = array.label(index);
        if label == 0.0 {
            class_indices[0].push(index);
        } else if label == 1.0 {
            class_indices[1].push(index);
        } else {
            return Err(SplitError::UnknownLabel { index, label });
        }
    }

    let mut train = TrackArray::new(array.rows_per_track, array.width);
    let mut test = TrackArray::new(array.rows_per_track, array.width);
    let mut val = TrackArray::new(array.rows_per_track, array.width);

    for indices in &class_indices {
        let (train_end, test_end) = class_boundaries(indices.len(), test_ratio, val_ratio);
        for (pos, &index) in indices.iter().enumerate() {
            let target = if pos < train_end {
                &mut train
            } else if pos < test_end {
                &mut test
            } else {
                &mut val
            };
            target.push_track(array.track(index));
        }
    }

    Ok(SplitDataset { train, test, val })
}
