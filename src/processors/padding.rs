//! Fixed-length normalization of variable-length tracks.
//!
//! Tracks come out of the segmenter with whatever length the recording gave
//! them. Downstream consumers want either the raw variable-length records or
//! a fixed shape; this module validates the padding configuration up front
//! and applies zero-filler padding per track.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::segmenter::Track;
use crate::core::loaders::{TrackArray, POINT_DIM};

/// Smallest accepted fixed length, the maximum track length observed in the
/// source recordings.
pub const MIN_FIXED_LENGTH: usize = 11;

/// Errors that can occur during padding.
#[derive(Debug, Error)]
pub enum PaddingError {
    /// The configured fixed length is below the floor.
    #[error(
        "Fixed length {0} is invalid: use no padding, or a length of at least {min}",
        min = MIN_FIXED_LENGTH
    )]
    LengthBelowFloor(usize),

    /// A track has more points than the configured fixed length.
    #[error("Track {index} has {length} points, more than the configured fixed length {fixed_length}")]
    TrackTooLong {
        index: usize,
        length: usize,
        fixed_length: usize,
    },
}

/// Result type for padding operations.
pub type Result<T> = std::result::Result<T, PaddingError>;

/// Padding configuration for one run. The two modes produce mutually
/// exclusive output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingMode {
    /// Emit tracks unchanged, with explicit lengths (variable-length encoding).
    None,
    /// Pad every track to exactly this many points (fixed-length encoding).
    Fixed(usize),
}

impl PaddingMode {
    /// Maps the CLI/config surface (`None` sentinel or an integer) to a mode.
    pub fn from_option(fixed_length: Option<usize>) -> Self {
        match fixed_length {
            Some(n) => PaddingMode::Fixed(n),
            None => PaddingMode::None,
        }
    }
}

/// One emitted track record.
///
/// `length` is the unpadded point count and is kept in both encodings. The
/// original pipeline dropped it in fixed-length mode, which made real
/// zero-valued points indistinguishable from filler; carrying it always
/// removes that ambiguity without changing the padded point data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    /// Point features, padded to the fixed length in fixed mode.
    pub points: Vec<[f64; POINT_DIM]>,
    /// Track label (0 = non-drone, 1 = drone).
    pub label: u8,
    /// Point count before padding.
    pub length: usize,
}

/// Validate a padding mode before any track is processed.
///
/// # Errors
///
/// Returns [`PaddingError::LengthBelowFloor`] for `Fixed(n)` with
/// `n < MIN_FIXED_LENGTH`. `PaddingMode::None` is always valid.
pub fn validate_mode(mode: PaddingMode) -> Result<()> {
    match mode {
        PaddingMode::Fixed(n) if n < MIN_FIXED_LENGTH => Err(PaddingError::LengthBelowFloor(n)),
        _ => Ok(()),
    }
}

/// Pad a track's points to `fixed_length` entries with zero-valued filler.
///
/// The first `track.length` entries of the result are the original points,
/// element for element.
///
/// # Errors
///
/// Returns [`PaddingError::TrackTooLong`] if the track has more points than
/// `fixed_length`. Truncation is never performed.
pub fn pad_track(track: &Track, index: usize, fixed_length: usize) -> Result<Vec<[f64; POINT_DIM]>> {
    if track.length > fixed_length {
        return Err(PaddingError::TrackTooLong {
            index,
            length: track.length,
            fixed_length,
        });
    }

    let mut points = track.points.clone();
    points.resize(fixed_length, [0.0; POINT_DIM]);
    Ok(points)
}

/// Normalize segmented tracks into output records per the padding mode.
///
/// The mode is validated before any track is touched, so an invalid
/// configuration fails without partial work.
///
/// # Errors
///
/// Returns an error for an invalid fixed length, or for any track longer
/// than the fixed length (with the offending track's index and lengths).
pub fn normalize_tracks(tracks: &[Track], mode: PaddingMode) -> Result<Vec<TrackRecord>> {
    validate_mode(mode)?;

    let mut records = Vec::with_capacity(tracks.len());
    for (index, track) in tracks.iter().enumerate() {
        let points = match mode {
            PaddingMode::None => track.points.clone(),
            PaddingMode::Fixed(fixed_length) => pad_track(track, index, fixed_length)?,
        };
        records.push(TrackRecord {
            points,
            label: track.label,
            length: track.length,
        });
    }

    Ok(records)
}

/// Fold fixed-length records into a dense track array.
///
/// Each track becomes `fixed_length + 1` rows of width [`POINT_DIM`]: the
/// padded points followed by a metadata trailer row `[label, length, 0, ...]`.
/// The trailer carries the per-track metadata the dense shape would otherwise
/// lose.
pub fn records_to_array(records: &[TrackRecord], fixed_length: usize) -> TrackArray {
    let mut array = TrackArray::new(fixed_length + 1, POINT_DIM);
    let mut values = Vec::with_capacity((fixed_length + 1) * POINT_DIM);

    for record in records {
        values.clear();
        for point in &record.points {
            values.extend_from_slice(point);
        }
        let mut trailer = [0.0; POINT_DIM];
        trailer[0] = record.label as f64;
        trailer[1] = record.length as f64;
        values.extend_from_slice(&trailer);
        array.push_track(&values);
    }

    array
}
