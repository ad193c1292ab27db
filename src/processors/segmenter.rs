//! Track segmentation by the run-length label convention.
//!
//! A recording is a flat row sequence in which only the first row of each
//! track carries a label marker; continuation rows leave it blank. The
//! segmenter scans the rows once and cuts a new track at every marker.

use thiserror::Error;

use crate::core::loaders::{PointRow, POINT_DIM};

/// Errors that can occur during segmentation.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// A continuation row appeared before any labeled row.
    #[error("Row {row}: blank label marker before any labeled row; a recording must open with a track start")]
    MissingLeadingLabel { row: usize },
}

/// Result type for segmentation operations.
pub type Result<T> = std::result::Result<T, SegmentError>;

/// A maximal run of consecutive points sharing one label.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Point features in row order.
    pub points: Vec<[f64; POINT_DIM]>,
    /// Track label: 0 = non-drone, 1 = drone. Taken from the first row's
    /// marker and shared by every continuation row.
    pub label: u8,
    /// Number of real points, always `points.len()` before any padding.
    pub length: usize,
}

/// Summary statistics over a segmented recording.
///
/// Returned alongside the tracks so callers can report them; the segmenter
/// itself never prints.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackStats {
    /// Number of emitted tracks.
    pub total_tracks: usize,
    /// Shortest track length (0 when there are no tracks).
    pub min_length: usize,
    /// Longest track length (0 when there are no tracks).
    pub max_length: usize,
    /// Mean track length (0.0 when there are no tracks).
    pub mean_length: f64,
    /// Track counts per label, indexed by label value.
    pub label_counts: [usize; 2],
}

impl TrackStats {
    /// Computes statistics over a track sequence.
    pub fn from_tracks(tracks: &[Track]) -> Self {
        let total_tracks = tracks.len();
        let min_length = tracks.iter().map(|t| t.length).min().unwrap_or(0);
        let max_length = tracks.iter().map(|t| t.length).max().unwrap_or(0);
        let mean_length = if total_tracks > 0 {
            tracks.iter().map(|t| t.length).sum::<usize>() as f64 / total_tracks as f64
        } else {
            0.0
        };

        let mut label_counts = [0usize; 2];
        for track in tracks {
            label_counts[track.label as usize] += 1;
        }

        Self {
            total_tracks,
            min_length,
            max_length,
            mean_length,
            label_counts,
        }
    }
}

/// Segment a row sequence into tracks.
///
/// A single fold over the rows with an explicit accumulator: a marker row
/// finalizes any in-progress track and starts a new one; a blank row extends
/// the current track. The final track is emitted once after the loop, so a
/// well-formed input yields exactly one track per marker row. Single-row
/// tracks are valid.
///
/// # Arguments
///
/// * `rows` - Ordered rows from the loader
///
/// # Returns
///
/// The emitted tracks in input order, plus summary statistics.
///
/// # Errors
///
/// Returns [`SegmentError::MissingLeadingLabel`] if a blank-marker row
/// appears before the first labeled row.
pub fn segment_rows(rows: &[PointRow]) -> Result<(Vec<Track>, TrackStats)> {
    let mut tracks = Vec::new();
    let mut current: Option<Track> = None;

    for (row_idx, row) in rows.iter().enumerate() {
        match row.marker {
            Some(label) => {
                if let Some(track) = current.take() {
                    tracks.push(track);
                }
                current = Some(Track {
                    points: vec![row.features],
                    label,
                    length: 1,
                });
            }
            None => match current.as_mut() {
                Some(track) => {
                    track.points.push(row.features);
                    track.length += 1;
                }
                None => return Err(SegmentError::MissingLeadingLabel { row: row_idx }),
            },
        }
    }

    // The loop never emits the trailing track on its own
    if let Some(track) = current.take() {
        tracks.push(track);
    }

    let stats = TrackStats::from_tracks(&tracks);
    Ok((tracks, stats))
}
