//! Derived-feature sequence encoding.
//!
//! An alternate output layout that widens each point from 6 raw features to
//! a 9-wide vector with a computed elevation angle, the point's index within
//! its track, and a trailing label slot. Every track is padded to a fixed
//! window of 15 points before the metadata trailer row, giving a dense
//! `[tracks, 16, 9]` array.

use log::warn;
use thiserror::Error;

use super::segmenter::{segment_rows, SegmentError, Track, TrackStats};
use crate::core::loaders::{PointRow, TrackArray};

/// Width of a derived sequence row.
pub const SEQ_DIM: usize = 9;

/// Fixed point window per track in the sequence encoding.
pub const SEQ_FIXED_LENGTH: usize = 15;

/// Tolerance for |height/range| slightly above 1 from measurement jitter.
/// Ratios within the tolerance are clamped; anything beyond is rejected.
const RATIO_TOLERANCE: f64 = 1e-6;

/// Errors that can occur while building the sequence encoding.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error(transparent)]
    Segment(#[from] SegmentError),

    /// Elevation is undefined for a point at zero slant range.
    #[error("Track {track}, point {point}: slant range is zero, elevation angle is undefined")]
    ZeroRange { track: usize, point: usize },

    /// |height/range| exceeds 1 by more than the jitter tolerance.
    #[error("Track {track}, point {point}: impossible geometry, |height/range| = {ratio:.6} (height {height}, range {range})")]
    ElevationDomain {
        track: usize,
        point: usize,
        height: f64,
        range: f64,
        ratio: f64,
    },

    /// A track has more points than the sequence window.
    #[error("Track {track} has {length} points, more than the sequence window of {SEQ_FIXED_LENGTH}")]
    TrackTooLong { track: usize, length: usize },
}

/// Result type for sequence encoding operations.
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Elevation angle in degrees from slant range and relative height.
///
/// Computes `asin(height / range)` in degrees. A ratio just past ±1 is
/// clamped with a warning; a zero range or a ratio beyond the tolerance is
/// an error rather than a silent NaN. `track` and `point` identify the
/// offending input in error messages.
pub fn elevation_angle_deg(track: usize, point: usize, range: f64, height: f64) -> Result<f64> {
    if range == 0.0 {
        return Err(FeatureError::ZeroRange { track, point });
    }

    let ratio = height / range;
    if ratio.abs() > 1.0 + RATIO_TOLERANCE {
        return Err(FeatureError::ElevationDomain {
            track,
            point,
            height,
            range,
            ratio,
        });
    }
    if ratio.abs() > 1.0 {
        warn!(
            "track {track}, point {point}: clamping |height/range| = {ratio} to 1 for elevation angle"
        );
    }

    Ok(ratio.clamp(-1.0, 1.0).asin().to_degrees())
}

/// Map one track to its padded sequence rows.
///
/// Row layout: `[time, range, azimuth, elevation, velocity, point_index,
/// height, rcs, label]`. Filler rows are zero-valued except for the trailing
/// label slot, which is stamped with the track label; the final trailer row
/// is `[label, length, 0, ...]`.
fn track_to_sequence(track: &Track, index: usize) -> Result<Vec<f64>> {
    if track.length > SEQ_FIXED_LENGTH {
        return Err(FeatureError::TrackTooLong {
            track: index,
            length: track.length,
        });
    }

    let mut values = Vec::with_capacity((SEQ_FIXED_LENGTH + 1) * SEQ_DIM);
    let label = track.label as f64;

    for (point_idx, point) in track.points.iter().enumerate() {
        let [azimuth, range, height, velocity, time, rcs] = *point;
        let elevation = elevation_angle_deg(index, point_idx, range, height)?;
        values.extend_from_slice(&[
            time,
            range,
            azimuth,
            elevation,
            velocity,
            point_idx as f64,
            height,
            rcs,
            label,
        ]);
    }

    // Label-stamped filler: zero features, label kept in the trailing slot
    for _ in track.length..SEQ_FIXED_LENGTH {
        let mut filler = [0.0; SEQ_DIM];
        filler[SEQ_DIM - 1] = label;
        values.extend_from_slice(&filler);
    }

    let mut trailer = [0.0; SEQ_DIM];
    trailer[0] = label;
    trailer[1] = track.length as f64;
    values.extend_from_slice(&trailer);

    Ok(values)
}

/// Build the derived-feature sequence dataset from raw rows.
///
/// Segments the rows with the standard boundary convention, widens each
/// point to the 9-wide layout, and pads every track to the fixed window.
///
/// # Returns
///
/// A dense `[tracks, 16, 9]` array plus the segmentation statistics.
///
/// # Errors
///
/// Propagates segmentation errors, numeric-domain failures from the
/// elevation computation, and over-long tracks.
pub fn build_sequence_dataset(rows: &[PointRow]) -> Result<(TrackArray, TrackStats)> {
    let (tracks, stats) = segment_rows(rows)?;

    let mut array = TrackArray::new(SEQ_FIXED_LENGTH + 1, SEQ_DIM);
    for (index, track) in tracks.iter().enumerate() {
        let values = track_to_sequence(track, index)?;
        array.push_track(&values);
    }

    Ok((array, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loaders::POINT_DIM;

    fn row(features: [f64; POINT_DIM], marker: Option<u8>) -> PointRow {
        PointRow { features, marker }
    }

    #[test]
    fn test_elevation_angle_basic() {
        // height/range = 0.5 -> 30 degrees
        let angle = elevation_angle_deg(0, 0, 100.0, 50.0).unwrap();
        assert!((angle - 30.0).abs() < 1e-9);

        // Level flight
        let angle = elevation_angle_deg(0, 0, 100.0, 0.0).unwrap();
        assert_eq!(angle, 0.0);

        // Below the radar
        let angle = elevation_angle_deg(0, 0, 100.0, -100.0).unwrap();
        assert!((angle + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_elevation_angle_zero_range() {
        let result = elevation_angle_deg(3, 7, 0.0, 10.0);
        assert!(matches!(
            result,
            Err(FeatureError::ZeroRange { track: 3, point: 7 })
        ));
    }

    #[test]
    fn test_elevation_angle_out_of_domain() {
        let result = elevation_angle_deg(0, 0, 10.0, 25.0);
        match result.unwrap_err() {
            FeatureError::ElevationDomain { ratio, .. } => assert_eq!(ratio, 2.5),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_elevation_angle_jitter_clamped() {
        // Just past 1 within tolerance: clamped to exactly 90 degrees
        let height = 100.0 * (1.0 + 1e-9);
        let angle = elevation_angle_deg(0, 0, 100.0, height).unwrap();
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_sequence_dataset_layout() {
        let rows = vec![
            // [azimuth, range, height, velocity, time, rcs]
            row([1.0, 100.0, 50.0, 5.0, 0.0, 3.0], Some(1)),
            row([2.0, 200.0, 100.0, 5.0, 1.0, 3.0], None),
            row([3.0, 50.0, 0.0, 2.0, 2.0, 1.0], Some(0)),
        ];

        let (array, stats) = build_sequence_dataset(&rows).unwrap();

        assert_eq!(array.num_tracks(), 2);
        assert_eq!(array.rows_per_track, SEQ_FIXED_LENGTH + 1);
        assert_eq!(array.width, SEQ_DIM);
        assert_eq!(stats.total_tracks, 2);

        // First point of track 0: [time, range, azimuth, elevation,
        // velocity, point_index, height, rcs, label]
        let track0 = array.track(0);
        let first = &track0[..SEQ_DIM];
        assert_eq!(first[0], 0.0);
        assert_eq!(first[1], 100.0);
        assert_eq!(first[2], 1.0);
        assert!((first[3] - 30.0).abs() < 1e-9);
        assert_eq!(first[4], 5.0);
        assert_eq!(first[5], 0.0);
        assert_eq!(first[6], 50.0);
        assert_eq!(first[7], 3.0);
        assert_eq!(first[8], 1.0);

        // Second point carries its within-track index
        let second = &track0[SEQ_DIM..2 * SEQ_DIM];
        assert_eq!(second[5], 1.0);

        // Filler rows are zero except the label slot
        let filler = &track0[2 * SEQ_DIM..3 * SEQ_DIM];
        assert_eq!(&filler[..SEQ_DIM - 1], &[0.0; SEQ_DIM - 1]);
        assert_eq!(filler[SEQ_DIM - 1], 1.0);

        // Trailer row carries label and unpadded length
        assert_eq!(array.label(0), 1.0);
        assert_eq!(array.length(0), 2.0);
        assert_eq!(array.label(1), 0.0);
        assert_eq!(array.length(1), 1.0);
    }

    #[test]
    fn test_sequence_track_too_long() {
        let mut rows = vec![row([1.0, 100.0, 50.0, 5.0, 0.0, 3.0], Some(1))];
        for i in 0..SEQ_FIXED_LENGTH {
            rows.push(row([1.0, 100.0, 50.0, 5.0, i as f64, 3.0], None));
        }

        let result = build_sequence_dataset(&rows);

        assert!(matches!(
            result,
            Err(FeatureError::TrackTooLong { track: 0, length }) if length == SEQ_FIXED_LENGTH + 1
        ));
    }
}
