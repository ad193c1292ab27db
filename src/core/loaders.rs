//! Data loaders for raw track recordings and processed track arrays.
//!
//! This module provides parsers for:
//! - Raw radar recording files (delimited text with a run-length label column)
//! - Fixed-shape track array files (NumPy `.npy` format)

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use thiserror::Error;

use crate::config::InputConfig;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Input file not found: {0}")]
    MissingFile(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    #[error("Row {row}: expected at least {expected} fields, found {found}")]
    ShortRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {row}, column {column}: invalid numeric value '{value}'")]
    InvalidNumber {
        row: usize,
        column: usize,
        value: String,
    },

    #[error("Row {row}: invalid label marker '{value}' (expected 0, 1, or blank)")]
    InvalidLabel { row: usize, value: String },

    #[error("Invalid track array in {path}: {reason}")]
    InvalidArray { path: PathBuf, reason: String },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Number of numeric features per radar point.
pub const POINT_DIM: usize = 6;

/// One raw measurement row.
///
/// The six features are, in file order: azimuth angle (deg), slant range (m),
/// relative height (m), radial velocity (m/s), record time (s), and radar
/// cross-section. The marker is present only on the first row of a track.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRow {
    /// Feature values in file order.
    pub features: [f64; POINT_DIM],
    /// Label marker: `Some(0)` or `Some(1)` on a track start, `None` on
    /// continuation rows.
    pub marker: Option<u8>,
}

/// Dense container for fixed-shape track data, shape `[tracks][rows][width]`.
///
/// Each track occupies `rows_per_track` rows of `width` values. The final row
/// of every track is a metadata trailer whose first two slots hold the track
/// label and the unpadded length.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackArray {
    /// Rows per track, including the metadata trailer row.
    pub rows_per_track: usize,
    /// Values per row.
    pub width: usize,
    /// Flattened values, length `num_tracks * rows_per_track * width`.
    pub data: Vec<f64>,
}

impl TrackArray {
    /// Creates an empty array with the given per-track shape.
    pub fn new(rows_per_track: usize, width: usize) -> Self {
        Self {
            rows_per_track,
            width,
            data: Vec::new(),
        }
    }

    /// Returns the number of tracks in the array.
    #[inline]
    pub fn num_tracks(&self) -> usize {
        if self.rows_per_track == 0 || self.width == 0 {
            return 0;
        }
        self.data.len() / (self.rows_per_track * self.width)
    }

    /// Returns the flattened values of track `index`.
    pub fn track(&self, index: usize) -> &[f64] {
        let stride = self.rows_per_track * self.width;
        &self.data[index * stride..(index + 1) * stride]
    }

    /// Appends the flattened values of one track.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not match the per-track shape.
    pub fn push_track(&mut self, values: &[f64]) {
        assert_eq!(
            values.len(),
            self.rows_per_track * self.width,
            "track values must match the per-track shape"
        );
        self.data.extend_from_slice(values);
    }

    /// Returns the label of track `index`, read from its trailer row.
    #[inline]
    pub fn label(&self, index: usize) -> f64 {
        let track = self.track(index);
        track[(self.rows_per_track - 1) * self.width]
    }

    /// Returns the unpadded length of track `index`, read from its trailer row.
    #[inline]
    pub fn length(&self, index: usize) -> f64 {
        let track = self.track(index);
        track[(self.rows_per_track - 1) * self.width + 1]
    }
}

/// Load raw track recording rows from a delimited text file.
///
/// The expected format:
/// - Optional header row (skipped when `config.has_header` is set)
/// - 7 fields per row: azimuth angle, slant range, relative height,
///   radial velocity, record time, RCS, label
/// - The label field holds `0` or `1` on the first row of each track and is
///   blank on continuation rows
///
/// # Arguments
///
/// * `path` - Path to the recording file
/// * `config` - Input format configuration (uses defaults if None)
///
/// # Returns
///
/// The ordered row sequence, ready for segmentation.
///
/// # Errors
///
/// Returns an error if the file does not exist, is empty, or contains a row
/// with too few fields, a non-numeric feature, or a label other than 0/1.
pub fn load_track_rows<P: AsRef<Path>>(path: P, config: Option<&InputConfig>) -> Result<Vec<PointRow>> {
    let path = path.as_ref();
    let default_config = InputConfig::default();
    let config = config.unwrap_or(&default_config);

    if !path.exists() {
        return Err(LoaderError::MissingFile(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(config.has_header)
        .delimiter(config.delimiter as u8)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut rows = Vec::with_capacity(4096);

    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;

        // 6 features plus the label column; trailing empty columns are allowed
        if record.len() < POINT_DIM + 1 {
            return Err(LoaderError::ShortRow {
                row: row_idx,
                expected: POINT_DIM + 1,
                found: record.len(),
            });
        }

        let mut features = [0.0; POINT_DIM];
        for (col, slot) in features.iter_mut().enumerate() {
            let raw = record.get(col).unwrap_or("").trim();
            *slot = raw.parse().map_err(|_| LoaderError::InvalidNumber {
                row: row_idx,
                column: col,
                value: raw.to_string(),
            })?;
        }

        let marker_raw = record.get(POINT_DIM).unwrap_or("").trim();
        let marker = if marker_raw.is_empty() {
            None
        } else {
            match marker_raw.parse::<u8>() {
                Ok(label @ (0 | 1)) => Some(label),
                _ => {
                    return Err(LoaderError::InvalidLabel {
                        row: row_idx,
                        value: marker_raw.to_string(),
                    })
                }
            }
        };

        rows.push(PointRow { features, marker });
    }

    if rows.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    Ok(rows)
}

/// Load a fixed-shape track array from a `.npy` file.
///
/// The array must be a 3-dimensional `f64` array of shape
/// `[tracks, rows_per_track, width]` as produced by the pipeline's
/// fixed-length writers.
///
/// # Errors
///
/// Returns an error if the file is missing, is not a valid `.npy` file, or
/// does not have three dimensions.
pub fn load_track_array<P: AsRef<Path>>(path: P) -> Result<TrackArray> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(LoaderError::MissingFile(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)?;
    let npy = npyz::NpyFile::new(&bytes[..])?;
    let shape = npy.shape().to_vec();

    if shape.len() != 3 {
        return Err(LoaderError::InvalidArray {
            path: path.to_path_buf(),
            reason: format!("expected 3 dimensions, found {}", shape.len()),
        });
    }

    let rows_per_track = shape[1] as usize;
    let width = shape[2] as usize;
    if rows_per_track < 2 || width < 2 {
        return Err(LoaderError::InvalidArray {
            path: path.to_path_buf(),
            reason: format!("per-track shape [{rows_per_track}, {width}] has no room for a metadata trailer"),
        });
    }

    let data: Vec<f64> = npy.into_vec()?;

    Ok(TrackArray {
        rows_per_track,
        width,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_sample_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "azimuth,range,height,velocity,time,rcs,label").unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_track_rows() {
        let file = write_sample_csv(&[
            "1.0,100.0,10.0,5.0,0.0,3.0,0",
            "2.0,101.0,10.0,5.0,1.0,3.0,",
            "3.0,50.0,5.0,2.0,2.0,1.0,1",
        ]);

        let rows = load_track_rows(file.path(), None).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].features, [1.0, 100.0, 10.0, 5.0, 0.0, 3.0]);
        assert_eq!(rows[0].marker, Some(0));
        assert_eq!(rows[1].marker, None);
        assert_eq!(rows[2].marker, Some(1));
    }

    #[test]
    fn test_load_track_rows_missing_file() {
        let result = load_track_rows("no/such/recording.csv", None);
        assert!(matches!(result, Err(LoaderError::MissingFile(_))));
    }

    #[test]
    fn test_load_track_rows_empty_file() {
        let file = write_sample_csv(&[]);
        let result = load_track_rows(file.path(), None);
        assert!(matches!(result, Err(LoaderError::EmptyFile(_))));
    }

    #[test]
    fn test_load_track_rows_invalid_number() {
        let file = write_sample_csv(&["1.0,abc,10.0,5.0,0.0,3.0,0"]);
        let result = load_track_rows(file.path(), None);
        match result.unwrap_err() {
            LoaderError::InvalidNumber { row, column, value } => {
                assert_eq!(row, 0);
                assert_eq!(column, 1);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_track_rows_invalid_label() {
        let file = write_sample_csv(&["1.0,100.0,10.0,5.0,0.0,3.0,2"]);
        let result = load_track_rows(file.path(), None);
        assert!(matches!(result, Err(LoaderError::InvalidLabel { row: 0, .. })));
    }

    #[test]
    fn test_load_track_rows_short_row() {
        let file = write_sample_csv(&["1.0,100.0,10.0"]);
        let result = load_track_rows(file.path(), None);
        assert!(matches!(
            result,
            Err(LoaderError::ShortRow { row: 0, found: 3, .. })
        ));
    }

    #[test]
    fn test_load_track_rows_tab_delimited() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "azimuth\trange\theight\tvelocity\ttime\trcs\tlabel").unwrap();
        writeln!(file, "1.0\t100.0\t10.0\t5.0\t0.0\t3.0\t1").unwrap();
        file.flush().unwrap();

        let config = InputConfig {
            delimiter: '\t',
            has_header: true,
        };
        let rows = load_track_rows(file.path(), Some(&config)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].marker, Some(1));
    }

    #[test]
    fn test_track_array_accessors() {
        let mut array = TrackArray::new(3, 2);
        // Track 0: two data rows plus trailer [label=1, length=2]
        array.push_track(&[10.0, 11.0, 20.0, 21.0, 1.0, 2.0]);
        // Track 1: one data row, one filler row, trailer [label=0, length=1]
        array.push_track(&[30.0, 31.0, 0.0, 0.0, 0.0, 1.0]);

        assert_eq!(array.num_tracks(), 2);
        assert_eq!(array.label(0), 1.0);
        assert_eq!(array.length(0), 2.0);
        assert_eq!(array.label(1), 0.0);
        assert_eq!(array.length(1), 1.0);
        assert_eq!(array.track(1)[0], 30.0);
    }
}
