//! Artifact writers for processed track datasets.
//!
//! This module provides functions for writing pipeline outputs:
//! - JSON track lists for the variable-length encoding
//! - NumPy `.npy` arrays for the fixed-length encodings
//! - The derived output path conventions for each encoding

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use npyz::WriterBuilder;
use thiserror::Error;

use super::loaders::TrackArray;
use crate::processors::padding::TrackRecord;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[error("JSON write error for '{path}': {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Creates a buffered writer for the given path.
fn create_buffered_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(BufWriter::new(file))
}

/// Output path for the variable-length encoding.
///
/// A `_data` suffix on the input file stem is replaced by `_tracks_graph`;
/// without the suffix, `_tracks_graph` is appended. The extension becomes
/// `.json`, e.g. `raw_data.csv` -> `raw_tracks_graph.json`.
pub fn variable_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "tracks".to_string());
    let base = stem.strip_suffix("_data").unwrap_or(&stem);
    input.with_file_name(format!("{base}_tracks_graph.json"))
}

/// Output path for the fixed-length encoding: `raw_data.csv` -> `raw_data_padded.npy`.
pub fn padded_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "tracks".to_string());
    input.with_file_name(format!("{stem}_padded.npy"))
}

/// Output path for the derived-feature sequence encoding: the input with a
/// `.npy` extension.
pub fn sequence_output_path(input: &Path) -> PathBuf {
    input.with_extension("npy")
}

/// Write variable-length track records as a JSON array.
///
/// Each record keeps its points, label, and explicit length, so the encoding
/// is self-describing and needs no fixed shape.
///
/// # Arguments
///
/// * `path` - Output file path (parent directories will be created if needed)
/// * `records` - Track records in emission order
///
/// # Errors
///
/// Returns an error if the file cannot be created or serialization fails.
pub fn write_tracks_json(path: &Path, records: &[TrackRecord]) -> Result<()> {
    ensure_parent_dirs(path)?;
    let mut writer = create_buffered_writer(path)?;
    let path_str = path.display().to_string();

    serde_json::to_writer(&mut writer, records).map_err(|e| WriteError::JsonError {
        path: path_str.clone(),
        source: e,
    })?;

    writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}

/// Write a fixed-shape track array as an `f64` NumPy `.npy` file.
///
/// The array is written with shape `[tracks, rows_per_track, width]`.
///
/// # Arguments
///
/// * `path` - Output file path (parent directories will be created if needed)
/// * `array` - Track array to serialize
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_track_array(path: &Path, array: &TrackArray) -> Result<()> {
    ensure_parent_dirs(path)?;
    let writer = create_buffered_writer(path)?;
    let path_str = path.display().to_string();

    let shape = [
        array.num_tracks() as u64,
        array.rows_per_track as u64,
        array.width as u64,
    ];

    let io_err = |e: std::io::Error| WriteError::WriteFile {
        path: path_str.clone(),
        source: e,
    };

    let mut npy = npyz::WriteOptions::new()
        .default_dtype()
        .shape(&shape)
        .writer(writer)
        .begin_nd()
        .map_err(io_err)?;
    npy.extend(array.data.iter().copied()).map_err(io_err)?;
    npy.finish().map_err(io_err)?;

    Ok(())
}

/// Write the three split partitions under the dataset root.
///
/// Files land at `<root>/train/train.npy`, `<root>/test/test.npy`, and
/// `<root>/eval/val.npy`.
///
/// # Returns
///
/// The three output paths in train/test/val order.
pub fn write_split_arrays(
    root: &Path,
    train: &TrackArray,
    test: &TrackArray,
    val: &TrackArray,
) -> Result<[PathBuf; 3]> {
    let paths = [
        root.join("train").join("train.npy"),
        root.join("test").join("test.npy"),
        root.join("eval").join("val.npy"),
    ];

    for (path, array) in paths.iter().zip([train, test, val]) {
        write_track_array(path, array)?;
    }

    Ok(paths)
}
