//! End-to-end extraction runs: load, segment, normalize, write.
//!
//! These functions compose the loaders, the core segmentation and padding
//! stages, and the artifact writers into the three whole-file operations the
//! CLI exposes. Each run either writes one complete artifact or fails
//! without writing anything.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use super::features::build_sequence_dataset;
use super::padding::{normalize_tracks, records_to_array, validate_mode, PaddingMode};
use super::segmenter::{segment_rows, TrackStats};
use super::split::{split_dataset, validate_ratios};
use crate::config::InputConfig;
use crate::core::loaders::{load_track_array, load_track_rows};
use crate::core::writers::{
    padded_output_path, sequence_output_path, variable_output_path, write_split_arrays,
    write_track_array, write_tracks_json,
};

/// Outcome of a track extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    /// Path of the written artifact.
    pub output_path: PathBuf,
    /// Segmentation statistics for caller-side reporting.
    pub stats: TrackStats,
    /// The padding mode the run used.
    pub mode: PaddingMode,
}

/// Outcome of a dataset split run.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    /// The train/test/val artifact paths.
    pub output_paths: [PathBuf; 3],
    /// Tracks per split, in train/test/val order.
    pub sizes: [usize; 3],
}

/// Extract tracks from a raw recording and write one dataset artifact.
///
/// With `PaddingMode::None` the variable-length JSON encoding is written;
/// with `PaddingMode::Fixed(n)` tracks are zero-padded to `n` points and
/// written as a dense `.npy` array. The padding configuration is validated
/// before the input is read.
///
/// # Arguments
///
/// * `input` - Path to the raw recording file
/// * `mode` - Padding mode for this run
/// * `config` - Input format configuration
/// * `output` - Output path override (derived from `input` if None)
///
/// # Returns
///
/// The artifact path and segmentation statistics.
pub fn extract_tracks(
    input: &Path,
    mode: PaddingMode,
    config: &InputConfig,
    output: Option<&Path>,
) -> Result<ExtractOutcome> {
    // Fail fast on bad configuration, before touching the input
    validate_mode(mode)?;

    let rows = load_track_rows(input, Some(config))
        .with_context(|| format!("Failed to load recording: {}", input.display()))?;
    info!("Loaded {} rows from {}", rows.len(), input.display());

    let (tracks, stats) = segment_rows(&rows)
        .with_context(|| format!("Failed to segment recording: {}", input.display()))?;
    info!(
        "Segmented {} tracks ({} non-drone, {} drone)",
        stats.total_tracks, stats.label_counts[0], stats.label_counts[1]
    );

    let records = normalize_tracks(&tracks, mode)?;

    let output_path = match mode {
        PaddingMode::None => {
            let path = output
                .map(Path::to_path_buf)
                .unwrap_or_else(|| variable_output_path(input));
            write_tracks_json(&path, &records)
                .with_context(|| format!("Failed to write track list: {}", path.display()))?;
            path
        }
        PaddingMode::Fixed(fixed_length) => {
            let path = output
                .map(Path::to_path_buf)
                .unwrap_or_else(|| padded_output_path(input));
            let array = records_to_array(&records, fixed_length);
            write_track_array(&path, &array)
                .with_context(|| format!("Failed to write track array: {}", path.display()))?;
            path
        }
    };

    Ok(ExtractOutcome {
        output_path,
        stats,
        mode,
    })
}

/// Build the derived-feature sequence dataset from a raw recording.
///
/// Widens each point to the 9-wide layout with the computed elevation angle
/// and writes the dense `[tracks, 16, 9]` array.
pub fn extract_sequences(
    input: &Path,
    config: &InputConfig,
    output: Option<&Path>,
) -> Result<ExtractOutcome> {
    let rows = load_track_rows(input, Some(config))
        .with_context(|| format!("Failed to load recording: {}", input.display()))?;
    info!("Loaded {} rows from {}", rows.len(), input.display());

    let (array, stats) = build_sequence_dataset(&rows)
        .with_context(|| format!("Failed to build sequence dataset from {}", input.display()))?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| sequence_output_path(input));
    write_track_array(&path, &array)
        .with_context(|| format!("Failed to write sequence array: {}", path.display()))?;

    Ok(ExtractOutcome {
        output_path: path,
        stats,
        mode: PaddingMode::Fixed(super::features::SEQ_FIXED_LENGTH),
    })
}

/// Split a fixed-shape dataset artifact into train/test/val files.
///
/// Reads the `.npy` array at `data_path`, stratifies by the trailer label,
/// and writes the three partitions under `root`. Ratios are validated
/// before the input is read.
pub fn split_dataset_files(
    data_path: &Path,
    root: &Path,
    test_ratio: f64,
    val_ratio: f64,
) -> Result<SplitOutcome> {
    validate_ratios(test_ratio, val_ratio)?;

    let array = load_track_array(data_path)
        .with_context(|| format!("Failed to load dataset: {}", data_path.display()))?;
    info!(
        "Loaded {} tracks of shape [{}, {}]",
        array.num_tracks(),
        array.rows_per_track,
        array.width
    );

    let split = split_dataset(&array, test_ratio, val_ratio)?;
    let sizes = [
        split.train.num_tracks(),
        split.test.num_tracks(),
        split.val.num_tracks(),
    ];

    let output_paths = write_split_arrays(root, &split.train, &split.test, &split.val)
        .with_context(|| format!("Failed to write split datasets under {}", root.display()))?;

    Ok(SplitOutcome {
        output_paths,
        sizes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    use crate::core::loaders::load_track_array;
    use crate::processors::padding::TrackRecord;

    fn write_recording(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "azimuth,range,height,velocity,time,rcs,label").unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    const SAMPLE: &[&str] = &[
        "1.0,100.0,10.0,5.0,0.0,3.0,0",
        "2.0,101.0,10.0,5.0,1.0,3.0,",
        "3.0,50.0,5.0,2.0,2.0,1.0,1",
    ];

    #[test]
    fn test_extract_tracks_variable_mode() {
        let dir = tempdir().unwrap();
        let input = write_recording(dir.path(), "raw_data.csv", SAMPLE);

        let outcome =
            extract_tracks(&input, PaddingMode::None, &InputConfig::default(), None).unwrap();

        assert_eq!(outcome.output_path, dir.path().join("raw_tracks_graph.json"));
        assert_eq!(outcome.stats.total_tracks, 2);

        let content = std::fs::read_to_string(&outcome.output_path).unwrap();
        let records: Vec<TrackRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].length, 2);
        assert_eq!(records[1].label, 1);
    }

    #[test]
    fn test_extract_tracks_fixed_mode() {
        let dir = tempdir().unwrap();
        let input = write_recording(dir.path(), "raw_data.csv", SAMPLE);

        let outcome =
            extract_tracks(&input, PaddingMode::Fixed(11), &InputConfig::default(), None).unwrap();

        assert_eq!(outcome.output_path, dir.path().join("raw_data_padded.npy"));

        let array = load_track_array(&outcome.output_path).unwrap();
        assert_eq!(array.num_tracks(), 2);
        assert_eq!(array.rows_per_track, 12);
        assert_eq!(array.label(0), 0.0);
        assert_eq!(array.length(0), 2.0);
    }

    #[test]
    fn test_extract_tracks_invalid_fixed_length_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = write_recording(dir.path(), "raw_data.csv", SAMPLE);

        let result = extract_tracks(&input, PaddingMode::Fixed(5), &InputConfig::default(), None);

        assert!(result.is_err());
        assert!(!dir.path().join("raw_data_padded.npy").exists());
    }

    #[test]
    fn test_extract_sequences() {
        let dir = tempdir().unwrap();
        let input = write_recording(dir.path(), "recording.csv", SAMPLE);

        let outcome = extract_sequences(&input, &InputConfig::default(), None).unwrap();

        assert_eq!(outcome.output_path, dir.path().join("recording.npy"));
        let array = load_track_array(&outcome.output_path).unwrap();
        assert_eq!(array.num_tracks(), 2);
        assert_eq!(array.rows_per_track, 16);
        assert_eq!(array.width, 9);
    }

    #[test]
    fn test_split_dataset_files() {
        let dir = tempdir().unwrap();
        let input = write_recording(dir.path(), "raw_data.csv", SAMPLE);
        let outcome =
            extract_tracks(&input, PaddingMode::Fixed(11), &InputConfig::default(), None).unwrap();

        let root = dir.path().join("dataset");
        let split = split_dataset_files(&outcome.output_path, &root, 0.2, 0.2).unwrap();

        assert_eq!(split.sizes.iter().sum::<usize>(), 2);
        for path in &split.output_paths {
            assert!(path.exists());
        }
    }

    #[test]
    fn test_split_rejects_bad_ratios_before_reading() {
        let root = Path::new("unused");
        let result = split_dataset_files(Path::new("missing.npy"), root, 0.8, 0.4);

        // Ratio validation fires before the missing file would
        assert!(result.unwrap_err().to_string().contains("sum to below 1"));
    }
}
