//! Command-line interface for the track pipeline.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::Instant;

use crate::processors::{extract_sequences, extract_tracks, split_dataset_files, PaddingMode};
use crate::PipelineConfig;

#[derive(Parser)]
#[command(name = "track-pipeline")]
#[command(about = "Radar track preprocessing pipeline", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract labeled tracks from a raw recording
    Extract {
        /// Input recording file (delimited text with a label column)
        input: PathBuf,
        /// Pad every track to this many points (omit for variable-length output)
        #[arg(short, long)]
        fixed_length: Option<usize>,
        /// Output file path (derived from the input name by default)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the derived-feature sequence dataset (9-wide rows with elevation angle)
    Sequence {
        /// Input recording file
        input: PathBuf,
        /// Output file path (input with .npy extension by default)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split a fixed-length dataset into train/test/val sets
    Split {
        /// Processed dataset file (.npy)
        data: PathBuf,
        /// Dataset root for the train/, test/, and eval/ outputs
        root: PathBuf,
        /// Fraction of each class for the test set
        #[arg(long)]
        test_ratio: Option<f64>,
        /// Fraction of each class for the validation set
        #[arg(long)]
        val_ratio: Option<f64>,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.len() > 39 {
            format!("{}...", &value[..36])
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}, using defaults",
                    path.display(),
                    e
                );
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    };

    // Dispatch to subcommands
    match cli.command {
        Commands::Extract {
            input,
            fixed_length,
            output,
        } => {
            cmd_extract(&input, fixed_length, output.as_deref(), &config);
        }
        Commands::Sequence { input, output } => {
            cmd_sequence(&input, output.as_deref(), &config);
        }
        Commands::Split {
            data,
            root,
            test_ratio,
            val_ratio,
        } => {
            cmd_split(&data, &root, test_ratio, val_ratio, &config);
        }
    }
}

fn cmd_extract(
    input: &PathBuf,
    fixed_length: Option<usize>,
    output: Option<&std::path::Path>,
    config: &PipelineConfig,
) {
    let start = Instant::now();
    let mode = PaddingMode::from_option(fixed_length);

    println!("Extracting tracks...");
    println!("Input: {}", input.display());
    match mode {
        PaddingMode::None => println!("Padding: none (variable-length output)"),
        PaddingMode::Fixed(n) => println!("Padding: fixed length {}", n),
    }

    let spinner = create_spinner("Segmenting recording...");

    match extract_tracks(input, mode, &config.input, output) {
        Ok(outcome) => {
            spinner.finish_and_clear();

            let stats = &outcome.stats;
            let mut items = vec![
                ("Input file", input.display().to_string()),
                ("Output file", outcome.output_path.display().to_string()),
                ("Tracks", stats.total_tracks.to_string()),
                ("Label 0 (non-drone)", stats.label_counts[0].to_string()),
                ("Label 1 (drone)", stats.label_counts[1].to_string()),
            ];
            // Length statistics only mean anything before padding
            if mode == PaddingMode::None {
                items.push(("Min length", stats.min_length.to_string()));
                items.push(("Max length", stats.max_length.to_string()));
                items.push(("Mean length", format!("{:.2}", stats.mean_length)));
            }
            items.push(("Duration", format!("{:.2?}", start.elapsed())));

            print_summary("Track Extraction Complete", &items);
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Extraction failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_sequence(input: &PathBuf, output: Option<&std::path::Path>, config: &PipelineConfig) {
    let start = Instant::now();

    println!("Building sequence dataset...");
    println!("Input: {}", input.display());

    let spinner = create_spinner("Computing derived features...");

    match extract_sequences(input, &config.input, output) {
        Ok(outcome) => {
            spinner.finish_and_clear();

            let stats = &outcome.stats;
            print_summary(
                "Sequence Dataset Complete",
                &[
                    ("Input file", input.display().to_string()),
                    ("Output file", outcome.output_path.display().to_string()),
                    ("Tracks", stats.total_tracks.to_string()),
                    ("Label 0 (non-drone)", stats.label_counts[0].to_string()),
                    ("Label 1 (drone)", stats.label_counts[1].to_string()),
                    ("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Sequence build failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_split(
    data: &PathBuf,
    root: &PathBuf,
    test_ratio: Option<f64>,
    val_ratio: Option<f64>,
    config: &PipelineConfig,
) {
    let start = Instant::now();

    let test_ratio = test_ratio.unwrap_or(config.split.test_ratio);
    let val_ratio = val_ratio.unwrap_or(config.split.val_ratio);

    println!("Splitting dataset...");
    println!("Input: {}", data.display());
    println!("Dataset root: {}", root.display());
    println!("Ratios: test {} / val {}", test_ratio, val_ratio);

    let spinner = create_spinner("Partitioning tracks...");

    match split_dataset_files(data, root, test_ratio, val_ratio) {
        Ok(outcome) => {
            spinner.finish_and_clear();

            print_summary(
                "Dataset Split Complete",
                &[
                    ("Input file", data.display().to_string()),
                    ("Train tracks", outcome.sizes[0].to_string()),
                    ("Test tracks", outcome.sizes[1].to_string()),
                    ("Val tracks", outcome.sizes[2].to_string()),
                    ("Train file", outcome.output_paths[0].display().to_string()),
                    ("Test file", outcome.output_paths[1].display().to_string()),
                    ("Val file", outcome.output_paths[2].display().to_string()),
                    ("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Split failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
