//! CLI argument definitions for exam-prep.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use exam_cli::FitPolicy;
use exam_model::TARGET_COLUMN;
use exam_transform::DEFAULT_ARTIFACT_PATH;

#[derive(Parser)]
#[command(
    name = "exam-prep",
    version,
    about = "Preprocess student exam-score tables into model-ready arrays",
    long_about = "Preprocess student exam-score tables into model-ready arrays.\n\n\
                  Numeric scores are median-imputed and scaled; demographic columns are\n\
                  imputed with their most frequent value, one-hot encoded and scaled.\n\
                  The fitted preprocessor is saved as JSON for reuse."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fit the preprocessor on a training table and transform train and test.
    Transform(TransformArgs),

    /// Transform a table with a previously saved preprocessor.
    Apply(ApplyArgs),

    /// Show the learned parameters of a saved preprocessor.
    Inspect(InspectArgs),
}

#[derive(Parser)]
pub struct TransformArgs {
    /// Training table (CSV with header row).
    #[arg(value_name = "TRAIN")]
    pub train: PathBuf,

    /// Test table (CSV with header row).
    #[arg(value_name = "TEST")]
    pub test: PathBuf,

    /// Where to save the fitted preprocessor.
    #[arg(long = "artifact", value_name = "PATH", default_value = DEFAULT_ARTIFACT_PATH)]
    pub artifact: PathBuf,

    /// How the test table is transformed.
    ///
    /// `train-only` reuses the parameters learned on the training table.
    /// `refit-on-test` fits a separate copy on the test table; the saved
    /// preprocessor is always the training fit.
    #[arg(long = "fit-policy", value_enum, default_value = "train-only")]
    pub fit_policy: FitPolicyArg,

    /// Also write train_array.csv and test_array.csv to this directory.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Saved preprocessor (JSON).
    #[arg(value_name = "ARTIFACT")]
    pub artifact: PathBuf,

    /// Table to transform (CSV with header row).
    #[arg(value_name = "CSV")]
    pub data: PathBuf,

    /// Target column to append as the last array column.
    #[arg(long = "target", value_name = "COLUMN", num_args = 0..=1, default_missing_value = TARGET_COLUMN)]
    pub target: Option<String>,

    /// Write the transformed array to this CSV file.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Saved preprocessor (JSON).
    #[arg(value_name = "ARTIFACT")]
    pub artifact: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FitPolicyArg {
    TrainOnly,
    RefitOnTest,
}

impl From<FitPolicyArg> for FitPolicy {
    fn from(value: FitPolicyArg) -> Self {
        match value {
            FitPolicyArg::TrainOnly => FitPolicy::TrainOnly,
            FitPolicyArg::RefitOnTest => FitPolicy::RefitOnTest,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
