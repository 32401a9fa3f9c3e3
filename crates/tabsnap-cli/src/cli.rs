use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Extract and validate schedule tables from OCR token dumps.
#[derive(Debug, Parser)]
#[command(name = "tabsnap", about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract tables from an OCR token dump
    Tables {
        /// Path to the token dump (JSON array of {text, left, top, width, height, conf})
        #[arg(value_name = "TOKENS")]
        tokens: PathBuf,

        /// Detected table regions (JSON array of {x1, y1, x2, y2}). Default: one region spanning all tokens
        #[arg(long)]
        regions: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Emit the validation view (canonical-role columns only)
        #[arg(long)]
        canonical: bool,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Extract tables and report validation warnings
    Validate {
        /// Path to the token dump (JSON array of {text, left, top, width, height, conf})
        #[arg(value_name = "TOKENS")]
        tokens: PathBuf,

        /// Detected table regions (JSON array of {x1, y1, x2, y2}). Default: one region spanning all tokens
        #[arg(long)]
        regions: Option<PathBuf>,

        /// Header field map (JSON object) for the required-field checks
        #[arg(long)]
        header: Option<PathBuf>,

        /// Raw full-page OCR text, used to recover document-level totals
        #[arg(long)]
        page_text: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Parse `Key: Value` lines from header-strip text into a JSON map
    Header {
        /// Path to the header-strip text file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Key rename map (JSON object), applied to parsed keys
        #[arg(long)]
        key_map: Option<PathBuf>,
    },
}

/// Extraction tuning flags shared by `tables` and `validate`.
#[derive(Debug, clap::Args)]
pub struct Tuning {
    /// Minimum OCR confidence for body tokens (default: 30)
    #[arg(long, default_value_t = 30.0)]
    pub confidence_threshold: f64,

    /// Row-grouping tolerance fallback in pixels (default: 15)
    #[arg(long, default_value_t = 15)]
    pub row_tolerance: i64,

    /// Disable the self-calibrating row tolerance
    #[arg(long)]
    pub no_dynamic_tolerance: bool,

    /// Gap below which adjacent header tokens merge into one column (default: 120)
    #[arg(long, default_value_t = 120)]
    pub header_merge_tolerance: i64,

    /// Disable header-driven column binning (forces the numeric fallback)
    #[arg(long)]
    pub no_header_bins: bool,

    /// Padding around the table band in pixels (default: 6)
    #[arg(long, default_value_t = 6)]
    pub band_pad: i64,
}

/// Output format for extracted tables and warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated text
    Text,
    /// JSON
    Json,
    /// CSV (row-major, header row first)
    Csv,
}
