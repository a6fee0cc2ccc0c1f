use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

use crate::chart_export::ChartExportFormat;
use crate::loader::LoadOptions;

/// Compression format for data files
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Gzip compression (.gz) - Most common, good balance of speed and compression
    Gzip,
    /// Zstandard compression (.zst) - Modern, fast compression with good ratios
    Zstd,
    /// Bzip2 compression (.bz2) - Good compression ratio, slower than gzip
    Bzip2,
    /// XZ compression (.xz) - Excellent compression ratio, slower than bzip2
    Xz,
}

impl CompressionFormat {
    /// Auto-detect from the file extension, e.g. `data.csv.gz`.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "gz" | "gzip" => Some(Self::Gzip),
            "zst" => Some(Self::Zstd),
            "bz2" => Some(Self::Bzip2),
            "xz" => Some(Self::Xz),
            _ => None,
        }
    }
}

/// Command-line arguments for lifechart
#[derive(Parser, Debug)]
#[command(version, about = "lifechart")]
pub struct Args {
    /// Delimited data file to chart (required unless --init-plan)
    pub path: Option<PathBuf>,

    /// Directory the chart images are written to
    #[arg(long = "out-dir", default_value = "charts")]
    pub out_dir: PathBuf,

    /// Chart plan (TOML); the built-in lifestyle plan is used when omitted
    #[arg(long = "plan")]
    pub plan: Option<PathBuf>,

    /// Image format for rendered charts
    #[arg(long = "format", value_enum, default_value = "png")]
    pub format: ChartExportFormat,

    /// Specify the delimiter to use when reading the file
    #[arg(long = "delimiter")]
    pub delimiter: Option<u8>,

    /// Specify that the file has no header
    #[arg(long = "no-header", action)]
    pub no_header: bool,

    /// Skip this many lines when reading the file
    #[arg(long = "skip-lines")]
    pub skip_lines: Option<usize>,

    /// Skip this many rows when reading the file
    #[arg(long = "skip-rows")]
    pub skip_rows: Option<usize>,

    /// Specify the compression format explicitly (gzip, zstd, bzip2, xz)
    /// If not specified, compression is auto-detected from the file extension.
    #[arg(long = "compression", value_enum)]
    pub compression: Option<CompressionFormat>,

    /// Write the default chart plan as a TOML template and exit
    #[arg(long = "init-plan", action)]
    pub init_plan: bool,

    /// Overwrite an existing plan file when used with --init-plan
    #[arg(long = "force", action)]
    pub force: bool,

    /// Enable debug logging
    #[arg(short, long, action)]
    pub verbose: bool,
}

impl From<&Args> for LoadOptions {
    fn from(args: &Args) -> Self {
        let mut opts = LoadOptions::new();
        if let Some(delimiter) = args.delimiter {
            opts = opts.with_delimiter(delimiter);
        }
        if args.no_header {
            opts = opts.with_has_header(false);
        }
        if let Some(skip_lines) = args.skip_lines {
            opts = opts.with_skip_lines(skip_lines);
        }
        if let Some(skip_rows) = args.skip_rows {
            opts = opts.with_skip_rows(skip_rows);
        }
        if let Some(compression) = args.compression {
            opts = opts.with_compression(compression);
        }
        opts
    }
}
