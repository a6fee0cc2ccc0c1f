//! Eager CSV loading with compression auto-detection.
//!
//! Compressed inputs (gzip, zstd, bzip2, xz) are decompressed in memory and
//! fed to the polars reader through a cursor. Values that fail schema-level
//! parsing become missing rather than failing the load, matching the
//! coerce-or-missing policy downstream.

use color_eyre::Result;
use polars::prelude::*;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use crate::cli::CompressionFormat;

/// Options controlling how a delimited file is read. Unset fields fall back
/// to the reader defaults (comma-separated, with header).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
    pub skip_lines: Option<usize>,
    pub skip_rows: Option<usize>,
    pub compression: Option<CompressionFormat>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = Some(has_header);
        self
    }

    pub fn with_skip_lines(mut self, skip_lines: usize) -> Self {
        self.skip_lines = Some(skip_lines);
        self
    }

    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = Some(skip_rows);
        self
    }

    pub fn with_compression(mut self, compression: CompressionFormat) -> Self {
        self.compression = Some(compression);
        self
    }
}

fn read_options(options: &LoadOptions) -> CsvReadOptions {
    let mut read_options = CsvReadOptions::default();
    if let Some(skip_lines) = options.skip_lines {
        read_options.skip_lines = skip_lines;
    }
    if let Some(skip_rows) = options.skip_rows {
        read_options.skip_rows = skip_rows;
    }
    if let Some(has_header) = options.has_header {
        read_options.has_header = has_header;
    }
    // A value that does not fit the inferred column type becomes null instead
    // of failing the whole read.
    read_options.ignore_errors = true;
    if let Some(delimiter) = options.delimiter {
        read_options = read_options.map_parse_options(|opts| opts.with_separator(delimiter));
    }
    read_options
}

fn decompress(path: &Path, compression: CompressionFormat) -> Result<Vec<u8>> {
    let file = BufReader::new(File::open(path)?);
    let mut decompressed = Vec::new();
    match compression {
        CompressionFormat::Gzip => {
            flate2::read::MultiGzDecoder::new(file).read_to_end(&mut decompressed)?;
        }
        CompressionFormat::Zstd => {
            zstd::stream::read::Decoder::new(file)?.read_to_end(&mut decompressed)?;
        }
        CompressionFormat::Bzip2 => {
            bzip2::read::BzDecoder::new(file).read_to_end(&mut decompressed)?;
        }
        CompressionFormat::Xz => {
            xz2::read::XzDecoder::new(file).read_to_end(&mut decompressed)?;
        }
    }
    Ok(decompressed)
}

/// Read a delimited file into a DataFrame. Compression is taken from the
/// options when set, otherwise auto-detected from the file extension.
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<DataFrame> {
    let compression = options
        .compression
        .or_else(|| CompressionFormat::from_extension(path));

    let df = match compression {
        Some(compression) => {
            let decompressed = decompress(path, compression)?;
            CsvReader::new(Cursor::new(decompressed))
                .with_options(read_options(options))
                .finish()?
        }
        None => read_options(options)
            .try_into_reader_with_file_path(Some(path.into()))?
            .finish()?,
    };
    Ok(df)
}
