use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file type '{extension}' (expected xlsx, xlsm, xlsb, xls, ods, csv, tsv or txt)")]
    Unsupported { extension: String },

    #[error("{path} is {size} bytes, over the {limit} byte limit")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Workbook could not be opened or a sheet could not be read.
    #[error("cannot open workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("sheet '{name}' not found (available: {})", .available.join(", "))]
    SheetNotFound { name: String, available: Vec<String> },

    #[error("malformed delimited file: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0} has no header row")]
    NoHeader(PathBuf),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unsupported export type '{extension}' (expected xlsx or csv)")]
    Unsupported { extension: String },

    #[error("xlsx export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("table too large for a worksheet ({rows} rows, {cols} columns)")]
    TooLarge { rows: usize, cols: usize },
}
