// Sheet loading and export

pub mod csv;
pub mod error;
pub mod xlsx;

use std::path::Path;

use haul_schema::config::DEFAULT_MAX_FILE_BYTES;
use haul_schema::{CanonicalRecord, CanonicalTable, RawTable};

pub use error::{ExportError, LoadError};

/// How a file is read, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Workbook,
    Delimited,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = extension(path);
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Workbook),
            "csv" | "tsv" | "txt" => Ok(Self::Delimited),
            _ => Err(LoadError::Unsupported { extension: ext }),
        }
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Worksheet to read; the first one when unset. Ignored for delimited files.
    pub sheet: Option<String>,
    pub max_file_bytes: u64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sheet: None,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

/// Load a sheet into a `RawTable`, rejecting oversized files before parsing.
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<RawTable, LoadError> {
    let format = SourceFormat::from_path(path)?;

    let size = std::fs::metadata(path)
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    if size > options.max_file_bytes {
        return Err(LoadError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: options.max_file_bytes,
        });
    }

    match format {
        SourceFormat::Workbook => xlsx::read_workbook(path, options.sheet.as_deref()),
        SourceFormat::Delimited => {
            if options.sheet.is_some() {
                log::warn!("{}: --sheet ignored for delimited files", path.display());
            }
            csv::read_delimited(path)
        }
    }
}

/// Export by extension: `.xlsx` or `.csv`.
pub fn write_table(
    table: &CanonicalTable,
    records: &[&CanonicalRecord],
    path: &Path,
) -> Result<(), ExportError> {
    match extension(path).as_str() {
        "xlsx" => xlsx::write_xlsx(table, records, path),
        "csv" => {
            let file = std::fs::File::create(path)?;
            csv::write_csv(table, records, std::io::BufWriter::new(file))?;
            log::info!("wrote {} row(s) to {}", records.len(), path.display());
            Ok(())
        }
        other => Err(ExportError::Unsupported {
            extension: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_source_format_by_extension() {
        let cases = [
            ("a.xlsx", SourceFormat::Workbook),
            ("a.XLS", SourceFormat::Workbook),
            ("a.ods", SourceFormat::Workbook),
            ("a.csv", SourceFormat::Delimited),
            ("a.TSV", SourceFormat::Delimited),
            ("a.txt", SourceFormat::Delimited),
        ];
        for (name, expected) in cases {
            assert_eq!(SourceFormat::from_path(&PathBuf::from(name)).unwrap(), expected);
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let err = SourceFormat::from_path(Path::new("sheet.pdf")).unwrap_err();
        assert!(matches!(err, LoadError::Unsupported { ref extension } if extension == "pdf"));
        assert!(SourceFormat::from_path(Path::new("noext")).is_err());
    }
}
