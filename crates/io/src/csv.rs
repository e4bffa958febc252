// Delimited text import/export (csv, tsv, txt)

use std::io::Write;
use std::path::Path;

use haul_schema::{CanonicalRecord, CanonicalTable, CellValue, RawTable};

use crate::error::{ExportError, LoadError};

pub fn read_delimited(path: &Path) -> Result<RawTable, LoadError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = if has_extension(path, "tsv") {
        b'\t'
    } else {
        sniff_delimiter(&content)
    };
    log::debug!(
        "{}: delimiter {:?}",
        path.display(),
        char::from(delimiter)
    );
    parse_delimited(&content, delimiter)?.ok_or_else(|| LoadError::NoHeader(path.to_path_buf()))
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Detect the field delimiter from the first lines of the file.
///
/// Each candidate (tab, semicolon, comma, pipe) is scored by how many sample
/// lines share the first line's field count, times that count. Candidates
/// that leave the first line as a single field are skipped.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample: Vec<&str> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();

    let mut best = b',';
    let mut best_score = 0usize;

    for &delim in candidates {
        let counts: Vec<usize> = sample.iter().map(|line| field_count(line, delim)).collect();

        let Some(&target) = counts.first() else { break };
        if target <= 1 {
            continue;
        }

        let score = counts.iter().filter(|&&c| c == target).count() * target;
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map_or(1, |r| r.len())
}

/// Read a file as UTF-8, falling back to Windows-1252 (Excel's CSV export).
pub fn read_file_as_utf8(path: &Path) -> Result<String, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s)),
        Err(e) => {
            log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
            Ok(decoded.into_owned())
        }
    }
}

/// First non-blank record is the header; blank records are skipped.
/// Returns `None` when there is no header at all.
pub fn parse_delimited(content: &str, delimiter: u8) -> Result<Option<RawTable>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        match headers {
            None => headers = Some(record.iter().map(str::to_string).collect()),
            Some(_) => rows.push(record.iter().map(CellValue::from).collect()),
        }
    }

    Ok(headers.map(|h| RawTable::new(h, rows)))
}

pub fn write_csv<W: Write>(
    table: &CanonicalTable,
    records: &[&CanonicalRecord],
    writer: W,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(table.column_names())?;
    for record in records {
        let cells = table.row_cells(record);
        writer.write_record(cells.iter().map(|c| c.to_string()))?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Tanggal;Qty;Salesman\n01/02/2024;5;Ani\n02/02/2024;6;Budi\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "Tanggal,Qty,Salesman\n01/02/2024,5,Ani\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Tanggal\tQty\tSalesman\n01/02/2024\t5\tAni\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_pipe_delimiter() {
        let content = "Tanggal|Qty|Salesman\n01/02/2024|5|Ani\n";
        assert_eq!(sniff_delimiter(content), b'|');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        let content = "Customer;Alamat;Qty\n\"PT Beton, Tbk\";\"Jl. Sudirman, 4\";7\nPT Jaya;\"Jl. Asia\";5\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_single_column_falls_back_to_comma() {
        assert_eq!(sniff_delimiter("Tanggal\n2024-01-01\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_parse_skips_blank_lines_before_header() {
        let content = "\n,,\nTanggal,Qty\n2024-01-01,5\n,\n2024-01-02,\n";
        let table = parse_delimited(content, b',').unwrap().unwrap();
        assert_eq!(table.headers(), ["Tanggal", "Qty"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[1][1], CellValue::Empty);
    }

    #[test]
    fn test_parse_empty_content_has_no_header() {
        assert!(parse_delimited("\n\n", b',').unwrap().is_none());
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // é as a single 0xE9 byte
        fs::write(&path, b"Pelanggan\nCaf\xe9\n").unwrap();
        let content = read_file_as_utf8(&path).unwrap();
        assert_eq!(content, "Pelanggan\nCafé\n");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        fs::write(&path, "\u{feff}Tanggal,Qty\n").unwrap();
        let table = read_delimited(&path).unwrap();
        assert_eq!(table.headers()[0], "Tanggal");
    }

    #[test]
    fn test_tsv_extension_forces_tab() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sheet.tsv");
        fs::write(&path, "Area\tCatatan\nJakarta\ta,b;c\n").unwrap();
        let table = read_delimited(&path).unwrap();
        assert_eq!(table.headers(), ["Area", "Catatan"]);
        assert_eq!(table.rows()[0][1], CellValue::Text("a,b;c".into()));
    }
}
