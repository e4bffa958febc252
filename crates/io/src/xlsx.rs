// Excel workbook import (xlsx, xlsm, xlsb, xls, ods) and export (xlsx only)
//
// Import reads one worksheet into a RawTable. Export writes the canonical
// columns followed by passthrough columns to a single "Report" sheet.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use haul_schema::{CanonicalRecord, CanonicalTable, CellValue, RawTable};

use crate::error::{ExportError, LoadError};

pub const EXPORT_SHEET_NAME: &str = "Report";

const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm";

// Worksheet limits for the xlsx format.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Read the named sheet, or the first one. The first non-empty row is the
/// header; empty rows are skipped.
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<RawTable, LoadError> {
    let workbook_error = |message: String| LoadError::Workbook {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook: Sheets<_> =
        open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| LoadError::SheetNotFound {
                name: wanted.to_string(),
                available: sheet_names.clone(),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| workbook_error("workbook contains no sheets".into()))?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| workbook_error(format!("failed to read sheet '{name}': {e}")))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(CellValue::is_empty));

    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| LoadError::NoHeader(path.to_path_buf()))?
        .iter()
        .map(|c| c.to_string().trim().to_string())
        .collect();
    let body: Vec<Vec<CellValue>> = rows.collect();

    log::info!(
        "{}: sheet '{}', {} column(s), {} row(s)",
        path.display(),
        name,
        headers.len(),
        body.len()
    );
    Ok(RawTable::new(headers, body))
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Date-formatted numbers; fall back to the serial when out of range.
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => {
            log::debug!("cell error {e:?} read as empty");
            CellValue::Empty
        }
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Write the selected records of `table` to an xlsx file.
pub fn write_xlsx(
    table: &CanonicalTable,
    records: &[&CanonicalRecord],
    path: &Path,
) -> Result<(), ExportError> {
    let mut workbook = build_workbook(table, records)?;
    workbook.save(path)?;
    log::info!("wrote {} row(s) to {}", records.len(), path.display());
    Ok(())
}

/// Same workbook as `write_xlsx`, in memory.
pub fn xlsx_bytes(
    table: &CanonicalTable,
    records: &[&CanonicalRecord],
) -> Result<Vec<u8>, ExportError> {
    let mut workbook = build_workbook(table, records)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(
    table: &CanonicalTable,
    records: &[&CanonicalRecord],
) -> Result<Workbook, ExportError> {
    let columns = table.column_names();
    if records.len() >= MAX_ROWS || columns.len() > MAX_COLS {
        return Err(ExportError::TooLarge {
            rows: records.len(),
            cols: columns.len(),
        });
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet().set_name(EXPORT_SHEET_NAME)?;

    let header_format = Format::new().set_bold();
    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header_format)?;
    }

    let date_format = Format::new().set_num_format(DATE_FORMAT);
    for (idx, record) in records.iter().enumerate() {
        let row = idx as u32 + 1;
        for (col, cell) in table.row_cells(record).iter().enumerate() {
            write_cell(worksheet, row, col as u16, cell, &date_format)?;
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofit();
    Ok(workbook)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    date_format: &Format,
) -> Result<(), ExportError> {
    match cell {
        CellValue::Empty => {}
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::DateTime(dt) => {
            worksheet.write_datetime_with_format(row, col, dt, date_format)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::ExcelDateTime;

    #[test]
    fn test_convert_plain_cells() {
        assert_eq!(convert_cell(&Data::Empty), CellValue::Empty);
        assert_eq!(convert_cell(&Data::String("  ".into())), CellValue::Empty);
        assert_eq!(convert_cell(&Data::String("Ani".into())), CellValue::Text("Ani".into()));
        assert_eq!(convert_cell(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(convert_cell(&Data::Float(6.5)), CellValue::Number(6.5));
        assert_eq!(convert_cell(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(
            convert_cell(&Data::DateTimeIso("2024-03-05T08:00:00".into())),
            CellValue::Text("2024-03-05T08:00:00".into())
        );
        assert_eq!(
            convert_cell(&Data::Error(calamine::CellErrorType::NA)),
            CellValue::Empty
        );
    }

    #[test]
    fn test_convert_excel_date() {
        let dt = ExcelDateTime::new(45356.5, calamine::ExcelDateTimeType::DateTime, false);
        let expected = chrono::NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(convert_cell(&Data::DateTime(dt)), CellValue::DateTime(expected));
    }
}
