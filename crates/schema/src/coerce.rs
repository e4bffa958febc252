// Lenient cell coercion. Failures return None; callers decide the fallback.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

use crate::model::CellValue;

/// Pseudo-format selecting RFC 3339 parsing.
pub const RFC3339: &str = "rfc3339";

/// Formats tried in order for text dates. Slash, dash and dot forms with
/// the year last are day-first.
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    RFC3339,
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d-%m-%Y",
    "%d-%m-%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d.%m.%Y",
    "%d %b %Y",
];

// 1900 date system. Excel counts a phantom 1900-02-29 as serial 60, so
// serials from 61 on are days since 1899-12-30 and earlier ones are one day
// later than that. Serial 60 itself lands on 1900-02-28.
const EXCEL_LEAP_BUG_SERIAL: f64 = 60.0;
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParser {
    formats: Vec<String>,
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect())
    }
}

impl DateParser {
    pub fn new(formats: Vec<String>) -> Self {
        Self { formats }
    }

    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    pub fn parse_cell(&self, cell: &CellValue) -> Option<NaiveDateTime> {
        match cell {
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::Number(n) => excel_serial_to_datetime(*n),
            CellValue::Text(s) => self.parse_text(s),
            CellValue::Empty | CellValue::Bool(_) => None,
        }
    }

    pub fn parse_text(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.formats.iter().find_map(|fmt| {
            if fmt == RFC3339 {
                return DateTime::parse_from_rfc3339(text)
                    .ok()
                    .map(|dt| dt.naive_local());
            }
            NaiveDateTime::parse_from_str(text, fmt).ok().or_else(|| {
                NaiveDate::parse_from_str(text, fmt)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
        })
    }
}

pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(1.0..=EXCEL_MAX_SERIAL).contains(&serial) {
        return None;
    }
    let base = if serial < EXCEL_LEAP_BUG_SERIAL {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    }
    .and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    base.checked_add_signed(Duration::milliseconds(millis))
}

/// Numeric value of a cell; `None` means "not a number" and becomes zero.
///
/// Text must be a plain decimal with `.` as the separator. `12,5` and
/// `1,250` are rejected rather than guessed at, since sheets mix locales.
pub fn number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Trimmed text of a cell; `None` for empty cells.
pub fn text(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Empty => None,
        CellValue::Text(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        other => Some(other.to_string()),
    }
}
