use chrono::NaiveDateTime;
use serde::Serialize;

use crate::field::CanonicalField;
use crate::mapping::ColumnMapping;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single spreadsheet cell as loaded, before any coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => write!(f, "{s}"),
            // integers without decimals
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Uploaded table: untrusted headers plus rows aligned to them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Rows are padded with `Empty` or truncated to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell under the first column whose header equals `header`.
    pub fn get(&self, row: usize, header: &str) -> Option<&CellValue> {
        let col = self.headers.iter().position(|h| h == header)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One delivery row with every canonical field populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    /// `None` only when the date field is optional and absent, or the
    /// unparseable-date policy keeps bad rows.
    pub delivery_date: Option<NaiveDateTime>,
    pub volume: f64,
    pub salesman: String,
    pub trip_id: String,
    pub truck_id: String,
    pub area: String,
    pub plant: String,
    pub end_customer: String,
    pub distance: f64,
    /// Passthrough cells, aligned with `CanonicalTable::passthrough`.
    pub extra: Vec<CellValue>,
}

impl CanonicalRecord {
    /// Value of a text or identifier field. Date and numeric fields yield `None`.
    pub fn text(&self, field: CanonicalField) -> Option<&str> {
        match field {
            CanonicalField::Salesman => Some(&self.salesman),
            CanonicalField::TripId => Some(&self.trip_id),
            CanonicalField::TruckId => Some(&self.truck_id),
            CanonicalField::Area => Some(&self.area),
            CanonicalField::Plant => Some(&self.plant),
            CanonicalField::EndCustomer => Some(&self.end_customer),
            CanonicalField::DeliveryDate | CanonicalField::Volume | CanonicalField::Distance => {
                None
            }
        }
    }

    /// Trips this row stands for. A numeric trip column (Ritase) holds a
    /// count; an identifier such as `DP-001` is one trip.
    pub fn trips(&self) -> f64 {
        self.trip_id
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && *n >= 0.0)
            .unwrap_or(1.0)
    }

    pub fn number(&self, field: CanonicalField) -> Option<f64> {
        match field {
            CanonicalField::Volume => Some(self.volume),
            CanonicalField::Distance => Some(self.distance),
            _ => None,
        }
    }

    /// Canonical field as a cell, for export.
    pub fn cell(&self, field: CanonicalField) -> CellValue {
        match field {
            CanonicalField::DeliveryDate => self
                .delivery_date
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Empty),
            CanonicalField::Volume => CellValue::Number(self.volume),
            CanonicalField::Distance => CellValue::Number(self.distance),
            other => CellValue::Text(self.text(other).unwrap_or_default().to_string()),
        }
    }
}

/// Counts of what reconciliation absorbed. Nothing here is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub rows_in: usize,
    pub rows_out: usize,
    pub dropped_bad_dates: usize,
    /// Rows kept without a date under the keep policy.
    pub kept_bad_dates: usize,
    pub numeric_zeroed: usize,
    pub defaulted: Vec<CanonicalField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalTable {
    pub mapping: ColumnMapping,
    /// Original names of the unmatched columns, in column order.
    pub passthrough: Vec<String>,
    pub records: Vec<CanonicalRecord>,
    pub summary: ReconcileSummary,
}

impl CanonicalTable {
    /// Export layout: canonical names in declaration order, then passthrough.
    pub fn column_names(&self) -> Vec<String> {
        CanonicalField::ALL
            .iter()
            .map(|f| f.name().to_string())
            .chain(self.passthrough.iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Row cells in `column_names` order.
    pub fn row_cells(&self, record: &CanonicalRecord) -> Vec<CellValue> {
        CanonicalField::ALL
            .iter()
            .map(|f| record.cell(*f))
            .chain(record.extra.iter().cloned())
            .collect()
    }

    /// Canonical table back into a raw one, as it would be written out.
    pub fn to_raw(&self) -> RawTable {
        RawTable::new(
            self.column_names(),
            self.records.iter().map(|r| self.row_cells(r)).collect(),
        )
    }
}
